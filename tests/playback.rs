use simlog::core::query::{self, FrameCursor};
use simlog::core::{parser, CollisionKind};

/// Nominally simultaneous samples from different particles carry
/// independent floating-point jitter; a frame query near the nominal time
/// still gathers all of them onto one frame.
#[test]
fn jittered_timestamps_land_on_the_same_frame() -> simlog::error::Result<()> {
    let log = "\
0.1,POSITION,1,1,1,1,1
0.1000000001,POSITION,2,2,2,1,1
0.2,POSITION,1,1.5,1,1,1
0.1999999999,POSITION,2,2,2.5,1,1
";
    let model = parser::parse_str(log)?;
    // Each jittered stamp registers its own frame,
    assert_eq!(model.frame_count(), 4);
    // yet a query near the nominal time sees both particles.
    for nominal in [0.1, 0.2] {
        let frame = query::frame_snapshot(&model, nominal, query::SAMPLE_TOLERANCE);
        let ids: Vec<u32> = frame.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![1, 2], "at nominal time {nominal}");
    }
    Ok(())
}

/// A forward playback pass through cursors visits exactly the samples the
/// random-access query finds, frame by frame, across particles with offset
/// lifetimes.
#[test]
fn cursor_playback_matches_random_access() -> simlog::error::Result<()> {
    let mut log = String::new();
    for i in 0..40 {
        let t = f64::from(i) * 0.05;
        log.push_str(&format!("{t},POSITION,1,{},0,1,1\n", f64::from(i)));
        if i >= 10 {
            log.push_str(&format!("{},POSITION,2,0,{},1,1\n", t + 0.0004, f64::from(i)));
        }
        if i < 25 {
            log.push_str(&format!("{},POSITION,3,3,{},1,1\n", t + 0.0003, f64::from(i)));
        }
    }
    let model = parser::parse_str(&log)?;

    let ids = model.particle_ids();
    let mut cursors = Vec::new();
    for id in &ids {
        cursors.push(FrameCursor::new(model.trajectory_of(*id)?));
    }
    for index in 0..model.frame_count() {
        let time = model.time_at(index)?;
        let mut walked = Vec::new();
        for (id, cursor) in ids.iter().zip(cursors.iter_mut()) {
            if let Some(sample) = cursor.advance_to(time, query::SAMPLE_TOLERANCE) {
                walked.push((*id, sample.time));
            }
        }
        let expected: Vec<(u32, f64)> = query::frame_snapshot(&model, time, query::SAMPLE_TOLERANCE)
            .iter()
            .map(|(id, s)| (*id, s.time))
            .collect();
        assert_eq!(walked, expected, "frame {index} at time {time}");
    }
    Ok(())
}

/// Particles outside their recorded lifetime are omitted from frames
/// rather than drawn at a stale position.
#[test]
fn absent_particles_are_omitted() -> simlog::error::Result<()> {
    let log = "\
0.0,POSITION,1,1,1,1,1
1.0,POSITION,1,2,1,1,1
1.0,POSITION,2,9,9,1,1
2.0,POSITION,2,8,9,1,1
";
    let model = parser::parse_str(log)?;
    let present = |time: f64| -> Vec<u32> {
        query::frame_snapshot(&model, time, query::SAMPLE_TOLERANCE)
            .iter()
            .map(|(id, _)| *id)
            .collect()
    };
    assert_eq!(present(0.0), vec![1]);
    assert_eq!(present(1.0), vec![1, 2]);
    assert_eq!(present(2.0), vec![2]);
    Ok(())
}

/// The collision window is a strict bound on both sides, so a zero-width
/// window matches nothing, even dead on an event.
#[test]
fn collision_window_bounds_are_strict() -> simlog::error::Result<()> {
    let log = "\
0.0,POSITION,1,1,1,1,1
0.5,WALL_COLLISION,1
1.5,OBSTACLE_COLLISION,1
";
    let model = parser::parse_str(log)?;
    assert!(query::collisions_near(&model, 1.0, 0.5).is_empty());
    assert_eq!(query::collisions_near(&model, 1.0, 0.500001).len(), 2);
    assert!(query::collisions_near(&model, 0.5, 0.0).is_empty());
    Ok(())
}

/// Collision reports keep log order; they are never re-sorted by proximity
/// to the query time.
#[test]
fn collision_reports_preserve_log_order() -> simlog::error::Result<()> {
    let log = "\
0.0,POSITION,1,1,1,1,1
1.25,PARTICLE_COLLISION,1,2
0.75,WALL_COLLISION,1
1.0,OBSTACLE_COLLISION,3
";
    let model = parser::parse_str(log)?;
    let near = query::collisions_near(&model, 1.0, 0.5);
    let times: Vec<f64> = near.iter().map(|ev| ev.time).collect();
    assert_eq!(times, vec![1.25, 0.75, 1.0]);
    assert_eq!(near[1].kind, CollisionKind::Wall);
    Ok(())
}

/// Long runs decimate to a bounded playback pass: 1200 frames under a 500
/// frame cap gives stride 2, visiting every other frame from frame 0.
#[test]
fn playback_decimates_long_timelines() -> simlog::error::Result<()> {
    let mut log = String::new();
    for i in 0..1200 {
        log.push_str(&format!("{},POSITION,1,0,0,1,1\n", f64::from(i) * 0.01));
    }
    let model = parser::parse_str(&log)?;
    assert_eq!(model.frame_count(), 1200);

    let frames: Vec<usize> = query::playback_frames(&model, 500).collect();
    assert_eq!(frames.len(), 600);
    assert_eq!(frames[0], 0);
    assert_eq!(frames[599], 1198);
    assert!(frames.windows(2).all(|w| w[1] - w[0] == 2));

    // A cap above the frame count plays back in full.
    let full: Vec<usize> = query::playback_frames(&model, 2000).collect();
    assert_eq!(full.len(), 1200);
    Ok(())
}

/// The frame timeline is the sorted set of distinct sample times, and
/// time_at indexes straight into it.
#[test]
fn timeline_is_sorted_and_distinct() -> simlog::error::Result<()> {
    let log = "\
2.0,POSITION,1,1,1,1,1
0.0,POSITION,2,2,2,1,1
2.0,POSITION,2,2,3,1,1
3.0,POSITION,1,1,2,1,1
";
    let model = parser::parse_str(log)?;
    assert_eq!(model.times(), &[0.0, 2.0, 3.0]);
    assert!(model.times().windows(2).all(|w| w[0] < w[1]));
    for (index, &time) in model.times().iter().enumerate() {
        assert_eq!(model.time_at(index)?, time);
    }
    Ok(())
}
