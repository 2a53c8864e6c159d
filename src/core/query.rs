//! Stateless queries over a loaded model: nearest-sample lookup per
//! trajectory and time-windowed collision aggregation, the two operations a
//! playback driver issues once per rendered frame.

use crate::core::model::{SimulationModel, Trajectory};
use crate::core::record::{CollisionEvent, ParticleId, TrajectorySample};

/// Default tolerance for nearest-sample matching.
///
/// Distinct particles' sample times carry independent floating-point
/// rounding even when nominally simultaneous in the source simulation, so
/// exact equality would spuriously exclude particles from frames. The bound
/// stays mandatory in the other direction too: without it, a particle whose
/// last sample is long past would be drawn at every later frame.
pub const SAMPLE_TOLERANCE: f64 = 1e-3;

/// Default half-width of the window in which a collision is considered
/// relevant to a displayed frame.
pub const COLLISION_WINDOW: f64 = 0.1;

/// The sample whose time is nearest to `target_time`, accepted only if the
/// difference is strictly below `tolerance`; `None` means the particle is
/// absent from that frame (not yet appeared, or already vanished from the
/// log).
///
/// Sample times strictly increase, so this is a binary search. When the
/// target is exactly equidistant from two samples the earlier one wins.
pub fn sample_near(
    trajectory: &Trajectory,
    target_time: f64,
    tolerance: f64,
) -> Option<&TrajectorySample> {
    let samples = trajectory.samples();
    let split = samples.partition_point(|s| s.time < target_time);
    let mut best: Option<&TrajectorySample> = None;
    if split > 0 {
        best = Some(&samples[split - 1]);
    }
    if let Some(right) = samples.get(split) {
        best = match best {
            Some(left) if (left.time - target_time).abs() <= (right.time - target_time).abs() => {
                Some(left)
            }
            _ => Some(right),
        };
    }
    best.filter(|s| (s.time - target_time).abs() < tolerance)
}

/// Advancing-cursor variant of [`sample_near`] for drivers that visit
/// frames in non-decreasing time order: amortized O(1) per frame over a
/// whole playback pass, same observable contract.
#[derive(Debug, Clone)]
pub struct FrameCursor<'a> {
    trajectory: &'a Trajectory,
    position: usize,
}

impl<'a> FrameCursor<'a> {
    /// Cursor positioned before the trajectory's first sample.
    pub fn new(trajectory: &'a Trajectory) -> Self {
        Self {
            trajectory,
            position: 0,
        }
    }

    /// Nearest in-tolerance sample for `target_time`.
    ///
    /// Targets must not decrease across calls on one cursor; the cursor
    /// only moves forward. For random access use [`sample_near`].
    pub fn advance_to(&mut self, target_time: f64, tolerance: f64) -> Option<&'a TrajectorySample> {
        let samples = self.trajectory.samples();
        // Advance while the next sample is strictly closer, so ties keep
        // the earlier sample like the binary search does.
        while let Some(next) = samples.get(self.position + 1) {
            if (next.time - target_time).abs() < (samples[self.position].time - target_time).abs()
            {
                self.position += 1;
            } else {
                break;
            }
        }
        samples
            .get(self.position)
            .filter(|s| (s.time - target_time).abs() < tolerance)
    }
}

/// Every collision event with `|event.time - target_time| < window_radius`
/// (strict), in ingestion order, never re-sorted by proximity. A zero
/// radius therefore matches nothing, even a target exactly on an event.
pub fn collisions_near(
    model: &SimulationModel,
    target_time: f64,
    window_radius: f64,
) -> Vec<&CollisionEvent> {
    model
        .collisions()
        .iter()
        .filter(|ev| (ev.time - target_time).abs() < window_radius)
        .collect()
}

/// All particles present at `time`: the in-tolerance nearest sample per
/// trajectory, in ascending particle id order. Particles without a sample
/// near `time` are simply omitted from the frame.
pub fn frame_snapshot(
    model: &SimulationModel,
    time: f64,
    tolerance: f64,
) -> Vec<(ParticleId, &TrajectorySample)> {
    model
        .trajectories()
        .filter_map(|(id, trajectory)| sample_near(trajectory, time, tolerance).map(|s| (id, s)))
        .collect()
}

/// Frame subsampling step so a playback pass renders roughly `max_frames`
/// frames at most; never below 1. A `max_frames` of 0 disables decimation.
pub fn frame_stride(frame_count: usize, max_frames: usize) -> usize {
    if max_frames == 0 {
        return 1;
    }
    (frame_count / max_frames).max(1)
}

/// Indices of the frames a decimated playback pass visits, starting at
/// frame 0.
pub fn playback_frames(model: &SimulationModel, max_frames: usize) -> impl Iterator<Item = usize> {
    let count = model.frame_count();
    (0..count).step_by(frame_stride(count, max_frames))
}
