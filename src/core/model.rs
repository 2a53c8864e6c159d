use std::collections::BTreeMap;
use std::io::Write;

use crate::core::record::{
    BoxDimensions, CollisionEvent, CollisionKind, Obstacle, ParticleId, TrajectorySample,
    BOX_HEAD, COMMENT_MARKER, OBSTACLE_HEAD, POSITION_TAG,
};
use crate::error::{Error, Result};

/// Time-ordered samples of a single particle.
///
/// Sample times strictly increase; the parser rejects logs that violate
/// the producer contract, so queries may binary-search by time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,
}

impl Trajectory {
    /// All samples in ingestion (= time) order.
    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True for a trajectory with no samples yet.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Earliest sample (where the particle enters the log).
    pub fn first(&self) -> Option<&TrajectorySample> {
        self.samples.first()
    }

    /// Latest sample (where the particle leaves the log).
    pub fn last(&self) -> Option<&TrajectorySample> {
        self.samples.last()
    }

    /// Append a sample. The caller guarantees `sample.time` exceeds the
    /// last sample's time; the parser enforces this with line context.
    pub(crate) fn push(&mut self, sample: TrajectorySample) {
        debug_assert!(self.samples.last().is_none_or(|s| s.time < sample.time));
        self.samples.push(sample);
    }
}

/// Per-kind collision counts, the summary the analysis overlay reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionTally {
    /// Wall bounces.
    pub wall: usize,
    /// Obstacle bounces.
    pub obstacle: usize,
    /// Particle-particle collisions.
    pub particle: usize,
}

impl CollisionTally {
    /// Collisions of all kinds.
    pub fn total(&self) -> usize {
        self.wall + self.obstacle + self.particle
    }
}

/// In-memory replay state reconstructed from one simulation log.
///
/// Built in a single pass by [`crate::core::parser::parse`] and read-only
/// afterwards, so any number of consumers (playback, analysis) may query a
/// shared reference concurrently without locking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationModel {
    box_dims: BoxDimensions,
    obstacles: Vec<Obstacle>,
    trajectories: BTreeMap<ParticleId, Trajectory>,
    timeline: Vec<f64>,
    collisions: Vec<CollisionEvent>,
}

impl SimulationModel {
    /// Assemble a loaded model. Only the parser constructs models; the
    /// timeline must already be sorted and duplicate-free.
    pub(crate) fn from_parts(
        box_dims: BoxDimensions,
        obstacles: Vec<Obstacle>,
        trajectories: BTreeMap<ParticleId, Trajectory>,
        timeline: Vec<f64>,
        collisions: Vec<CollisionEvent>,
    ) -> Self {
        debug_assert!(timeline.windows(2).all(|w| w[0] < w[1]));
        Self {
            box_dims,
            obstacles,
            trajectories,
            timeline,
            collisions,
        }
    }

    /// Box dimensions (defaults to 100x100 when the log declared none).
    pub fn box_dimensions(&self) -> BoxDimensions {
        self.box_dims
    }

    /// Obstacles in file order.
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Every particle id observed in the log, ascending.
    pub fn particle_ids(&self) -> Vec<ParticleId> {
        self.trajectories.keys().copied().collect()
    }

    /// Number of distinct particles.
    pub fn num_particles(&self) -> usize {
        self.trajectories.len()
    }

    /// The trajectory recorded for `id`.
    ///
    /// Errors: [`Error::UnknownParticle`] if the id never appeared.
    pub fn trajectory_of(&self, id: ParticleId) -> Result<&Trajectory> {
        self.trajectories.get(&id).ok_or(Error::UnknownParticle(id))
    }

    /// Iterate `(id, trajectory)` pairs in ascending id order.
    pub fn trajectories(&self) -> impl Iterator<Item = (ParticleId, &Trajectory)> {
        self.trajectories.iter().map(|(id, t)| (*id, t))
    }

    /// Number of playback frames (distinct sample times).
    pub fn frame_count(&self) -> usize {
        self.timeline.len()
    }

    /// Simulation time of frame `index`.
    ///
    /// Errors: [`Error::FrameOutOfRange`] if `index >= frame_count()`.
    pub fn time_at(&self, index: usize) -> Result<f64> {
        self.timeline
            .get(index)
            .copied()
            .ok_or(Error::FrameOutOfRange {
                index,
                frames: self.timeline.len(),
            })
    }

    /// The full frame timeline: sorted, duplicate-free sample times.
    pub fn times(&self) -> &[f64] {
        &self.timeline
    }

    /// Collision events in ingestion order.
    pub fn collisions(&self) -> &[CollisionEvent] {
        &self.collisions
    }

    /// Count collisions by kind.
    pub fn collision_tally(&self) -> CollisionTally {
        let mut tally = CollisionTally::default();
        for ev in &self.collisions {
            match ev.kind {
                CollisionKind::Wall => tally.wall += 1,
                CollisionKind::Obstacle => tally.obstacle += 1,
                CollisionKind::Particle => tally.particle += 1,
            }
        }
        tally
    }

    /// Serialize the model back into the log text format.
    ///
    /// Emits the box header, obstacle headers, each particle's POSITION
    /// records grouped by ascending id (time-ordered within a particle),
    /// then collision records in ingestion order. Re-parsing the output
    /// reconstructs an equal model; `f64` values print in Rust's shortest
    /// round-trip form, so no precision is lost.
    pub fn write_log<W: Write>(&self, mut w: W) -> Result<()> {
        writeln!(
            w,
            "{COMMENT_MARKER} {BOX_HEAD} {}x{}",
            self.box_dims.width, self.box_dims.height
        )?;
        for o in &self.obstacles {
            writeln!(w, "{COMMENT_MARKER} {OBSTACLE_HEAD} {},{},{}", o.x, o.y, o.side)?;
        }
        for (id, trajectory) in &self.trajectories {
            for s in trajectory.samples() {
                writeln!(
                    w,
                    "{},{POSITION_TAG},{},{},{},{},{}",
                    s.time, id, s.x, s.y, s.radius, s.mass
                )?;
            }
        }
        for ev in &self.collisions {
            write!(w, "{},{}", ev.time, ev.kind.tag())?;
            for field in &ev.payload {
                write!(w, ",{field}")?;
            }
            writeln!(w)?;
        }
        Ok(())
    }
}
