//! Typed records reconstructed from the simulation log.
//!
//! Field invariants (positive sides/radii/masses, finite numbers, strictly
//! increasing per-particle times) are established by the parser at load
//! time; everything here is plain immutable data afterwards.

/// Comment marker introducing metadata and annotation lines.
pub const COMMENT_MARKER: char = '#';
/// Metadata head declaring the box dimensions, `# BOX: <W>x<H>`.
pub const BOX_HEAD: &str = "BOX:";
/// Metadata head declaring one obstacle, `# OBSTACLE: <x>,<y>,<side>`.
pub const OBSTACLE_HEAD: &str = "OBSTACLE:";
/// Record tag for trajectory samples.
pub const POSITION_TAG: &str = "POSITION";

/// Particle identifier assigned by the producer. The model never generates
/// ids, it only keys trajectories by them.
pub type ParticleId = u32;

/// Interior dimensions of the simulation box, from the `# BOX:` header.
///
/// The producer may restate the header; the last declaration wins. Logs
/// without one fall back to [`BoxDimensions::default`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxDimensions {
    /// Box width (> 0).
    pub width: f64,
    /// Box height (> 0).
    pub height: f64,
}

impl Default for BoxDimensions {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
        }
    }
}

/// Axis-aligned square obstacle declared by an `# OBSTACLE:` header.
///
/// Collected in file order; the producer may declare overlapping or
/// duplicate obstacles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// Center x coordinate.
    pub x: f64,
    /// Center y coordinate.
    pub y: f64,
    /// Side length (> 0).
    pub side: f64,
}

/// One recorded particle state at a single instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    /// Simulation time of the record.
    pub time: f64,
    /// Position x.
    pub x: f64,
    /// Position y.
    pub y: f64,
    /// Particle radius (> 0).
    pub radius: f64,
    /// Particle mass (> 0).
    pub mass: f64,
}

/// The three collision record tags emitted by the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// Particle bounced off a box wall.
    Wall,
    /// Particle bounced off an obstacle.
    Obstacle,
    /// Two particles collided.
    Particle,
}

impl CollisionKind {
    /// Map a record tag to its kind; `None` for tags this format does not
    /// define (the parser treats those as fatal, not as collisions).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "WALL_COLLISION" => Some(Self::Wall),
            "OBSTACLE_COLLISION" => Some(Self::Obstacle),
            "PARTICLE_COLLISION" => Some(Self::Particle),
            _ => None,
        }
    }

    /// The record tag this kind is written as.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Wall => "WALL_COLLISION",
            Self::Obstacle => "OBSTACLE_COLLISION",
            Self::Particle => "PARTICLE_COLLISION",
        }
    }
}

/// A collision record: occurrence time, kind, and the producer's remaining
/// fields stored verbatim (arity is kind-specific and left to downstream
/// consumers). Collision times do not register playback frames.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    /// Time the collision occurred.
    pub time: f64,
    /// Which of the three tags the record carried.
    pub kind: CollisionKind,
    /// Raw fields after the tag, unparsed.
    pub payload: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_box_is_100_square() {
        let b = BoxDimensions::default();
        assert_eq!(b.width, 100.0);
        assert_eq!(b.height, 100.0);
    }

    #[test]
    fn kind_tags_round_trip() {
        for kind in [
            CollisionKind::Wall,
            CollisionKind::Obstacle,
            CollisionKind::Particle,
        ] {
            assert_eq!(CollisionKind::from_tag(kind.tag()), Some(kind));
        }
    }

    #[test]
    fn unknown_tag_is_not_a_kind() {
        assert_eq!(CollisionKind::from_tag("POSITION"), None);
        assert_eq!(CollisionKind::from_tag("wall_collision"), None);
        assert_eq!(CollisionKind::from_tag(""), None);
    }
}
