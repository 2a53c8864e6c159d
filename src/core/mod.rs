//! Core ingestion and query machinery: the record vocabulary of the log
//! format, the streaming parser, the aggregated simulation model, and the
//! frame/collision queries a playback pass runs against it.

pub mod model;
pub mod parser;
pub mod query;
pub mod record;

pub use model::{CollisionTally, SimulationModel, Trajectory};
pub use record::{
    BoxDimensions, CollisionEvent, CollisionKind, Obstacle, ParticleId, TrajectorySample,
};
