//! Ingestion and frame-query core for particle collision simulation logs.
//!
//! A producer streams a line-oriented log (header comments for the box and
//! obstacles, then timestamped position and collision records); this crate
//! parses that stream into a [`core::SimulationModel`] and answers the
//! queries a playback or analysis pass needs: nearest sample per particle
//! at a display time, collisions inside a time window, and frame
//! decimation. The optional `python` feature exposes the same surface to
//! Python drivers as the `simlog` extension module.

pub mod core;
pub mod error;

#[cfg(feature = "python")]
pub mod python;
