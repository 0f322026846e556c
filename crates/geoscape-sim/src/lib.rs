//! Geoscape simulation.
//!
//! Owns the hecs entity world holding every target on the globe, runs the
//! alien mission state machines and UFO trajectories, scores regions and
//! countries, and produces `GeoscapeSnapshot`s for the frontend.

pub mod engine;
pub mod mission;
pub mod motion;
pub mod persistence;
pub mod placement;
pub mod saved_game;
pub mod scoring;
pub mod systems;
pub mod targets;
pub mod ufo;
pub mod world_setup;

pub use geoscape_core as core;
pub use geoscape_globe as globe;

pub use engine::{GeoscapeEngine, SimConfig};
pub use mission::AlienMission;
pub use saved_game::{MissionContext, SavedGame};
