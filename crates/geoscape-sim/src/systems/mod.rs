//! Geoscape systems, run in order by the engine each tick.

pub mod cleanup;
pub mod detection;
pub mod movement;
pub mod planner;
pub mod sites;
pub mod snapshot;
pub mod trajectory;
