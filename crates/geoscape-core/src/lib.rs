//! Core types and definitions for the Geoscape simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geographic types, enums, static rule data, commands, events, snapshot
//! views, constants and the error taxonomy. It has no dependency on the
//! entity world or any runtime framework.

pub mod commands;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod rules;
pub mod state;
pub mod types;

pub use error::{GeoscapeError, Result};
