//! Error taxonomy for the Geoscape simulation.

use thiserror::Error;

/// Errors surfaced by the simulation, the ruleset loader and persistence.
#[derive(Debug, Error)]
pub enum GeoscapeError {
    /// A save references state that does not exist. Fatal to the load.
    #[error("corrupted save: {0}")]
    CorruptedSave(String),

    #[error("mission id already assigned ({0})")]
    MissionIdAlreadySet(u32),

    #[error("mission id read before assignment")]
    MissionIdUnassigned,

    #[error("unknown {kind} rule: {id}")]
    UnknownRule { kind: &'static str, id: String },

    /// Ruleset failed start-up validation.
    #[error("invalid ruleset: {0}")]
    InvalidRuleset(String),

    /// A state machine transition was requested from a state that forbids it.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("ufo {0} has no trajectory")]
    MissingTrajectory(u32),

    #[error("no such {kind}: {id}")]
    NoSuchTarget { kind: &'static str, id: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GeoscapeError>;
