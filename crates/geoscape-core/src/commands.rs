//! Commands sent to the simulation from the outside (UI, scripts, tests).
//!
//! Commands are queued and applied at the start of the next tick.

use serde::{Deserialize, Serialize};

use crate::types::{GeoPoint, TargetRef};

/// All externally driven Geoscape actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoscapeCommand {
    // --- Missions ---
    /// Start a mission by rule id in a region, optionally forcing the race.
    StartMission {
        rule: String,
        region: String,
        race: Option<String>,
    },
    /// Override the current wave countdown of a mission (minutes).
    SetWaveCountdown { mission_id: u32, minutes: u32 },

    // --- Player assets ---
    /// Build a player base.
    BuildBase {
        name: String,
        position: GeoPoint,
        /// Radar detection chance (percent) per half hour.
        detection_chance: u32,
        /// Radar range in nautical miles.
        radar_range_nm: f64,
        hyperwave: bool,
    },
    /// Send a craft from its base toward a target.
    LaunchCraft {
        craft_id: u32,
        target: TargetRef,
    },
    /// Launch a craft toward an arbitrary point.
    LaunchCraftToPoint { craft_id: u32, position: GeoPoint },
    /// Order a craft home.
    RecallCraft { craft_id: u32 },

    // --- Combat outcomes ---
    /// Apply interception damage to a UFO.
    DamageUfo { ufo_id: u32, damage: u32 },
    SetUfoDetected { ufo_id: u32, detected: bool },
    SetUfoHyperDetected { ufo_id: u32, hyper: bool },
    /// Flag a player base as spotted by aliens.
    MarkRetaliationTarget { base_id: u32 },
    /// Credit X-COM score at a position (e.g. after a ground mission).
    AddXcomScore { position: GeoPoint, points: i32 },
}
