//! Events emitted by the simulation for UI and log consumers.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::GeoPoint;

/// Something noteworthy that happened on the Geoscape during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoscapeEvent {
    MissionStarted {
        mission_id: u32,
        rule: String,
        region: String,
    },
    /// Mission reaped after finishing (or being abandoned).
    MissionFinished { mission_id: u32, rule: String },
    UfoSpawned {
        ufo_id: u32,
        mission_id: u32,
        rule: String,
        position: GeoPoint,
    },
    /// UFO came into radar coverage.
    UfoDetected { ufo_id: u32, hyper: bool },
    /// UFO left radar coverage.
    UfoLost { ufo_id: u32 },
    UfoLanded { ufo_id: u32, position: GeoPoint },
    UfoCrashed { ufo_id: u32, position: GeoPoint },
    UfoDestroyed { ufo_id: u32 },
    /// Terror site appeared.
    MissionSiteCreated {
        site_id: u32,
        mission_id: u32,
        position: GeoPoint,
        city: Option<String>,
    },
    /// Terror site timed out without an X-COM response.
    MissionSiteExpired { site_id: u32, points: i32 },
    AlienBaseBuilt {
        alien_base_id: u32,
        region: String,
        position: GeoPoint,
    },
    PactSigned { country: String },
    /// A retaliation battleship is heading for a player base.
    BaseAssaulted { base_id: u32, ufo_id: u32 },
    /// A player base was spotted by a retaliation UFO.
    BaseMarkedForRetaliation { base_id: u32 },
    /// No land point found in the zone; used the last random point instead.
    DegradedPlacement {
        region: String,
        zone: usize,
        position: GeoPoint,
    },
    CraftArrived { craft_id: u32 },
    /// Month-end funding settlement ran.
    MonthEnded {
        month: u64,
        xcom_score: i32,
        alien_score: i32,
        funding: i64,
    },
    /// Country mood changed at month end.
    CountrySatisfaction {
        country: String,
        satisfaction: Satisfaction,
    },
}
