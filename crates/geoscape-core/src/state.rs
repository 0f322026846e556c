//! Geoscape snapshot: the complete visible state returned after each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::GeoscapeEvent;
use crate::types::{Destination, GameTime, GeoPoint};

/// Everything a frontend needs to draw the Geoscape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoscapeSnapshot {
    pub time: GameTime,
    pub difficulty: Difficulty,
    pub missions: Vec<MissionView>,
    pub ufos: Vec<UfoView>,
    pub alien_bases: Vec<AlienBaseView>,
    pub mission_sites: Vec<MissionSiteView>,
    pub bases: Vec<BaseView>,
    pub crafts: Vec<CraftView>,
    pub regions: Vec<RegionView>,
    pub countries: Vec<CountryView>,
    /// Events raised during the tick that produced this snapshot.
    pub events: Vec<GeoscapeEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionView {
    pub id: u32,
    pub rule: String,
    pub kind: MissionKind,
    pub region: String,
    pub race: String,
    pub next_wave: usize,
    pub wave_count: usize,
    pub live_ufos: u32,
    /// Minutes until the next spawn.
    pub spawn_countdown: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UfoView {
    pub id: u32,
    pub rule: String,
    pub mission_id: u32,
    pub position: GeoPoint,
    pub destination: Destination,
    pub status: UfoStatus,
    pub altitude: UfoAltitude,
    /// Knots.
    pub speed: u32,
    pub damage: u32,
    pub detected: bool,
    pub hyper_detected: bool,
    pub trajectory_point: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlienBaseView {
    pub id: u32,
    pub position: GeoPoint,
    pub race: String,
    pub discovered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionSiteView {
    pub id: u32,
    pub position: GeoPoint,
    pub mission_id: u32,
    pub race: String,
    pub seconds_remaining: u32,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseView {
    pub id: u32,
    pub name: String,
    pub position: GeoPoint,
    pub retaliation_target: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CraftView {
    pub id: u32,
    pub base_id: u32,
    pub position: GeoPoint,
    pub destination: Destination,
    pub status: CraftStatus,
    pub soldiers: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionView {
    pub id: String,
    pub xcom_activity: i32,
    pub alien_activity: i32,
    pub recent_alien_activity: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryView {
    pub id: String,
    pub funding: i64,
    pub satisfaction: Satisfaction,
    pub pact: bool,
    pub xcom_activity: i32,
    pub alien_activity: i32,
}
