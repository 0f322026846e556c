//! Static rule data consumed by the simulation.
//!
//! Rules are loaded once before any mission starts and never mutated.
//! Angles are stored in radians but written in degrees in ruleset files.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::{MissionKind, UfoAltitude, UfoSize};
use crate::error::{GeoscapeError, Result};
use crate::types::GeoPoint;

/// Serde adapter: degrees on disk, radians in memory.
mod degrees {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_f64(value.to_degrees())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
        Ok(f64::deserialize(d)?.to_radians())
    }
}

/// Longitude/latitude box. A box with `lon_min > lon_max` wraps through 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoRect {
    #[serde(with = "degrees")]
    pub lon_min: f64,
    #[serde(with = "degrees")]
    pub lon_max: f64,
    #[serde(with = "degrees")]
    pub lat_min: f64,
    #[serde(with = "degrees")]
    pub lat_max: f64,
}

impl GeoRect {
    pub fn contains(&self, p: GeoPoint) -> bool {
        let in_lon = if self.lon_min <= self.lon_max {
            p.lon >= self.lon_min && p.lon < self.lon_max
        } else {
            p.lon >= self.lon_min || p.lon < self.lon_max
        };
        in_lon && p.lat >= self.lat_min && p.lat < self.lat_max
    }
}

/// One area of a mission zone: a box, or a single point when min == max.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionArea {
    #[serde(with = "degrees")]
    pub lon_min: f64,
    #[serde(with = "degrees")]
    pub lon_max: f64,
    #[serde(with = "degrees")]
    pub lat_min: f64,
    #[serde(with = "degrees")]
    pub lat_max: f64,
    /// City name, for single-point city areas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Globe texture forced for missions in this area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<i32>,
}

impl MissionArea {
    pub fn is_point(&self) -> bool {
        self.lon_min == self.lon_max && self.lat_min == self.lat_max
    }

    pub fn rect(&self) -> GeoRect {
        GeoRect {
            lon_min: self.lon_min,
            lon_max: self.lon_max,
            lat_min: self.lat_min,
            lat_max: self.lat_max,
        }
    }

    /// The south-west corner; the exact location for point areas.
    pub fn origin(&self) -> GeoPoint {
        GeoPoint::new(self.lon_min, self.lat_min)
    }
}

/// A named group of areas used to pick UFO waypoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissionZone {
    pub areas: Vec<MissionArea>,
}

/// An id with a relative weight, for weighted random choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedId {
    pub id: String,
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRegion {
    pub id: String,
    /// Membership boxes. Regions are expected not to overlap.
    pub areas: Vec<GeoRect>,
    pub mission_zones: Vec<MissionZone>,
    /// Relative chance of each mission rule being planned here.
    #[serde(default)]
    pub mission_weights: Vec<WeightedId>,
    /// Relative chance of this region being picked by the monthly planner.
    #[serde(default = "default_weight")]
    pub weight: u32,
}

impl RuleRegion {
    pub fn inside_region(&self, p: GeoPoint) -> bool {
        self.areas.iter().any(|a| a.contains(p))
    }

    pub fn zone(&self, index: usize) -> Option<&MissionZone> {
        self.mission_zones.get(index)
    }

    /// Single-point areas of the city zone.
    pub fn cities(&self) -> impl Iterator<Item = &MissionArea> {
        self.mission_zones
            .get(CITY_MISSION_ZONE)
            .into_iter()
            .flat_map(|z| z.areas.iter())
            .filter(|a| a.is_point())
    }

    /// The city located exactly at `p`, if any.
    pub fn city_at(&self, p: GeoPoint) -> Option<&MissionArea> {
        self.cities().find(|c| c.origin().is_same(&p))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCountry {
    pub id: String,
    /// Starting monthly funding.
    pub funding_base: i64,
    /// Funding never rises above this many thousand.
    pub funding_cap: i64,
    #[serde(with = "degrees")]
    pub label_lon: f64,
    #[serde(with = "degrees")]
    pub label_lat: f64,
    pub areas: Vec<GeoRect>,
}

impl RuleCountry {
    pub fn inside_country(&self, p: GeoPoint) -> bool {
        self.areas.iter().any(|a| a.contains(p))
    }

    pub fn label_point(&self) -> GeoPoint {
        GeoPoint::new(self.label_lon, self.label_lat)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleUfo {
    pub id: String,
    pub size: UfoSize,
    /// Knots.
    pub max_speed: u32,
    pub max_damage: u32,
    /// Points awarded to X-COM for bringing it down.
    #[serde(default)]
    pub score: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryWaypoint {
    /// Mission zone index in the target region.
    pub zone: usize,
    pub altitude: UfoAltitude,
    /// Percentage of the UFO's maximum speed on the leg leaving this point.
    pub speed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UfoTrajectory {
    pub id: String,
    /// Time on the ground, in 5-second units.
    pub ground_timer: u32,
    pub waypoints: Vec<TrajectoryWaypoint>,
}

impl UfoTrajectory {
    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    pub fn waypoint(&self, index: usize) -> Result<&TrajectoryWaypoint> {
        self.waypoints.get(index).ok_or_else(|| {
            GeoscapeError::InvalidRuleset(format!(
                "trajectory {} has no waypoint {index}",
                self.id
            ))
        })
    }

    /// Speed on the leg leaving `index`, as a fraction of maximum speed.
    pub fn speed_percentage(&self, index: usize) -> Result<f64> {
        Ok(self.waypoint(index)?.speed as f64 / 100.0)
    }

    /// Ground time in seconds.
    pub fn ground_seconds(&self) -> u32 {
        self.ground_timer * GROUND_TIMER_SCALE
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionWave {
    /// UFO rule id.
    pub ufo: String,
    pub count: u32,
    pub trajectory: String,
    /// Minutes between spawns, before randomisation.
    pub spawn_timer: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAlienMission {
    pub id: String,
    pub kind: MissionKind,
    /// Alien activity points per scoring event.
    pub points: i32,
    pub waves: Vec<MissionWave>,
    #[serde(default)]
    pub race_weights: Vec<WeightedId>,
}

impl RuleAlienMission {
    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    pub fn wave(&self, index: usize) -> Option<&MissionWave> {
        self.waves.get(index)
    }
}

/// Globe texture and the battlescape terrains it maps to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTexture {
    pub id: i32,
    pub terrains: Vec<String>,
}

/// Land polygon outline, vertices as `[lon, lat]` in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonRule {
    pub texture: i32,
    pub points: Vec<[f64; 2]>,
}

/// The complete static ruleset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    pub ufos: Vec<RuleUfo>,
    pub trajectories: Vec<UfoTrajectory>,
    pub regions: Vec<RuleRegion>,
    pub countries: Vec<RuleCountry>,
    pub missions: Vec<RuleAlienMission>,
    #[serde(default)]
    pub textures: Vec<RuleTexture>,
    #[serde(default)]
    pub polygons: Vec<PolygonRule>,
}

impl Ruleset {
    /// Parse and validate a ruleset document.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Ruleset = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// The compact built-in ruleset shipped with the crate.
    pub fn standard() -> Result<Self> {
        Self::from_json(include_str!("../data/standard_ruleset.json"))
    }

    pub fn ufo(&self, id: &str) -> Result<&RuleUfo> {
        self.ufos.iter().find(|u| u.id == id).ok_or_else(|| unknown("ufo", id))
    }

    pub fn trajectory(&self, id: &str) -> Result<&UfoTrajectory> {
        self.trajectories
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| unknown("trajectory", id))
    }

    pub fn region(&self, id: &str) -> Result<&RuleRegion> {
        self.regions.iter().find(|r| r.id == id).ok_or_else(|| unknown("region", id))
    }

    pub fn country(&self, id: &str) -> Result<&RuleCountry> {
        self.countries.iter().find(|c| c.id == id).ok_or_else(|| unknown("country", id))
    }

    pub fn mission(&self, id: &str) -> Result<&RuleAlienMission> {
        self.missions.iter().find(|m| m.id == id).ok_or_else(|| unknown("mission", id))
    }

    /// First mission rule of the given kind.
    pub fn mission_of_kind(&self, kind: MissionKind) -> Result<&RuleAlienMission> {
        self.missions
            .iter()
            .find(|m| m.kind == kind)
            .ok_or_else(|| unknown("mission", &format!("{kind:?}")))
    }

    pub fn texture(&self, id: i32) -> Option<&RuleTexture> {
        self.textures.iter().find(|t| t.id == id)
    }

    /// Start-up validation. Catches missing data the mission engine would
    /// otherwise only trip over mid-game.
    pub fn validate(&self) -> Result<()> {
        if self.regions.is_empty() {
            return invalid("ruleset defines no regions".to_string());
        }
        for t in &self.trajectories {
            if t.waypoints.len() < 2 {
                return invalid(format!("trajectory {} needs at least 2 waypoints", t.id));
            }
            for wp in &t.waypoints {
                if wp.speed > 100 {
                    return invalid(format!("trajectory {} speed {} over 100%", t.id, wp.speed));
                }
                for r in &self.regions {
                    match r.zone(wp.zone) {
                        Some(z) if !z.areas.is_empty() => {}
                        _ => {
                            return invalid(format!(
                                "region {} lacks zone {} used by trajectory {}",
                                r.id, wp.zone, t.id
                            ))
                        }
                    }
                }
            }
        }

        for m in &self.missions {
            if m.waves.is_empty() {
                return invalid(format!("mission {} has no waves", m.id));
            }
            for w in &m.waves {
                self.ufo(&w.ufo)?;
                self.trajectory(&w.trajectory)?;
                if w.count == 0 {
                    return invalid(format!("mission {} has an empty wave", m.id));
                }
            }
            match m.kind {
                MissionKind::Terror => {
                    if let Some(r) = self.regions.iter().find(|r| r.cities().next().is_none()) {
                        return invalid(format!("terror mission {} but region {} has no cities", m.id, r.id));
                    }
                }
                MissionKind::Retaliation => {
                    self.ufo(BATTLESHIP_UFO)?;
                    self.trajectory(RETALIATION_ASSAULT_TRAJECTORY)?;
                }
                MissionKind::Base | MissionKind::Infiltration => {
                    if let Some(r) = self.regions.iter().find(|r| r.zone(ALIEN_BASE_ZONE).is_none_or(|z| z.areas.is_empty())) {
                        return invalid(format!("mission {} builds bases but region {} has no base zone", m.id, r.id));
                    }
                }
                _ => {}
            }
        }

        for r in &self.regions {
            if r.areas.is_empty() {
                return invalid(format!("region {} has no areas", r.id));
            }
            for w in &r.mission_weights {
                self.mission(&w.id)?;
            }
        }

        for c in &self.countries {
            if c.funding_cap < 0 || c.funding_base < 0 {
                return invalid(format!("country {} has negative funding", c.id));
            }
        }
        Ok(())
    }
}

fn unknown(kind: &'static str, id: &str) -> GeoscapeError {
    GeoscapeError::UnknownRule { kind, id: id.to_string() }
}

fn invalid<T>(msg: String) -> Result<T> {
    Err(GeoscapeError::InvalidRuleset(msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> GeoRect {
        GeoRect {
            lon_min: lon_min.to_radians(),
            lon_max: lon_max.to_radians(),
            lat_min: lat_min.to_radians(),
            lat_max: lat_max.to_radians(),
        }
    }

    #[test]
    fn test_rect_contains_plain() {
        let r = rect(10.0, 20.0, -5.0, 5.0);
        assert!(r.contains(GeoPoint::from_degrees(15.0, 0.0)));
        assert!(!r.contains(GeoPoint::from_degrees(25.0, 0.0)));
        assert!(!r.contains(GeoPoint::from_degrees(15.0, 6.0)));
    }

    #[test]
    fn test_rect_contains_wrapping() {
        let r = rect(350.0, 10.0, 0.0, 10.0);
        assert!(r.contains(GeoPoint::from_degrees(355.0, 5.0)));
        assert!(r.contains(GeoPoint::from_degrees(5.0, 5.0)));
        assert!(!r.contains(GeoPoint::from_degrees(20.0, 5.0)));
    }

    #[test]
    fn test_standard_ruleset_is_valid() {
        let rules = Ruleset::standard().unwrap();
        assert!(rules.regions.len() >= 5);
        assert!(rules.trajectory(RETALIATION_ASSAULT_TRAJECTORY).is_ok());
        for region in &rules.regions {
            assert!(region.cities().count() > 0, "{} has no cities", region.id);
        }
    }

    #[test]
    fn test_degrees_on_disk() {
        let json = r#"{"lon_min": 90.0, "lon_max": 180.0, "lat_min": 0.0, "lat_max": 45.0}"#;
        let r: GeoRect = serde_json::from_str(json).unwrap();
        assert!((r.lon_min - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        let back = serde_json::to_string(&r).unwrap();
        assert!(back.contains("90"), "serialised back in degrees: {back}");
    }

    #[test]
    fn test_validate_rejects_missing_trajectory() {
        let mut rules = Ruleset::standard().unwrap();
        rules.missions[0].waves[0].trajectory = "P_NOPE".into();
        assert!(matches!(
            rules.validate(),
            Err(GeoscapeError::UnknownRule { kind: "trajectory", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_terror_without_cities() {
        let mut rules = Ruleset::standard().unwrap();
        rules.regions[0].mission_zones[CITY_MISSION_ZONE].areas.retain(|a| !a.is_point());
        rules.regions[0].mission_zones[CITY_MISSION_ZONE]
            .areas
            .push(MissionArea {
                lon_min: 0.1,
                lon_max: 0.2,
                lat_min: 0.1,
                lat_max: 0.2,
                name: None,
                texture: None,
            });
        assert!(matches!(rules.validate(), Err(GeoscapeError::InvalidRuleset(_))));
    }

    #[test]
    fn test_validate_rejects_empty_region_list() {
        let mut rules = Ruleset::standard().unwrap();
        rules.regions.clear();
        assert!(matches!(rules.validate(), Err(GeoscapeError::InvalidRuleset(_))));
    }
}
