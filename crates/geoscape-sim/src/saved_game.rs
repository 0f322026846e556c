//! The campaign aggregate: entity world, missions, meters and id counters.

use hecs::World;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use geoscape_core::enums::{Difficulty, MissionKind};
use geoscape_core::error::{GeoscapeError, Result};
use geoscape_core::events::GeoscapeEvent;
use geoscape_core::rules::{RuleRegion, Ruleset};
use geoscape_core::types::{GameTime, GeoPoint};
use geoscape_globe::Globe;

use crate::mission::AlienMission;
use crate::placement::{land_point, random_point_in_zone, LandPoint};
use crate::scoring::{self, Country, Region, Side};

/// Kinds of object that draw ids from the campaign counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Mission,
    Ufo,
    AlienBase,
    MissionSite,
    Base,
    Craft,
    Waypoint,
    LandingSite,
    CrashSite,
}

/// Last id handed out per kind. Ids start at 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounters {
    mission: u32,
    ufo: u32,
    alien_base: u32,
    mission_site: u32,
    base: u32,
    craft: u32,
    waypoint: u32,
    landing_site: u32,
    crash_site: u32,
}

impl IdCounters {
    pub fn next(&mut self, kind: IdKind) -> u32 {
        let slot = match kind {
            IdKind::Mission => &mut self.mission,
            IdKind::Ufo => &mut self.ufo,
            IdKind::AlienBase => &mut self.alien_base,
            IdKind::MissionSite => &mut self.mission_site,
            IdKind::Base => &mut self.base,
            IdKind::Craft => &mut self.craft,
            IdKind::Waypoint => &mut self.waypoint,
            IdKind::LandingSite => &mut self.landing_site,
            IdKind::CrashSite => &mut self.crash_site,
        };
        *slot += 1;
        *slot
    }
}

/// Everything that persists between sessions.
pub struct SavedGame {
    pub time: GameTime,
    pub difficulty: Difficulty,
    /// UFOs, alien bases, mission sites, player bases and crafts.
    pub world: World,
    pub missions: Vec<AlienMission>,
    pub regions: Vec<Region>,
    pub countries: Vec<Country>,
    pub ids: IdCounters,
}

/// Mutable campaign state handed to mission operations for one call.
///
/// Borrowed out of a `SavedGame` alongside its mission list so a mission
/// can update the world, the meters and the counters while it is itself
/// borrowed mutably.
pub struct MissionContext<'a> {
    pub world: &'a mut World,
    pub regions: &'a mut Vec<Region>,
    pub countries: &'a mut Vec<Country>,
    pub ids: &'a mut IdCounters,
    pub rules: &'a Ruleset,
    pub globe: &'a Globe,
    pub rng: &'a mut ChaCha8Rng,
    pub difficulty: Difficulty,
    pub events: &'a mut Vec<GeoscapeEvent>,
}

impl MissionContext<'_> {
    pub fn next_id(&mut self, kind: IdKind) -> u32 {
        self.ids.next(kind)
    }

    pub fn add_score(&mut self, p: GeoPoint, side: Side, points: i32) {
        scoring::add_score(self.regions, self.countries, self.rules, p, side, points);
    }

    /// A point in one of the region's mission zones. Ground points must be
    /// on land inside the region; a failed search is logged and reported
    /// but still used.
    pub fn zone_point(&mut self, region: &RuleRegion, zone: usize, on_land: bool) -> Result<GeoPoint> {
        if !on_land {
            return random_point_in_zone(self.rng, region, zone);
        }
        match land_point(self.globe, self.rng, region, zone)? {
            LandPoint::OnLand(p) => Ok(p),
            LandPoint::Degraded(p) => {
                let (lon, lat) = p.to_degrees();
                warn!(region = %region.id, zone, lon, lat, "no land point found, placing anyway");
                self.events.push(GeoscapeEvent::DegradedPlacement {
                    region: region.id.clone(),
                    zone,
                    position: p,
                });
                Ok(p)
            }
        }
    }
}

impl SavedGame {
    /// A fresh campaign with zeroed meters for every region and country.
    pub fn new(rules: &Ruleset, difficulty: Difficulty, time: GameTime) -> Self {
        let (regions, countries) = scoring::initial_meters(rules);
        Self {
            time,
            difficulty,
            world: World::new(),
            missions: Vec::new(),
            regions,
            countries,
            ids: IdCounters::default(),
        }
    }

    /// Split into the mission list and a context over everything else.
    pub fn split<'a>(
        &'a mut self,
        rules: &'a Ruleset,
        globe: &'a Globe,
        rng: &'a mut ChaCha8Rng,
        events: &'a mut Vec<GeoscapeEvent>,
    ) -> (&'a mut Vec<AlienMission>, MissionContext<'a>) {
        let SavedGame {
            difficulty,
            world,
            missions,
            regions,
            countries,
            ids,
            ..
        } = self;
        let ctx = MissionContext {
            world,
            regions,
            countries,
            ids,
            rules,
            globe,
            rng,
            difficulty: *difficulty,
            events,
        };
        (missions, ctx)
    }

    pub fn mission(&self, id: u32) -> Option<&AlienMission> {
        self.missions.iter().find(|m| m.id().ok() == Some(id))
    }

    pub fn mission_mut(&mut self, id: u32) -> Option<&mut AlienMission> {
        self.missions.iter_mut().find(|m| m.id().ok() == Some(id))
    }

    pub fn mission_index(&self, id: u32) -> Option<usize> {
        self.missions.iter().position(|m| m.id().ok() == Some(id))
    }

    /// Create, number and start a mission. Returns its id.
    pub fn start_mission(
        &mut self,
        rules: &Ruleset,
        rule_id: &str,
        region: &str,
        race: &str,
        initial_countdown: u32,
        rng: &mut ChaCha8Rng,
        events: &mut Vec<GeoscapeEvent>,
    ) -> Result<u32> {
        let rule = rules.mission(rule_id)?;
        rules.region(region)?;
        let mut mission = AlienMission::new(rule, region, race);
        let id = self.ids.next(IdKind::Mission);
        mission.set_id(id)?;
        mission.start(initial_countdown, rng);
        info!(mission_id = id, rule = rule_id, region, race, "alien mission started");
        events.push(GeoscapeEvent::MissionStarted {
            mission_id: id,
            rule: rule_id.to_string(),
            region: region.to_string(),
        });
        self.missions.push(mission);
        Ok(id)
    }

    /// Region rule containing `p`.
    pub fn region_at<'r>(&self, rules: &'r Ruleset, p: GeoPoint) -> Option<&'r RuleRegion> {
        rules.regions.iter().find(|r| r.inside_region(p))
    }

    /// Whether a mission of `kind` is already running in `region`.
    pub fn has_active_mission(&self, kind: MissionKind, region: &str) -> bool {
        self.missions
            .iter()
            .any(|m| m.kind() == kind && m.region() == region && !m.is_abandoned())
    }

    pub fn require_mission(&self, id: u32) -> Result<&AlienMission> {
        self.mission(id).ok_or(GeoscapeError::NoSuchTarget { kind: "mission", id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_id_counters_are_per_kind() {
        let mut ids = IdCounters::default();
        assert_eq!(ids.next(IdKind::Ufo), 1);
        assert_eq!(ids.next(IdKind::Ufo), 2);
        assert_eq!(ids.next(IdKind::Mission), 1);
        assert_eq!(ids.next(IdKind::Waypoint), 1);
        assert_eq!(ids.next(IdKind::Ufo), 3);
    }

    #[test]
    fn test_start_mission_numbers_and_records() {
        let rules = Ruleset::standard().unwrap();
        let mut game = SavedGame::new(&rules, Difficulty::Beginner, GameTime::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut events = Vec::new();
        let a = game
            .start_mission(&rules, "STR_ALIEN_RESEARCH", "STR_EUROPE", "STR_SECTOID", 0, &mut rng, &mut events)
            .unwrap();
        let b = game
            .start_mission(&rules, "STR_ALIEN_HARVEST", "STR_ASIA", "STR_FLOATER", 90, &mut rng, &mut events)
            .unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(game.missions.len(), 2);
        assert_eq!(game.require_mission(2).unwrap().wave_countdown(), 90);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], GeoscapeEvent::MissionStarted { mission_id: 1, .. }));
    }

    #[test]
    fn test_start_mission_rejects_unknown_rules() {
        let rules = Ruleset::standard().unwrap();
        let mut game = SavedGame::new(&rules, Difficulty::Beginner, GameTime::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut events = Vec::new();
        assert!(game
            .start_mission(&rules, "STR_NOPE", "STR_EUROPE", "STR_SECTOID", 0, &mut rng, &mut events)
            .is_err());
        assert!(game
            .start_mission(&rules, "STR_ALIEN_RESEARCH", "STR_ATLANTIS", "STR_SECTOID", 0, &mut rng, &mut events)
            .is_err());
        assert!(game.missions.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn test_new_game_has_meters_for_every_rule() {
        let rules = Ruleset::standard().unwrap();
        let game = SavedGame::new(&rules, Difficulty::Veteran, GameTime::default());
        assert_eq!(game.regions.len(), rules.regions.len());
        assert_eq!(game.countries.len(), rules.countries.len());
        assert!(game.world.iter().next().is_none());
    }
}
