//! Non-UFO targets on the globe and id-based lookups.
//!
//! Every target is a hecs entity carrying a `GeoPoint` plus one of the
//! components below. Cross-references are `TargetRef`s resolved by scanning,
//! never stored entity handles.

use hecs::{Component, Entity, World};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use geoscape_core::enums::{CraftStatus, TargetKind};
use geoscape_core::rules::Ruleset;
use geoscape_core::types::{Destination, GeoPoint, TargetRef};
use geoscape_globe::Globe;

use crate::motion::Motion;
use crate::ufo::Ufo;

/// Terrain used when neither the mission area nor the globe names one.
pub const DEFAULT_TERRAIN: &str = "CULTA";

/// Components addressable by a numeric id.
pub trait Identified {
    const KIND: TargetKind;
    fn id(&self) -> u32;

    fn target_ref(&self) -> TargetRef {
        TargetRef::new(Self::KIND, self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlienBase {
    pub id: u32,
    pub race: String,
    pub discovered: bool,
    pub in_battlescape: bool,
}

impl AlienBase {
    pub fn new(id: u32, race: &str) -> Self {
        Self {
            id,
            race: race.to_string(),
            discovered: false,
            in_battlescape: false,
        }
    }
}

/// A terror site created when a terror ship lands in a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionSite {
    pub id: u32,
    pub mission_id: u32,
    /// Mission rule id, e.g. `STR_ALIEN_TERROR`.
    pub mission_rule: String,
    pub race: String,
    pub seconds_remaining: u32,
    /// Alien activity awarded if the site expires unanswered.
    pub expiry_score: i32,
    pub city: Option<String>,
    /// Texture forced by the mission area, if any.
    pub texture: Option<i32>,
    /// Battlescape terrain, resolved on first request.
    terrain: Option<String>,
    pub discovered: bool,
    pub in_battlescape: bool,
}

impl MissionSite {
    pub fn new(id: u32, mission_id: u32, mission_rule: &str, race: &str, seconds_remaining: u32) -> Self {
        Self {
            id,
            mission_id,
            mission_rule: mission_rule.to_string(),
            race: race.to_string(),
            seconds_remaining,
            expiry_score: 0,
            city: None,
            texture: None,
            terrain: None,
            discovered: false,
            in_battlescape: false,
        }
    }

    /// The battlescape terrain for this site. Picked once from the area's
    /// texture, else from the land texture under the site, and kept.
    pub fn terrain<R: Rng>(&mut self, pos: GeoPoint, globe: &Globe, rules: &Ruleset, rng: &mut R) -> &str {
        if self.terrain.is_none() {
            let texture = self.texture.or_else(|| globe.texture_at(pos.lon, pos.lat));
            let picked = texture
                .and_then(|t| rules.texture(t))
                .and_then(|t| t.terrains.choose(rng))
                .cloned()
                .unwrap_or_else(|| DEFAULT_TERRAIN.to_string());
            self.terrain = Some(picked);
        }
        self.terrain.as_deref().unwrap_or(DEFAULT_TERRAIN)
    }

    pub fn resolved_terrain(&self) -> Option<&str> {
        self.terrain.as_deref()
    }
}

/// A player base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub id: u32,
    pub name: String,
    /// Percent chance per half hour of spotting a UFO in range.
    pub detection_chance: u32,
    pub radar_range_nm: f64,
    /// Hyper-wave decoders reveal mission and race.
    pub hyperwave: bool,
    /// Spotted by the aliens; retaliation missions go after it.
    pub retaliation_target: bool,
}

/// A player craft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Craft {
    pub id: u32,
    pub rule: String,
    pub base_id: u32,
    pub max_speed: u32,
    pub soldiers: u32,
    pub status: CraftStatus,
}

impl Identified for Ufo {
    const KIND: TargetKind = TargetKind::Ufo;
    fn id(&self) -> u32 {
        self.id
    }
}

impl Identified for AlienBase {
    const KIND: TargetKind = TargetKind::AlienBase;
    fn id(&self) -> u32 {
        self.id
    }
}

impl Identified for MissionSite {
    const KIND: TargetKind = TargetKind::MissionSite;
    fn id(&self) -> u32 {
        self.id
    }
}

impl Identified for Base {
    const KIND: TargetKind = TargetKind::Base;
    fn id(&self) -> u32 {
        self.id
    }
}

impl Identified for Craft {
    const KIND: TargetKind = TargetKind::Craft;
    fn id(&self) -> u32 {
        self.id
    }
}

/// Find the entity carrying a `T` with the given id.
pub fn find<T: Identified + Component>(world: &World, id: u32) -> Option<Entity> {
    world
        .query::<&T>()
        .iter()
        .find(|(_, t)| t.id() == id)
        .map(|(e, _)| e)
}

fn position_of<T: Identified + Component>(world: &World, id: u32) -> Option<GeoPoint> {
    let entity = find::<T>(world, id)?;
    world.get::<&GeoPoint>(entity).ok().map(|p| *p)
}

/// Current position of a live target. Waypoints are not entities.
pub fn target_position(world: &World, target: TargetRef) -> Option<GeoPoint> {
    match target.kind {
        TargetKind::Ufo => position_of::<Ufo>(world, target.id),
        TargetKind::Base => position_of::<Base>(world, target.id),
        TargetKind::AlienBase => position_of::<AlienBase>(world, target.id),
        TargetKind::MissionSite => position_of::<MissionSite>(world, target.id),
        TargetKind::Craft => position_of::<Craft>(world, target.id),
        TargetKind::Waypoint => None,
    }
}

/// Crafts currently following `target`.
pub fn followers(world: &World, target: TargetRef) -> Vec<u32> {
    world
        .query::<(&Motion, &Craft)>()
        .iter()
        .filter(|(_, (motion, _))| motion.destination() == &Destination::Target(target))
        .map(|(_, (_, craft))| craft.id)
        .collect()
}

/// Player base sitting exactly at `pos`.
pub fn base_at(world: &World, pos: GeoPoint) -> Option<u32> {
    world
        .query::<(&GeoPoint, &Base)>()
        .iter()
        .find(|(_, (p, _))| p.is_same(&pos))
        .map(|(_, (_, base))| base.id)
}

pub fn alien_base_count(world: &World) -> usize {
    world.query::<&AlienBase>().iter().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_find_and_position() {
        let mut world = World::new();
        let p = GeoPoint::from_degrees(10.0, 20.0);
        world.spawn((p, AlienBase::new(4, "STR_SECTOID")));
        world.spawn((GeoPoint::default(), AlienBase::new(5, "STR_FLOATER")));
        assert!(find::<AlienBase>(&world, 4).is_some());
        assert!(find::<AlienBase>(&world, 6).is_none());
        let got = target_position(&world, TargetRef::new(TargetKind::AlienBase, 4)).unwrap();
        assert!(got.is_same(&p));
        assert_eq!(alien_base_count(&world), 2);
        assert_eq!(target_position(&world, TargetRef::new(TargetKind::Waypoint, 4)), None);
    }

    #[test]
    fn test_followers_only_lists_chasers() {
        let mut world = World::new();
        let ufo_ref = TargetRef::new(TargetKind::Ufo, 9);
        let here = GeoPoint::default();
        for (id, chasing) in [(1, true), (2, false), (3, true)] {
            let mut motion = Motion::new(1000);
            if chasing {
                motion.set_target(here, ufo_ref, GeoPoint::from_degrees(1.0, 1.0));
            }
            let craft = Craft {
                id,
                rule: "STR_SKYRANGER".into(),
                base_id: 1,
                max_speed: 1000,
                soldiers: 0,
                status: CraftStatus::Out,
            };
            world.spawn((here, motion, craft));
        }
        let mut ids = followers(&world, ufo_ref);
        ids.sort();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_terrain_is_resolved_once() {
        let rules = Ruleset::standard().unwrap();
        let globe = Globe::from_rules(&rules);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let cairo = GeoPoint::from_degrees(31.2, 30.0);
        let mut site = MissionSite::new(1, 1, "STR_ALIEN_TERROR", "STR_SECTOID", 3600);
        assert_eq!(site.resolved_terrain(), None);
        let first = site.terrain(cairo, &globe, &rules, &mut rng).to_string();
        assert_eq!(first, "DESERT");
        for _ in 0..5 {
            assert_eq!(site.terrain(cairo, &globe, &rules, &mut rng), first);
        }
    }
}
