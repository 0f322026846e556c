//! Entity spawn factories for player assets.
//!
//! A new base comes with one interceptor and one troop transport, both
//! parked at the base.

use hecs::World;

use geoscape_core::constants::*;
use geoscape_core::enums::CraftStatus;
use geoscape_core::types::GeoPoint;

use crate::motion::Motion;
use crate::saved_game::{IdCounters, IdKind};
use crate::targets::{Base, Craft};

/// Radar and identity of a base to build.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseSpec {
    pub name: String,
    pub position: GeoPoint,
    pub detection_chance: u32,
    pub radar_range_nm: f64,
    pub hyperwave: bool,
}

impl BaseSpec {
    /// The campaign's first base: London, with a standard radar.
    pub fn starting() -> Self {
        Self {
            name: STARTING_BASE_NAME.to_string(),
            position: GeoPoint::from_degrees(STARTING_BASE_LON, STARTING_BASE_LAT),
            detection_chance: STARTING_RADAR_CHANCE,
            radar_range_nm: STARTING_RADAR_RANGE_NM,
            hyperwave: false,
        }
    }
}

/// Build a base with its starting crafts. Returns the base id.
pub fn spawn_base(world: &mut World, ids: &mut IdCounters, spec: &BaseSpec) -> u32 {
    let id = ids.next(IdKind::Base);
    world.spawn((
        spec.position,
        Base {
            id,
            name: spec.name.clone(),
            detection_chance: spec.detection_chance,
            radar_range_nm: spec.radar_range_nm,
            hyperwave: spec.hyperwave,
            retaliation_target: false,
        },
    ));
    spawn_craft(world, ids, id, spec.position, INTERCEPTOR_CRAFT, INTERCEPTOR_SPEED, 0);
    spawn_craft(world, ids, id, spec.position, TRANSPORT_CRAFT, TRANSPORT_SPEED, TRANSPORT_SOLDIERS);
    id
}

/// Park a ready craft at its base. Returns the craft id.
pub fn spawn_craft(
    world: &mut World,
    ids: &mut IdCounters,
    base_id: u32,
    position: GeoPoint,
    rule: &str,
    max_speed: u32,
    soldiers: u32,
) -> u32 {
    let id = ids.next(IdKind::Craft);
    world.spawn((
        position,
        Motion::new(0),
        Craft {
            id,
            rule: rule.to_string(),
            base_id,
            max_speed,
            soldiers,
            status: CraftStatus::Ready,
        },
    ));
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::{base_at, find};

    #[test]
    fn test_base_comes_with_two_crafts() {
        let mut world = World::new();
        let mut ids = IdCounters::default();
        let spec = BaseSpec::starting();
        let base_id = spawn_base(&mut world, &mut ids, &spec);
        assert_eq!(base_at(&world, spec.position), Some(base_id));

        let crafts: Vec<Craft> = world.query::<&Craft>().iter().map(|(_, c)| c.clone()).collect();
        assert_eq!(crafts.len(), 2);
        assert!(crafts.iter().all(|c| c.base_id == base_id && c.status == CraftStatus::Ready));
        let transport = crafts.iter().find(|c| c.rule == TRANSPORT_CRAFT).unwrap();
        assert_eq!(transport.soldiers, TRANSPORT_SOLDIERS);
        assert!(find::<Craft>(&world, transport.id).is_some());
    }

    #[test]
    fn test_second_base_gets_fresh_ids() {
        let mut world = World::new();
        let mut ids = IdCounters::default();
        let first = spawn_base(&mut world, &mut ids, &BaseSpec::starting());
        let mut spec = BaseSpec::starting();
        spec.name = "Bravo".into();
        spec.position = GeoPoint::from_degrees(250.0, 40.0);
        let second = spawn_base(&mut world, &mut ids, &spec);
        assert_eq!((first, second), (1, 2));
        let mut craft_ids: Vec<u32> = world.query::<&Craft>().iter().map(|(_, c)| c.id).collect();
        craft_ids.sort();
        assert_eq!(craft_ids, vec![1, 2, 3, 4]);
    }
}
