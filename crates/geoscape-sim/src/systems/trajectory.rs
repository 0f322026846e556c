//! Hands UFOs whose leg or ground timer is done to their mission.

use hecs::{Entity, World};
use tracing::warn;

use geoscape_core::enums::UfoStatus;
use geoscape_core::error::Result;
use geoscape_core::types::GeoPoint;

use crate::mission::AlienMission;
use crate::motion::Motion;
use crate::saved_game::MissionContext;
use crate::ufo::Ufo;

/// Flying UFOs sitting on their destination: `(entity, mission id)`.
pub fn arrivals(world: &World) -> Vec<(Entity, u32)> {
    world
        .query::<(&GeoPoint, &Motion, &Ufo)>()
        .iter()
        .filter(|(_, (pos, motion, ufo))| ufo.status() == UfoStatus::Flying && motion.reached(**pos))
        .map(|(e, (_, _, ufo))| (e, ufo.mission_id))
        .collect()
}

/// Landed or crashed UFOs whose timer ran out, skipping any on a battlescape.
pub fn ground_expired(world: &World) -> Vec<(Entity, u32)> {
    world
        .query::<&Ufo>()
        .iter()
        .filter(|(_, ufo)| {
            matches!(ufo.status(), UfoStatus::Landed | UfoStatus::Crashed)
                && ufo.seconds_remaining == 0
                && !ufo.in_battlescape
        })
        .map(|(e, ufo)| (e, ufo.mission_id))
        .collect()
}

/// Apply a mission operation to each listed UFO. Failures are logged and
/// the UFO is skipped for this tick; UFOs whose mission is gone are destroyed.
pub fn dispatch<F>(
    missions: &mut [AlienMission],
    ctx: &mut MissionContext,
    ufos: &[(Entity, u32)],
    what: &str,
    mut op: F,
) where
    F: FnMut(&mut AlienMission, &mut MissionContext, Entity) -> Result<()>,
{
    for &(entity, mission_id) in ufos {
        let Some(mission) = missions.iter_mut().find(|m| m.id().ok() == Some(mission_id)) else {
            warn!(mission_id, what, "ufo belongs to no live mission, destroying it");
            if let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(entity) {
                let _ = ufo.set_status(UfoStatus::Destroyed);
            }
            continue;
        };
        if let Err(err) = op(mission, ctx, entity) {
            warn!(mission_id, what, %err, "ufo transition skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saved_game::SavedGame;
    use geoscape_core::enums::{Difficulty, UfoAltitude};
    use geoscape_core::rules::{RuleUfo, Ruleset};
    use geoscape_core::types::{GameTime, Waypoint};
    use geoscape_globe::Globe;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn scout(mission_id: u32) -> Ufo {
        let rule = RuleUfo {
            id: "STR_SMALL_SCOUT".into(),
            size: Default::default(),
            max_speed: 2200,
            max_damage: 50,
            score: 50,
        };
        Ufo::new(1, &rule, mission_id, "P0")
    }

    #[test]
    fn test_arrivals_and_expiry_are_status_filtered() {
        let mut world = World::new();
        let here = GeoPoint::from_degrees(10.0, 10.0);
        let mut at_dest = Motion::new(0);
        at_dest.set_waypoint(here, Waypoint { id: 1, position: here });

        let flying = world.spawn((here, at_dest.clone(), scout(4)));
        let mut landed_ufo = scout(5);
        landed_ufo.set_altitude(UfoAltitude::Ground);
        let landed = world.spawn((here, at_dest, landed_ufo));

        assert_eq!(arrivals(&world), vec![(flying, 4)]);
        assert_eq!(ground_expired(&world), vec![(landed, 5)]);

        world.get::<&mut Ufo>(landed).unwrap().seconds_remaining = 60;
        assert!(ground_expired(&world).is_empty());
    }

    #[test]
    fn test_orphan_ufo_is_destroyed() {
        let rules = Ruleset::standard().unwrap();
        let globe = Globe::from_rules(&rules);
        let mut game = SavedGame::new(&rules, Difficulty::Beginner, GameTime::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut events = Vec::new();
        let e = game.world.spawn((GeoPoint::default(), Motion::new(0), scout(99)));
        let (missions, mut ctx) = game.split(&rules, &globe, &mut rng, &mut events);
        dispatch(missions, &mut ctx, &[(e, 99)], "arrival", |_, _, _| Ok(()));
        assert_eq!(game.world.get::<&Ufo>(e).unwrap().status(), UfoStatus::Destroyed);
    }
}
