//! Cleanup system: reaps destroyed UFOs between ticks.

use hecs::{Entity, World};
use tracing::{debug, warn};

use geoscape_core::enums::UfoStatus;
use geoscape_core::events::GeoscapeEvent;

use crate::mission::AlienMission;
use crate::ufo::Ufo;

/// Remove every DESTROYED UFO, releasing it from its mission exactly once.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(
    world: &mut World,
    missions: &mut [AlienMission],
    events: &mut Vec<GeoscapeEvent>,
    despawn_buffer: &mut Vec<Entity>,
) {
    despawn_buffer.clear();

    for (entity, ufo) in world.query_mut::<&Ufo>() {
        if ufo.status() != UfoStatus::Destroyed {
            continue;
        }
        despawn_buffer.push(entity);
        match missions.iter_mut().find(|m| m.id().ok() == Some(ufo.mission_id)) {
            Some(mission) => {
                if let Err(err) = mission.ufo_removed() {
                    warn!(ufo_id = ufo.id, %err, "live ufo count out of step");
                }
            }
            None => debug!(ufo_id = ufo.id, mission_id = ufo.mission_id, "reaped ufo of a finished mission"),
        }
        events.push(GeoscapeEvent::UfoDestroyed { ufo_id: ufo.id });
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saved_game::SavedGame;
    use crate::targets::find;
    use geoscape_core::enums::Difficulty;
    use geoscape_core::rules::Ruleset;
    use geoscape_core::types::GameTime;
    use geoscape_globe::Globe;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_destroyed_ufo_released_once() {
        let rules = Ruleset::standard().unwrap();
        let globe = Globe::from_rules(&rules);
        let mut game = SavedGame::new(&rules, Difficulty::Beginner, GameTime::default());
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut events = Vec::new();
        let id = game
            .start_mission(&rules, "STR_ALIEN_RESEARCH", "STR_EUROPE", "STR_SECTOID", 30, &mut rng, &mut events)
            .unwrap();

        let (missions, mut ctx) = game.split(&rules, &globe, &mut rng, &mut events);
        let wave = missions[0].rule().waves[0].clone();
        let first = missions[0].spawn_ufo(&mut ctx, &wave).unwrap().unwrap();
        missions[0].spawn_ufo(&mut ctx, &wave).unwrap();
        assert_eq!(missions[0].live_ufos(), 2);

        let doomed = find::<Ufo>(ctx.world, first).unwrap();
        ctx.world.get::<&mut Ufo>(doomed).unwrap().set_damage(100_000);

        let mut reaped = Vec::new();
        let mut buffer = Vec::new();
        run(ctx.world, missions, &mut reaped, &mut buffer);
        assert_eq!(missions[0].live_ufos(), 1);
        assert_eq!(reaped, vec![GeoscapeEvent::UfoDestroyed { ufo_id: first }]);
        assert_eq!(ctx.world.query::<&Ufo>().iter().count(), 1);

        run(ctx.world, missions, &mut reaped, &mut buffer);
        assert_eq!(missions[0].live_ufos(), 1, "a reaped ufo is never counted twice");
        assert_eq!(missions[0].id().unwrap(), id);
    }
}
