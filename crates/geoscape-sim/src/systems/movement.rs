//! Movement system: UFO and craft motion along great circles.
//!
//! Followed targets are re-resolved every tick. A craft whose target has
//! left the world turns for home.

use hecs::{Entity, World};

use geoscape_core::enums::{CraftStatus, TargetKind};
use geoscape_core::events::GeoscapeEvent;
use geoscape_core::types::{Destination, GeoPoint, TargetRef};

use crate::motion::Motion;
use crate::targets::{target_position, Craft};
use crate::ufo::Ufo;

/// Update cached positions of followed targets; crafts that lost theirs
/// head back to base.
pub fn refresh_targets(world: &mut World) {
    let followed: Vec<(Entity, TargetRef)> = world
        .query::<&Motion>()
        .iter()
        .filter_map(|(e, m)| m.destination().target().map(|t| (e, t)))
        .collect();

    for (entity, target) in followed {
        let resolved = target_position(world, target);
        let home = world.get::<&Craft>(entity).ok().map(|c| c.base_id);
        let Ok((here, motion)) = world.query_one_mut::<(&GeoPoint, &mut Motion)>(entity) else {
            continue;
        };
        match resolved {
            Some(p) => motion.refresh_target_position(*here, p),
            None => motion.clear_destination(),
        }
        if resolved.is_none() {
            if let Some(base_id) = home {
                return_to_base(world, entity, base_id);
            }
        }
    }
}

/// Point a craft at its home base.
pub fn return_to_base(world: &mut World, entity: Entity, base_id: u32) {
    let home = TargetRef::new(TargetKind::Base, base_id);
    let Some(base_pos) = target_position(world, home) else {
        return;
    };
    if let Ok((here, motion, craft)) = world.query_one_mut::<(&GeoPoint, &mut Motion, &mut Craft)>(entity) {
        motion.set_target(*here, home, base_pos);
        motion.set_speed(*here, craft.max_speed);
        craft.status = CraftStatus::Returning;
    }
}

/// One tick of UFO motion and ground timers.
pub fn run_ufos(world: &mut World) {
    for (_entity, (pos, motion, ufo)) in world.query_mut::<(&mut GeoPoint, &mut Motion, &mut Ufo)>() {
        ufo.think(pos, motion);
    }
}

/// One tick of craft motion. Crafts reaching a plain waypoint hold there;
/// returning crafts landing at base become ready.
pub fn run_crafts(world: &mut World, events: &mut Vec<GeoscapeEvent>) {
    for (_entity, (pos, motion, craft)) in world.query_mut::<(&mut GeoPoint, &mut Motion, &mut Craft)>() {
        if craft.status == CraftStatus::Ready || motion.destination().is_none() {
            continue;
        }
        motion.step(pos);
        if !motion.reached(*pos) {
            continue;
        }
        let home = Destination::Target(TargetRef::new(TargetKind::Base, craft.base_id));
        if craft.status == CraftStatus::Returning && *motion.destination() == home {
            craft.status = CraftStatus::Ready;
            motion.clear_destination();
            motion.set_speed(*pos, 0);
            events.push(GeoscapeEvent::CraftArrived { craft_id: craft.id });
        } else if matches!(motion.destination(), Destination::Waypoint(_)) {
            motion.clear_destination();
            events.push(GeoscapeEvent::CraftArrived { craft_id: craft.id });
        }
    }
}
