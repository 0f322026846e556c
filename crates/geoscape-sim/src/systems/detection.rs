//! Radar detection, run every half hour.
//!
//! Bases roll `detection_chance + visibility` percent against each flying
//! UFO inside their radar range. Detected UFOs that leave all cover are
//! lost. UFOs of retaliation missions roll in turn to spot the bases they
//! pass near.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use geoscape_core::constants::{RETALIATION_SPOT_CHANCE, RETALIATION_SPOT_RANGE_NM};
use geoscape_core::enums::UfoStatus;
use geoscape_core::events::GeoscapeEvent;
use geoscape_core::types::GeoPoint;
use geoscape_globe::geometry::within_range_nm;

use crate::targets::Base;
use crate::ufo::Ufo;

fn roll(rng: &mut ChaCha8Rng, chance: i32) -> bool {
    chance > 0 && rng.gen_range(0..100) < chance
}

/// Player radar against every flying UFO.
pub fn run(world: &mut World, rng: &mut ChaCha8Rng, events: &mut Vec<GeoscapeEvent>) {
    let bases: Vec<(GeoPoint, Base)> = world
        .query::<(&GeoPoint, &Base)>()
        .iter()
        .map(|(_, (p, b))| (*p, b.clone()))
        .collect();

    for (_entity, (pos, ufo)) in world.query_mut::<(&GeoPoint, &mut Ufo)>() {
        if ufo.status() != UfoStatus::Flying {
            continue;
        }
        let covering: Vec<&Base> = bases
            .iter()
            .filter(|(p, b)| within_range_nm(*p, *pos, b.radar_range_nm))
            .map(|(_, b)| b)
            .collect();

        if ufo.detected {
            if covering.is_empty() {
                ufo.detected = false;
                ufo.hyper_detected = false;
                debug!(ufo_id = ufo.id, "ufo left radar cover");
                events.push(GeoscapeEvent::UfoLost { ufo_id: ufo.id });
            }
            continue;
        }

        for base in covering {
            if roll(rng, base.detection_chance as i32 + ufo.visibility()) {
                ufo.detected = true;
                ufo.hyper_detected |= base.hyperwave;
                debug!(ufo_id = ufo.id, base_id = base.id, "ufo detected");
                events.push(GeoscapeEvent::UfoDetected {
                    ufo_id: ufo.id,
                    hyper: ufo.hyper_detected,
                });
                break;
            }
        }
    }
}

/// UFOs flying for a retaliation mission look for bases nearby.
pub fn retaliation_spotting(
    world: &mut World,
    retaliation_missions: &[u32],
    rng: &mut ChaCha8Rng,
    events: &mut Vec<GeoscapeEvent>,
) {
    if retaliation_missions.is_empty() {
        return;
    }
    let hunters: Vec<(GeoPoint, i32)> = world
        .query::<(&GeoPoint, &Ufo)>()
        .iter()
        .filter(|(_, (_, u))| u.status() == UfoStatus::Flying && retaliation_missions.contains(&u.mission_id))
        .map(|(_, (p, u))| (*p, u.detectors()))
        .collect();

    for (_entity, (pos, base)) in world.query_mut::<(&GeoPoint, &mut Base)>() {
        if base.retaliation_target {
            continue;
        }
        for (ufo_pos, detectors) in &hunters {
            if within_range_nm(*ufo_pos, *pos, RETALIATION_SPOT_RANGE_NM)
                && roll(rng, RETALIATION_SPOT_CHANCE as i32 + detectors)
            {
                base.retaliation_target = true;
                info!(base_id = base.id, "base spotted by the aliens");
                events.push(GeoscapeEvent::BaseMarkedForRetaliation { base_id: base.id });
                break;
            }
        }
    }
}
