//! Monthly alien planning: which missions start where.
//!
//! Every month one terror mission goes to a random region and one more
//! mission is drawn from a weighted region's mission table. Retaliation
//! and supply missions are only ever triggered by events.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use geoscape_core::constants::DEFAULT_RACE;
use geoscape_core::enums::MissionKind;
use geoscape_core::error::Result;
use geoscape_core::events::GeoscapeEvent;
use geoscape_core::rules::{RuleAlienMission, Ruleset, WeightedId};

use crate::saved_game::SavedGame;

/// Index drawn with probability proportional to its weight.
pub fn pick_index<R: Rng>(rng: &mut R, weights: &[u32]) -> Option<usize> {
    let total: u32 = weights.iter().sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.gen_range(0..total);
    for (i, &w) in weights.iter().enumerate() {
        if roll < w {
            return Some(i);
        }
        roll -= w;
    }
    None
}

pub fn pick_weighted<'a, R: Rng>(rng: &mut R, items: &'a [WeightedId]) -> Option<&'a str> {
    let weights: Vec<u32> = items.iter().map(|w| w.weight).collect();
    pick_index(rng, &weights).map(|i| items[i].id.as_str())
}

/// Alien race for a new mission.
pub fn pick_race<R: Rng>(rng: &mut R, rule: &RuleAlienMission) -> String {
    pick_weighted(rng, &rule.race_weights)
        .unwrap_or(DEFAULT_RACE)
        .to_string()
}

fn plannable(kind: MissionKind) -> bool {
    !matches!(kind, MissionKind::Retaliation | MissionKind::Supply)
}

/// Start this month's missions. Returns the ids started.
pub fn plan_month(
    game: &mut SavedGame,
    rules: &Ruleset,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<GeoscapeEvent>,
) -> Result<Vec<u32>> {
    let mut planned: Vec<(String, String)> = Vec::new();

    if let Ok(terror) = rules.mission_of_kind(MissionKind::Terror) {
        if let Some(region) = rules.regions.choose(rng) {
            planned.push((terror.id.clone(), region.id.clone()));
        }
    }

    let weights: Vec<u32> = rules.regions.iter().map(|r| r.weight).collect();
    if let Some(i) = pick_index(rng, &weights) {
        let region = &rules.regions[i];
        let table: Vec<WeightedId> = region
            .mission_weights
            .iter()
            .filter(|w| rules.mission(&w.id).is_ok_and(|m| plannable(m.kind)))
            .cloned()
            .collect();
        if let Some(rule) = pick_weighted(rng, &table) {
            planned.push((rule.to_string(), region.id.clone()));
        }
    }

    let mut started = Vec::new();
    for (rule_id, region) in planned {
        let rule = rules.mission(&rule_id)?;
        if game.has_active_mission(rule.kind, &region) {
            debug!(rule = %rule_id, region = %region, "mission already running, skipped");
            continue;
        }
        let race = pick_race(rng, rule);
        match game.start_mission(rules, &rule_id, &region, &race, 0, rng, events) {
            Ok(id) => started.push(id),
            Err(err) => warn!(rule = %rule_id, region = %region, %err, "could not start planned mission"),
        }
    }
    Ok(started)
}
