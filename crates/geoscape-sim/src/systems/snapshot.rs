//! Snapshot system: queries the world and builds a complete GeoscapeSnapshot.
//!
//! This system is read-only. Views are sorted by id so two runs with the
//! same seed serialise identically.

use hecs::World;

use geoscape_core::events::GeoscapeEvent;
use geoscape_core::state::*;
use geoscape_core::types::GeoPoint;

use crate::motion::Motion;
use crate::saved_game::SavedGame;
use crate::targets::{AlienBase, Base, Craft, MissionSite};
use crate::ufo::Ufo;

/// Build a complete GeoscapeSnapshot from the campaign state.
pub fn build_snapshot(game: &SavedGame, events: Vec<GeoscapeEvent>) -> GeoscapeSnapshot {
    GeoscapeSnapshot {
        time: game.time,
        difficulty: game.difficulty,
        missions: build_missions(game),
        ufos: build_ufos(&game.world),
        alien_bases: build_alien_bases(&game.world),
        mission_sites: build_mission_sites(&game.world),
        bases: build_bases(&game.world),
        crafts: build_crafts(&game.world),
        regions: game
            .regions
            .iter()
            .map(|r| RegionView {
                id: r.rule.clone(),
                xcom_activity: r.current_xcom(),
                alien_activity: r.current_alien(),
                recent_alien_activity: r.recent_activity_alien(),
            })
            .collect(),
        countries: game
            .countries
            .iter()
            .map(|c| CountryView {
                id: c.rule.clone(),
                funding: c.current_funding(),
                satisfaction: c.satisfaction(),
                pact: c.pact(),
                xcom_activity: c.current_xcom(),
                alien_activity: c.current_alien(),
            })
            .collect(),
        events,
    }
}

fn build_missions(game: &SavedGame) -> Vec<MissionView> {
    game.missions
        .iter()
        .filter_map(|m| {
            Some(MissionView {
                id: m.id().ok()?,
                rule: m.rule().id.clone(),
                kind: m.kind(),
                region: m.region().to_string(),
                race: m.race().to_string(),
                next_wave: m.next_wave(),
                wave_count: m.rule().wave_count(),
                live_ufos: m.live_ufos(),
                spawn_countdown: m.wave_countdown(),
            })
        })
        .collect()
}

fn build_ufos(world: &World) -> Vec<UfoView> {
    let mut ufos: Vec<UfoView> = world
        .query::<(&GeoPoint, &Motion, &Ufo)>()
        .iter()
        .map(|(_, (pos, motion, ufo))| UfoView {
            id: ufo.id,
            rule: ufo.rule.clone(),
            mission_id: ufo.mission_id,
            position: *pos,
            destination: *motion.destination(),
            status: ufo.status(),
            altitude: ufo.altitude(),
            speed: motion.speed(),
            damage: ufo.damage(),
            detected: ufo.detected,
            hyper_detected: ufo.hyper_detected,
            trajectory_point: ufo.trajectory_point,
        })
        .collect();
    ufos.sort_by_key(|u| u.id);
    ufos
}

fn build_alien_bases(world: &World) -> Vec<AlienBaseView> {
    let mut bases: Vec<AlienBaseView> = world
        .query::<(&GeoPoint, &AlienBase)>()
        .iter()
        .map(|(_, (pos, base))| AlienBaseView {
            id: base.id,
            position: *pos,
            race: base.race.clone(),
            discovered: base.discovered,
        })
        .collect();
    bases.sort_by_key(|b| b.id);
    bases
}

fn build_mission_sites(world: &World) -> Vec<MissionSiteView> {
    let mut sites: Vec<MissionSiteView> = world
        .query::<(&GeoPoint, &MissionSite)>()
        .iter()
        .map(|(_, (pos, site))| MissionSiteView {
            id: site.id,
            position: *pos,
            mission_id: site.mission_id,
            race: site.race.clone(),
            seconds_remaining: site.seconds_remaining,
            city: site.city.clone(),
        })
        .collect();
    sites.sort_by_key(|s| s.id);
    sites
}

fn build_bases(world: &World) -> Vec<BaseView> {
    let mut bases: Vec<BaseView> = world
        .query::<(&GeoPoint, &Base)>()
        .iter()
        .map(|(_, (pos, base))| BaseView {
            id: base.id,
            name: base.name.clone(),
            position: *pos,
            retaliation_target: base.retaliation_target,
        })
        .collect();
    bases.sort_by_key(|b| b.id);
    bases
}

fn build_crafts(world: &World) -> Vec<CraftView> {
    let mut crafts: Vec<CraftView> = world
        .query::<(&GeoPoint, &Motion, &Craft)>()
        .iter()
        .map(|(_, (pos, motion, craft))| CraftView {
            id: craft.id,
            base_id: craft.base_id,
            position: *pos,
            destination: *motion.destination(),
            status: craft.status,
            soldiers: craft.soldiers,
        })
        .collect();
    crafts.sort_by_key(|c| c.id);
    crafts
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoscape_core::enums::Difficulty;
    use geoscape_core::rules::Ruleset;
    use geoscape_core::types::GameTime;

    #[test]
    fn test_snapshot_lists_views_in_id_order() {
        let rules = Ruleset::standard().unwrap();
        let mut game = SavedGame::new(&rules, Difficulty::Veteran, GameTime { seconds: 3600 });
        for id in [3, 1, 2] {
            game.world.spawn((GeoPoint::from_degrees(id as f64, 0.0), AlienBase::new(id, "STR_SNAKEMAN")));
        }
        let snap = build_snapshot(&game, vec![GeoscapeEvent::UfoLost { ufo_id: 4 }]);
        let ids: Vec<u32> = snap.alien_bases.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(snap.regions.len(), rules.regions.len());
        assert_eq!(snap.countries.len(), rules.countries.len());
        assert_eq!(snap.difficulty, Difficulty::Veteran);
        assert_eq!(snap.time.seconds, 3600);
        assert_eq!(snap.events.len(), 1);
        assert!(snap.ufos.is_empty() && snap.missions.is_empty());
    }
}
