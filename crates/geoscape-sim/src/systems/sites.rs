//! Mission site countdown. Unanswered sites expire and score for the aliens.

use hecs::{Entity, World};
use tracing::info;

use geoscape_core::constants::TICK_SECONDS;
use geoscape_core::events::GeoscapeEvent;
use geoscape_core::rules::Ruleset;
use geoscape_core::types::GeoPoint;

use crate::scoring::{add_score, Country, Region, Side};
use crate::targets::MissionSite;

pub fn run(
    world: &mut World,
    regions: &mut [Region],
    countries: &mut [Country],
    rules: &Ruleset,
    events: &mut Vec<GeoscapeEvent>,
) {
    let mut expired: Vec<(Entity, u32, GeoPoint, i32)> = Vec::new();
    for (entity, (pos, site)) in world.query_mut::<(&GeoPoint, &mut MissionSite)>() {
        if site.in_battlescape {
            continue;
        }
        site.seconds_remaining = site.seconds_remaining.saturating_sub(TICK_SECONDS);
        if site.seconds_remaining == 0 {
            expired.push((entity, site.id, *pos, site.expiry_score));
        }
    }

    for (entity, site_id, pos, points) in expired {
        add_score(regions, countries, rules, pos, Side::Alien, points);
        info!(site_id, points, "mission site expired");
        events.push(GeoscapeEvent::MissionSiteExpired { site_id, points });
        let _ = world.despawn(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::initial_meters;

    #[test]
    fn test_site_expires_and_scores() {
        let rules = Ruleset::standard().unwrap();
        let (mut regions, mut countries) = initial_meters(&rules);
        let mut world = World::new();
        let paris = GeoPoint::from_degrees(2.35, 48.85);
        let mut site = MissionSite::new(1, 1, "STR_ALIEN_TERROR", "STR_SECTOID", 10);
        site.expiry_score = 250;
        world.spawn((paris, site));

        let mut events = Vec::new();
        run(&mut world, &mut regions, &mut countries, &rules, &mut events);
        assert!(events.is_empty(), "5 seconds left after one tick");
        run(&mut world, &mut regions, &mut countries, &rules, &mut events);
        assert_eq!(events, vec![GeoscapeEvent::MissionSiteExpired { site_id: 1, points: 250 }]);
        assert_eq!(world.query::<&MissionSite>().iter().count(), 0);

        let europe = regions.iter().find(|r| r.rule == "STR_EUROPE").unwrap();
        assert_eq!(europe.current_alien(), 250);
    }

    #[test]
    fn test_site_in_battle_is_frozen() {
        let rules = Ruleset::standard().unwrap();
        let (mut regions, mut countries) = initial_meters(&rules);
        let mut world = World::new();
        let mut site = MissionSite::new(2, 1, "STR_ALIEN_TERROR", "STR_SECTOID", 5);
        site.in_battlescape = true;
        let e = world.spawn((GeoPoint::default(), site));
        let mut events = Vec::new();
        run(&mut world, &mut regions, &mut countries, &rules, &mut events);
        assert_eq!(world.get::<&MissionSite>(e).unwrap().seconds_remaining, 5);
    }
}
