//! Region and country activity scoring.
//!
//! Scoring never fails: a point outside every region or country simply
//! scores nothing there.

pub mod country;
pub mod region;

pub use country::{Country, Settlement};
pub use region::Region;

use geoscape_core::rules::Ruleset;
use geoscape_core::types::GeoPoint;

/// Which side earned the points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Xcom,
    Alien,
}

/// Credit `points` to the first region and the first country containing `p`.
pub fn add_score(
    regions: &mut [Region],
    countries: &mut [Country],
    rules: &Ruleset,
    p: GeoPoint,
    side: Side,
    points: i32,
) {
    if let Some(region) = regions
        .iter_mut()
        .find(|r| rules.region(&r.rule).is_ok_and(|rule| rule.inside_region(p)))
    {
        match side {
            Side::Xcom => region.add_activity_xcom(points),
            Side::Alien => region.add_activity_alien(points),
        }
    }
    if let Some(country) = countries
        .iter_mut()
        .find(|c| rules.country(&c.rule).is_ok_and(|rule| rule.inside_country(p)))
    {
        match side {
            Side::Xcom => country.add_activity_xcom(points),
            Side::Alien => country.add_activity_alien(points),
        }
    }
}

/// Fresh region and country meters for a new campaign.
pub fn initial_meters(rules: &Ruleset) -> (Vec<Region>, Vec<Country>) {
    let regions = rules.regions.iter().map(|r| Region::new(&r.id)).collect();
    let countries = rules.countries.iter().map(Country::new).collect();
    (regions, countries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_hits_exactly_one_region_and_country() {
        let rules = Ruleset::standard().unwrap();
        let (mut regions, mut countries) = initial_meters(&rules);
        let paris = GeoPoint::from_degrees(2.35, 48.85);
        add_score(&mut regions, &mut countries, &rules, paris, Side::Alien, 17);

        for r in &regions {
            let expected = if r.rule == "STR_EUROPE" { 17 } else { 0 };
            assert_eq!(r.current_alien(), expected, "region {}", r.rule);
            assert_eq!(r.current_xcom(), 0);
        }
        for c in &countries {
            let expected = if c.rule == "STR_FRANCE" { 17 } else { 0 };
            assert_eq!(c.current_alien(), expected, "country {}", c.rule);
        }
    }

    #[test]
    fn test_xcom_side() {
        let rules = Ruleset::standard().unwrap();
        let (mut regions, mut countries) = initial_meters(&rules);
        let tokyo = GeoPoint::from_degrees(139.7, 35.7);
        add_score(&mut regions, &mut countries, &rules, tokyo, Side::Xcom, 30);
        let asia = regions.iter().find(|r| r.rule == "STR_ASIA").unwrap();
        assert_eq!(asia.current_xcom(), 30);
        assert_eq!(asia.current_alien(), 0);
        let japan = countries.iter().find(|c| c.rule == "STR_JAPAN").unwrap();
        assert_eq!(japan.current_xcom(), 30);
    }

    #[test]
    fn test_open_ocean_scores_nothing() {
        let rules = Ruleset::standard().unwrap();
        let (mut regions, mut countries) = initial_meters(&rules);
        let pacific = GeoPoint::from_degrees(200.0, -40.0);
        add_score(&mut regions, &mut countries, &rules, pacific, Side::Alien, 100);
        assert!(regions.iter().all(|r| r.current_alien() == 0));
        assert!(countries.iter().all(|c| c.current_alien() == 0));
    }
}
