//! Picking UFO waypoints inside a region's mission zones.

use rand::Rng;

use geoscape_core::constants::LAND_POINT_TRIES;
use geoscape_core::error::{GeoscapeError, Result};
use geoscape_core::rules::RuleRegion;
use geoscape_core::types::GeoPoint;
use geoscape_globe::{random_point_in_area, Globe};

/// Outcome of a land-constrained placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LandPoint {
    /// On land and inside the region.
    OnLand(GeoPoint),
    /// No satisfying point was found; this is the last candidate tried,
    /// possibly over water.
    Degraded(GeoPoint),
}

impl LandPoint {
    pub fn point(self) -> GeoPoint {
        match self {
            LandPoint::OnLand(p) | LandPoint::Degraded(p) => p,
        }
    }

    pub fn is_degraded(self) -> bool {
        matches!(self, LandPoint::Degraded(_))
    }
}

/// Uniform random point in one of the zone's areas.
pub fn random_point_in_zone<R: Rng>(rng: &mut R, region: &RuleRegion, zone: usize) -> Result<GeoPoint> {
    let areas = region.zone(zone).map(|z| z.areas.as_slice()).unwrap_or_default();
    if areas.is_empty() {
        return Err(GeoscapeError::InvalidRuleset(format!(
            "region {} has no areas in zone {zone}",
            region.id
        )));
    }
    let area = &areas[rng.gen_range(0..areas.len())];
    Ok(random_point_in_area(rng, area))
}

/// A point in `zone` that is both on land and inside the region, trying up
/// to `LAND_POINT_TRIES` candidates before settling for the last one.
pub fn land_point<R: Rng>(globe: &Globe, rng: &mut R, region: &RuleRegion, zone: usize) -> Result<LandPoint> {
    let mut candidate = random_point_in_zone(rng, region, zone)?;
    for _ in 1..LAND_POINT_TRIES {
        if globe.inside_land(candidate.lon, candidate.lat) && region.inside_region(candidate) {
            return Ok(LandPoint::OnLand(candidate));
        }
        candidate = random_point_in_zone(rng, region, zone)?;
    }
    if globe.inside_land(candidate.lon, candidate.lat) && region.inside_region(candidate) {
        return Ok(LandPoint::OnLand(candidate));
    }
    Ok(LandPoint::Degraded(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoscape_core::rules::{GeoRect, MissionArea, MissionZone, Ruleset};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ocean_region() -> RuleRegion {
        let (lo, hi) = (200f64.to_radians(), 210f64.to_radians());
        let (la, lb) = ((-40f64).to_radians(), (-30f64).to_radians());
        RuleRegion {
            id: "STR_PACIFIC".into(),
            areas: vec![GeoRect {
                lon_min: lo,
                lon_max: hi,
                lat_min: la,
                lat_max: lb,
            }],
            mission_zones: vec![MissionZone {
                areas: vec![MissionArea {
                    lon_min: lo,
                    lon_max: hi,
                    lat_min: la,
                    lat_max: lb,
                    name: None,
                    texture: None,
                }],
            }],
            mission_weights: vec![],
            weight: 1,
        }
    }

    #[test]
    fn test_land_point_in_standard_regions() {
        let rules = Ruleset::standard().unwrap();
        let globe = Globe::from_rules(&rules);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for region in &rules.regions {
            for zone in 0..region.mission_zones.len() {
                let lp = land_point(&globe, &mut rng, region, zone).unwrap();
                let p = lp.point();
                assert!(!lp.is_degraded(), "region {} zone {zone} degraded at {p:?}", region.id);
                assert!(globe.inside_land(p.lon, p.lat));
                assert!(region.inside_region(p));
            }
        }
    }

    #[test]
    fn test_open_ocean_zone_degrades() {
        let rules = Ruleset::standard().unwrap();
        let globe = Globe::from_rules(&rules);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let region = ocean_region();
        let lp = land_point(&globe, &mut rng, &region, 0).unwrap();
        assert!(lp.is_degraded(), "a zone with no land can only degrade");
        assert!(region.inside_region(lp.point()), "fallback still lies in the zone");
    }

    #[test]
    fn test_missing_zone_is_an_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let region = ocean_region();
        assert!(random_point_in_zone(&mut rng, &region, 3).is_err());
    }

    #[test]
    fn test_city_zone_returns_exact_cities() {
        let rules = Ruleset::standard().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let europe = rules.region("STR_EUROPE").unwrap();
        for _ in 0..10 {
            let p = random_point_in_zone(&mut rng, europe, 3).unwrap();
            assert!(europe.city_at(p).is_some(), "city zone point {p:?} should be a city");
        }
    }
}
