//! Great-circle helpers and random placement inside rule areas.

use std::f64::consts::TAU;

use glam::DVec3;
use rand::Rng;

use geoscape_core::constants::NM_PER_RADIAN;
use geoscape_core::rules::{GeoRect, MissionArea};
use geoscape_core::types::GeoPoint;

/// Unit vector for a surface point (x toward lon 0, z toward the north pole).
pub fn to_unit(p: GeoPoint) -> DVec3 {
    let (sin_lat, cos_lat) = p.lat.sin_cos();
    let (sin_lon, cos_lon) = p.lon.sin_cos();
    DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
}

/// Great-circle angle between two points, in radians.
pub fn angular_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    to_unit(a).dot(to_unit(b)).clamp(-1.0, 1.0).acos()
}

/// Great-circle distance in nautical miles.
pub fn distance_nm(a: GeoPoint, b: GeoPoint) -> f64 {
    angular_distance(a, b) * NM_PER_RADIAN
}

/// Whether `b` lies within `range_nm` of `a`.
pub fn within_range_nm(a: GeoPoint, b: GeoPoint, range_nm: f64) -> bool {
    distance_nm(a, b) <= range_nm
}

/// Uniform random point inside a box, bounds inclusive. Handles boxes that
/// wrap through longitude 0.
pub fn random_point_in_rect<R: Rng>(rng: &mut R, rect: &GeoRect) -> GeoPoint {
    let lon = if rect.lon_min <= rect.lon_max {
        rng.gen_range(rect.lon_min..=rect.lon_max)
    } else {
        let span = rect.lon_max + TAU - rect.lon_min;
        rect.lon_min + rng.gen_range(0.0..=span)
    };
    let (lat_lo, lat_hi) = if rect.lat_min <= rect.lat_max {
        (rect.lat_min, rect.lat_max)
    } else {
        (rect.lat_max, rect.lat_min)
    };
    let lat = rng.gen_range(lat_lo..=lat_hi);
    GeoPoint::new(lon, lat)
}

/// Random point inside a mission area; point areas return their exact location.
pub fn random_point_in_area<R: Rng>(rng: &mut R, area: &MissionArea) -> GeoPoint {
    if area.is_point() {
        area.origin()
    } else {
        random_point_in_rect(rng, &area.rect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_quarter_circle_distance() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(FRAC_PI_2, 0.0);
        assert!((angular_distance(a, b) - FRAC_PI_2).abs() < 1e-12);
        let pole = GeoPoint::new(1.3, FRAC_PI_2);
        assert!((angular_distance(a, pole) - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_one_degree_is_sixty_nm() {
        let a = GeoPoint::from_degrees(10.0, 0.0);
        let b = GeoPoint::from_degrees(11.0, 0.0);
        let d = distance_nm(a, b);
        assert!((d - 60.0).abs() < 1e-6, "1 degree of arc should be 60 nm, got {d}");
        assert!(within_range_nm(a, b, 61.0));
        assert!(!within_range_nm(a, b, 59.0));
    }

    #[test]
    fn test_distance_across_meridian() {
        let a = GeoPoint::from_degrees(359.5, 0.0);
        let b = GeoPoint::from_degrees(0.5, 0.0);
        assert!((distance_nm(a, b) - 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_random_point_stays_in_wrapping_rect() {
        let rect = GeoRect {
            lon_min: 350f64.to_radians(),
            lon_max: 10f64.to_radians(),
            lat_min: 20f64.to_radians(),
            lat_max: 30f64.to_radians(),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let p = random_point_in_rect(&mut rng, &rect);
            let (lon, lat) = p.to_degrees();
            assert!(lon >= 350.0 - 1e-9 || lon <= 10.0 + 1e-9, "lon {lon} outside wrapped box");
            assert!((20.0 - 1e-9..=30.0 + 1e-9).contains(&lat), "lat {lat} outside box");
        }
    }

    #[test]
    fn test_point_area_is_exact() {
        let area = MissionArea {
            lon_min: 0.5,
            lon_max: 0.5,
            lat_min: 0.2,
            lat_max: 0.2,
            name: Some("STR_SOMEWHERE".into()),
            texture: None,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let p = random_point_in_area(&mut rng, &area);
        assert!(p.is_same(&GeoPoint::new(0.5, 0.2)));
    }
}
