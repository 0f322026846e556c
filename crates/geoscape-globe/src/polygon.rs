//! Land polygons and the spherical point-in-polygon test.

use geoscape_core::rules::PolygonRule;
use geoscape_core::types::GeoPoint;

/// Cosine of the angular distance beyond which a vertex counts as "far".
/// A polygon with every vertex far from the query point is rejected
/// without running the crossing test.
pub const POLYGON_DISCARD_COS: f64 = 0.75;

/// A land polygon on the globe, vertices in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<GeoPoint>,
    texture: i32,
}

impl Polygon {
    pub fn new(points: Vec<GeoPoint>, texture: i32) -> Self {
        Self { points, texture }
    }

    /// Build from a ruleset outline given in degrees.
    pub fn from_rule(rule: &PolygonRule) -> Self {
        let points = rule
            .points
            .iter()
            .map(|[lon, lat]| GeoPoint::from_degrees(*lon, *lat))
            .collect();
        Self::new(points, rule.texture)
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn texture(&self) -> i32 {
        self.texture
    }

    /// Whether `(lon, lat)` lies inside the polygon.
    ///
    /// Vertices are projected onto the plane tangent to the query point, which
    /// then sits at the origin; a ray cast along +x counts edge crossings.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        if self.points.len() < 3 {
            return false;
        }

        let (sin_lat, cos_lat) = lat.sin_cos();
        let mut all_far = true;
        let projected: Vec<(f64, f64)> = self
            .points
            .iter()
            .map(|v| {
                let (sin_vlat, cos_vlat) = v.lat.sin_cos();
                let dlon = v.lon - lon;
                let z = cos_lat * cos_vlat * dlon.cos() + sin_lat * sin_vlat;
                if z >= POLYGON_DISCARD_COS {
                    all_far = false;
                }
                let x = cos_vlat * dlon.sin();
                let y = cos_lat * sin_vlat - sin_lat * cos_vlat * dlon.cos();
                (x, y)
            })
            .collect();

        if all_far {
            return false;
        }

        let mut inside = false;
        let n = projected.len();
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = projected[i];
            let (xj, yj) = projected[j];
            if (yi < 0.0) != (yj < 0.0) {
                let x_cross = xi + (xj - xi) * (0.0 - yi) / (yj - yi);
                if x_cross > 0.0 {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(lon0: f64, lon1: f64, lat0: f64, lat1: f64) -> Polygon {
        Polygon::new(
            vec![
                GeoPoint::from_degrees(lon0, lat0),
                GeoPoint::from_degrees(lon1, lat0),
                GeoPoint::from_degrees(lon1, lat1),
                GeoPoint::from_degrees(lon0, lat1),
            ],
            3,
        )
    }

    #[test]
    fn test_point_inside_square() {
        let p = square(10.0, 30.0, 10.0, 30.0);
        assert!(p.contains(20f64.to_radians(), 20f64.to_radians()));
        assert!(p.contains(11f64.to_radians(), 29f64.to_radians()));
    }

    #[test]
    fn test_point_outside_square() {
        let p = square(10.0, 30.0, 10.0, 30.0);
        assert!(!p.contains(35f64.to_radians(), 20f64.to_radians()));
        assert!(!p.contains(20f64.to_radians(), 5f64.to_radians()));
    }

    #[test]
    fn test_far_polygon_rejected() {
        let p = square(10.0, 30.0, 10.0, 30.0);
        // Antipode of the square's centre; projection alone would alias it inside.
        assert!(!p.contains(200f64.to_radians(), (-20f64).to_radians()));
    }

    #[test]
    fn test_large_polygon_with_some_far_vertices_still_hit() {
        // Two of the four corners lie beyond the discard distance from the query point.
        let p = square(0.0, 80.0, 0.0, 60.0);
        assert!(p.contains(30f64.to_radians(), 25f64.to_radians()));
        assert!(!p.contains(100f64.to_radians(), 25f64.to_radians()));
    }

    #[test]
    fn test_square_across_prime_meridian() {
        let p = square(350.0, 10.0, 40.0, 55.0);
        assert!(p.contains(0.5f64.to_radians(), 50f64.to_radians()));
        assert!(p.contains(355f64.to_radians(), 45f64.to_radians()));
        assert!(!p.contains(20f64.to_radians(), 45f64.to_radians()));
    }

    #[test]
    fn test_from_rule_converts_degrees() {
        let rule = PolygonRule {
            texture: 6,
            points: vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]],
        };
        let p = Polygon::from_rule(&rule);
        assert_eq!(p.texture(), 6);
        assert!((p.points()[1].lon - 10f64.to_radians()).abs() < 1e-12);
    }
}
