//! Orthographic globe projection and land hit-testing.
//!
//! The view looks at the sphere from infinitely far away above
//! `(cen_lon, cen_lat)`. Screen coordinates are relative to `(cen_x, cen_y)`
//! and scaled by the zoom-dependent radius.

use std::f64::consts::FRAC_PI_2;

use geoscape_core::rules::Ruleset;
use geoscape_core::types::{normalize_lon, GeoPoint};

use crate::polygon::Polygon;

/// Globe radius in pixels for each zoom level.
pub const ZOOM_RADII: [f64; 6] = [90.0, 120.0, 180.0, 360.0, 450.0, 720.0];

/// Default viewport centre, used by headless globes.
pub const DEFAULT_CEN_X: f64 = 160.0;
pub const DEFAULT_CEN_Y: f64 = 100.0;

const RHO_EPSILON: f64 = 1e-12;

/// The Geoscape globe: view state plus land polygons.
#[derive(Debug, Clone)]
pub struct Globe {
    cen_lon: f64,
    cen_lat: f64,
    cen_x: f64,
    cen_y: f64,
    zoom: usize,
    polygons: Vec<Polygon>,
}

impl Globe {
    /// Create a globe with its view centred at lon 0, lat 0 and minimum zoom.
    pub fn new(cen_x: f64, cen_y: f64, polygons: Vec<Polygon>) -> Self {
        Self {
            cen_lon: 0.0,
            cen_lat: 0.0,
            cen_x,
            cen_y,
            zoom: 0,
            polygons,
        }
    }

    /// Build a headless globe from the ruleset's land polygons.
    pub fn from_rules(rules: &Ruleset) -> Self {
        let polygons = rules.polygons.iter().map(Polygon::from_rule).collect();
        Self::new(DEFAULT_CEN_X, DEFAULT_CEN_Y, polygons)
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    // --- View state ---

    pub fn radius(&self) -> f64 {
        ZOOM_RADII[self.zoom]
    }

    pub fn zoom(&self) -> usize {
        self.zoom
    }

    /// Set the zoom level, clamped to the available levels.
    pub fn set_zoom(&mut self, zoom: usize) {
        self.zoom = zoom.min(ZOOM_RADII.len() - 1);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + 1);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1);
    }

    /// The point currently under the view centre.
    pub fn center_point(&self) -> GeoPoint {
        GeoPoint {
            lon: self.cen_lon,
            lat: self.cen_lat,
        }
    }

    /// Look straight down at `(lon, lat)`.
    pub fn center(&mut self, lon: f64, lat: f64) {
        self.cen_lon = normalize_lon(lon);
        self.cen_lat = lat.clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Spin the view by angular deltas. Latitude stops at the poles.
    pub fn rotate(&mut self, dlon: f64, dlat: f64) {
        self.center(self.cen_lon + dlon, self.cen_lat + dlat);
    }

    // --- Projection ---

    /// Project a surface point to screen coordinates.
    pub fn polar_to_cart(&self, lon: f64, lat: f64) -> (f64, f64) {
        let r = self.radius();
        let dlon = lon - self.cen_lon;
        let x = self.cen_x + r * lat.cos() * dlon.sin();
        let y = self.cen_y
            + r * (self.cen_lat.cos() * lat.sin() - self.cen_lat.sin() * lat.cos() * dlon.cos());
        (x, y)
    }

    /// Inverse projection. The exact centre maps to the view centre; points
    /// off the disc are clamped onto its rim.
    pub fn cart_to_polar(&self, x: f64, y: f64) -> (f64, f64) {
        let x = x - self.cen_x;
        let y = y - self.cen_y;
        let rho = (x * x + y * y).sqrt();
        if rho < RHO_EPSILON {
            return (self.cen_lon, self.cen_lat);
        }

        let c = (rho / self.radius()).clamp(-1.0, 1.0).asin();
        let (sin_c, cos_c) = c.sin_cos();
        let (sin_cen, cos_cen) = self.cen_lat.sin_cos();

        let lat = (cos_c * sin_cen + y * sin_c * cos_cen / rho).clamp(-1.0, 1.0).asin();
        let lon = (x * sin_c).atan2(rho * cos_cen * cos_c - y * sin_cen * sin_c) + self.cen_lon;
        (normalize_lon(lon), lat)
    }

    /// Whether the point is on the far hemisphere and must not be drawn or hit-tested.
    pub fn point_back(&self, lon: f64, lat: f64) -> bool {
        let c = self.cen_lat.cos() * lat.cos() * (lon - self.cen_lon).cos()
            + self.cen_lat.sin() * lat.sin();
        c < 0.0
    }

    // --- Land ---

    /// The land polygon containing the point, if any.
    pub fn polygon_at(&self, lon: f64, lat: f64) -> Option<&Polygon> {
        self.polygons.iter().find(|p| p.contains(lon, lat))
    }

    pub fn inside_land(&self, lon: f64, lat: f64) -> bool {
        self.polygon_at(lon, lat).is_some()
    }

    /// Texture of the land under the point; `None` over water.
    pub fn texture_at(&self, lon: f64, lat: f64) -> Option<i32> {
        self.polygon_at(lon, lat).map(Polygon::texture)
    }
}
