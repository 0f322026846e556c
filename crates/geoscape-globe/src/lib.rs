//! Globe geometry for the Geoscape.
//!
//! Orthographic projection, far-side occlusion, land polygons and
//! great-circle helpers used for placement and radar coverage.

pub use geoscape_core as core;

pub mod geometry;
pub mod polygon;
pub mod projection;

// Re-export key types for convenience.
pub use geometry::{angular_distance, distance_nm, random_point_in_area, random_point_in_rect};
pub use polygon::Polygon;
pub use projection::Globe;
