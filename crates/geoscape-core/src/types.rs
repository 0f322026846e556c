//! Fundamental geographic and simulation types.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use crate::constants::{DAYS_PER_MONTH, SECONDS_PER_DAY, SECONDS_PER_HALF_HOUR, SECONDS_PER_HOUR};
use crate::enums::TargetKind;

/// Tolerance used when comparing coordinates for "same place" checks.
pub const COORD_EPSILON: f64 = 1e-9;

/// Position on the globe surface in radians.
///
/// Longitude is kept in [0, 2π) and latitude in [-π/2, π/2]; the
/// constructor and setters normalise out-of-range values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        let mut p = Self { lon: 0.0, lat: 0.0 };
        p.set(lon, lat);
        p
    }

    /// Build a point from degrees.
    pub fn from_degrees(lon: f64, lat: f64) -> Self {
        Self::new(lon.to_radians(), lat.to_radians())
    }

    /// Set both coordinates, folding latitude over the poles first.
    pub fn set(&mut self, lon: f64, lat: f64) {
        let (mut lon, mut lat) = (lon, lat);
        if lat < -FRAC_PI_2 {
            lat = -PI - lat;
            lon += PI;
        } else if lat > FRAC_PI_2 {
            lat = PI - lat;
            lon += PI;
        }
        self.lon = normalize_lon(lon);
        self.lat = lat;
    }

    pub fn set_lon(&mut self, lon: f64) {
        self.lon = normalize_lon(lon);
    }

    pub fn set_lat(&mut self, lat: f64) {
        let lon = self.lon;
        self.set(lon, lat);
    }

    /// Whether two points are the same place within `COORD_EPSILON`.
    pub fn is_same(&self, other: &GeoPoint) -> bool {
        let dlon = (self.lon - other.lon).abs();
        let dlon = dlon.min(TAU - dlon);
        dlon < COORD_EPSILON && (self.lat - other.lat).abs() < COORD_EPSILON
    }

    /// Longitude and latitude in degrees.
    pub fn to_degrees(&self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }
}

/// Normalise a longitude into [0, 2π).
pub fn normalize_lon(lon: f64) -> f64 {
    let r = lon.rem_euclid(TAU);
    if r >= TAU {
        0.0
    } else {
        r
    }
}

/// Typed reference to a live target in the entity world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRef {
    pub kind: TargetKind,
    pub id: u32,
}

impl TargetRef {
    pub fn new(kind: TargetKind, id: u32) -> Self {
        Self { kind, id }
    }
}

/// A bare navigation point. Owned by value by whatever is heading to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: u32,
    pub position: GeoPoint,
}

/// Where a moving target is heading.
///
/// A `Waypoint` is owned by the mover and dropped when superseded; a
/// `Target` is a non-owning reference to another live entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Destination {
    #[default]
    None,
    Waypoint(Waypoint),
    Target(TargetRef),
}

impl Destination {
    pub fn is_none(&self) -> bool {
        matches!(self, Destination::None)
    }

    /// The referenced target, if the destination is a live entity.
    pub fn target(&self) -> Option<TargetRef> {
        match self {
            Destination::Target(t) => Some(*t),
            _ => None,
        }
    }
}

/// Simulated calendar time, counted in seconds since campaign start.
///
/// Months are fixed at `DAYS_PER_MONTH` days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameTime {
    pub seconds: u64,
}

impl GameTime {
    pub fn advance(&mut self, seconds: u32) {
        self.seconds += seconds as u64;
    }

    pub fn minute(&self) -> u64 {
        (self.seconds / 60) % 60
    }

    pub fn hour(&self) -> u64 {
        (self.seconds / SECONDS_PER_HOUR) % 24
    }

    /// Zero-based day within the current month.
    pub fn day(&self) -> u64 {
        (self.seconds / SECONDS_PER_DAY) % DAYS_PER_MONTH
    }

    /// Zero-based month since campaign start.
    pub fn month(&self) -> u64 {
        self.seconds / (SECONDS_PER_DAY * DAYS_PER_MONTH)
    }

    pub fn is_half_hour_boundary(&self) -> bool {
        self.seconds.is_multiple_of(SECONDS_PER_HALF_HOUR)
    }

    pub fn is_hour_boundary(&self) -> bool {
        self.seconds.is_multiple_of(SECONDS_PER_HOUR)
    }

    pub fn is_day_boundary(&self) -> bool {
        self.seconds.is_multiple_of(SECONDS_PER_DAY)
    }

    pub fn is_month_boundary(&self) -> bool {
        self.seconds.is_multiple_of(SECONDS_PER_DAY * DAYS_PER_MONTH)
    }
}
