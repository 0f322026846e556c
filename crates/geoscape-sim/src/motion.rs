//! Great-circle movement toward a destination.
//!
//! `Motion` is the moving-target component shared by UFOs and crafts. The
//! per-axis speed vector is derived state: every setter recomputes it, and
//! `step` recomputes it again before moving so a drifting target is never
//! chased with a stale heading.

use serde::{Deserialize, Serialize};

use geoscape_core::constants::{SECONDS_PER_HOUR, TICK_SECONDS};
use geoscape_core::types::{Destination, GeoPoint, TargetRef, Waypoint};
use geoscape_globe::geometry::angular_distance;

/// Radians travelled per tick at one knot (one nautical mile per hour,
/// a nautical mile being 1/60 of a degree).
fn radians_per_tick(knots: u32) -> f64 {
    knots as f64 * (1.0f64 / 60.0).to_radians() * TICK_SECONDS as f64 / SECONDS_PER_HOUR as f64
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    destination: Destination,
    /// Last known position of the destination.
    dest_pos: Option<GeoPoint>,
    /// Knots.
    speed: u32,
    speed_radian: f64,
    speed_lon: f64,
    speed_lat: f64,
}

impl Motion {
    pub fn new(speed: u32) -> Self {
        Self {
            speed,
            speed_radian: radians_per_tick(speed),
            ..Default::default()
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn destination_position(&self) -> Option<GeoPoint> {
        self.dest_pos
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Radians per tick.
    pub fn speed_radian(&self) -> f64 {
        self.speed_radian
    }

    /// Per-tick `(lon, lat)` increments.
    pub fn speed_vector(&self) -> (f64, f64) {
        (self.speed_lon, self.speed_lat)
    }

    pub fn set_speed(&mut self, here: GeoPoint, knots: u32) {
        self.speed = knots;
        self.speed_radian = radians_per_tick(knots);
        self.recalculate(here);
    }

    /// Head for an owned waypoint. Any previous waypoint is dropped.
    pub fn set_waypoint(&mut self, here: GeoPoint, waypoint: Waypoint) {
        self.destination = Destination::Waypoint(waypoint);
        self.dest_pos = Some(waypoint.position);
        self.recalculate(here);
    }

    /// Follow another live target whose current position is `target_pos`.
    pub fn set_target(&mut self, here: GeoPoint, target: TargetRef, target_pos: GeoPoint) {
        self.destination = Destination::Target(target);
        self.dest_pos = Some(target_pos);
        self.recalculate(here);
    }

    pub fn clear_destination(&mut self) {
        self.destination = Destination::None;
        self.dest_pos = None;
        self.speed_lon = 0.0;
        self.speed_lat = 0.0;
    }

    /// Update the cached position of a followed target.
    pub fn refresh_target_position(&mut self, here: GeoPoint, target_pos: GeoPoint) {
        if matches!(self.destination, Destination::Target(_)) {
            self.dest_pos = Some(target_pos);
            self.recalculate(here);
        }
    }

    /// Recompute the speed vector from the current position.
    pub fn recalculate(&mut self, here: GeoPoint) {
        let Some(dest) = self.dest_pos else {
            self.speed_lon = 0.0;
            self.speed_lat = 0.0;
            return;
        };
        let dlon_raw = dest.lon - here.lon;
        let dlon = dlon_raw.sin() * dest.lat.cos();
        let dlat = here.lat.cos() * dest.lat.sin() - here.lat.sin() * dest.lat.cos() * dlon_raw.cos();
        let length = (dlon * dlon + dlat * dlat).sqrt();
        self.speed_lat = dlat / length * self.speed_radian;
        self.speed_lon = dlon / length * self.speed_radian / (here.lat + self.speed_lat).cos();
        if !self.speed_lon.is_finite() || !self.speed_lat.is_finite() {
            self.speed_lon = 0.0;
            self.speed_lat = 0.0;
        }
    }

    /// Advance one tick. Snaps onto the destination once within one step.
    pub fn step(&mut self, pos: &mut GeoPoint) {
        self.recalculate(*pos);
        let Some(dest) = self.dest_pos else {
            return;
        };
        if angular_distance(*pos, dest) > self.speed_radian {
            pos.set(pos.lon + self.speed_lon, pos.lat + self.speed_lat);
        } else {
            *pos = dest;
        }
    }

    /// Whether `pos` sits on the destination.
    pub fn reached(&self, pos: GeoPoint) -> bool {
        self.dest_pos.is_some_and(|d| d.is_same(&pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoscape_core::enums::TargetKind;

    fn waypoint(lon: f64, lat: f64) -> Waypoint {
        Waypoint {
            id: 1,
            position: GeoPoint::from_degrees(lon, lat),
        }
    }

    #[test]
    fn test_speed_conversion() {
        // 3600 knots is 60 degrees per hour, spread over 720 ticks.
        let m = Motion::new(3600);
        let per_hour = m.speed_radian() * 720.0;
        assert!((per_hour - 60f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_moves_toward_waypoint_and_snaps() {
        let mut pos = GeoPoint::from_degrees(0.0, 0.0);
        let mut m = Motion::new(0);
        m.set_waypoint(pos, waypoint(1.0, 0.0));
        m.set_speed(pos, 3600);
        let start = angular_distance(pos, m.destination_position().unwrap());
        m.step(&mut pos);
        let after = angular_distance(pos, m.destination_position().unwrap());
        assert!(after < start, "should close distance: {start} -> {after}");
        for _ in 0..100 {
            m.step(&mut pos);
        }
        assert!(m.reached(pos), "should have snapped onto the waypoint");
    }

    #[test]
    fn test_no_destination_no_motion() {
        let mut pos = GeoPoint::from_degrees(10.0, 10.0);
        let mut m = Motion::new(2000);
        m.recalculate(pos);
        assert_eq!(m.speed_vector(), (0.0, 0.0));
        m.step(&mut pos);
        assert!(pos.is_same(&GeoPoint::from_degrees(10.0, 10.0)));
        assert!(!m.reached(pos));
    }

    #[test]
    fn test_zero_length_heading_is_not_nan() {
        let pos = GeoPoint::from_degrees(5.0, 5.0);
        let mut m = Motion::new(1000);
        m.set_waypoint(pos, waypoint(5.0, 5.0));
        let (slon, slat) = m.speed_vector();
        assert_eq!((slon, slat), (0.0, 0.0));
        assert!(m.reached(pos));
    }

    #[test]
    fn test_follow_target_refreshes_heading() {
        let here = GeoPoint::from_degrees(0.0, 0.0);
        let mut m = Motion::new(1000);
        let target = TargetRef::new(TargetKind::Ufo, 3);
        m.set_target(here, target, GeoPoint::from_degrees(10.0, 0.0));
        let (east, _) = m.speed_vector();
        assert!(east > 0.0);
        m.refresh_target_position(here, GeoPoint::from_degrees(0.0, 10.0));
        let (east, north) = m.speed_vector();
        assert!(east.abs() < 1e-12 && north > 0.0, "heading swung north");
        assert_eq!(m.destination().target(), Some(target));
    }

    #[test]
    fn test_crossing_the_meridian() {
        let mut pos = GeoPoint::from_degrees(359.5, 0.0);
        let mut m = Motion::new(3600);
        m.set_waypoint(pos, waypoint(0.5, 0.0));
        let (east, _) = m.speed_vector();
        assert!(east > 0.0, "takes the short way east across lon 0");
        for _ in 0..50 {
            m.step(&mut pos);
        }
        assert!(m.reached(pos));
    }
}
