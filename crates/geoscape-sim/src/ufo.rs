//! UFO entity component: status, altitude, damage and trajectory progress.
//!
//! Status changes go through `set_status`, `set_altitude` and `set_damage`,
//! which refuse to move a crashed UFO back into the air or revive a
//! destroyed one.

use serde::{Deserialize, Serialize};

use geoscape_core::constants::TICK_SECONDS;
use geoscape_core::enums::{UfoAltitude, UfoSize, UfoStatus};
use geoscape_core::error::{GeoscapeError, Result};
use geoscape_core::rules::RuleUfo;
use geoscape_core::types::GeoPoint;

use crate::motion::Motion;

/// Interception bookkeeping. Owned by the dogfight collaborator; the
/// Geoscape only stores and persists it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dogfight {
    pub fire_countdown: u32,
    pub escape_countdown: u32,
    /// Already processed by a dogfight this tick.
    pub engaged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ufo {
    pub id: u32,
    /// `RuleUfo` id.
    pub rule: String,
    pub size: UfoSize,
    pub max_speed: u32,
    pub max_damage: u32,
    pub mission_id: u32,
    /// `UfoTrajectory` id.
    pub trajectory: String,
    pub trajectory_point: usize,
    status: UfoStatus,
    altitude: UfoAltitude,
    damage: u32,
    pub detected: bool,
    pub hyper_detected: bool,
    /// Ground timer (landed) or crash-site lifetime (crashed).
    pub seconds_remaining: u32,
    pub land_id: Option<u32>,
    pub crash_id: Option<u32>,
    pub shot_down_by: Option<u32>,
    pub in_battlescape: bool,
    #[serde(default)]
    pub dogfight: Dogfight,
}

impl Ufo {
    pub fn new(id: u32, rule: &RuleUfo, mission_id: u32, trajectory: &str) -> Self {
        Self {
            id,
            rule: rule.id.clone(),
            size: rule.size,
            max_speed: rule.max_speed,
            max_damage: rule.max_damage,
            mission_id,
            trajectory: trajectory.to_string(),
            trajectory_point: 0,
            status: UfoStatus::Flying,
            altitude: UfoAltitude::default(),
            damage: 0,
            detected: false,
            hyper_detected: false,
            seconds_remaining: 0,
            land_id: None,
            crash_id: None,
            shot_down_by: None,
            in_battlescape: false,
            dogfight: Dogfight::default(),
        }
    }

    pub fn status(&self) -> UfoStatus {
        self.status
    }

    /// Move to `next`, rejecting transitions out of CRASHED or DESTROYED.
    pub fn set_status(&mut self, next: UfoStatus) -> Result<()> {
        if !self.status.can_become(next) {
            return Err(GeoscapeError::InvalidTransition(format!(
                "ufo {} cannot go from {:?} to {:?}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    pub fn altitude(&self) -> UfoAltitude {
        self.altitude
    }

    /// Set the altitude; the status follows it (GROUND means landed, anything
    /// else flying) unless the UFO is already crashed or destroyed.
    pub fn set_altitude(&mut self, altitude: UfoAltitude) {
        self.altitude = altitude;
        if matches!(self.status, UfoStatus::Crashed | UfoStatus::Destroyed) {
            return;
        }
        self.status = if altitude.is_ground() {
            UfoStatus::Landed
        } else {
            UfoStatus::Flying
        };
    }

    pub fn damage(&self) -> u32 {
        self.damage
    }

    pub fn damage_percentage(&self) -> u32 {
        if self.max_damage == 0 {
            return 100;
        }
        ((self.damage as f64 / self.max_damage as f64) * 100.0).round() as u32
    }

    pub fn is_crashed(&self) -> bool {
        self.damage >= self.max_damage / 2
    }

    pub fn is_destroyed(&self) -> bool {
        self.damage >= self.max_damage
    }

    /// Set hull damage, crashing at half and destroying at full damage.
    pub fn set_damage(&mut self, damage: u32) {
        self.damage = damage;
        if self.is_destroyed() {
            self.status = UfoStatus::Destroyed;
        } else if self.is_crashed() && self.status != UfoStatus::Destroyed {
            self.status = UfoStatus::Crashed;
        }
    }

    /// Detection chance modifier from size and altitude.
    pub fn visibility(&self) -> i32 {
        let size = match self.size {
            UfoSize::VerySmall => -30,
            UfoSize::Small => -15,
            UfoSize::Medium => 0,
            UfoSize::Large => 15,
            UfoSize::VeryLarge => 30,
        };
        let altitude = match self.altitude {
            UfoAltitude::Ground => -50,
            UfoAltitude::VeryLow => -20,
            UfoAltitude::Low => -10,
            UfoAltitude::High => 0,
            UfoAltitude::VeryHigh => -10,
        };
        size + altitude
    }

    /// Modifier to this UFO's own chance of spotting player targets.
    pub fn detectors(&self) -> i32 {
        let size = match self.size {
            UfoSize::VerySmall => -12,
            UfoSize::Small => -8,
            UfoSize::Medium => 0,
            UfoSize::Large => 8,
            UfoSize::VeryLarge => 12,
        };
        let altitude = match self.altitude {
            UfoAltitude::Ground => -30,
            UfoAltitude::VeryLow => 10,
            UfoAltitude::Low => 20,
            UfoAltitude::High => 0,
            UfoAltitude::VeryHigh => -10,
        };
        size + altitude
    }

    /// Advance one tick.
    ///
    /// Flying UFOs move and stop dead on arrival; landed and crashed UFOs
    /// run down their timer. A crash site is always visible.
    pub fn think(&mut self, pos: &mut GeoPoint, motion: &mut Motion) {
        match self.status {
            UfoStatus::Flying => {
                motion.step(pos);
                if motion.reached(*pos) {
                    motion.set_speed(*pos, 0);
                }
            }
            UfoStatus::Landed => {
                self.seconds_remaining = self.seconds_remaining.saturating_sub(TICK_SECONDS);
            }
            UfoStatus::Crashed => {
                self.detected = true;
                self.seconds_remaining = self.seconds_remaining.saturating_sub(TICK_SECONDS);
            }
            UfoStatus::Destroyed => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoscape_core::types::Waypoint;

    fn scout() -> Ufo {
        let rule = RuleUfo {
            id: "STR_SMALL_SCOUT".into(),
            size: UfoSize::VerySmall,
            max_speed: 2200,
            max_damage: 50,
            score: 50,
        };
        Ufo::new(1, &rule, 7, "P0")
    }

    #[test]
    fn test_damage_thresholds() {
        let mut ufo = scout();
        ufo.set_damage(24);
        assert_eq!(ufo.status(), UfoStatus::Flying);
        ufo.set_damage(25);
        assert_eq!(ufo.status(), UfoStatus::Crashed, "half damage crashes");
        assert_eq!(ufo.damage_percentage(), 50);
        ufo.set_damage(50);
        assert_eq!(ufo.status(), UfoStatus::Destroyed);
    }

    #[test]
    fn test_altitude_drives_status() {
        let mut ufo = scout();
        ufo.set_altitude(UfoAltitude::Ground);
        assert_eq!(ufo.status(), UfoStatus::Landed);
        ufo.set_altitude(UfoAltitude::VeryLow);
        assert_eq!(ufo.status(), UfoStatus::Flying);
    }

    #[test]
    fn test_crashed_never_flies_again() {
        let mut ufo = scout();
        ufo.set_damage(30);
        ufo.set_altitude(UfoAltitude::High);
        assert_eq!(ufo.status(), UfoStatus::Crashed);
        assert!(ufo.set_status(UfoStatus::Flying).is_err());
        assert!(ufo.set_status(UfoStatus::Landed).is_err());
        assert!(ufo.set_status(UfoStatus::Destroyed).is_ok());
        ufo.set_altitude(UfoAltitude::Ground);
        assert_eq!(ufo.status(), UfoStatus::Destroyed);
        assert!(ufo.set_status(UfoStatus::Crashed).is_err());
    }

    #[test]
    fn test_visibility_modifiers() {
        let mut ufo = scout();
        ufo.set_altitude(UfoAltitude::VeryHigh);
        assert_eq!(ufo.visibility(), -40);
        ufo.set_altitude(UfoAltitude::Low);
        assert_eq!(ufo.detectors(), 8);
    }

    #[test]
    fn test_think_counts_down_on_ground() {
        let mut ufo = scout();
        let mut pos = GeoPoint::default();
        let mut motion = Motion::new(0);
        ufo.set_altitude(UfoAltitude::Ground);
        ufo.seconds_remaining = 12;
        ufo.think(&mut pos, &mut motion);
        assert_eq!(ufo.seconds_remaining, 7);
        ufo.think(&mut pos, &mut motion);
        ufo.think(&mut pos, &mut motion);
        assert_eq!(ufo.seconds_remaining, 0, "saturates at zero");
    }

    #[test]
    fn test_think_stops_on_arrival() {
        let mut ufo = scout();
        let mut pos = GeoPoint::from_degrees(0.0, 0.0);
        let mut motion = Motion::new(2200);
        let wp = Waypoint {
            id: 1,
            position: GeoPoint::from_degrees(0.1, 0.0),
        };
        motion.set_waypoint(pos, wp);
        for _ in 0..10 {
            ufo.think(&mut pos, &mut motion);
        }
        assert!(motion.reached(pos));
        assert_eq!(motion.speed(), 0, "speed zeroed on arrival");
    }

    #[test]
    fn test_crash_site_becomes_visible() {
        let mut ufo = scout();
        ufo.set_damage(40);
        let mut pos = GeoPoint::default();
        let mut motion = Motion::new(0);
        ufo.think(&mut pos, &mut motion);
        assert!(ufo.detected);
    }
}
