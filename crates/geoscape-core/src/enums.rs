//! Enumeration types used throughout the simulation.
//!
//! Ruleset string IDs (`STR_...`) only appear here, at the serde boundary.

use serde::{Deserialize, Serialize};

/// UFO lifecycle status. `Destroyed` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UfoStatus {
    #[default]
    Flying,
    Landed,
    Crashed,
    Destroyed,
}

impl UfoStatus {
    /// Whether moving from `self` to `next` is allowed.
    ///
    /// Destroyed never changes; Crashed can only become Destroyed.
    pub fn can_become(self, next: UfoStatus) -> bool {
        match self {
            UfoStatus::Destroyed => next == UfoStatus::Destroyed,
            UfoStatus::Crashed => matches!(next, UfoStatus::Crashed | UfoStatus::Destroyed),
            UfoStatus::Flying | UfoStatus::Landed => true,
        }
    }
}

/// Categorical flight altitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UfoAltitude {
    #[serde(rename = "STR_GROUND")]
    Ground,
    #[serde(rename = "STR_VERY_LOW")]
    VeryLow,
    #[serde(rename = "STR_LOW_UC")]
    Low,
    #[default]
    #[serde(rename = "STR_HIGH_UC")]
    High,
    #[serde(rename = "STR_VERY_HIGH")]
    VeryHigh,
}

impl UfoAltitude {
    pub fn is_ground(self) -> bool {
        self == UfoAltitude::Ground
    }

    pub fn as_rule_str(self) -> &'static str {
        match self {
            UfoAltitude::Ground => "STR_GROUND",
            UfoAltitude::VeryLow => "STR_VERY_LOW",
            UfoAltitude::Low => "STR_LOW_UC",
            UfoAltitude::High => "STR_HIGH_UC",
            UfoAltitude::VeryHigh => "STR_VERY_HIGH",
        }
    }
}

/// Hull size category of a UFO.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UfoSize {
    #[serde(rename = "STR_VERY_SMALL")]
    VerySmall,
    #[serde(rename = "STR_SMALL")]
    Small,
    #[default]
    #[serde(rename = "STR_MEDIUM_UC")]
    Medium,
    #[serde(rename = "STR_LARGE")]
    Large,
    #[serde(rename = "STR_VERY_LARGE")]
    VeryLarge,
}

/// Alien mission archetype. Drives the special branches of the mission engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MissionKind {
    #[serde(rename = "STR_ALIEN_RESEARCH")]
    Research,
    #[serde(rename = "STR_ALIEN_HARVEST")]
    Harvest,
    #[serde(rename = "STR_ALIEN_ABDUCTION")]
    Abduction,
    #[serde(rename = "STR_ALIEN_INFILTRATION")]
    Infiltration,
    #[serde(rename = "STR_ALIEN_BASE")]
    Base,
    #[serde(rename = "STR_ALIEN_TERROR")]
    Terror,
    #[serde(rename = "STR_ALIEN_RETALIATION")]
    Retaliation,
    #[serde(rename = "STR_ALIEN_SUPPLY")]
    Supply,
}

/// Closed set of target variants living on the globe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetKind {
    Waypoint,
    Ufo,
    Base,
    AlienBase,
    MissionSite,
    Craft,
}

impl TargetKind {
    /// Globe marker sprite index for the target kind.
    pub fn marker(self) -> i32 {
        match self {
            TargetKind::Base => 0,
            TargetKind::Craft => 1,
            TargetKind::Ufo => 2,
            TargetKind::MissionSite => 5,
            TargetKind::Waypoint => 6,
            TargetKind::AlienBase => 7,
        }
    }
}

/// Player craft status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CraftStatus {
    #[default]
    Ready,
    Out,
    Returning,
}

/// Campaign difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Beginner,
    Experienced,
    Veteran,
    Genius,
    Superhuman,
}

impl Difficulty {
    /// Numeric level, 0 for Beginner up to 4 for Superhuman.
    pub fn level(self) -> u32 {
        match self {
            Difficulty::Beginner => 0,
            Difficulty::Experienced => 1,
            Difficulty::Veteran => 2,
            Difficulty::Genius => 3,
            Difficulty::Superhuman => 4,
        }
    }

    pub fn from_level(level: u32) -> Self {
        match level {
            0 => Difficulty::Beginner,
            1 => Difficulty::Experienced,
            2 => Difficulty::Veteran,
            3 => Difficulty::Genius,
            _ => Difficulty::Superhuman,
        }
    }
}

/// Month-end country mood, ordered from worst to best.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Satisfaction {
    /// Signed a pact with the aliens.
    Pact,
    /// Funding cut.
    Unhappy,
    /// Funding unchanged.
    #[default]
    Satisfied,
    /// Funding raised.
    Happy,
}

impl Satisfaction {
    pub fn level(self) -> u8 {
        match self {
            Satisfaction::Pact => 0,
            Satisfaction::Unhappy => 1,
            Satisfaction::Satisfied => 2,
            Satisfaction::Happy => 3,
        }
    }
}
