//! Per-region monthly activity.

use serde::{Deserialize, Serialize};

use geoscape_core::constants::{HISTORY_MONTHS, RECENT_ACTIVITY_HOURS};

/// Activity meters for one region. The last history entry is the current month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// `RuleRegion` id.
    pub rule: String,
    activity_xcom: Vec<i32>,
    activity_alien: Vec<i32>,
    /// Hours since the last X-COM / alien activity, while the blink is lit.
    recent_xcom: Option<u32>,
    recent_alien: Option<u32>,
}

impl Region {
    pub fn new(rule: &str) -> Self {
        Self {
            rule: rule.to_string(),
            activity_xcom: vec![0],
            activity_alien: vec![0],
            recent_xcom: None,
            recent_alien: None,
        }
    }

    pub fn activity_xcom(&self) -> &[i32] {
        &self.activity_xcom
    }

    pub fn activity_alien(&self) -> &[i32] {
        &self.activity_alien
    }

    pub fn current_xcom(&self) -> i32 {
        self.activity_xcom.last().copied().unwrap_or(0)
    }

    pub fn current_alien(&self) -> i32 {
        self.activity_alien.last().copied().unwrap_or(0)
    }

    pub fn add_activity_xcom(&mut self, points: i32) {
        add_current(&mut self.activity_xcom, points);
        self.recent_xcom = Some(0);
    }

    pub fn add_activity_alien(&mut self, points: i32) {
        add_current(&mut self.activity_alien, points);
        self.recent_alien = Some(0);
    }

    pub fn recent_activity_xcom(&self) -> bool {
        self.recent_xcom.is_some()
    }

    pub fn recent_activity_alien(&self) -> bool {
        self.recent_alien.is_some()
    }

    /// Hourly: age the activity blinks, switching them off after a day.
    pub fn age_recent_activity(&mut self) {
        age_blink(&mut self.recent_xcom);
        age_blink(&mut self.recent_alien);
    }

    /// Close the month: open a fresh entry and drop history beyond a year.
    pub fn new_month(&mut self) {
        push_capped(&mut self.activity_xcom, 0);
        push_capped(&mut self.activity_alien, 0);
    }
}

pub(crate) fn add_current(history: &mut Vec<i32>, points: i32) {
    match history.last_mut() {
        Some(last) => *last += points,
        None => history.push(points),
    }
}

pub(crate) fn push_capped<T>(history: &mut Vec<T>, value: T) {
    history.push(value);
    if history.len() > HISTORY_MONTHS {
        let excess = history.len() - HISTORY_MONTHS;
        history.drain(..excess);
    }
}

pub(crate) fn age_blink(counter: &mut Option<u32>) {
    if let Some(hours) = counter {
        *hours += 1;
        if *hours > RECENT_ACTIVITY_HOURS {
            *counter = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_caps_at_twelve() {
        let mut region = Region::new("STR_EUROPE");
        for month in 0..13 {
            region.add_activity_alien(month + 1);
            region.new_month();
        }
        assert_eq!(region.activity_alien().len(), 12);
        assert_eq!(region.activity_xcom().len(), 12);
        // 14 entries were produced; the first two (1 and 2) were evicted.
        assert_eq!(region.activity_alien()[0], 3);
        assert_eq!(region.current_alien(), 0);
    }

    #[test]
    fn test_blink_expires_after_a_day() {
        let mut region = Region::new("STR_ASIA");
        region.add_activity_alien(5);
        assert!(region.recent_activity_alien());
        for _ in 0..RECENT_ACTIVITY_HOURS {
            region.age_recent_activity();
        }
        assert!(region.recent_activity_alien());
        region.age_recent_activity();
        assert!(!region.recent_activity_alien());
        assert!(!region.recent_activity_xcom());
    }
}
