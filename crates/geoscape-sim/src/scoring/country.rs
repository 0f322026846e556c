//! Per-country activity, funding and the month-end settlement.

use rand::Rng;
use serde::{Deserialize, Serialize};

use geoscape_core::constants::*;
use geoscape_core::enums::{Difficulty, Satisfaction};
use geoscape_core::rules::RuleCountry;

use super::region::{add_current, age_blink, push_capped};

/// Outcome of one month-end settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub satisfaction: Satisfaction,
    /// Funding for the month just opened.
    pub funding: i64,
    /// The country signed a pact this month.
    pub pact_signed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    /// `RuleCountry` id.
    pub rule: String,
    funding: Vec<i64>,
    activity_xcom: Vec<i32>,
    activity_alien: Vec<i32>,
    satisfaction: Satisfaction,
    pact: bool,
    new_pact: bool,
    recent_xcom: Option<u32>,
    recent_alien: Option<u32>,
}

impl Country {
    pub fn new(rule: &RuleCountry) -> Self {
        Self {
            rule: rule.id.clone(),
            funding: vec![rule.funding_base],
            activity_xcom: vec![0],
            activity_alien: vec![0],
            satisfaction: Satisfaction::Satisfied,
            pact: false,
            new_pact: false,
            recent_xcom: None,
            recent_alien: None,
        }
    }

    pub fn funding(&self) -> &[i64] {
        &self.funding
    }

    pub fn current_funding(&self) -> i64 {
        self.funding.last().copied().unwrap_or(0)
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

    pub fn satisfaction(&self) -> Satisfaction {
        self.satisfaction
    }

    pub fn pact(&self) -> bool {
        self.pact
    }

    pub fn new_pact(&self) -> bool {
        self.new_pact
    }

    /// Mark the country as about to sign with the aliens at month end.
    pub fn set_new_pact(&mut self) {
        self.new_pact = true;
    }

    pub fn add_activity_xcom(&mut self, points: i32) {
        add_current(&mut self.activity_xcom, points);
        self.recent_xcom = Some(0);
    }

    pub fn add_activity_alien(&mut self, points: i32) {
        add_current(&mut self.activity_alien, points);
        self.recent_alien = Some(0);
    }

    pub fn recent_activity_alien(&self) -> bool {
        self.recent_alien.is_some()
    }

    pub fn age_recent_activity(&mut self) {
        age_blink(&mut self.recent_xcom);
        age_blink(&mut self.recent_alien);
    }

    /// Month-end settlement.
    ///
    /// Compares this month's X-COM and alien showing (plus a share of the
    /// global totals) and moves funding by 5-20% when one side clearly leads.
    /// A pending pact is signed here, after which funding stays at zero.
    pub fn new_month<R: Rng>(
        &mut self,
        rule: &RuleCountry,
        xcom_total: i32,
        alien_total: i32,
        pact_score: i32,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Settlement {
        self.satisfaction = Satisfaction::Satisfied;
        let funding = self.current_funding();
        let good = xcom_total / XCOM_TOTAL_DIVISOR + self.current_xcom();
        let bad = alien_total / ALIEN_TOTAL_DIVISOR + self.current_alien();
        let happy_margin = SATISFACTION_MARGIN + SATISFACTION_MARGIN_PER_LEVEL * difficulty.level() as i32;

        let mut change = (funding / 1000)
            * rng.gen_range(FUNDING_CHANGE_MIN_PERCENT..=FUNDING_CHANGE_MAX_PERCENT)
            / 100
            * 1000;

        if bad <= good + SATISFACTION_MARGIN {
            if good > bad + happy_margin && rng.gen_range(0..=good.max(0)) > bad {
                let cap = rule.funding_cap * 1000;
                if funding + change > cap {
                    change = (cap - funding).max(0);
                }
                if change != 0 {
                    self.satisfaction = Satisfaction::Happy;
                }
            }
        } else if rng.gen_range(0..=bad.max(0)) > good && change != 0 {
            change = -change;
            if funding + change < 0 {
                change = -funding;
            }
            if change != 0 {
                self.satisfaction = Satisfaction::Unhappy;
            }
        }

        let mut pact_signed = false;
        if self.new_pact && !self.pact {
            self.new_pact = false;
            self.pact = true;
            pact_signed = true;
            self.add_activity_alien(pact_score);
        }

        let next_funding = if self.pact {
            self.satisfaction = Satisfaction::Pact;
            0
        } else if self.satisfaction != Satisfaction::Satisfied {
            funding + change
        } else {
            funding
        };

        push_capped(&mut self.funding, next_funding);
        push_capped(&mut self.activity_xcom, 0);
        push_capped(&mut self.activity_alien, 0);

        Settlement {
            satisfaction: self.satisfaction,
            funding: next_funding,
            pact_signed,
        }
    }
}
