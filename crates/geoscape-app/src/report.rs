//! Plain-text campaign summary.

use std::fmt::Write;

use geoscape_core::events::GeoscapeEvent;
use geoscape_core::state::GeoscapeSnapshot;

/// Counts of the events worth summarising over a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventTally {
    pub missions_started: usize,
    pub missions_finished: usize,
    pub ufos_spawned: usize,
    pub ufos_detected: usize,
    pub terror_sites: usize,
    pub alien_bases: usize,
    pub pacts: usize,
    pub months: usize,
}

impl EventTally {
    pub fn add(&mut self, events: &[GeoscapeEvent]) {
        for event in events {
            match event {
                GeoscapeEvent::MissionStarted { .. } => self.missions_started += 1,
                GeoscapeEvent::MissionFinished { .. } => self.missions_finished += 1,
                GeoscapeEvent::UfoSpawned { .. } => self.ufos_spawned += 1,
                GeoscapeEvent::UfoDetected { .. } => self.ufos_detected += 1,
                GeoscapeEvent::MissionSiteCreated { .. } => self.terror_sites += 1,
                GeoscapeEvent::AlienBaseBuilt { .. } => self.alien_bases += 1,
                GeoscapeEvent::PactSigned { .. } => self.pacts += 1,
                GeoscapeEvent::MonthEnded { .. } => self.months += 1,
                _ => {}
            }
        }
    }
}

pub fn render(snap: &GeoscapeSnapshot, tally: &EventTally) -> String {
    let mut s = String::new();
    let t = snap.time;
    let _ = writeln!(
        s,
        "Month {} day {} {:02}:{:02}  ({:?})",
        t.month() + 1,
        t.day() + 1,
        t.hour(),
        t.minute(),
        snap.difficulty
    );
    let _ = writeln!(
        s,
        "missions {} started / {} finished, ufos {} spawned / {} detected, terror sites {}, alien bases {}, pacts {}",
        tally.missions_started,
        tally.missions_finished,
        tally.ufos_spawned,
        tally.ufos_detected,
        tally.terror_sites,
        tally.alien_bases,
        tally.pacts
    );

    let _ = writeln!(s, "\nActive missions");
    for m in &snap.missions {
        let _ = writeln!(
            s,
            "  #{:<3} {:<24} {:<16} {:<12} wave {}/{} live {}",
            m.id, m.rule, m.region, m.race, m.next_wave, m.wave_count, m.live_ufos
        );
    }

    let _ = writeln!(s, "\nRegions (xcom / alien)");
    for r in &snap.regions {
        let _ = writeln!(s, "  {:<20} {:>6} {:>6}", r.id, r.xcom_activity, r.alien_activity);
    }

    let _ = writeln!(s, "\nCountries");
    for c in &snap.countries {
        let _ = writeln!(
            s,
            "  {:<12} {:>10} {:?}{}",
            c.id,
            c.funding,
            c.satisfaction,
            if c.pact { " (pact)" } else { "" }
        );
    }
    s
}
