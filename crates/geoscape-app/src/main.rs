//! Headless Geoscape runner.
//!
//! Starts or loads a campaign, advances it a number of days and prints a
//! month-end style report. Logging goes to stderr and is filtered with
//! `RUST_LOG` (default `info`).

mod report;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use geoscape_core::constants::{SECONDS_PER_DAY, TICK_SECONDS};
use geoscape_core::enums::Difficulty;
use geoscape_core::rules::Ruleset;
use geoscape_sim::{GeoscapeEngine, SimConfig};

/// Run the Geoscape without a frontend.
#[derive(Parser, Debug)]
#[command(name = "geoscape", version, about, long_about = None)]
struct Args {
    /// Ruleset JSON file (built-in standard rules when omitted)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Resume from a save file instead of starting a new campaign
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write the campaign here when the run ends
    #[arg(long)]
    save: Option<PathBuf>,

    /// Days to simulate
    #[arg(long, default_value_t = 30)]
    days: u64,

    /// Seed for a new campaign
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Difficulty level for a new campaign, 0 (Beginner) to 4 (Superhuman)
    #[arg(long, default_value_t = 0)]
    difficulty: u32,

    /// Print every event as a JSON line on stdout
    #[arg(long)]
    events: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let rules = load_rules(&args)?;
    let mut engine = match &args.load {
        Some(path) => GeoscapeEngine::load_file(rules, path)
            .with_context(|| format!("loading save {}", path.display()))?,
        None => {
            if args.difficulty > 4 {
                bail!("difficulty must be between 0 and 4, got {}", args.difficulty);
            }
            let config = SimConfig {
                seed: args.seed,
                difficulty: Difficulty::from_level(args.difficulty),
                ..Default::default()
            };
            GeoscapeEngine::new(rules, config).context("starting campaign")?
        }
    };

    let ticks_per_day = SECONDS_PER_DAY / TICK_SECONDS as u64;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut tally = report::EventTally::default();
    for day in 0..args.days {
        let events = engine.advance(ticks_per_day);
        tally.add(&events);
        if args.events {
            for event in &events {
                writeln!(out, "{}", serde_json::to_string(event)?)?;
            }
        }
        info!(day = day + 1, events = events.len(), "day simulated");
    }

    write!(out, "{}", report::render(&engine.snapshot(), &tally))?;

    if let Some(path) = &args.save {
        engine
            .save_file(path)
            .with_context(|| format!("writing save {}", path.display()))?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_rules(args: &Args) -> Result<Ruleset> {
    let rules = match &args.rules {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("reading rules {}", path.display()))?;
            Ruleset::from_json(&json).with_context(|| format!("parsing rules {}", path.display()))?
        }
        None => Ruleset::standard().context("built-in ruleset")?,
    };
    Ok(rules)
}
