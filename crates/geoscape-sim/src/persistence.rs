//! Save and load: the campaign as one serde document.
//!
//! Entities are written per kind with their position (and motion, for
//! movers) next to the component. Cross-references are checked on load
//! and any dangling one fails the whole load with `CorruptedSave`.

use std::collections::HashSet;
use std::path::Path;

use hecs::{Component, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use geoscape_core::enums::Difficulty;
use geoscape_core::error::{GeoscapeError, Result};
use geoscape_core::rules::Ruleset;
use geoscape_core::types::{GameTime, GeoPoint};

use crate::mission::{AlienMission, MissionSave};
use crate::motion::Motion;
use crate::saved_game::{IdCounters, SavedGame};
use crate::scoring::{Country, Region};
use crate::targets::{AlienBase, Base, Craft, Identified, MissionSite};
use crate::ufo::Ufo;

pub const SAVE_VERSION: u32 = 1;

/// A target that never moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Located<T> {
    pub position: GeoPoint,
    #[serde(flatten)]
    pub state: T,
}

/// A target with a destination and speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moving<T> {
    pub position: GeoPoint,
    pub motion: Motion,
    #[serde(flatten)]
    pub state: T,
}

/// Exact position of the rng stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: [u8; 32],
    pub stream: u64,
    pub word_pos: u128,
}

impl RngState {
    pub fn capture(rng: &ChaCha8Rng) -> Self {
        Self {
            seed: rng.get_seed(),
            stream: rng.get_stream(),
            word_pos: rng.get_word_pos(),
        }
    }

    pub fn restore(&self) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::from_seed(self.seed);
        rng.set_stream(self.stream);
        rng.set_word_pos(self.word_pos);
        rng
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub time: GameTime,
    pub difficulty: Difficulty,
    pub rng: RngState,
    pub ids: IdCounters,
    pub missions: Vec<MissionSave>,
    pub regions: Vec<Region>,
    pub countries: Vec<Country>,
    pub ufos: Vec<Moving<Ufo>>,
    pub crafts: Vec<Moving<Craft>>,
    pub alien_bases: Vec<Located<AlienBase>>,
    pub mission_sites: Vec<Located<MissionSite>>,
    pub bases: Vec<Located<Base>>,
}

fn located<T: Identified + Component + Clone>(world: &World) -> Vec<Located<T>> {
    let mut out: Vec<Located<T>> = world
        .query::<(&GeoPoint, &T)>()
        .iter()
        .map(|(_, (p, t))| Located {
            position: *p,
            state: t.clone(),
        })
        .collect();
    out.sort_by_key(|l| l.state.id());
    out
}

fn moving<T: Identified + Component + Clone>(world: &World) -> Vec<Moving<T>> {
    let mut out: Vec<Moving<T>> = world
        .query::<(&GeoPoint, &Motion, &T)>()
        .iter()
        .map(|(_, (p, m, t))| Moving {
            position: *p,
            motion: m.clone(),
            state: t.clone(),
        })
        .collect();
    out.sort_by_key(|m| m.state.id());
    out
}

fn corrupted<T>(msg: String) -> Result<T> {
    Err(GeoscapeError::CorruptedSave(msg))
}

impl SaveData {
    /// Capture the campaign and the rng.
    pub fn from_game(game: &SavedGame, rng: &ChaCha8Rng) -> Result<Self> {
        let missions = game
            .missions
            .iter()
            .map(AlienMission::save)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            version: SAVE_VERSION,
            time: game.time,
            difficulty: game.difficulty,
            rng: RngState::capture(rng),
            ids: game.ids.clone(),
            missions,
            regions: game.regions.clone(),
            countries: game.countries.clone(),
            ufos: moving::<Ufo>(&game.world),
            crafts: moving::<Craft>(&game.world),
            alien_bases: located::<AlienBase>(&game.world),
            mission_sites: located::<MissionSite>(&game.world),
            bases: located::<Base>(&game.world),
        })
    }

    /// Rebuild the campaign, checking every reference against `rules` and
    /// the other saved objects.
    pub fn into_game(self, rules: &Ruleset) -> Result<(SavedGame, ChaCha8Rng)> {
        if self.version != SAVE_VERSION {
            return corrupted(format!("unsupported save version {}", self.version));
        }
        for region in &self.regions {
            if rules.region(&region.rule).is_err() {
                return corrupted(format!("unknown region {}", region.rule));
            }
        }
        for country in &self.countries {
            if rules.country(&country.rule).is_err() {
                return corrupted(format!("unknown country {}", country.rule));
            }
        }

        let alien_base_ids: HashSet<u32> = self.alien_bases.iter().map(|b| b.state.id).collect();
        let missions = self
            .missions
            .into_iter()
            .map(|m| AlienMission::load(m, rules, |id| alien_base_ids.contains(&id)))
            .collect::<Result<Vec<_>>>()?;
        let mission_ids: HashSet<u32> = missions.iter().filter_map(|m| m.id().ok()).collect();
        let base_ids: HashSet<u32> = self.bases.iter().map(|b| b.state.id).collect();

        let mut world = World::new();
        for ufo in self.ufos {
            if !mission_ids.contains(&ufo.state.mission_id) {
                return corrupted(format!("ufo {} belongs to missing mission {}", ufo.state.id, ufo.state.mission_id));
            }
            if rules.trajectory(&ufo.state.trajectory).is_err() {
                return corrupted(format!("ufo {} flies unknown trajectory {}", ufo.state.id, ufo.state.trajectory));
            }
            world.spawn((ufo.position, ufo.motion, ufo.state));
        }
        for craft in self.crafts {
            if !base_ids.contains(&craft.state.base_id) {
                return corrupted(format!("craft {} belongs to missing base {}", craft.state.id, craft.state.base_id));
            }
            world.spawn((craft.position, craft.motion, craft.state));
        }
        for base in self.alien_bases {
            world.spawn((base.position, base.state));
        }
        for site in self.mission_sites {
            world.spawn((site.position, site.state));
        }
        for base in self.bases {
            world.spawn((base.position, base.state));
        }

        let game = SavedGame {
            time: self.time,
            difficulty: self.difficulty,
            world,
            missions,
            regions: self.regions,
            countries: self.countries,
            ids: self.ids,
        };
        Ok((game, self.rng.restore()))
    }
}

pub fn save_to_file(path: &Path, data: &SaveData) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), "game saved");
    Ok(())
}

pub fn load_from_file(path: &Path) -> Result<SaveData> {
    let json = std::fs::read_to_string(path)?;
    let data = serde_json::from_str(&json)?;
    info!(path = %path.display(), "save read");
    Ok(data)
}
