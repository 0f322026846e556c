//! Geoscape engine, the tick driver.
//!
//! `GeoscapeEngine` owns the campaign, the ruleset, the globe and the rng.
//! It applies queued commands, runs every system in order and produces
//! `GeoscapeSnapshot`s. Completely headless; every random draw comes from
//! one seeded `ChaCha8Rng`, so a seed fixes the whole campaign.

use std::collections::VecDeque;
use std::path::Path;

use hecs::Entity;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use geoscape_core::commands::GeoscapeCommand;
use geoscape_core::constants::*;
use geoscape_core::enums::{CraftStatus, Difficulty, MissionKind, UfoAltitude, UfoStatus};
use geoscape_core::error::{GeoscapeError, Result};
use geoscape_core::events::GeoscapeEvent;
use geoscape_core::rules::Ruleset;
use geoscape_core::state::GeoscapeSnapshot;
use geoscape_core::types::{Destination, GameTime, GeoPoint, Waypoint};
use geoscape_globe::Globe;

use crate::mission::AlienMission;
use crate::motion::Motion;
use crate::persistence::{self, SaveData};
use crate::saved_game::{IdKind, MissionContext, SavedGame};
use crate::scoring::Side;
use crate::systems;
use crate::targets::{find, target_position, AlienBase, Base, Craft};
use crate::ufo::Ufo;
use crate::world_setup::{self, BaseSpec};

/// Configuration for starting a new campaign.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same campaign.
    pub seed: u64,
    pub difficulty: Difficulty,
    pub start_time: GameTime,
    /// Run the monthly mission plan once at start-up.
    pub plan_first_month: bool,
    /// Build the default first base.
    pub starting_base: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            difficulty: Difficulty::Beginner,
            start_time: GameTime::default(),
            plan_first_month: true,
            starting_base: true,
        }
    }
}

pub struct GeoscapeEngine {
    rules: Ruleset,
    globe: Globe,
    game: SavedGame,
    rng: ChaCha8Rng,
    command_queue: VecDeque<GeoscapeCommand>,
    despawn_buffer: Vec<Entity>,
    events: Vec<GeoscapeEvent>,
}

impl GeoscapeEngine {
    /// Start a new campaign. The ruleset is validated first.
    pub fn new(rules: Ruleset, config: SimConfig) -> Result<Self> {
        rules.validate()?;
        let globe = Globe::from_rules(&rules);
        let mut game = SavedGame::new(&rules, config.difficulty, config.start_time);
        if config.starting_base {
            world_setup::spawn_base(&mut game.world, &mut game.ids, &BaseSpec::starting());
        }
        let mut engine = Self {
            rules,
            globe,
            game,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
        };
        if config.plan_first_month {
            engine.plan_month();
        }
        info!(seed = config.seed, difficulty = ?config.difficulty, "campaign started");
        Ok(engine)
    }

    /// Resume a saved campaign.
    pub fn from_save(rules: Ruleset, data: SaveData) -> Result<Self> {
        rules.validate()?;
        let globe = Globe::from_rules(&rules);
        let (game, rng) = data.into_game(&rules)?;
        info!(missions = game.missions.len(), time = game.time.seconds, "campaign loaded");
        Ok(Self {
            rules,
            globe,
            game,
            rng,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
        })
    }

    pub fn load_file(rules: Ruleset, path: &Path) -> Result<Self> {
        Self::from_save(rules, persistence::load_from_file(path)?)
    }

    pub fn save(&self) -> Result<SaveData> {
        SaveData::from_game(&self.game, &self.rng)
    }

    pub fn save_file(&self, path: &Path) -> Result<()> {
        persistence::save_to_file(path, &self.save()?)
    }

    pub fn game(&self) -> &SavedGame {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut SavedGame {
        &mut self.game
    }

    pub fn rules(&self) -> &Ruleset {
        &self.rules
    }

    pub fn globe(&self) -> &Globe {
        &self.globe
    }

    pub fn time(&self) -> GameTime {
        self.game.time
    }

    /// The mission list plus a context over the rest of the campaign, for
    /// collaborators (dogfights, ground combat) that drive missions directly.
    pub fn context(&mut self) -> (&mut Vec<AlienMission>, MissionContext<'_>) {
        self.game.split(&self.rules, &self.globe, &mut self.rng, &mut self.events)
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: GeoscapeCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = GeoscapeCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> GeoscapeSnapshot {
        self.step();
        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.game, events)
    }

    /// Advance `ticks` ticks without building snapshots. Returns the events.
    pub fn advance(&mut self, ticks: u64) -> Vec<GeoscapeEvent> {
        for _ in 0..ticks {
            self.step();
        }
        std::mem::take(&mut self.events)
    }

    /// Snapshot of the current state, without events.
    pub fn snapshot(&self) -> GeoscapeSnapshot {
        systems::snapshot::build_snapshot(&self.game, Vec::new())
    }

    fn step(&mut self) {
        self.process_commands();
        self.run_systems();
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        // 1. Movement and ground timers
        systems::movement::refresh_targets(&mut self.game.world);
        systems::movement::run_ufos(&mut self.game.world);
        systems::movement::run_crafts(&mut self.game.world, &mut self.events);

        // 2. Trajectory progress
        let arrived = systems::trajectory::arrivals(&self.game.world);
        let expired = systems::trajectory::ground_expired(&self.game.world);
        {
            let (missions, mut ctx) = self.context();
            systems::trajectory::dispatch(missions, &mut ctx, &arrived, "waypoint", |m, ctx, e| {
                m.ufo_reached_waypoint(ctx, e)
            });
            systems::trajectory::dispatch(missions, &mut ctx, &expired, "lift-off", |m, ctx, e| {
                m.ufo_lifting(ctx, e)
            });
        }

        // 3. Mission sites
        systems::sites::run(
            &mut self.game.world,
            &mut self.game.regions,
            &mut self.game.countries,
            &self.rules,
            &mut self.events,
        );

        // 4. Calendar
        self.game.time.advance(TICK_SECONDS);
        let time = self.game.time;
        if time.is_half_hour_boundary() {
            self.half_hourly();
        }
        if time.is_hour_boundary() {
            self.hourly();
        }
        if time.is_day_boundary() {
            self.daily();
        }
        if time.is_month_boundary() {
            self.monthly();
        }

        // 5. Reap destroyed UFOs
        systems::cleanup::run(
            &mut self.game.world,
            &mut self.game.missions,
            &mut self.events,
            &mut self.despawn_buffer,
        );
    }

    fn half_hourly(&mut self) {
        let difficulty = self.game.difficulty;
        let (missions, mut ctx) = self.context();
        for mission in missions.iter_mut() {
            if let Err(err) = mission.think(&mut ctx) {
                warn!(mission_id = ?mission.id().ok(), %err, "mission step skipped");
            }
            mission.roll_infiltration_end(difficulty, ctx.rng);
        }

        let hunters: Vec<u32> = missions
            .iter()
            .filter(|m| m.kind() == MissionKind::Retaliation)
            .filter_map(|m| m.id().ok())
            .collect();
        systems::detection::run(ctx.world, ctx.rng, ctx.events);
        systems::detection::retaliation_spotting(ctx.world, &hunters, ctx.rng, ctx.events);

        let events = &mut self.events;
        self.game.missions.retain(|m| {
            if !m.is_finished() {
                return true;
            }
            let mission_id = m.id().unwrap_or_default();
            info!(mission_id, rule = %m.rule().id, region = %m.region(), "alien mission finished");
            events.push(GeoscapeEvent::MissionFinished {
                mission_id,
                rule: m.rule().id.clone(),
            });
            false
        });
    }

    fn hourly(&mut self) {
        for region in &mut self.game.regions {
            region.age_recent_activity();
        }
        for country in &mut self.game.countries {
            country.age_recent_activity();
        }
    }

    /// Each alien base may call for a supply run.
    fn daily(&mut self) {
        let Ok(supply) = self.rules.mission_of_kind(MissionKind::Supply) else {
            return;
        };
        let bases: Vec<(u32, GeoPoint, String)> = self
            .game
            .world
            .query::<(&GeoPoint, &AlienBase)>()
            .iter()
            .map(|(_, (p, b))| (b.id, *p, b.race.clone()))
            .collect();

        for (base_id, pos, race) in bases {
            if self.rng.gen_range(0..100) >= SUPPLY_MISSION_CHANCE {
                continue;
            }
            let Some(region) = self.game.region_at(&self.rules, pos) else {
                debug!(base_id, "alien base outside every region, no supply");
                continue;
            };
            let region = region.id.clone();
            match self
                .game
                .start_mission(&self.rules, &supply.id, &region, &race, 0, &mut self.rng, &mut self.events)
            {
                Ok(id) => {
                    if let Some(mission) = self.game.mission_mut(id) {
                        mission.set_alien_base(Some(base_id));
                    }
                }
                Err(err) => warn!(base_id, %err, "supply mission not started"),
            }
        }
    }

    /// Month-end: settle every region and country, then plan new missions.
    fn monthly(&mut self) {
        let xcom_total: i32 = self.game.regions.iter().map(|r| r.current_xcom()).sum();
        let alien_total: i32 = self.game.regions.iter().map(|r| r.current_alien()).sum();
        let pact_score = self
            .rules
            .mission_of_kind(MissionKind::Infiltration)
            .map(|m| m.points)
            .unwrap_or(0);

        for region in &mut self.game.regions {
            region.new_month();
        }
        let mut funding = 0;
        for country in &mut self.game.countries {
            let rule = match self.rules.country(&country.rule) {
                Ok(rule) => rule,
                Err(err) => {
                    warn!(%err, "country without a rule skipped");
                    continue;
                }
            };
            let settled = country.new_month(
                rule,
                xcom_total,
                alien_total,
                pact_score,
                self.game.difficulty,
                &mut self.rng,
            );
            funding += settled.funding;
            if settled.pact_signed {
                info!(country = %country.rule, "pact signed with the aliens");
                self.events.push(GeoscapeEvent::PactSigned {
                    country: country.rule.clone(),
                });
            }
            self.events.push(GeoscapeEvent::CountrySatisfaction {
                country: country.rule.clone(),
                satisfaction: settled.satisfaction,
            });
        }

        let month = self.game.time.month().saturating_sub(1);
        info!(month, xcom_total, alien_total, funding, "month settled");
        self.events.push(GeoscapeEvent::MonthEnded {
            month,
            xcom_score: xcom_total,
            alien_score: alien_total,
            funding,
        });
        self.plan_month();
    }

    fn plan_month(&mut self) {
        if let Err(err) = systems::planner::plan_month(&mut self.game, &self.rules, &mut self.rng, &mut self.events) {
            warn!(%err, "monthly plan failed");
        }
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(err) = self.handle_command(command.clone()) {
                warn!(?command, %err, "command rejected");
            }
        }
    }

    fn handle_command(&mut self, command: GeoscapeCommand) -> Result<()> {
        match command {
            GeoscapeCommand::StartMission { rule, region, race } => {
                let race = match race {
                    Some(race) => race,
                    None => systems::planner::pick_race(&mut self.rng, self.rules.mission(&rule)?),
                };
                self.game
                    .start_mission(&self.rules, &rule, &region, &race, 0, &mut self.rng, &mut self.events)?;
            }
            GeoscapeCommand::SetWaveCountdown { mission_id, minutes } => {
                self.game
                    .mission_mut(mission_id)
                    .ok_or(GeoscapeError::NoSuchTarget { kind: "mission", id: mission_id })?
                    .set_wave_countdown(minutes)?;
            }
            GeoscapeCommand::BuildBase {
                name,
                position,
                detection_chance,
                radar_range_nm,
                hyperwave,
            } => {
                let spec = BaseSpec {
                    name,
                    position,
                    detection_chance,
                    radar_range_nm,
                    hyperwave,
                };
                let id = world_setup::spawn_base(&mut self.game.world, &mut self.game.ids, &spec);
                info!(base_id = id, name = %spec.name, "base built");
            }
            GeoscapeCommand::LaunchCraft { craft_id, target } => {
                let target_pos = target_position(&self.game.world, target).ok_or(GeoscapeError::NoSuchTarget {
                    kind: "target",
                    id: target.id,
                })?;
                self.launch(craft_id, |here, motion| motion.set_target(here, target, target_pos))?;
            }
            GeoscapeCommand::LaunchCraftToPoint { craft_id, position } => {
                let waypoint = Waypoint {
                    id: self.game.ids.next(IdKind::Waypoint),
                    position,
                };
                self.launch(craft_id, |here, motion| motion.set_waypoint(here, waypoint))?;
            }
            GeoscapeCommand::RecallCraft { craft_id } => {
                let entity = self.craft_entity(craft_id)?;
                let base_id = self
                    .game
                    .world
                    .get::<&Craft>(entity)
                    .map(|c| c.base_id)
                    .map_err(|_| missing_craft(craft_id))?;
                systems::movement::return_to_base(&mut self.game.world, entity, base_id);
            }
            GeoscapeCommand::DamageUfo { ufo_id, damage } => self.damage_ufo(ufo_id, damage)?,
            GeoscapeCommand::SetUfoDetected { ufo_id, detected } => {
                self.with_ufo(ufo_id, |ufo| ufo.detected = detected)?;
            }
            GeoscapeCommand::SetUfoHyperDetected { ufo_id, hyper } => {
                self.with_ufo(ufo_id, |ufo| ufo.hyper_detected = hyper)?;
            }
            GeoscapeCommand::MarkRetaliationTarget { base_id } => {
                let entity = find::<Base>(&self.game.world, base_id)
                    .ok_or(GeoscapeError::NoSuchTarget { kind: "base", id: base_id })?;
                if let Ok(mut base) = self.game.world.get::<&mut Base>(entity) {
                    base.retaliation_target = true;
                }
                self.events.push(GeoscapeEvent::BaseMarkedForRetaliation { base_id });
            }
            GeoscapeCommand::AddXcomScore { position, points } => {
                let (_, mut ctx) = self.context();
                ctx.add_score(position, Side::Xcom, points);
            }
        }
        Ok(())
    }

    /// Where a craft is heading.
    pub fn craft_destination(&self, craft_id: u32) -> Option<Destination> {
        let entity = find::<Craft>(&self.game.world, craft_id)?;
        let motion = self.game.world.get::<&Motion>(entity).ok()?;
        Some(*motion.destination())
    }

    fn ufo_entity(&self, ufo_id: u32) -> Result<Entity> {
        find::<Ufo>(&self.game.world, ufo_id).ok_or_else(|| missing_ufo(ufo_id))
    }

    fn craft_entity(&self, craft_id: u32) -> Result<Entity> {
        find::<Craft>(&self.game.world, craft_id).ok_or_else(|| missing_craft(craft_id))
    }

    /// Send a ready or airborne craft out with a new destination.
    fn launch(&mut self, craft_id: u32, aim: impl FnOnce(GeoPoint, &mut Motion)) -> Result<()> {
        let entity = self.craft_entity(craft_id)?;
        let (here, motion, craft) = self
            .game
            .world
            .query_one_mut::<(&GeoPoint, &mut Motion, &mut Craft)>(entity)
            .map_err(|_| missing_craft(craft_id))?;
        aim(*here, &mut *motion);
        motion.set_speed(*here, craft.max_speed);
        craft.status = CraftStatus::Out;
        debug!(craft_id, destination = ?motion.destination(), "craft launched");
        Ok(())
    }

    fn with_ufo(&mut self, ufo_id: u32, f: impl FnOnce(&mut Ufo)) -> Result<()> {
        let entity = self.ufo_entity(ufo_id)?;
        let mut ufo = self
            .game
            .world
            .get::<&mut Ufo>(entity)
            .map_err(|_| missing_ufo(ufo_id))?;
        f(&mut ufo);
        Ok(())
    }

    /// Interception damage. A UFO brought down scores for X-COM, delays its
    /// mission and may provoke a retaliation.
    fn damage_ufo(&mut self, ufo_id: u32, damage: u32) -> Result<()> {
        let entity = self.ufo_entity(ufo_id)?;
        let (before, after, mission_id, rule) = {
            let mut ufo = self
                .game
                .world
                .get::<&mut Ufo>(entity)
                .map_err(|_| missing_ufo(ufo_id))?;
            let before = ufo.status();
            if matches!(before, UfoStatus::Crashed | UfoStatus::Destroyed) {
                return Err(GeoscapeError::InvalidTransition(format!(
                    "ufo {ufo_id} is already down ({before:?})"
                )));
            }
            let total = ufo.damage().saturating_add(damage);
            ufo.set_damage(total);
            (before, ufo.status(), ufo.mission_id, ufo.rule.clone())
        };
        if after == before {
            return Ok(());
        }

        let pos = *self
            .game
            .world
            .get::<&GeoPoint>(entity)
            .map_err(|_| missing_ufo(ufo_id))?;
        let score = self.rules.ufo(&rule).map(|r| r.score).unwrap_or(0);

        if after == UfoStatus::Crashed {
            let hours = self.rng.gen_range(CRASH_SITE_MIN_HOURS..=CRASH_SITE_MAX_HOURS);
            let crash_id = self.game.ids.next(IdKind::CrashSite);
            if let Ok((here, motion, ufo)) = self
                .game
                .world
                .query_one_mut::<(&GeoPoint, &mut Motion, &mut Ufo)>(entity)
            {
                ufo.set_altitude(UfoAltitude::Ground);
                ufo.seconds_remaining = hours * SECONDS_PER_HOUR as u32;
                ufo.crash_id = Some(crash_id);
                motion.set_speed(*here, 0);
            }
            info!(ufo_id, hours, "ufo crashed");
            self.events.push(GeoscapeEvent::UfoCrashed { ufo_id, position: pos });
        } else {
            info!(ufo_id, "ufo destroyed in the air");
        }

        let points = if after == UfoStatus::Destroyed { score * 2 } else { score };
        let difficulty = self.game.difficulty;
        let retaliation_roll = self.rng.gen_range(0..100);
        let (missions, mut ctx) = self.context();
        ctx.add_score(pos, Side::Xcom, points);

        let Some(mission) = missions.iter_mut().find(|m| m.id().ok() == Some(mission_id)) else {
            debug!(ufo_id, mission_id, "downed ufo has no mission");
            return Ok(());
        };
        mission.ufo_shot_down(&mut ctx, entity)?;
        let region = mission.region().to_string();
        let race = mission.race().to_string();
        let kind = mission.kind();

        let chance = RETALIATION_CHANCE + RETALIATION_CHANCE_PER_LEVEL * difficulty.level();
        if kind != MissionKind::Retaliation && retaliation_roll < chance {
            self.start_retaliation(&region, &race)?;
        }
        Ok(())
    }

    fn start_retaliation(&mut self, region: &str, race: &str) -> Result<()> {
        if self.game.has_active_mission(MissionKind::Retaliation, region) {
            return Ok(());
        }
        let rule = self.rules.mission_of_kind(MissionKind::Retaliation)?.id.clone();
        let id = self
            .game
            .start_mission(&self.rules, &rule, region, race, 0, &mut self.rng, &mut self.events)?;
        info!(mission_id = id, region, "aliens retaliate");
        Ok(())
    }
}

fn missing_ufo(id: u32) -> GeoscapeError {
    GeoscapeError::NoSuchTarget { kind: "ufo", id }
}

fn missing_craft(id: u32) -> GeoscapeError {
    GeoscapeError::NoSuchTarget { kind: "craft", id }
}
