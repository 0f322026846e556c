//! Alien missions: wave scheduling and the UFO trajectory state machine.
//!
//! A mission owns none of its UFOs. It spawns them into the world tagged
//! with its id, counts how many are still alive, and is consulted by the
//! engine whenever one of them reaches a waypoint, lifts off or is shot
//! down. All randomness comes from the context's seeded rng.

use hecs::{Entity, World};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use geoscape_core::constants::*;
use geoscape_core::enums::{Difficulty, MissionKind, TargetKind, UfoAltitude, UfoStatus};
use geoscape_core::error::{GeoscapeError, Result};
use geoscape_core::events::GeoscapeEvent;
use geoscape_core::rules::{MissionWave, RuleAlienMission, RuleRegion, RuleUfo, Ruleset, UfoTrajectory};
use geoscape_core::types::{GeoPoint, TargetRef, Waypoint};

use crate::motion::Motion;
use crate::saved_game::{IdKind, MissionContext};
use crate::scoring::Side;
use crate::targets::{alien_base_count, base_at, find, followers, AlienBase, Base, Craft, MissionSite};
use crate::ufo::Ufo;

/// What one `think` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissionTick {
    /// Id of the UFO spawned this call.
    pub spawned: Option<u32>,
    /// An infiltration ran out of waves and started over.
    pub looped: bool,
    /// Id of the alien base built this call.
    pub alien_base: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlienMission {
    rule: RuleAlienMission,
    region: String,
    race: String,
    next_wave: usize,
    next_ufo_counter: u32,
    /// Minutes until the next spawn.
    spawn_countdown: u32,
    live_ufos: u32,
    unique_id: Option<u32>,
    /// Supplied alien base (supply missions only).
    alien_base: Option<u32>,
    /// Looping infiltration that has given up; reaped once its UFOs are gone.
    abandoned: bool,
}

/// Persisted form of a mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionSave {
    pub rule: String,
    pub region: String,
    pub race: String,
    pub next_wave: usize,
    pub next_ufo_counter: u32,
    pub spawn_countdown: u32,
    pub live_ufos: u32,
    pub unique_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alien_base: Option<u32>,
    #[serde(default)]
    pub abandoned: bool,
}

/// Speed for a trajectory leg: a share of the hull's maximum, rounded up.
fn leg_speed(percentage: f64, max_speed: u32) -> u32 {
    (percentage * max_speed as f64).ceil() as u32
}

fn missing_ufo(entity: Entity) -> GeoscapeError {
    GeoscapeError::NoSuchTarget {
        kind: "ufo",
        id: entity.id(),
    }
}

/// Working copy of a UFO entity's components.
struct UfoParts {
    pos: GeoPoint,
    motion: Motion,
    ufo: Ufo,
}

impl UfoParts {
    fn load(world: &World, entity: Entity) -> Result<Self> {
        let mut query = world
            .query_one::<(&GeoPoint, &Motion, &Ufo)>(entity)
            .map_err(|_| missing_ufo(entity))?;
        let (pos, motion, ufo) = query.get().ok_or_else(|| missing_ufo(entity))?;
        let parts = Self {
            pos: *pos,
            motion: motion.clone(),
            ufo: ufo.clone(),
        };
        Ok(parts)
    }

    fn store(self, world: &mut World, entity: Entity) -> Result<()> {
        let (pos, motion, ufo) = world
            .query_one_mut::<(&mut GeoPoint, &mut Motion, &mut Ufo)>(entity)
            .map_err(|_| missing_ufo(entity))?;
        *pos = self.pos;
        *motion = self.motion;
        *ufo = self.ufo;
        Ok(())
    }
}

fn trajectory_of<'r>(rules: &'r Ruleset, ufo: &Ufo) -> Result<&'r UfoTrajectory> {
    rules
        .trajectory(&ufo.trajectory)
        .map_err(|_| GeoscapeError::MissingTrajectory(ufo.id))
}

fn new_waypoint(ctx: &mut MissionContext, position: GeoPoint) -> Waypoint {
    Waypoint {
        id: ctx.next_id(IdKind::Waypoint),
        position,
    }
}

impl AlienMission {
    pub fn new(rule: &RuleAlienMission, region: &str, race: &str) -> Self {
        Self {
            rule: rule.clone(),
            region: region.to_string(),
            race: race.to_string(),
            next_wave: 0,
            next_ufo_counter: 0,
            spawn_countdown: 0,
            live_ufos: 0,
            unique_id: None,
            alien_base: None,
            abandoned: false,
        }
    }

    pub fn rule(&self) -> &RuleAlienMission {
        &self.rule
    }

    pub fn kind(&self) -> MissionKind {
        self.rule.kind
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn race(&self) -> &str {
        &self.race
    }

    pub fn id(&self) -> Result<u32> {
        self.unique_id.ok_or(GeoscapeError::MissionIdUnassigned)
    }

    /// Assign the mission id. Ids are assigned exactly once.
    pub fn set_id(&mut self, id: u32) -> Result<()> {
        if let Some(existing) = self.unique_id {
            return Err(GeoscapeError::MissionIdAlreadySet(existing));
        }
        self.unique_id = Some(id);
        Ok(())
    }

    pub fn alien_base(&self) -> Option<u32> {
        self.alien_base
    }

    pub fn set_alien_base(&mut self, alien_base: Option<u32>) {
        self.alien_base = alien_base;
    }

    /// Minutes until the next UFO spawns.
    pub fn wave_countdown(&self) -> u32 {
        self.spawn_countdown
    }

    /// Override the spawn countdown. `minutes` must be a positive multiple
    /// of the 30-minute step; finished missions ignore the call.
    pub fn set_wave_countdown(&mut self, minutes: u32) -> Result<()> {
        if minutes == 0 || !minutes.is_multiple_of(MISSION_STEP_MINUTES) {
            return Err(GeoscapeError::InvalidTransition(format!(
                "wave countdown of {minutes} minutes is not a positive multiple of {MISSION_STEP_MINUTES}"
            )));
        }
        if !self.is_over() {
            self.spawn_countdown = minutes;
        }
        Ok(())
    }

    pub fn next_wave(&self) -> usize {
        self.next_wave
    }

    pub fn live_ufos(&self) -> u32 {
        self.live_ufos
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    /// All waves dispatched and every UFO gone. Infiltrations loop and are
    /// never over by this measure.
    pub fn is_over(&self) -> bool {
        if self.kind() == MissionKind::Infiltration {
            return false;
        }
        self.next_wave == self.rule.wave_count() && self.live_ufos == 0
    }

    /// Ready to be removed from the campaign.
    pub fn is_finished(&self) -> bool {
        self.is_over() || (self.abandoned && self.live_ufos == 0)
    }

    /// Reset the wave counters. A zero `initial_countdown` draws the first
    /// delay from wave 0's spawn timer.
    pub fn start<R: Rng>(&mut self, initial_countdown: u32, rng: &mut R) {
        self.next_wave = 0;
        self.next_ufo_counter = 0;
        self.live_ufos = 0;
        if initial_countdown == 0 {
            self.schedule_wave(rng);
        } else {
            self.spawn_countdown = initial_countdown;
        }
    }

    /// `30 × (timer/2 + uniform(0, timer))` minutes, timer in 30-minute steps.
    fn schedule_wave<R: Rng>(&mut self, rng: &mut R) {
        let Some(wave) = self.rule.wave(self.next_wave) else {
            return;
        };
        let timer = wave.spawn_timer / MISSION_STEP_MINUTES;
        self.spawn_countdown = (timer / 2 + rng.gen_range(0..=timer)) * MISSION_STEP_MINUTES;
    }

    /// One 30-minute step of the wave schedule.
    pub fn think(&mut self, ctx: &mut MissionContext) -> Result<MissionTick> {
        let mut tick = MissionTick::default();
        if self.abandoned || self.next_wave >= self.rule.wave_count() {
            return Ok(tick);
        }
        if self.spawn_countdown > MISSION_STEP_MINUTES {
            self.spawn_countdown -= MISSION_STEP_MINUTES;
            return Ok(tick);
        }

        let wave = self.rule.wave(self.next_wave).cloned().ok_or_else(|| {
            GeoscapeError::InvalidRuleset(format!("mission {} has no wave {}", self.rule.id, self.next_wave))
        })?;
        tick.spawned = self.spawn_ufo(ctx, &wave)?;
        self.next_ufo_counter += 1;
        if self.next_ufo_counter >= wave.count {
            self.next_ufo_counter = 0;
            self.next_wave += 1;
        }

        let exhausted = self.next_wave == self.rule.wave_count();
        if exhausted && self.kind() == MissionKind::Infiltration {
            let rules = ctx.rules;
            let region = rules.region(&self.region)?;
            let candidate = ctx.countries.iter().position(|c| {
                !c.pact()
                    && !c.new_pact()
                    && rules
                        .country(&c.rule)
                        .is_ok_and(|rule| region.inside_region(rule.label_point()))
            });
            if let Some(index) = candidate {
                ctx.countries[index].set_new_pact();
                info!(country = %ctx.countries[index].rule, region = %self.region, "infiltration complete, pact pending");
                tick.alien_base = self.spawn_alien_base(ctx)?;
            }
            self.next_wave = 0;
            tick.looped = true;
        }
        if exhausted && self.kind() == MissionKind::Base {
            tick.alien_base = self.spawn_alien_base(ctx)?;
        }

        if self.next_wave != self.rule.wave_count() {
            self.schedule_wave(ctx.rng);
        }
        Ok(tick)
    }

    /// Infiltrations give up with a chance of 20% per difficulty level,
    /// rolled once per step. Returns whether the mission is now abandoned.
    pub fn roll_infiltration_end<R: Rng>(&mut self, difficulty: Difficulty, rng: &mut R) -> bool {
        if self.kind() != MissionKind::Infiltration || self.abandoned {
            return self.abandoned;
        }
        let chance = INFILTRATION_END_CHANCE_PER_LEVEL * difficulty.level();
        if rng.gen_range(0..100) < chance {
            info!(mission_id = ?self.unique_id, region = %self.region, "infiltration abandoned");
            self.abandoned = true;
        }
        self.abandoned
    }

    /// Spawn one UFO for `wave`. Returns `None` when nothing could be
    /// launched (a supply ship with no base to supply).
    pub fn spawn_ufo(&mut self, ctx: &mut MissionContext, wave: &MissionWave) -> Result<Option<u32>> {
        let rules = ctx.rules;
        let mission_id = self.id()?;
        let region = rules.region(&self.region)?;
        let ufo_rule = rules.ufo(&wave.ufo)?;
        let trajectory = rules.trajectory(&wave.trajectory)?;

        let target_base = if self.kind() == MissionKind::Retaliation {
            retaliation_target(ctx.world, region)
        } else {
            None
        };

        let spawned = match target_base {
            Some(base_pos) => self.assault_run(ctx, region, trajectory, base_pos, mission_id)?,
            None => {
                let supplied = if self.kind() == MissionKind::Supply && ufo_rule.id == SUPPLY_SHIP_UFO {
                    let base = self.alien_base.and_then(|id| find::<AlienBase>(ctx.world, id));
                    match base.and_then(|e| ctx.world.get::<&GeoPoint>(e).ok().map(|p| *p)) {
                        Some(p) => Some(p),
                        None => {
                            debug!(mission_id, "supply run without a base to supply");
                            return Ok(None);
                        }
                    }
                } else {
                    None
                };
                self.sequence_run(ctx, region, ufo_rule, trajectory, supplied, mission_id)?
            }
        };

        let (pos, motion, ufo) = spawned;
        let ufo_id = ufo.id;
        debug!(ufo_id, mission_id, rule = %ufo.rule, trajectory = %ufo.trajectory, "ufo spawned");
        ctx.events.push(GeoscapeEvent::UfoSpawned {
            ufo_id,
            mission_id,
            rule: ufo.rule.clone(),
            position: pos,
        });
        ctx.world.spawn((pos, motion, ufo));
        self.live_ufos += 1;
        Ok(Some(ufo_id))
    }

    /// Battleship straight for the marked base.
    fn assault_run(
        &self,
        ctx: &mut MissionContext,
        region: &RuleRegion,
        nominal: &UfoTrajectory,
        base_pos: GeoPoint,
        mission_id: u32,
    ) -> Result<(GeoPoint, Motion, Ufo)> {
        let rules = ctx.rules;
        let battleship = rules.ufo(BATTLESHIP_UFO)?;
        let assault = rules.trajectory(RETALIATION_ASSAULT_TRAJECTORY)?;
        let first = nominal.waypoint(0)?;
        let start = ctx.zone_point(region, first.zone, first.altitude.is_ground())?;

        let mut ufo = Ufo::new(ctx.next_id(IdKind::Ufo), battleship, mission_id, &assault.id);
        ufo.set_altitude(assault.waypoint(0)?.altitude);
        let mut motion = Motion::new(0);
        let wp = new_waypoint(ctx, base_pos);
        motion.set_waypoint(start, wp);
        motion.set_speed(start, leg_speed(assault.speed_percentage(0)?, battleship.max_speed));
        Ok((start, motion, ufo))
    }

    /// A UFO following its trajectory from waypoint 0 toward waypoint 1.
    fn sequence_run(
        &self,
        ctx: &mut MissionContext,
        region: &RuleRegion,
        ufo_rule: &RuleUfo,
        trajectory: &UfoTrajectory,
        supplied_base: Option<GeoPoint>,
        mission_id: u32,
    ) -> Result<(GeoPoint, Motion, Ufo)> {
        let first = *trajectory.waypoint(0)?;
        let second = *trajectory.waypoint(1)?;
        let start = ctx.zone_point(region, first.zone, first.altitude.is_ground())?;

        let mut ufo = Ufo::new(ctx.next_id(IdKind::Ufo), ufo_rule, mission_id, &trajectory.id);
        ufo.set_altitude(first.altitude);
        if first.altitude.is_ground() {
            ufo.seconds_remaining = trajectory.ground_seconds();
        }

        let dest = match supplied_base {
            Some(base_pos) if second.altitude.is_ground() => base_pos,
            _ => ctx.zone_point(region, second.zone, second.altitude.is_ground())?,
        };
        let mut motion = Motion::new(0);
        let wp = new_waypoint(ctx, dest);
        motion.set_waypoint(start, wp);
        motion.set_speed(start, leg_speed(trajectory.speed_percentage(0)?, ufo_rule.max_speed));
        Ok((start, motion, ufo))
    }

    /// The UFO arrived at its destination: advance along the trajectory.
    pub fn ufo_reached_waypoint(&mut self, ctx: &mut MissionContext, entity: Entity) -> Result<()> {
        let rules = ctx.rules;
        let mut parts = UfoParts::load(ctx.world, entity)?;
        let trajectory = trajectory_of(rules, &parts.ufo)?;
        let next = parts.ufo.trajectory_point + 1;

        if next >= trajectory.waypoint_count() {
            parts.ufo.detected = false;
            parts.ufo.set_status(UfoStatus::Destroyed)?;
            debug!(ufo_id = parts.ufo.id, "ufo left the atmosphere");
            return parts.store(ctx.world, entity);
        }

        let point = *trajectory.waypoint(next)?;
        parts.ufo.set_altitude(point.altitude);
        parts.ufo.trajectory_point = next;

        let region = rules.region(&self.region)?;
        let dest = match trajectory.waypoints.get(next + 1) {
            Some(after) => ctx.zone_point(region, after.zone, after.altitude.is_ground())?,
            None => ctx.zone_point(region, point.zone, false)?,
        };
        let wp = new_waypoint(ctx, dest);
        parts.motion.set_waypoint(parts.pos, wp);

        if !point.altitude.is_ground() {
            parts.ufo.land_id = None;
            let speed = leg_speed(trajectory.speed_percentage(next)?, parts.ufo.max_speed);
            parts.motion.set_speed(parts.pos, speed);
            return parts.store(ctx.world, entity);
        }

        let ufo_id = parts.ufo.id;
        let pos = parts.pos;

        if parts.ufo.rule == TERROR_SHIP_UFO
            && self.kind() == MissionKind::Terror
            && point.zone == CITY_MISSION_ZONE
        {
            self.add_score(ctx, pos);
            parts.ufo.set_status(UfoStatus::Destroyed)?;
            parts.store(ctx.world, entity)?;
            self.spawn_mission_site(ctx, pos, ufo_id)?;
            return Ok(());
        }

        if parts.ufo.trajectory == RETALIATION_ASSAULT_TRAJECTORY {
            parts.ufo.detected = false;
            match base_at(ctx.world, pos) {
                Some(base_id) => {
                    parts.motion.set_target(pos, TargetRef::new(TargetKind::Base, base_id), pos);
                    parts.ufo.seconds_remaining = trajectory.ground_seconds();
                    info!(ufo_id, base_id, "base under assault");
                    ctx.events.push(GeoscapeEvent::BaseAssaulted { base_id, ufo_id });
                }
                None => {
                    parts.ufo.set_status(UfoStatus::Destroyed)?;
                    debug!(ufo_id, "assault target gone");
                }
            }
            return parts.store(ctx.world, entity);
        }

        parts.ufo.seconds_remaining = trajectory.ground_seconds();
        if parts.ufo.detected && parts.ufo.land_id.is_none() {
            parts.ufo.land_id = Some(ctx.next_id(IdKind::LandingSite));
        }
        debug!(ufo_id, seconds = parts.ufo.seconds_remaining, "ufo landed");
        ctx.events.push(GeoscapeEvent::UfoLanded { ufo_id, position: pos });
        parts.store(ctx.world, entity)
    }

    /// Terror ship landed in a city: replace it with a mission site and send
    /// crafts carrying soldiers there.
    fn spawn_mission_site(&self, ctx: &mut MissionContext, pos: GeoPoint, ufo_id: u32) -> Result<u32> {
        let rules = ctx.rules;
        let mission_id = self.id()?;
        let id = ctx.next_id(IdKind::MissionSite);
        let hours = MISSION_SITE_HOURS + ctx.rng.gen_range(0..=MISSION_SITE_EXTRA_HOURS);
        let mut site = MissionSite::new(id, mission_id, &self.rule.id, &self.race, hours * SECONDS_PER_HOUR as u32);
        site.expiry_score = self.rule.points * MISSION_SITE_EXPIRY_MULTIPLIER;
        let city = rules.region(&self.region).ok().and_then(|r| r.city_at(pos));
        site.city = city.and_then(|c| c.name.clone());
        site.texture = city.and_then(|c| c.texture);
        let city_name = site.city.clone();
        ctx.world.spawn((pos, site));

        let site_ref = TargetRef::new(TargetKind::MissionSite, id);
        for craft_id in followers(ctx.world, TargetRef::new(TargetKind::Ufo, ufo_id)) {
            let Some(entity) = find::<Craft>(ctx.world, craft_id) else {
                continue;
            };
            if let Ok((here, motion, craft)) = ctx.world.query_one_mut::<(&GeoPoint, &mut Motion, &Craft)>(entity) {
                if craft.soldiers > 0 {
                    motion.set_target(*here, site_ref, pos);
                }
            }
        }

        info!(site_id = id, mission_id, city = ?city_name, hours, "terror site created");
        ctx.events.push(GeoscapeEvent::MissionSiteCreated {
            site_id: id,
            mission_id,
            position: pos,
            city: city_name,
        });
        Ok(id)
    }

    /// The UFO's ground timer ran out.
    pub fn ufo_lifting(&mut self, ctx: &mut MissionContext, entity: Entity) -> Result<()> {
        let rules = ctx.rules;
        let mut parts = UfoParts::load(ctx.world, entity)?;
        match parts.ufo.status() {
            UfoStatus::Landed => {
                if self.rule.points > 0 && self.kind() != MissionKind::Base {
                    self.add_score(ctx, parts.pos);
                }
                let trajectory = trajectory_of(rules, &parts.ufo)?;
                parts.ufo.set_altitude(UfoAltitude::VeryLow);
                let pct = trajectory.speed_percentage(parts.ufo.trajectory_point)?;
                parts.motion.set_speed(parts.pos, leg_speed(pct, parts.ufo.max_speed));
                debug!(ufo_id = parts.ufo.id, "ufo lifting off");
            }
            UfoStatus::Crashed => {
                parts.ufo.detected = false;
                parts.ufo.set_status(UfoStatus::Destroyed)?;
                debug!(ufo_id = parts.ufo.id, "crash site expired");
            }
            status @ (UfoStatus::Flying | UfoStatus::Destroyed) => {
                return Err(GeoscapeError::InvalidTransition(format!(
                    "ufo {} cannot lift off while {status:?}",
                    parts.ufo.id
                )));
            }
        }
        parts.store(ctx.world, entity)
    }

    /// The UFO was brought down. Delays the next wave while any remain.
    pub fn ufo_shot_down(&mut self, ctx: &mut MissionContext, entity: Entity) -> Result<()> {
        let (ufo_id, status) = ctx
            .world
            .get::<&Ufo>(entity)
            .map(|u| (u.id, u.status()))
            .map_err(|_| missing_ufo(entity))?;
        match status {
            UfoStatus::Flying | UfoStatus::Landed => Err(GeoscapeError::InvalidTransition(format!(
                "ufo {ufo_id} was not shot down ({status:?})"
            ))),
            UfoStatus::Crashed | UfoStatus::Destroyed => {
                if self.next_wave != self.rule.wave_count() {
                    let steps = ctx.rng.gen_range(0..=SHOT_DOWN_DELAY_SPREAD) + SHOT_DOWN_DELAY_BASE;
                    self.spawn_countdown += MISSION_STEP_MINUTES * steps;
                    debug!(ufo_id, countdown = self.spawn_countdown, "next wave delayed");
                }
                Ok(())
            }
        }
    }

    /// One of this mission's UFOs was removed from the world.
    pub fn ufo_removed(&mut self) -> Result<()> {
        if self.live_ufos == 0 {
            return Err(GeoscapeError::InvalidTransition(format!(
                "mission {:?} has no live ufos to remove",
                self.unique_id
            )));
        }
        self.live_ufos -= 1;
        Ok(())
    }

    /// Build an alien base in the region's base zone, unless the global
    /// cap for the difficulty is reached.
    pub fn spawn_alien_base(&self, ctx: &mut MissionContext) -> Result<Option<u32>> {
        let cap = ALIEN_BASE_CAP + ALIEN_BASE_CAP_PER_LEVEL * ctx.difficulty.level() as usize;
        if alien_base_count(ctx.world) >= cap {
            debug!(cap, "alien base cap reached");
            return Ok(None);
        }
        let rules = ctx.rules;
        let region = rules.region(&self.region)?;
        let pos = ctx.zone_point(region, ALIEN_BASE_ZONE, true)?;
        let id = ctx.next_id(IdKind::AlienBase);
        ctx.world.spawn((pos, AlienBase::new(id, &self.race)));
        self.add_score(ctx, pos);
        info!(alien_base_id = id, region = %self.region, race = %self.race, "alien base built");
        ctx.events.push(GeoscapeEvent::AlienBaseBuilt {
            alien_base_id: id,
            region: self.region.clone(),
            position: pos,
        });
        Ok(Some(id))
    }

    /// Credit this mission's points to the aliens at `p`.
    pub fn add_score(&self, ctx: &mut MissionContext, p: GeoPoint) {
        ctx.add_score(p, Side::Alien, self.rule.points);
    }

    pub fn save(&self) -> Result<MissionSave> {
        Ok(MissionSave {
            rule: self.rule.id.clone(),
            region: self.region.clone(),
            race: self.race.clone(),
            next_wave: self.next_wave,
            next_ufo_counter: self.next_ufo_counter,
            spawn_countdown: self.spawn_countdown,
            live_ufos: self.live_ufos,
            unique_id: self.id()?,
            alien_base: self.alien_base,
            abandoned: self.abandoned,
        })
    }

    /// Rebuild a mission, resolving its rule and supplied alien base.
    pub fn load(save: MissionSave, rules: &Ruleset, alien_base_exists: impl Fn(u32) -> bool) -> Result<Self> {
        let rule = rules.mission(&save.rule).map_err(|_| {
            GeoscapeError::CorruptedSave(format!("mission {} uses unknown rule {}", save.unique_id, save.rule))
        })?;
        if let Some(base) = save.alien_base {
            if !alien_base_exists(base) {
                return Err(GeoscapeError::CorruptedSave(format!(
                    "mission {} supplies missing alien base {base}",
                    save.unique_id
                )));
            }
        }
        let mut mission = Self::new(rule, &save.region, &save.race);
        mission.set_id(save.unique_id)?;
        mission.next_wave = save.next_wave;
        mission.next_ufo_counter = save.next_ufo_counter;
        mission.spawn_countdown = save.spawn_countdown;
        mission.live_ufos = save.live_ufos;
        mission.alien_base = save.alien_base;
        mission.abandoned = save.abandoned;
        Ok(mission)
    }
}

/// Position of a base marked for retaliation inside the region.
fn retaliation_target(world: &World, region: &RuleRegion) -> Option<GeoPoint> {
    world
        .query::<(&GeoPoint, &Base)>()
        .iter()
        .find(|(_, (p, base))| base.retaliation_target && region.inside_region(**p))
        .map(|(_, (p, _))| *p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saved_game::SavedGame;
    use geoscape_core::types::GameTime;
    use geoscape_globe::Globe;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fixture() -> (Ruleset, Globe, SavedGame, ChaCha8Rng) {
        let rules = Ruleset::standard().unwrap();
        let globe = Globe::from_rules(&rules);
        let game = SavedGame::new(&rules, Difficulty::Beginner, GameTime::default());
        (rules, globe, game, ChaCha8Rng::seed_from_u64(21))
    }

    fn mission(rules: &Ruleset, rule: &str) -> AlienMission {
        let mut m = AlienMission::new(rules.mission(rule).unwrap(), "STR_EUROPE", "STR_SECTOID");
        m.set_id(1).unwrap();
        m
    }

    #[test]
    fn test_id_assigned_once() {
        let rules = Ruleset::standard().unwrap();
        let mut m = AlienMission::new(rules.mission("STR_ALIEN_RESEARCH").unwrap(), "STR_EUROPE", "STR_SECTOID");
        assert!(matches!(m.id(), Err(GeoscapeError::MissionIdUnassigned)));
        m.set_id(7).unwrap();
        assert_eq!(m.id().unwrap(), 7);
        assert!(matches!(m.set_id(8), Err(GeoscapeError::MissionIdAlreadySet(7))));
        assert_eq!(m.id().unwrap(), 7, "a rejected reassignment keeps the old id");
    }

    #[test]
    fn test_start_draws_countdown_from_first_wave() {
        let rules = Ruleset::standard().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut m = mission(&rules, "STR_ALIEN_RESEARCH");
        let timer = m.rule().waves[0].spawn_timer / 30;
        for _ in 0..20 {
            m.start(0, &mut rng);
            let c = m.wave_countdown();
            assert_eq!(c % 30, 0);
            assert!(c >= (timer / 2) * 30 && c <= (timer / 2 + timer) * 30, "countdown {c} out of range");
        }
        m.start(450, &mut rng);
        assert_eq!(m.wave_countdown(), 450);
    }

    #[test]
    fn test_think_counts_down_in_half_hours() {
        let (rules, globe, mut game, mut rng) = fixture();
        let mut events = Vec::new();
        let mut m = mission(&rules, "STR_ALIEN_RESEARCH");
        m.start(120, &mut rng);
        let (_, mut ctx) = game.split(&rules, &globe, &mut rng, &mut events);
        for expected in [90, 60, 30] {
            let tick = m.think(&mut ctx).unwrap();
            assert_eq!(tick, MissionTick::default());
            assert_eq!(m.wave_countdown(), expected);
        }
        let tick = m.think(&mut ctx).unwrap();
        assert!(tick.spawned.is_some(), "countdown at 30 spawns");
        assert_eq!(m.live_ufos(), 1);
    }

    #[test]
    fn test_wave_countdown_validation() {
        let rules = Ruleset::standard().unwrap();
        let mut m = mission(&rules, "STR_ALIEN_RESEARCH");
        assert!(m.set_wave_countdown(0).is_err());
        assert!(m.set_wave_countdown(45).is_err());
        m.set_wave_countdown(300).unwrap();
        assert_eq!(m.wave_countdown(), 300);
    }

    #[test]
    fn test_is_over_requires_waves_and_ufos_gone() {
        let rules = Ruleset::standard().unwrap();
        let mut m = mission(&rules, "STR_ALIEN_RESEARCH");
        assert!(!m.is_over());
        m.next_wave = m.rule().wave_count();
        m.live_ufos = 1;
        assert!(!m.is_over(), "a live ufo keeps the mission running");
        m.ufo_removed().unwrap();
        assert!(m.is_over());
        assert!(m.ufo_removed().is_err(), "live ufos never go negative");
        assert_eq!(m.live_ufos(), 0);
    }

    #[test]
    fn test_infiltration_never_over() {
        let rules = Ruleset::standard().unwrap();
        let mut m = mission(&rules, "STR_ALIEN_INFILTRATION");
        m.next_wave = m.rule().wave_count();
        assert!(!m.is_over());
        assert!(!m.is_finished());
        m.abandoned = true;
        assert!(!m.is_over());
        assert!(m.is_finished(), "abandoned with no ufos is reaped");
    }

    #[test]
    fn test_infiltration_end_roll_depends_on_difficulty() {
        let rules = Ruleset::standard().unwrap();
        let mut ended_easy = 0;
        let mut ended_hard = 0;
        for seed in 0..1000 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut easy = mission(&rules, "STR_ALIEN_INFILTRATION");
            if easy.roll_infiltration_end(Difficulty::Beginner, &mut rng) {
                ended_easy += 1;
            }
            let mut hard = mission(&rules, "STR_ALIEN_INFILTRATION");
            if hard.roll_infiltration_end(Difficulty::Superhuman, &mut rng) {
                ended_hard += 1;
            }
        }
        assert_eq!(ended_easy, 0, "beginner infiltrations never give up");
        assert!(ended_hard > 740 && ended_hard < 860, "about 80% at superhuman: {ended_hard}");

        let mut research = mission(&rules, "STR_ALIEN_RESEARCH");
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(!research.roll_infiltration_end(Difficulty::Superhuman, &mut rng));
    }

    #[test]
    fn test_shot_down_delays_remaining_waves() {
        let (rules, globe, mut game, mut rng) = fixture();
        let mut events = Vec::new();
        let mut m = mission(&rules, "STR_ALIEN_RESEARCH");
        m.start(60, &mut rng);
        let (_, mut ctx) = game.split(&rules, &globe, &mut rng, &mut events);
        let wave = m.rule().waves[0].clone();
        let id = m.spawn_ufo(&mut ctx, &wave).unwrap().unwrap();
        let entity = find::<Ufo>(ctx.world, id).unwrap();

        assert!(m.ufo_shot_down(&mut ctx, entity).is_err(), "a flying ufo was not shot down");
        ctx.world.get::<&mut Ufo>(entity).unwrap().set_damage(1000);
        let before = m.wave_countdown();
        m.ufo_shot_down(&mut ctx, entity).unwrap();
        let delay = m.wave_countdown() - before;
        assert!((30 * 400..=30 * 448).contains(&delay), "delay {delay} out of range");
        assert_eq!(delay % 30, 0);
    }

    #[test]
    fn test_lifting_rejects_flying() {
        let (rules, globe, mut game, mut rng) = fixture();
        let mut events = Vec::new();
        let mut m = mission(&rules, "STR_ALIEN_RESEARCH");
        let (_, mut ctx) = game.split(&rules, &globe, &mut rng, &mut events);
        let wave = m.rule().waves[0].clone();
        let id = m.spawn_ufo(&mut ctx, &wave).unwrap().unwrap();
        let entity = find::<Ufo>(ctx.world, id).unwrap();
        assert!(matches!(
            m.ufo_lifting(&mut ctx, entity),
            Err(GeoscapeError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_spawned_ufo_follows_first_leg() {
        let (rules, globe, mut game, mut rng) = fixture();
        let mut events = Vec::new();
        let mut m = mission(&rules, "STR_ALIEN_RESEARCH");
        let (_, mut ctx) = game.split(&rules, &globe, &mut rng, &mut events);
        let wave = m.rule().waves[0].clone();
        let trajectory = rules.trajectory(&wave.trajectory).unwrap();
        let ufo_rule = rules.ufo(&wave.ufo).unwrap();
        let id = m.spawn_ufo(&mut ctx, &wave).unwrap().unwrap();
        let entity = find::<Ufo>(ctx.world, id).unwrap();

        let ufo = ctx.world.get::<&Ufo>(entity).unwrap();
        let motion = ctx.world.get::<&Motion>(entity).unwrap();
        assert_eq!(ufo.trajectory_point, 0);
        assert_eq!(ufo.altitude(), trajectory.waypoints[0].altitude);
        let expected = (trajectory.waypoints[0].speed as f64 / 100.0 * ufo_rule.max_speed as f64).ceil() as u32;
        assert_eq!(motion.speed(), expected);
        assert!(matches!(motion.destination(), geoscape_core::types::Destination::Waypoint(_)));
        assert_eq!(m.live_ufos(), 1);
        assert!(matches!(ctx.events[0], GeoscapeEvent::UfoSpawned { ufo_id, mission_id: 1, .. } if ufo_id == id));
    }

    #[test]
    fn test_save_omits_missing_alien_base() {
        let rules = Ruleset::standard().unwrap();
        let m = mission(&rules, "STR_ALIEN_RESEARCH");
        let json = serde_json::to_string(&m.save().unwrap()).unwrap();
        assert!(!json.contains("alien_base"), "absent base must be omitted: {json}");

        let mut supply = mission(&rules, "STR_ALIEN_SUPPLY");
        supply.set_alien_base(Some(4));
        let json = serde_json::to_string(&supply.save().unwrap()).unwrap();
        assert!(json.contains("\"alien_base\":4"));
    }

    #[test]
    fn test_load_resolves_alien_base() {
        let rules = Ruleset::standard().unwrap();
        let mut supply = mission(&rules, "STR_ALIEN_SUPPLY");
        supply.set_alien_base(Some(4));
        let save = supply.save().unwrap();

        let loaded = AlienMission::load(save.clone(), &rules, |id| id == 4).unwrap();
        assert_eq!(loaded, supply);

        let err = AlienMission::load(save, &rules, |_| false).unwrap_err();
        assert!(matches!(err, GeoscapeError::CorruptedSave(_)), "got {err}");
    }

    #[test]
    fn test_unsaved_id_cannot_be_saved() {
        let rules = Ruleset::standard().unwrap();
        let m = AlienMission::new(rules.mission("STR_ALIEN_RESEARCH").unwrap(), "STR_EUROPE", "STR_SECTOID");
        assert!(m.save().is_err());
    }
}
