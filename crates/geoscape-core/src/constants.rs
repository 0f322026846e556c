//! Simulation constants and tuning parameters.

// --- Time ---

/// Simulated seconds per engine tick (finest Geoscape granularity).
pub const TICK_SECONDS: u32 = 5;

/// Minutes removed from a mission's spawn countdown per `think()` call.
pub const MISSION_STEP_MINUTES: u32 = 30;

pub const SECONDS_PER_HOUR: u64 = 3600;
pub const SECONDS_PER_HALF_HOUR: u64 = 1800;
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Calendar months are fixed-length.
pub const DAYS_PER_MONTH: u64 = 30;

// --- Mission engine ---

/// Attempts at finding a point that is both on land and inside the region.
pub const LAND_POINT_TRIES: u32 = 100;

/// Trajectory ground timers are stored in 5-second units.
pub const GROUND_TIMER_SCALE: u32 = 5;

/// Base of the wave delay applied when a UFO is shot down (30-minute units).
pub const SHOT_DOWN_DELAY_BASE: u32 = 400;

/// Random spread added to the shot-down delay (30-minute units).
pub const SHOT_DOWN_DELAY_SPREAD: u32 = 48;

/// Global alien base cap is `ALIEN_BASE_CAP + ALIEN_BASE_CAP_PER_LEVEL * difficulty`.
pub const ALIEN_BASE_CAP: usize = 8;
pub const ALIEN_BASE_CAP_PER_LEVEL: usize = 2;

/// Mission site lifetime is `MISSION_SITE_HOURS + uniform(0, MISSION_SITE_EXTRA_HOURS)` hours.
pub const MISSION_SITE_HOURS: u32 = 4;
pub const MISSION_SITE_EXTRA_HOURS: u32 = 6;

/// Alien activity for an unanswered mission site, in multiples of the mission's points.
pub const MISSION_SITE_EXPIRY_MULTIPLIER: i32 = 5;

/// Crash sites linger `uniform(CRASH_SITE_MIN_HOURS, CRASH_SITE_MAX_HOURS)` hours.
pub const CRASH_SITE_MIN_HOURS: u32 = 24;
pub const CRASH_SITE_MAX_HOURS: u32 = 96;

/// Mission zone index holding the region's cities.
pub const CITY_MISSION_ZONE: usize = 3;

/// Mission zone index where alien bases are built.
pub const ALIEN_BASE_ZONE: usize = 4;

/// Chance (percent per difficulty level) that an infiltration gives up,
/// rolled every mission step.
pub const INFILTRATION_END_CHANCE_PER_LEVEL: u32 = 20;

/// Daily chance (percent) that an alien base requests a supply run.
pub const SUPPLY_MISSION_CHANCE: u32 = 6;

/// Chance (percent) of a retaliation mission after a UFO is shot down:
/// `RETALIATION_CHANCE + RETALIATION_CHANCE_PER_LEVEL * difficulty`.
pub const RETALIATION_CHANCE: u32 = 4;
pub const RETALIATION_CHANCE_PER_LEVEL: u32 = 4;

/// Range at which a retaliation UFO may spot a player base (nautical miles).
pub const RETALIATION_SPOT_RANGE_NM: f64 = 600.0;

/// Chance (percent per half hour) that a retaliation UFO in range spots a base.
pub const RETALIATION_SPOT_CHANCE: u32 = 10;

// --- Special rule IDs ---

pub const RETALIATION_ASSAULT_TRAJECTORY: &str = "__RETALIATION_ASSAULT_RUN";
pub const BATTLESHIP_UFO: &str = "STR_BATTLESHIP";
pub const SUPPLY_SHIP_UFO: &str = "STR_SUPPLY_SHIP";
pub const TERROR_SHIP_UFO: &str = "STR_TERROR_SHIP";

/// Race used when a mission rule lists no race weights.
pub const DEFAULT_RACE: &str = "STR_SECTOID";

// --- Player crafts ---

/// Every new base starts with one interceptor and one troop transport.
pub const INTERCEPTOR_CRAFT: &str = "STR_INTERCEPTOR";
pub const INTERCEPTOR_SPEED: u32 = 2100;
pub const TRANSPORT_CRAFT: &str = "STR_SKYRANGER";
pub const TRANSPORT_SPEED: u32 = 760;
pub const TRANSPORT_SOLDIERS: u32 = 8;

/// First base of a new campaign.
pub const STARTING_BASE_NAME: &str = "Alpha";
pub const STARTING_BASE_LON: f64 = 359.9;
pub const STARTING_BASE_LAT: f64 = 51.5;
pub const STARTING_RADAR_CHANCE: u32 = 30;
pub const STARTING_RADAR_RANGE_NM: f64 = 600.0;

// --- Scoring ---

/// Months of activity and funding history kept per region/country.
pub const HISTORY_MONTHS: usize = 12;

/// Divisors applied to the global month totals in country settlement.
pub const XCOM_TOTAL_DIVISOR: i32 = 10;
pub const ALIEN_TOTAL_DIVISOR: i32 = 20;

/// Margin by which one side must lead before a country changes its mind.
pub const SATISFACTION_MARGIN: i32 = 30;

/// Extra lead X-COM needs per difficulty level to raise funding.
pub const SATISFACTION_MARGIN_PER_LEVEL: i32 = 10;

/// Funding changes by `uniform(MIN, MAX)` percent of the current funding.
pub const FUNDING_CHANGE_MIN_PERCENT: i64 = 5;
pub const FUNDING_CHANGE_MAX_PERCENT: i64 = 20;

/// Hours a recent-activity blink stays lit.
pub const RECENT_ACTIVITY_HOURS: u32 = 24;

// --- Geometry ---

/// Nautical miles per radian of great-circle arc (60 nm per degree).
pub const NM_PER_RADIAN: f64 = 60.0 * 180.0 / std::f64::consts::PI;
