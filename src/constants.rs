//! Centralized balance and tuning constants for Lastlight core logic.
//!
//! These values define the deterministic math for the simulation core.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets.

// Rarity weights -----------------------------------------------------------
pub(crate) const RARITY_WEIGHT_COMMON: u32 = 5;
pub(crate) const RARITY_WEIGHT_UNCOMMON: u32 = 3;
pub(crate) const RARITY_WEIGHT_RARE: u32 = 1;

// Choice projection --------------------------------------------------------
pub(crate) const MIN_CHOICES_PER_EVENT: usize = 2;
pub(crate) const MAX_CHOICES_PER_EVENT: usize = 6;
pub(crate) const MIN_TIME_COST: u32 = 1;

// Condition hysteresis thresholds ------------------------------------------
pub(crate) const THIRST_STREAK_THRESHOLD: i32 = 80;
pub(crate) const DEHYDRATION_STREAK_TRIGGER: i64 = 3;
pub(crate) const DEHYDRATION_THIRST_RELEASE: i32 = 40;
pub(crate) const HYDRATION_RECOVERY_DELTA: i32 = -10;
pub(crate) const HYDRATION_RECOVERY_CAP: i64 = 2;
pub(crate) const COLD_EXPOSURE_TRIGGER: i64 = 3;
pub(crate) const WARM_STREAK_RELEASE: i64 = 4;
pub(crate) const EXHAUSTION_FATIGUE_TRIGGER: i32 = 85;
pub(crate) const EXHAUSTION_FATIGUE_RELEASE: i32 = 50;
pub(crate) const EXHAUSTION_DRAIN_DELAY_SCENES: i64 = 4;
pub(crate) const FEVER_REST_CAP: i64 = 8;
pub(crate) const FEVER_REST_GAIN: i64 = 2;
pub(crate) const FEVER_REST_RELEASE: i64 = 6;

// Baseline drains per resolved scene (hunger, thirst, fatigue) -------------
pub(crate) const BASELINE_DRAIN_EASY: (i32, i32, i32) = (1, 2, 1);
pub(crate) const BASELINE_DRAIN_STANDARD: (i32, i32, i32) = (2, 3, 2);
pub(crate) const BASELINE_DRAIN_HARD: (i32, i32, i32) = (3, 4, 3);

// Scarcity -----------------------------------------------------------------
pub(crate) const SCARCITY_GAIN_FACTOR: f32 = 0.7;

// Custom actions -----------------------------------------------------------
pub(crate) const CUSTOM_ACTION_COOLDOWN_SCENES: i64 = 2;
pub(crate) const CUSTOM_TURN_SENTINEL: i64 = -1_000_000;
pub(crate) const CUSTOM_FATIGUE_GATE: i32 = 85;
pub(crate) const CUSTOM_NEEDS_GATE: i32 = 95;

// Generation ---------------------------------------------------------------
pub(crate) const RESEARCHER_BRANCH_CHANCE: f64 = 0.05;
pub(crate) const RESEARCHER_EARLIEST_DAY: i32 = -9;
pub(crate) const FIRST_SURVIVOR_MAX_DISTANCE_KM: f64 = 100.0;
pub(crate) const TRAIT_COUNT_MIN: usize = 2;
pub(crate) const TRAIT_COUNT_MAX: usize = 3;
pub(crate) const SKILL_LEVEL_MAX: u8 = 5;
pub(crate) const SKILL_USES_PER_LEVEL: u8 = 3;
pub(crate) const FIRST_SURVIVOR_AGE_RANGE: (u8, u8) = (22, 54);
pub(crate) const REPLACEMENT_AGE_RANGE: (u8, u8) = (16, 68);

// Local Arrival Day tiers --------------------------------------------------
pub(crate) const LAD_TIER_A_MAX_KM: f64 = 100.0;
pub(crate) const LAD_TIER_B_MAX_KM: f64 = 800.0;
pub(crate) const LAD_TIER_C_MAX_KM: f64 = 3_000.0;
pub(crate) const LAD_TIER_B_BOUNDS: (i32, i32) = (1, 3);
pub(crate) const LAD_TIER_C_BOUNDS: (i32, i32) = (3, 10);
pub(crate) const LAD_TIER_D_BOUNDS: (i32, i32) = (7, 21);
pub(crate) const LAD_HUB_TRANSIT_SHIFT: i32 = -2;
pub(crate) const LAD_RURAL_JITTER: (i32, i32) = (2, 5);
pub(crate) const LAD_CLOSURE_JITTER: (i32, i32) = (2, 7);
pub(crate) const LAD_EVAC_JITTER: (i32, i32) = (-2, -1);

// Risk adjustment ----------------------------------------------------------
pub(crate) const RISK_SKILL_DISCOUNT_LEVEL: u8 = 4;
pub(crate) const RISK_SKILL_PENALTY_LEVEL: u8 = 1;
