//! Pure simulation state: survivor, world, stats, meters, environment.
//!
//! Nothing in this module draws randomness; generation and resolution
//! layers mutate this state through explicit operations.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{CUSTOM_TURN_SENTINEL, SKILL_LEVEL_MAX, SKILL_USES_PER_LEVEL};
use crate::seed::RunSeed;

/// The five core survivor stats. Hunger, thirst and fatigue are need
/// levels: higher means worse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    Health,
    Hunger,
    Thirst,
    Fatigue,
    Morale,
}

impl StatKey {
    pub const ALL: [Self; 5] = [
        Self::Health,
        Self::Hunger,
        Self::Thirst,
        Self::Fatigue,
        Self::Morale,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Hunger => "hunger",
            Self::Thirst => "thirst",
            Self::Fatigue => "fatigue",
            Self::Morale => "morale",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub health: i32,
    pub hunger: i32,
    pub thirst: i32,
    pub fatigue: i32,
    pub morale: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            health: 100,
            hunger: 0,
            thirst: 0,
            fatigue: 0,
            morale: 50,
        }
    }
}

impl Stats {
    /// All five stats at zero; the baseline for drain acceptance tests.
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            health: 0,
            hunger: 0,
            thirst: 0,
            fatigue: 0,
            morale: 0,
        }
    }

    pub fn clamp(&mut self) {
        self.health = self.health.clamp(0, 100);
        self.hunger = self.hunger.clamp(0, 100);
        self.thirst = self.thirst.clamp(0, 100);
        self.fatigue = self.fatigue.clamp(0, 100);
        self.morale = self.morale.clamp(0, 100);
    }

    #[must_use]
    pub const fn get(&self, key: StatKey) -> i32 {
        match key {
            StatKey::Health => self.health,
            StatKey::Hunger => self.hunger,
            StatKey::Thirst => self.thirst,
            StatKey::Fatigue => self.fatigue,
            StatKey::Morale => self.morale,
        }
    }

    /// Apply a delta and clamp every stat back into [0, 100].
    pub fn apply(&mut self, delta: &StatDelta) {
        self.health = self.health.saturating_add(delta.health);
        self.hunger = self.hunger.saturating_add(delta.hunger);
        self.thirst = self.thirst.saturating_add(delta.thirst);
        self.fatigue = self.fatigue.saturating_add(delta.fatigue);
        self.morale = self.morale.saturating_add(delta.morale);
        self.clamp();
    }
}

/// Signed per-stat change accumulated during one scene resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatDelta {
    #[serde(default)]
    pub health: i32,
    #[serde(default)]
    pub hunger: i32,
    #[serde(default)]
    pub thirst: i32,
    #[serde(default)]
    pub fatigue: i32,
    #[serde(default)]
    pub morale: i32,
}

impl StatDelta {
    #[must_use]
    pub const fn get(&self, key: StatKey) -> i32 {
        match key {
            StatKey::Health => self.health,
            StatKey::Hunger => self.hunger,
            StatKey::Thirst => self.thirst,
            StatKey::Fatigue => self.fatigue,
            StatKey::Morale => self.morale,
        }
    }

    pub fn add(&mut self, key: StatKey, amount: i32) {
        let slot = match key {
            StatKey::Health => &mut self.health,
            StatKey::Hunger => &mut self.hunger,
            StatKey::Thirst => &mut self.thirst,
            StatKey::Fatigue => &mut self.fatigue,
            StatKey::Morale => &mut self.morale,
        };
        *slot = slot.saturating_add(amount);
    }

    pub fn merge(&mut self, other: &Self) {
        for key in StatKey::ALL {
            self.add(key, other.get(key));
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        StatKey::ALL.iter().all(|key| self.get(*key) == 0)
    }
}

/// Survivor afflictions. Presence is boolean; additions and removals go
/// through the condition state machine or catalog effect routing only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Bleeding,
    Fracture,
    Infection,
    Fever,
    Hypothermia,
    Heatstroke,
    Dehydration,
    Pain,
    Poisoning,
    Exhaustion,
}

impl Condition {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Bleeding => "bleeding",
            Self::Fracture => "fracture",
            Self::Infection => "infection",
            Self::Fever => "fever",
            Self::Hypothermia => "hypothermia",
            Self::Heatstroke => "heatstroke",
            Self::Dehydration => "dehydration",
            Self::Pain => "pain",
            Self::Poisoning => "poisoning",
            Self::Exhaustion => "exhaustion",
        }
    }
}

/// Internal integer accumulators feeding condition hysteresis. Never
/// displayed directly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Meter {
    Noise,
    Visibility,
    Scent,
    ThirstStreak,
    HydrationRecovery,
    ColdExposure,
    FeverRest,
    FeverMedication,
    WarmStreak,
    ExhaustionScenes,
    CustomLastTurn,
}

impl Meter {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Noise => "noise",
            Self::Visibility => "visibility",
            Self::Scent => "scent",
            Self::ThirstStreak => "thirst_streak",
            Self::HydrationRecovery => "hydration_recovery",
            Self::ColdExposure => "cold_exposure",
            Self::FeverRest => "fever_rest",
            Self::FeverMedication => "fever_medication",
            Self::WarmStreak => "warm_streak",
            Self::ExhaustionScenes => "exhaustion_scenes",
            Self::CustomLastTurn => "custom_last_turn",
        }
    }

    /// All meters start at zero except the custom-action turn marker,
    /// which sits far in the past so the first custom action is never
    /// falsely rate-limited.
    #[must_use]
    pub const fn default_value(self) -> i64 {
        match self {
            Self::CustomLastTurn => CUSTOM_TURN_SENTINEL,
            _ => 0,
        }
    }
}

/// Owned meter map; unknown meters simply report their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Meters(BTreeMap<Meter, i64>);

impl Meters {
    #[must_use]
    pub fn value(&self, meter: Meter) -> i64 {
        self.0.get(&meter).copied().unwrap_or(meter.default_value())
    }

    pub fn set(&mut self, meter: Meter, value: i64) {
        self.0.insert(meter, value);
    }

    pub fn add(&mut self, meter: Meter, amount: i64) {
        let next = self.value(meter).saturating_add(amount);
        self.set(meter, next);
    }

    pub fn reset(&mut self, meter: Meter) {
        self.set(meter, 0);
    }

    /// Move the meter one step toward zero.
    pub fn decay(&mut self, meter: Meter) {
        let value = self.value(meter);
        self.set(meter, value - value.signum());
    }
}

/// Learned abilities, 0-5 per skill, raised by meaningful use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Scavenging,
    Medicine,
    Navigation,
    Crafting,
    Stealth,
    Diplomacy,
    Observation,
    Endurance,
    Leadership,
}

impl Skill {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Scavenging => "scavenging",
            Self::Medicine => "medicine",
            Self::Navigation => "navigation",
            Self::Crafting => "crafting",
            Self::Stealth => "stealth",
            Self::Diplomacy => "diplomacy",
            Self::Observation => "observation",
            Self::Endurance => "endurance",
            Self::Leadership => "leadership",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Skills {
    #[serde(default)]
    levels: BTreeMap<Skill, u8>,
    #[serde(default)]
    uses: BTreeMap<Skill, u8>,
}

impl Skills {
    #[must_use]
    pub fn level(&self, skill: Skill) -> u8 {
        self.levels.get(&skill).copied().unwrap_or(0)
    }

    /// Raise the floor for a skill without lowering an existing level.
    pub fn set_floor(&mut self, skill: Skill, floor: u8) {
        let level = self.level(skill).max(floor.min(SKILL_LEVEL_MAX));
        self.levels.insert(skill, level);
    }

    /// Record meaningful use; every few uses bumps the level by one.
    pub fn note_use(&mut self, skill: Skill) {
        let uses = self.uses.entry(skill).or_insert(0);
        *uses += 1;
        if *uses >= SKILL_USES_PER_LEVEL {
            *uses = 0;
            let level = self.levels.entry(skill).or_insert(0);
            *level = (*level + 1).min(SKILL_LEVEL_MAX);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Skill, u8)> + '_ {
        self.levels.iter().map(|(skill, level)| (*skill, *level))
    }
}

/// Fixed trait pool survivors draw from at generation time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TraitId {
    Resilient,
    IronStomach,
    LightSleeper,
    Optimist,
    QuickHands,
    EvenKeeled,
    NightOwl,
    Wiry,
}

impl TraitId {
    pub const POOL: [Self; 8] = [
        Self::Resilient,
        Self::IronStomach,
        Self::LightSleeper,
        Self::Optimist,
        Self::QuickHands,
        Self::EvenKeeled,
        Self::NightOwl,
        Self::Wiry,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Resilient => "resilient",
            Self::IronStomach => "iron_stomach",
            Self::LightSleeper => "light_sleeper",
            Self::Optimist => "optimist",
            Self::QuickHands => "quick_hands",
            Self::EvenKeeled => "even_keeled",
            Self::NightOwl => "night_owl",
            Self::Wiry => "wiry",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Midday,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [Self; 4] = [Self::Morning, Self::Midday, Self::Evening, Self::Night];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Midday => "midday",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Self; 4] = [Self::Spring, Self::Summer, Self::Autumn, Self::Winter];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Clear,
    Overcast,
    Rain,
    Snow,
    Storm,
    Fog,
}

impl Weather {
    pub const ALL: [Self; 6] = [
        Self::Clear,
        Self::Overcast,
        Self::Rain,
        Self::Snow,
        Self::Storm,
        Self::Fog,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Overcast => "overcast",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Storm => "storm",
            Self::Fog => "fog",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempBand {
    Freezing,
    Cold,
    Mild,
    Warm,
    Hot,
}

impl TempBand {
    pub const ALL: [Self; 5] = [
        Self::Freezing,
        Self::Cold,
        Self::Mild,
        Self::Warm,
        Self::Hot,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Freezing => "freezing",
            Self::Cold => "cold",
            Self::Mild => "mild",
            Self::Warm => "warm",
            Self::Hot => "hot",
        }
    }

    #[must_use]
    pub const fn is_cold(self) -> bool {
        matches!(self, Self::Freezing | Self::Cold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    City,
    Suburb,
    Town,
    Village,
    Rural,
    Forest,
    Coast,
    Mountain,
}

impl LocationType {
    pub const ALL: [Self; 8] = [
        Self::City,
        Self::Suburb,
        Self::Town,
        Self::Village,
        Self::Rural,
        Self::Forest,
        Self::Coast,
        Self::Mountain,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Suburb => "suburb",
            Self::Town => "town",
            Self::Village => "village",
            Self::Rural => "rural",
            Self::Forest => "forest",
            Self::Coast => "coast",
            Self::Mountain => "mountain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    #[default]
    Alone,
    Pair,
    Family,
    SmallGroup,
}

impl GroupKind {
    pub const ALL: [Self; 4] = [Self::Alone, Self::Pair, Self::Family, Self::SmallGroup];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Alone => "alone",
            Self::Pair => "pair",
            Self::Family => "family",
            Self::SmallGroup => "small_group",
        }
    }
}

/// Snapshot of the survivor's surroundings. Mutated only by explicit
/// day-sync or generation; `infected_present` is always recomputed from
/// the day counter and Local Arrival Day, never set directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub world_day: i32,
    pub time_of_day: TimeOfDay,
    pub season: Season,
    pub weather: Weather,
    pub temp_band: TempBand,
    pub region: String,
    pub location: LocationType,
    pub lad: i32,
    pub infected_present: bool,
    pub timezone: String,
    #[serde(default)]
    pub distance_km: Option<f64>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            world_day: 0,
            time_of_day: TimeOfDay::Morning,
            season: Season::Autumn,
            weather: Weather::Overcast,
            temp_band: TempBand::Mild,
            region: String::from("Unknown Region"),
            location: LocationType::Suburb,
            lad: 0,
            infected_present: true,
            timezone: String::from("UTC"),
            distance_km: None,
        }
    }
}

impl Environment {
    /// Advance to a world day and recompute infected presence.
    pub fn sync_day(&mut self, world_day: i32) {
        self.world_day = world_day;
        self.infected_present = self.world_day >= self.lad;
    }

    /// Assign the Local Arrival Day and recompute infected presence.
    pub fn set_lad(&mut self, lad: i32) {
        self.lad = lad;
        self.infected_present = self.world_day >= self.lad;
    }
}

/// String-keyed item counts. Item vocabulary lives in the catalog and
/// profession templates, not in code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Inventory {
    #[serde(default)]
    items: BTreeMap<String, u32>,
}

impl Inventory {
    pub fn grant(&mut self, item: &str, count: u32) {
        if count == 0 {
            return;
        }
        *self.items.entry(item.to_string()).or_insert(0) += count;
    }

    /// Remove up to `count` of an item; returns how many were removed.
    pub fn consume(&mut self, item: &str, count: u32) -> u32 {
        match self.items.get_mut(item) {
            Some(have) => {
                let taken = count.min(*have);
                *have -= taken;
                if *have == 0 {
                    self.items.remove(item);
                }
                taken
            }
            None => 0,
        }
    }

    #[must_use]
    pub fn count(&self, item: &str) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn has(&self, item: &str) -> bool {
        self.count(item) > 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.items.iter().map(|(item, count)| (item.as_str(), *count))
    }
}

/// The active playable character. Exactly one survivor is active at a
/// time; on death a replacement is generated and this value is dropped
/// after its terminal state has been archived externally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survivor {
    pub name: String,
    pub age: u8,
    pub background: String,
    pub traits: SmallVec<[TraitId; 3]>,
    pub skills: Skills,
    pub stats: Stats,
    pub conditions: BTreeSet<Condition>,
    pub meters: Meters,
    pub inventory: Inventory,
    pub env: Environment,
    #[serde(default)]
    pub group: GroupKind,
    #[serde(default = "default_group_size")]
    pub group_size: u8,
    pub alive: bool,
}

const fn default_group_size() -> u8 {
    1
}

impl Default for Survivor {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: 30,
            background: String::new(),
            traits: SmallVec::new(),
            skills: Skills::default(),
            stats: Stats::default(),
            conditions: BTreeSet::new(),
            meters: Meters::default(),
            inventory: Inventory::default(),
            env: Environment::default(),
            group: GroupKind::Alone,
            group_size: 1,
            alive: true,
        }
    }
}

impl Survivor {
    #[must_use]
    pub fn has_condition(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }

    /// Insert a condition; returns true when newly added.
    pub(crate) fn add_condition(&mut self, condition: Condition) -> bool {
        self.conditions.insert(condition)
    }

    /// Remove a condition; returns true when it was present.
    pub(crate) fn remove_condition(&mut self, condition: Condition) -> bool {
        self.conditions.remove(&condition)
    }

    /// Re-evaluate the alive flag from current health.
    pub fn evaluate_alive(&mut self) -> bool {
        self.alive = self.stats.health > 0;
        self.alive
    }
}

/// Hidden outbreak origin site. The player only ever sees the coarse
/// region label derived from the country code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginSite {
    pub id: String,
    pub city: String,
    pub country: String,
    pub timezone: String,
}

/// Small fixed catalog of candidate origin sites.
pub fn origin_sites() -> &'static [OriginSite] {
    static SITES: OnceLock<Vec<OriginSite>> = OnceLock::new();
    SITES.get_or_init(|| {
        let raw: [(&str, &str, &str, &str); 6] = [
            ("origin.volzhsk", "Volzhsk", "RU", "Europe/Moscow"),
            ("origin.kurashiki", "Kurashiki", "JP", "Asia/Tokyo"),
            ("origin.swindon", "Swindon", "GB", "Europe/London"),
            ("origin.macon", "Macon", "US", "America/New_York"),
            ("origin.sorocaba", "Sorocaba", "BR", "America/Sao_Paulo"),
            ("origin.polokwane", "Polokwane", "ZA", "Africa/Johannesburg"),
        ];
        raw.iter()
            .map(|(id, city, country, timezone)| OriginSite {
                id: (*id).to_string(),
                city: (*city).to_string(),
                country: (*country).to_string(),
                timezone: (*timezone).to_string(),
            })
            .collect()
    })
}

/// Run-wide singleton state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub origin: OriginSite,
    pub seed: RunSeed,
    pub rules_version: String,
    day: i32,
}

impl World {
    /// Build a world by choosing an origin site from the seed's world
    /// stream.
    #[must_use]
    pub fn generate(seed: RunSeed, rules_version: &str) -> Self {
        let mut stream = seed.stream("world.origin");
        let sites = origin_sites();
        let index = stream.bounded(sites.len() as u64) as usize;
        Self {
            origin: sites[index].clone(),
            seed,
            rules_version: rules_version.to_string(),
            day: 0,
        }
    }

    #[must_use]
    pub const fn day(&self) -> i32 {
        self.day
    }

    /// Advance the global day counter by one.
    pub fn advance_day(&mut self) {
        self.day = self.day.saturating_add(1);
    }

    /// Move the day counter forward; the counter never decreases.
    pub fn sync_day(&mut self, day: i32) {
        self.day = self.day.max(day);
    }
}
