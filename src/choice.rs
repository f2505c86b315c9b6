//! Choice resolution: costs, outcome draws, risk adjustment, death check.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{EffectSpec, OutcomeRange};
use crate::config::{Difficulty, SimConfig};
use crate::conditions::{self, ConditionContext};
use crate::constants::{
    BASELINE_DRAIN_EASY, BASELINE_DRAIN_HARD, BASELINE_DRAIN_STANDARD, RISK_SKILL_DISCOUNT_LEVEL,
    RISK_SKILL_PENALTY_LEVEL, SCARCITY_GAIN_FACTOR,
};
use crate::numbers::{i32_to_f32, round_f32_to_i32};
use crate::state::{Condition, Meter, Skill, StatDelta, StatKey, Survivor};

/// Index used for choices synthesized outside the catalog.
pub const SYNTHETIC_CHOICE_INDEX: i32 = -1;

/// Broad intent categories every choice maps to. Risk adjustment and
/// skill progression key off the archetype, not the individual choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Rest,
    Forage,
    Scout,
    Organize,
    Barricade,
    Craft,
    Diplomacy,
    Observe,
    Travel,
}

impl Archetype {
    pub const ALL: [Self; 9] = [
        Self::Rest,
        Self::Forage,
        Self::Scout,
        Self::Organize,
        Self::Barricade,
        Self::Craft,
        Self::Diplomacy,
        Self::Observe,
        Self::Travel,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Rest => "rest",
            Self::Forage => "forage",
            Self::Scout => "scout",
            Self::Organize => "organize",
            Self::Barricade => "barricade",
            Self::Craft => "craft",
            Self::Diplomacy => "diplomacy",
            Self::Observe => "observe",
            Self::Travel => "travel",
        }
    }

    /// The skill exercised by acting on this archetype.
    #[must_use]
    pub const fn skill(self) -> Skill {
        match self {
            Self::Rest => Skill::Endurance,
            Self::Forage => Skill::Scavenging,
            Self::Scout => Skill::Stealth,
            Self::Organize => Skill::Leadership,
            Self::Barricade | Self::Craft => Skill::Crafting,
            Self::Diplomacy => Skill::Diplomacy,
            Self::Observe => Skill::Observation,
            Self::Travel => Skill::Navigation,
        }
    }

    #[must_use]
    pub const fn is_physical(self) -> bool {
        matches!(
            self,
            Self::Forage | Self::Scout | Self::Barricade | Self::Craft | Self::Travel
        )
    }

    #[must_use]
    pub const fn is_passive(self) -> bool {
        matches!(self, Self::Rest | Self::Observe)
    }

    #[must_use]
    pub const fn is_gathering(self) -> bool {
        matches!(self, Self::Forage)
    }
}

/// Three-level risk band attached to every presented choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }

    #[must_use]
    pub const fn score(self) -> i32 {
        match self {
            Self::Low => 0,
            Self::Moderate => 1,
            Self::High => 2,
        }
    }

    #[must_use]
    pub const fn from_score(score: i32) -> Self {
        match score {
            i32::MIN..=0 => Self::Low,
            1 => Self::Moderate,
            _ => Self::High,
        }
    }
}

/// A fully projected, presentable choice. Produced by event selection or
/// the custom-action interpreter; consumed once by [`apply_choice`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Position within the presented list, or [`SYNTHETIC_CHOICE_INDEX`]
    /// for custom actions.
    pub index: i32,
    pub id: String,
    pub label: String,
    pub archetype: Archetype,
    pub time_cost: u32,
    #[serde(default)]
    pub fatigue_cost: i32,
    #[serde(default)]
    pub hunger_cost: i32,
    #[serde(default)]
    pub thirst_cost: i32,
    pub risk: RiskLevel,
    #[serde(default)]
    pub outcomes: BTreeMap<StatKey, OutcomeRange>,
    #[serde(default)]
    pub effects: EffectSpec,
}

/// Shift a choice's base risk by survivor competence, afflictions and
/// difficulty, clamped back into the three-level band.
#[must_use]
pub fn adjust_risk(
    base: RiskLevel,
    archetype: Archetype,
    survivor: &Survivor,
    difficulty: Difficulty,
) -> RiskLevel {
    let mut score = base.score();
    let skill = survivor.skills.level(archetype.skill());
    if skill >= RISK_SKILL_DISCOUNT_LEVEL {
        score -= 1;
    } else if skill <= RISK_SKILL_PENALTY_LEVEL {
        score += 1;
    }
    if survivor.has_condition(Condition::Bleeding) && archetype.is_physical() {
        score += 1;
    }
    if survivor.has_condition(Condition::Dehydration)
        && matches!(archetype, Archetype::Forage | Archetype::Travel)
    {
        score += 1;
    }
    if survivor.has_condition(Condition::Fever)
        && matches!(
            archetype,
            Archetype::Observe | Archetype::Scout | Archetype::Organize
        )
    {
        score += 1;
    }
    if survivor.has_condition(Condition::Hypothermia)
        && matches!(archetype, Archetype::Observe | Archetype::Forage)
    {
        score += 1;
    }
    if survivor.has_condition(Condition::Exhaustion) && archetype.is_physical() {
        score += 1;
    }
    match difficulty {
        Difficulty::Easy if archetype.is_passive() => score -= 1,
        Difficulty::Hard if archetype.is_gathering() => score += 1,
        _ => {}
    }
    RiskLevel::from_score(score.clamp(0, 2))
}

/// Everything that changed while resolving one choice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    pub delta: StatDelta,
    pub added: Vec<Condition>,
    pub removed: Vec<Condition>,
    pub died: bool,
}

const fn baseline_drain(difficulty: Difficulty) -> (i32, i32, i32) {
    match difficulty {
        Difficulty::Easy => BASELINE_DRAIN_EASY,
        Difficulty::Standard => BASELINE_DRAIN_STANDARD,
        Difficulty::Hard => BASELINE_DRAIN_HARD,
    }
}

fn scarcity_dampen(key: StatKey, value: i32, config: &SimConfig) -> i32 {
    // Negative hunger/thirst deltas are resource gains; scarcity shrinks
    // them toward zero. Harmful deltas pass through untouched.
    if config.scarcity && matches!(key, StatKey::Hunger | StatKey::Thirst) && value < 0 {
        round_f32_to_i32(i32_to_f32(value) * SCARCITY_GAIN_FACTOR)
    } else {
        value
    }
}

/// Resolve a choice against the survivor.
///
/// Order: draw outcome ranges, apply scarcity dampening and explicit
/// costs, add the difficulty baseline drain, apply the merged delta,
/// route catalog effects, advance the condition state machine, then
/// re-evaluate death. The survivor is mutated in place.
pub fn apply_choice<R: Rng>(
    survivor: &mut Survivor,
    choice: &Choice,
    config: &SimConfig,
    scene: i64,
    rng: &mut R,
) -> ResolutionOutcome {
    let mut delta = StatDelta::default();
    for (key, range) in &choice.outcomes {
        let drawn = range.draw(rng);
        delta.add(*key, scarcity_dampen(*key, drawn, config));
    }

    delta.add(StatKey::Fatigue, choice.fatigue_cost);
    delta.add(StatKey::Hunger, choice.hunger_cost);
    delta.add(StatKey::Thirst, choice.thirst_cost);

    let (hunger, thirst, fatigue) = baseline_drain(config.difficulty);
    delta.add(StatKey::Hunger, hunger);
    delta.add(StatKey::Thirst, thirst);
    delta.add(StatKey::Fatigue, fatigue);

    survivor.stats.apply(&delta);

    let mut added = Vec::new();
    let mut removed = Vec::new();
    for condition in &choice.effects.add_conditions {
        if survivor.add_condition(*condition) {
            added.push(*condition);
        }
    }
    for condition in &choice.effects.remove_conditions {
        if survivor.remove_condition(*condition) {
            removed.push(*condition);
        }
    }
    for (meter, amount) in &choice.effects.meter_deltas {
        survivor.meters.add(*meter, *amount);
    }
    for (item, count) in &choice.effects.grant_items {
        survivor.inventory.grant(item, *count);
    }
    for (item, count) in &choice.effects.consume_items {
        survivor.inventory.consume(item, *count);
    }

    let tick = conditions::advance(
        survivor,
        &ConditionContext {
            thirst_delta: delta.thirst,
            archetype: Some(choice.archetype),
            difficulty: config.difficulty,
        },
    );
    delta.merge(&tick.drain);
    added.extend(tick.added);
    removed.extend(tick.removed);

    survivor.skills.note_use(choice.archetype.skill());
    if choice.index == SYNTHETIC_CHOICE_INDEX {
        survivor.meters.set(Meter::CustomLastTurn, scene);
    }

    let alive = survivor.evaluate_alive();
    ResolutionOutcome {
        delta,
        added,
        removed,
        died: !alive,
    }
}
