//! Event catalog: blueprints loaded from JSON, validated before use.
//!
//! The catalog is static data. Nothing here draws randomness or mutates
//! survivor state; selection and choice resolution interpret it.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::choice::{Archetype, RiskLevel};
use crate::constants::{
    MIN_CHOICES_PER_EVENT, MIN_TIME_COST, RARITY_WEIGHT_COMMON, RARITY_WEIGHT_RARE,
    RARITY_WEIGHT_UNCOMMON,
};
use crate::state::{Condition, LocationType, Meter, Skill, StatKey, TimeOfDay};

/// Baked-in default catalog.
const DEFAULT_CATALOG_JSON: &str = include_str!("../assets/events.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("event with empty id")]
    EmptyEventId,
    #[error("duplicate event id '{0}'")]
    DuplicateEvent(String),
    #[error("event '{event}' has {count} choice templates, need at least {MIN_CHOICES_PER_EVENT}")]
    TooFewChoices { event: String, count: usize },
    #[error("event '{event}' choice '{choice}' has zero time cost")]
    ZeroTimeCost { event: String, choice: String },
    #[error("event '{event}' choice '{choice}' outcome range has min > max")]
    InvertedOutcome { event: String, choice: String },
    #[error("event '{event}' declares a skill gate with no skills")]
    EmptySkillGate { event: String },
    #[error("event '{event}' arc step must be at least 1")]
    BadArcStep { event: String },
    #[error("event '{event}' arc references unknown event '{target}'")]
    DanglingArcCandidate { event: String, target: String },
}

/// Spawn frequency band; weights feed the selection lottery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
}

impl Rarity {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
        }
    }

    #[must_use]
    pub(crate) const fn weight(self) -> u32 {
        match self {
            Self::Common => RARITY_WEIGHT_COMMON,
            Self::Uncommon => RARITY_WEIGHT_UNCOMMON,
            Self::Rare => RARITY_WEIGHT_RARE,
        }
    }
}

/// Which phase of the run an event belongs to, relative to the Local
/// Arrival Day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventTier {
    /// Eligible only before infected arrive locally.
    PreArrival,
    /// Eligible only once infected are present.
    PostArrival,
    /// Eligible only for the researcher opening branch (pre-outbreak
    /// world days).
    Researcher,
    #[default]
    Any,
}

/// Skill gate: any listed skill at or above the level satisfies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGate {
    pub skills: Vec<Skill>,
    pub level: u8,
}

impl SkillGate {
    #[must_use]
    pub(crate) fn passes(&self, skills: &crate::state::Skills) -> bool {
        self.skills.iter().any(|skill| skills.level(*skill) >= self.level)
    }
}

/// Position of the current world day relative to the Local Arrival Day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LadRelation {
    Before,
    At,
    After,
}

/// Static eligibility filters evaluated against the survivor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Preconditions {
    #[serde(default)]
    pub tier: EventTier,
    #[serde(default)]
    pub lad_relation: Option<LadRelation>,
    /// Empty means any location.
    #[serde(default)]
    pub locations: Vec<LocationType>,
    /// Empty means any time of day.
    #[serde(default)]
    pub times_of_day: Vec<TimeOfDay>,
    #[serde(default)]
    pub require_conditions: Vec<Condition>,
    #[serde(default)]
    pub forbid_conditions: Vec<Condition>,
    #[serde(default)]
    pub require_items: Vec<String>,
    /// Every group must pass; within a group any skill suffices.
    #[serde(default)]
    pub skill_gates: Vec<SkillGate>,
    #[serde(default)]
    pub min_world_day: Option<i32>,
    #[serde(default)]
    pub max_world_day: Option<i32>,
}

/// Multi-scene arc membership. Arcs sequence events by step number with
/// a minimum scene delay before the next step becomes eligible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcDescriptor {
    pub arc_id: String,
    /// 1-based position within the arc.
    pub step: u32,
    /// Scenes that must pass after this step before a successor fires.
    #[serde(default)]
    pub next_min_delay_scenes: i64,
    /// Event ids eligible as the following step.
    #[serde(default)]
    pub next_candidates: Vec<String>,
}

/// Inclusive stat-change range drawn at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRange {
    pub min: i32,
    pub max: i32,
}

impl OutcomeRange {
    pub(crate) fn draw<R: Rng>(&self, rng: &mut R) -> i32 {
        if self.min == self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Non-stat side effects of resolving a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EffectSpec {
    #[serde(default)]
    pub add_conditions: Vec<Condition>,
    #[serde(default)]
    pub remove_conditions: Vec<Condition>,
    #[serde(default)]
    pub meter_deltas: BTreeMap<Meter, i64>,
    #[serde(default)]
    pub grant_items: Vec<(String, u32)>,
    #[serde(default)]
    pub consume_items: Vec<(String, u32)>,
}

const fn default_time_cost() -> u32 {
    MIN_TIME_COST
}

/// Authored choice, pre-projection. Selection gates and re-ranks these
/// into presentable [`crate::choice::Choice`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceTemplate {
    pub id: String,
    pub label: String,
    pub archetype: Archetype,
    #[serde(default = "default_time_cost")]
    pub time_cost: u32,
    #[serde(default)]
    pub fatigue_cost: i32,
    #[serde(default)]
    pub hunger_cost: i32,
    #[serde(default)]
    pub thirst_cost: i32,
    #[serde(default)]
    pub risk: RiskLevel,
    #[serde(default)]
    pub outcomes: BTreeMap<StatKey, OutcomeRange>,
    #[serde(default)]
    pub effects: EffectSpec,
    #[serde(default)]
    pub skill_gate: Option<SkillGate>,
    #[serde(default)]
    pub require_conditions: Vec<Condition>,
    #[serde(default)]
    pub forbid_conditions: Vec<Condition>,
    /// Dropped while the survivor is exhausted.
    #[serde(default)]
    pub high_exertion: bool,
    /// Flavour choice surfaced only at rich text density.
    #[serde(default)]
    pub low_impact: bool,
}

/// One authored event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBlueprint {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub rarity: Rarity,
    /// Scenes the event stays ineligible after firing.
    #[serde(default)]
    pub cooldown_scenes: i64,
    /// Fires at most once per run.
    #[serde(default)]
    pub once: bool,
    #[serde(default)]
    pub preconditions: Preconditions,
    #[serde(default)]
    pub arc: Option<ArcDescriptor>,
    pub choices: Vec<ChoiceTemplate>,
}

/// Validated, indexed event collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCatalog {
    events: Vec<EventBlueprint>,
}

impl EventCatalog {
    /// Parse and validate a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on malformed JSON or any violated
    /// authoring invariant.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let events: Vec<EventBlueprint> = serde_json::from_str(json)?;
        let catalog = Self { events };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load the baked-in default catalog. The asset is validated in CI
    /// and covered by tests, so failure here is a packaging defect.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the shipped asset fails validation.
    pub fn load_default() -> Result<Self, CatalogError> {
        Self::from_json(DEFAULT_CATALOG_JSON)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut ids = BTreeSet::new();
        for event in &self.events {
            if event.id.trim().is_empty() {
                return Err(CatalogError::EmptyEventId);
            }
            if !ids.insert(event.id.as_str()) {
                return Err(CatalogError::DuplicateEvent(event.id.clone()));
            }
        }
        for event in &self.events {
            if event.choices.len() < MIN_CHOICES_PER_EVENT {
                return Err(CatalogError::TooFewChoices {
                    event: event.id.clone(),
                    count: event.choices.len(),
                });
            }
            if event
                .preconditions
                .skill_gates
                .iter()
                .any(|gate| gate.skills.is_empty())
            {
                return Err(CatalogError::EmptySkillGate {
                    event: event.id.clone(),
                });
            }
            for choice in &event.choices {
                if choice
                    .skill_gate
                    .as_ref()
                    .is_some_and(|gate| gate.skills.is_empty())
                {
                    return Err(CatalogError::EmptySkillGate {
                        event: event.id.clone(),
                    });
                }
                if choice.time_cost < MIN_TIME_COST {
                    return Err(CatalogError::ZeroTimeCost {
                        event: event.id.clone(),
                        choice: choice.id.clone(),
                    });
                }
                for range in choice.outcomes.values() {
                    if range.min > range.max {
                        return Err(CatalogError::InvertedOutcome {
                            event: event.id.clone(),
                            choice: choice.id.clone(),
                        });
                    }
                }
            }
            if let Some(arc) = &event.arc {
                if arc.step == 0 {
                    return Err(CatalogError::BadArcStep {
                        event: event.id.clone(),
                    });
                }
                for target in &arc.next_candidates {
                    if !ids.contains(target.as_str()) {
                        return Err(CatalogError::DanglingArcCandidate {
                            event: event.id.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn events(&self) -> &[EventBlueprint] {
        &self.events
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&EventBlueprint> {
        self.events.iter().find(|event| event.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_parses_and_validates() {
        let catalog = EventCatalog::load_default().expect("shipped catalog must validate");
        assert!(catalog.len() >= 10);
        for event in catalog.events() {
            assert!(event.choices.len() >= 2, "{} too few choices", event.id);
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let json = r#"[
            {"id": "a", "title": "A", "choices": [
                {"id": "a1", "label": "one", "archetype": "rest"},
                {"id": "a2", "label": "two", "archetype": "observe"}
            ]},
            {"id": "a", "title": "A again", "choices": [
                {"id": "b1", "label": "one", "archetype": "rest"},
                {"id": "b2", "label": "two", "archetype": "observe"}
            ]}
        ]"#;
        assert!(matches!(
            EventCatalog::from_json(json),
            Err(CatalogError::DuplicateEvent(id)) if id == "a"
        ));
    }

    #[test]
    fn single_choice_event_is_rejected() {
        let json = r#"[
            {"id": "solo", "title": "Solo", "choices": [
                {"id": "only", "label": "only", "archetype": "rest"}
            ]}
        ]"#;
        assert!(matches!(
            EventCatalog::from_json(json),
            Err(CatalogError::TooFewChoices { count: 1, .. })
        ));
    }

    #[test]
    fn zero_time_cost_is_rejected() {
        let json = r#"[
            {"id": "fast", "title": "Fast", "choices": [
                {"id": "c1", "label": "one", "archetype": "rest", "time_cost": 0},
                {"id": "c2", "label": "two", "archetype": "observe"}
            ]}
        ]"#;
        assert!(matches!(
            EventCatalog::from_json(json),
            Err(CatalogError::ZeroTimeCost { .. })
        ));
    }

    #[test]
    fn inverted_outcome_range_is_rejected() {
        let json = r#"[
            {"id": "bad", "title": "Bad", "choices": [
                {"id": "c1", "label": "one", "archetype": "rest",
                 "outcomes": {"morale": {"min": 5, "max": 2}}},
                {"id": "c2", "label": "two", "archetype": "observe"}
            ]}
        ]"#;
        assert!(matches!(
            EventCatalog::from_json(json),
            Err(CatalogError::InvertedOutcome { .. })
        ));
    }

    #[test]
    fn dangling_arc_candidate_is_rejected() {
        let json = r#"[
            {"id": "arc_start", "title": "Start",
             "arc": {"arc_id": "trail", "step": 1, "next_candidates": ["missing"]},
             "choices": [
                {"id": "c1", "label": "one", "archetype": "rest"},
                {"id": "c2", "label": "two", "archetype": "observe"}
            ]}
        ]"#;
        assert!(matches!(
            EventCatalog::from_json(json),
            Err(CatalogError::DanglingArcCandidate { target, .. }) if target == "missing"
        ));
    }

    #[test]
    fn arc_steps_are_one_based() {
        let json = r#"[
            {"id": "arc_zero", "title": "Zero",
             "arc": {"arc_id": "trail", "step": 0},
             "choices": [
                {"id": "c1", "label": "one", "archetype": "rest"},
                {"id": "c2", "label": "two", "archetype": "observe"}
            ]}
        ]"#;
        assert!(matches!(
            EventCatalog::from_json(json),
            Err(CatalogError::BadArcStep { .. })
        ));
    }

    #[test]
    fn rarity_weights_are_ordered() {
        assert!(Rarity::Common.weight() > Rarity::Uncommon.weight());
        assert!(Rarity::Uncommon.weight() > Rarity::Rare.weight());
        assert_eq!(Rarity::Rare.weight(), 1);
    }
}
