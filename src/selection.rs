//! Event selection: eligibility filtering, arc sequencing and the
//! rarity-weighted lottery.
//!
//! Selection is read-only over survivor and history; committing the
//! returned [`HistoryUpdate`] is the caller's move, after the scene is
//! actually presented.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{
    ArcDescriptor, EventBlueprint, EventCatalog, EventTier, LadRelation, Preconditions,
};
use crate::choice::{adjust_risk, Choice};
use crate::config::{SimConfig, TextDensity};
use crate::constants::{MAX_CHOICES_PER_EVENT, MIN_CHOICES_PER_EVENT};
use crate::history::{ArcProgress, EventHistory, HistoryUpdate};
use crate::state::{Condition, Survivor};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no eligible events for this scene")]
    NoEligibleEvents,
    #[error("unknown event id '{0}'")]
    UnknownEvent(String),
    #[error("event '{0}' is on cooldown")]
    OnCooldown(String),
    #[error("event '{0}' already fired this run")]
    AlreadyFired(String),
    #[error("event '{event}' projects {count} choices, need at least {MIN_CHOICES_PER_EVENT}")]
    ChoiceCount { event: String, count: usize },
}

/// Why a candidate was filtered out, recorded for telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    Tier,
    LadRelation,
    Location,
    TimeOfDay,
    Conditions,
    Items,
    Skills,
    WorldDay,
    OnceSpent,
    Cooldown,
    ArcOrder,
    ChoiceCount,
}

/// Deterministic record of one selection pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionTrace {
    pub scene: i64,
    pub considered: usize,
    pub rejected: Vec<(String, RejectReason)>,
    pub eligible: Vec<String>,
    /// Set when arc sequencing narrowed the lottery to due successors.
    pub arc_narrowed: bool,
    pub total_weight: u32,
    pub selected: String,
}

/// Borrowed inputs for one selection pass.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    pub survivor: &'a Survivor,
    pub config: &'a SimConfig,
    pub catalog: &'a EventCatalog,
    pub history: &'a EventHistory,
    pub scene: i64,
}

/// A selected event with its projected choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSelection {
    pub event_id: String,
    pub title: String,
    pub choices: Vec<Choice>,
    pub trace: SelectionTrace,
    cooldown_scenes: i64,
    arc: Option<ArcDescriptor>,
}

impl EventSelection {
    /// The history commit for this selection at the given scene.
    #[must_use]
    pub fn history_update(&self, scene: i64) -> HistoryUpdate {
        HistoryUpdate {
            event_id: self.event_id.clone(),
            scene,
            cooldown_until: scene + self.cooldown_scenes.max(0),
            arc: self.arc.as_ref().map(|arc| ArcProgress {
                arc_id: arc.arc_id.clone(),
                step: arc.step,
                event_id: self.event_id.clone(),
            }),
        }
    }
}

fn tier_allows(tier: EventTier, survivor: &Survivor) -> bool {
    match tier {
        EventTier::PreArrival => !survivor.env.infected_present,
        EventTier::PostArrival => survivor.env.infected_present,
        EventTier::Researcher => survivor.env.world_day < 0,
        EventTier::Any => true,
    }
}

fn lad_relation_holds(relation: LadRelation, survivor: &Survivor) -> bool {
    let day = survivor.env.world_day;
    let lad = survivor.env.lad;
    match relation {
        LadRelation::Before => day < lad,
        LadRelation::At => day == lad,
        LadRelation::After => day > lad,
    }
}

fn preconditions_reject(pre: &Preconditions, survivor: &Survivor) -> Option<RejectReason> {
    if !tier_allows(pre.tier, survivor) {
        return Some(RejectReason::Tier);
    }
    if pre
        .lad_relation
        .is_some_and(|relation| !lad_relation_holds(relation, survivor))
    {
        return Some(RejectReason::LadRelation);
    }
    if !pre.locations.is_empty() && !pre.locations.contains(&survivor.env.location) {
        return Some(RejectReason::Location);
    }
    if !pre.times_of_day.is_empty() && !pre.times_of_day.contains(&survivor.env.time_of_day) {
        return Some(RejectReason::TimeOfDay);
    }
    if pre
        .require_conditions
        .iter()
        .any(|condition| !survivor.has_condition(*condition))
        || pre
            .forbid_conditions
            .iter()
            .any(|condition| survivor.has_condition(*condition))
    {
        return Some(RejectReason::Conditions);
    }
    if pre.require_items.iter().any(|item| !survivor.inventory.has(item)) {
        return Some(RejectReason::Items);
    }
    if pre.skill_gates.iter().any(|gate| !gate.passes(&survivor.skills)) {
        return Some(RejectReason::Skills);
    }
    let day = survivor.env.world_day;
    if pre.min_world_day.is_some_and(|min| day < min)
        || pre.max_world_day.is_some_and(|max| day > max)
    {
        return Some(RejectReason::WorldDay);
    }
    None
}

/// Arc gate: step 1 only starts an untouched arc; later steps require
/// the predecessor step, its scene delay elapsed, and membership in the
/// predecessor's successor list.
fn arc_rejects(
    event: &EventBlueprint,
    catalog: &EventCatalog,
    history: &EventHistory,
    scene: i64,
) -> bool {
    let Some(arc) = &event.arc else {
        return false;
    };
    let record = history.arc(&arc.arc_id);
    if arc.step == 1 {
        return record.is_some();
    }
    let Some(record) = record else {
        return true;
    };
    if record.last_step != arc.step - 1 {
        return true;
    }
    let Some(previous) = catalog.get(&record.last_event_id) else {
        return true;
    };
    let Some(previous_arc) = &previous.arc else {
        return true;
    };
    // An empty candidate list means any same-arc successor qualifies.
    if !previous_arc.next_candidates.is_empty()
        && !previous_arc.next_candidates.iter().any(|id| id == &event.id)
    {
        return true;
    }
    scene - record.last_scene < previous_arc.next_min_delay_scenes
}

/// Project an event's choice templates against the survivor.
fn project_choices(
    event: &EventBlueprint,
    survivor: &Survivor,
    config: &SimConfig,
) -> Result<Vec<Choice>, SelectionError> {
    let exhausted = survivor.has_condition(Condition::Exhaustion);
    let mut choices = Vec::new();
    for template in &event.choices {
        if template.high_exertion && exhausted {
            continue;
        }
        if template.low_impact && config.text_density != TextDensity::Rich {
            continue;
        }
        if template
            .require_conditions
            .iter()
            .any(|condition| !survivor.has_condition(*condition))
            || template
                .forbid_conditions
                .iter()
                .any(|condition| survivor.has_condition(*condition))
        {
            continue;
        }
        if let Some(gate) = &template.skill_gate {
            if !gate.passes(&survivor.skills) {
                continue;
            }
        }
        let index = choices.len() as i32;
        choices.push(Choice {
            index,
            id: template.id.clone(),
            label: template.label.clone(),
            archetype: template.archetype,
            time_cost: template.time_cost,
            fatigue_cost: template.fatigue_cost,
            hunger_cost: template.hunger_cost,
            thirst_cost: template.thirst_cost,
            risk: adjust_risk(template.risk, template.archetype, survivor, config.difficulty),
            outcomes: template.outcomes.clone(),
            effects: template.effects.clone(),
        });
        if choices.len() == MAX_CHOICES_PER_EVENT {
            break;
        }
    }
    if choices.len() < MIN_CHOICES_PER_EVENT {
        return Err(SelectionError::ChoiceCount {
            event: event.id.clone(),
            count: choices.len(),
        });
    }
    Ok(choices)
}

fn build_selection(
    event: &EventBlueprint,
    choices: Vec<Choice>,
    trace: SelectionTrace,
) -> EventSelection {
    EventSelection {
        event_id: event.id.clone(),
        title: event.title.clone(),
        choices,
        trace,
        cooldown_scenes: event.cooldown_scenes,
        arc: event.arc.clone(),
    }
}

/// Select an event for the scene via the rarity-weighted lottery.
///
/// Due arc successors pre-empt the general pool so arcs advance as soon
/// as their delays allow.
///
/// # Errors
///
/// Returns [`SelectionError::NoEligibleEvents`] when every candidate is
/// filtered out.
pub fn select_event<R: Rng>(
    req: &SelectionRequest<'_>,
    rng: &mut R,
) -> Result<EventSelection, SelectionError> {
    let mut rejected = Vec::new();
    let mut eligible: Vec<&EventBlueprint> = Vec::new();
    for event in req.catalog.events() {
        if let Some(reason) = preconditions_reject(&event.preconditions, req.survivor) {
            rejected.push((event.id.clone(), reason));
            continue;
        }
        if event.once && req.history.has_fired(&event.id) {
            rejected.push((event.id.clone(), RejectReason::OnceSpent));
            continue;
        }
        if req.history.on_cooldown(&event.id, req.scene) {
            rejected.push((event.id.clone(), RejectReason::Cooldown));
            continue;
        }
        if arc_rejects(event, req.catalog, req.history, req.scene) {
            rejected.push((event.id.clone(), RejectReason::ArcOrder));
            continue;
        }
        if project_choices(event, req.survivor, req.config).is_err() {
            rejected.push((event.id.clone(), RejectReason::ChoiceCount));
            continue;
        }
        eligible.push(event);
    }

    let arc_due: Vec<&EventBlueprint> = eligible
        .iter()
        .copied()
        .filter(|event| event.arc.as_ref().is_some_and(|arc| arc.step > 1))
        .collect();
    let arc_narrowed = !arc_due.is_empty();
    let pool = if arc_narrowed { &arc_due } else { &eligible };
    if pool.is_empty() {
        return Err(SelectionError::NoEligibleEvents);
    }

    let total_weight: u32 = pool.iter().map(|event| event.rarity.weight()).sum();
    let mut roll = rng.gen_range(0..total_weight);
    let mut picked = pool[pool.len() - 1];
    for event in pool.iter().copied() {
        let weight = event.rarity.weight();
        if roll < weight {
            picked = event;
            break;
        }
        roll -= weight;
    }

    let choices = project_choices(picked, req.survivor, req.config)?;
    let trace = SelectionTrace {
        scene: req.scene,
        considered: req.catalog.len(),
        rejected,
        eligible: eligible.iter().map(|event| event.id.clone()).collect(),
        arc_narrowed,
        total_weight,
        selected: picked.id.clone(),
    };
    Ok(build_selection(picked, choices, trace))
}

/// Resolve a specific event id, bypassing the lottery but not the
/// repetition rules.
///
/// # Errors
///
/// Returns [`SelectionError`] when the id is unknown, spent, on
/// cooldown, or cannot project enough choices.
pub fn resolve_event(
    req: &SelectionRequest<'_>,
    event_id: &str,
) -> Result<EventSelection, SelectionError> {
    let event = req
        .catalog
        .get(event_id)
        .ok_or_else(|| SelectionError::UnknownEvent(event_id.to_string()))?;
    if event.once && req.history.has_fired(&event.id) {
        return Err(SelectionError::AlreadyFired(event.id.clone()));
    }
    if req.history.on_cooldown(&event.id, req.scene) {
        return Err(SelectionError::OnCooldown(event.id.clone()));
    }
    let choices = project_choices(event, req.survivor, req.config)?;
    let trace = SelectionTrace {
        scene: req.scene,
        considered: 1,
        rejected: Vec::new(),
        eligible: vec![event.id.clone()],
        arc_narrowed: false,
        total_weight: event.rarity.weight(),
        selected: event.id.clone(),
    };
    Ok(build_selection(event, choices, trace))
}
