//! Free-text custom actions.
//!
//! Player text is matched against a small keyword vocabulary and mapped
//! onto fixed, conservative choice templates. Anything the vocabulary
//! cannot place is refused rather than guessed at.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::catalog::{EffectSpec, OutcomeRange};
use crate::choice::{adjust_risk, Archetype, Choice, RiskLevel, SYNTHETIC_CHOICE_INDEX};
use crate::config::SimConfig;
use crate::constants::{CUSTOM_ACTION_COOLDOWN_SCENES, CUSTOM_FATIGUE_GATE, CUSTOM_NEEDS_GATE};
use crate::state::{Meter, StatKey, Survivor};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomActionError {
    #[error("could not map the text to a supported action")]
    UnsupportedAction,
    #[error("custom actions need {scenes_remaining} more scene(s) before reuse")]
    OnCooldown { scenes_remaining: i64 },
    #[error("too fatigued for anything but rest")]
    FatigueCritical,
    #[error("hunger or thirst is critical, only foraging makes sense")]
    NeedsCritical,
}

/// Keyword vocabulary in precedence order: the first group with a match
/// wins, so "rest before scouting" resolves to rest.
const VOCAB: [(&[&str], Archetype); 5] = [
    (&["rest", "sleep", "nap", "lie down", "recover"], Archetype::Rest),
    (
        &["forage", "scavenge", "search for food", "look for food", "find water", "gather"],
        Archetype::Forage,
    ),
    (
        &["scout", "explore", "look around", "survey", "recon"],
        Archetype::Scout,
    ),
    (
        &["organize", "sort", "take stock", "inventory", "plan"],
        Archetype::Organize,
    ),
    (
        &["barricade", "board up", "fortify", "block", "reinforce"],
        Archetype::Barricade,
    ),
];

/// Archetypes whose custom template gets riskier once infected are
/// present locally.
const fn exposed(archetype: Archetype) -> bool {
    matches!(
        archetype,
        Archetype::Forage | Archetype::Scout | Archetype::Barricade
    )
}

fn match_archetype(text: &str) -> Option<Archetype> {
    let normalized = text.to_lowercase();
    for (keywords, archetype) in &VOCAB {
        if keywords.iter().any(|keyword| normalized.contains(keyword)) {
            return Some(*archetype);
        }
    }
    None
}

fn template(archetype: Archetype, survivor: &Survivor, config: &SimConfig) -> Choice {
    let mut outcomes = BTreeMap::new();
    let mut fatigue_cost = 0;
    match archetype {
        Archetype::Rest => {
            outcomes.insert(StatKey::Fatigue, OutcomeRange { min: -15, max: -8 });
            outcomes.insert(StatKey::Morale, OutcomeRange { min: 0, max: 2 });
        }
        Archetype::Forage => {
            outcomes.insert(StatKey::Hunger, OutcomeRange { min: -12, max: -4 });
            outcomes.insert(StatKey::Thirst, OutcomeRange { min: -8, max: -2 });
            fatigue_cost = 6;
        }
        Archetype::Scout => {
            outcomes.insert(StatKey::Morale, OutcomeRange { min: 0, max: 2 });
            fatigue_cost = 5;
        }
        Archetype::Organize => {
            outcomes.insert(StatKey::Morale, OutcomeRange { min: 1, max: 3 });
            fatigue_cost = 3;
        }
        Archetype::Barricade => {
            outcomes.insert(StatKey::Morale, OutcomeRange { min: 1, max: 2 });
            fatigue_cost = 8;
        }
        // The vocabulary never produces the remaining archetypes.
        _ => {}
    }

    let mut base = RiskLevel::Low;
    if survivor.env.infected_present && exposed(archetype) {
        base = RiskLevel::Moderate;
    }

    Choice {
        index: SYNTHETIC_CHOICE_INDEX,
        id: format!("custom.{}", archetype.key()),
        label: format!("Custom: {}", archetype.key()),
        archetype,
        time_cost: 1,
        fatigue_cost,
        hunger_cost: 0,
        thirst_cost: 0,
        risk: adjust_risk(base, archetype, survivor, config.difficulty),
        outcomes,
        effects: EffectSpec::default(),
    }
}

/// Interpret free text into a synthetic choice.
///
/// Gate order: vocabulary match, reuse cooldown, fatigue gate, needs
/// gate. The cooldown meter is only stamped when the returned choice is
/// actually resolved, so a refused attempt costs nothing.
///
/// # Errors
///
/// Returns [`CustomActionError`] when the text cannot be mapped or a
/// safety gate refuses the action.
pub fn interpret(
    text: &str,
    survivor: &Survivor,
    config: &SimConfig,
    scene: i64,
) -> Result<Choice, CustomActionError> {
    let archetype = match_archetype(text).ok_or(CustomActionError::UnsupportedAction)?;

    let elapsed = scene - survivor.meters.value(Meter::CustomLastTurn);
    if elapsed < CUSTOM_ACTION_COOLDOWN_SCENES {
        return Err(CustomActionError::OnCooldown {
            scenes_remaining: CUSTOM_ACTION_COOLDOWN_SCENES - elapsed,
        });
    }
    if survivor.stats.fatigue > CUSTOM_FATIGUE_GATE && archetype != Archetype::Rest {
        return Err(CustomActionError::FatigueCritical);
    }
    if (survivor.stats.hunger > CUSTOM_NEEDS_GATE || survivor.stats.thirst > CUSTOM_NEEDS_GATE)
        && archetype != Archetype::Forage
    {
        return Err(CustomActionError::NeedsCritical);
    }

    Ok(template(archetype, survivor, config))
}
