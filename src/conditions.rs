//! Condition state machine with hysteresis.
//!
//! Conditions trigger and release on different thresholds so stat noise
//! near a boundary never flaps a condition on and off. All accumulator
//! movement happens here, once per resolved scene; catalog effects are
//! the only other path that touches the condition set.

use crate::choice::Archetype;
use crate::config::Difficulty;
use crate::constants::{
    COLD_EXPOSURE_TRIGGER, DEHYDRATION_STREAK_TRIGGER, DEHYDRATION_THIRST_RELEASE,
    EXHAUSTION_DRAIN_DELAY_SCENES, EXHAUSTION_FATIGUE_RELEASE, EXHAUSTION_FATIGUE_TRIGGER,
    FEVER_REST_CAP, FEVER_REST_GAIN, FEVER_REST_RELEASE, HYDRATION_RECOVERY_CAP,
    HYDRATION_RECOVERY_DELTA, THIRST_STREAK_THRESHOLD, WARM_STREAK_RELEASE,
};
use crate::state::{Condition, Meter, StatDelta, StatKey, Survivor, Weather};

/// Per-scene inputs the state machine needs beyond the survivor itself.
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext {
    /// Net thirst change applied this scene, before condition drains.
    pub thirst_delta: i32,
    /// Archetype acted on this scene, if any.
    pub archetype: Option<Archetype>,
    pub difficulty: Difficulty,
}

/// What one advance of the state machine did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConditionTick {
    pub added: Vec<Condition>,
    pub removed: Vec<Condition>,
    /// Drain already applied to the survivor's stats.
    pub drain: StatDelta,
}

const fn scaled(difficulty: Difficulty, easy: i32, standard: i32, hard: i32) -> i32 {
    match difficulty {
        Difficulty::Easy => easy,
        Difficulty::Standard => standard,
        Difficulty::Hard => hard,
    }
}

/// Per-scene stat drain for one active condition.
fn condition_drain(
    condition: Condition,
    difficulty: Difficulty,
    exhaustion_scenes: i64,
) -> StatDelta {
    let mut drain = StatDelta::default();
    match condition {
        Condition::Bleeding => {
            drain.add(StatKey::Health, -scaled(difficulty, 2, 3, 4));
            drain.add(StatKey::Fatigue, 1);
        }
        Condition::Fracture => {
            drain.add(StatKey::Health, -1);
            drain.add(StatKey::Fatigue, 2);
        }
        Condition::Infection => {
            drain.add(StatKey::Health, -scaled(difficulty, 1, 2, 3));
        }
        Condition::Fever => {
            drain.add(StatKey::Health, -1);
            drain.add(StatKey::Fatigue, scaled(difficulty, 1, 2, 2));
            drain.add(StatKey::Morale, -1);
        }
        Condition::Hypothermia => {
            drain.add(StatKey::Health, -scaled(difficulty, 1, 2, 3));
            drain.add(StatKey::Fatigue, 1);
        }
        Condition::Heatstroke => {
            drain.add(StatKey::Health, -scaled(difficulty, 1, 2, 2));
            drain.add(StatKey::Thirst, 2);
        }
        Condition::Dehydration => {
            drain.add(StatKey::Health, -scaled(difficulty, 1, 2, 3));
            drain.add(StatKey::Fatigue, 2);
            drain.add(StatKey::Morale, -1);
        }
        Condition::Pain => {
            drain.add(StatKey::Morale, -2);
        }
        Condition::Poisoning => {
            drain.add(StatKey::Health, -scaled(difficulty, 2, 3, 4));
        }
        Condition::Exhaustion => {
            drain.add(StatKey::Morale, -1);
            // Health only bleeds after the condition has persisted.
            if exhaustion_scenes >= EXHAUSTION_DRAIN_DELAY_SCENES {
                drain.add(StatKey::Health, -1);
            }
        }
    }
    drain
}

fn cold_scene(survivor: &Survivor) -> bool {
    survivor.env.temp_band.is_cold()
        || matches!(survivor.env.weather, Weather::Snow | Weather::Storm)
}

/// Advance the state machine by one resolved scene.
///
/// Accumulators move first, then trigger checks add conditions, then
/// release checks remove them, then the drain for everything still
/// active is applied. A condition added this scene therefore drains
/// immediately; one released this scene does not.
pub fn advance(survivor: &mut Survivor, ctx: &ConditionContext) -> ConditionTick {
    let mut tick = ConditionTick::default();

    // Thirst streak and hydration recovery.
    if survivor.stats.thirst >= THIRST_STREAK_THRESHOLD {
        survivor.meters.add(Meter::ThirstStreak, 1);
    } else {
        survivor.meters.reset(Meter::ThirstStreak);
    }
    if ctx.thirst_delta <= HYDRATION_RECOVERY_DELTA {
        let next = (survivor.meters.value(Meter::HydrationRecovery) + 1)
            .min(HYDRATION_RECOVERY_CAP);
        survivor.meters.set(Meter::HydrationRecovery, next);
    } else {
        survivor.meters.decay(Meter::HydrationRecovery);
    }

    // Cold exposure against warm streak.
    if cold_scene(survivor) {
        survivor.meters.add(Meter::ColdExposure, 1);
        survivor.meters.reset(Meter::WarmStreak);
    } else {
        survivor.meters.add(Meter::WarmStreak, 1);
        survivor.meters.decay(Meter::ColdExposure);
    }

    // Fever recovery tracking and ambient decay.
    survivor.meters.decay(Meter::FeverMedication);
    survivor.meters.decay(Meter::FeverRest);
    if ctx.archetype == Some(Archetype::Rest) {
        let next =
            (survivor.meters.value(Meter::FeverRest) + FEVER_REST_GAIN).min(FEVER_REST_CAP);
        survivor.meters.set(Meter::FeverRest, next);
    }
    survivor.meters.decay(Meter::Noise);
    survivor.meters.decay(Meter::Visibility);
    survivor.meters.decay(Meter::Scent);

    // Triggers.
    if survivor.meters.value(Meter::ThirstStreak) >= DEHYDRATION_STREAK_TRIGGER
        && survivor.add_condition(Condition::Dehydration)
    {
        tick.added.push(Condition::Dehydration);
    }
    if survivor.meters.value(Meter::ColdExposure) >= COLD_EXPOSURE_TRIGGER
        && survivor.add_condition(Condition::Hypothermia)
    {
        tick.added.push(Condition::Hypothermia);
    }
    if survivor.stats.fatigue >= EXHAUSTION_FATIGUE_TRIGGER
        && survivor.add_condition(Condition::Exhaustion)
    {
        tick.added.push(Condition::Exhaustion);
    }

    // Releases, on deliberately harder-to-reach thresholds.
    if survivor.has_condition(Condition::Dehydration)
        && survivor.stats.thirst <= DEHYDRATION_THIRST_RELEASE
        && survivor.meters.value(Meter::HydrationRecovery) >= HYDRATION_RECOVERY_CAP
        && survivor.remove_condition(Condition::Dehydration)
    {
        survivor.meters.reset(Meter::HydrationRecovery);
        survivor.meters.reset(Meter::ThirstStreak);
        tick.removed.push(Condition::Dehydration);
    }
    if survivor.has_condition(Condition::Hypothermia)
        && survivor.meters.value(Meter::WarmStreak) >= WARM_STREAK_RELEASE
        && survivor.remove_condition(Condition::Hypothermia)
    {
        survivor.meters.reset(Meter::WarmStreak);
        survivor.meters.reset(Meter::ColdExposure);
        tick.removed.push(Condition::Hypothermia);
    }
    if survivor.has_condition(Condition::Fever)
        && survivor.meters.value(Meter::FeverMedication) > 0
        && survivor.meters.value(Meter::FeverRest) >= FEVER_REST_RELEASE
        && survivor.remove_condition(Condition::Fever)
    {
        survivor.meters.reset(Meter::FeverMedication);
        survivor.meters.reset(Meter::FeverRest);
        tick.removed.push(Condition::Fever);
    }
    if survivor.has_condition(Condition::Exhaustion)
        && survivor.stats.fatigue <= EXHAUSTION_FATIGUE_RELEASE
        && survivor.remove_condition(Condition::Exhaustion)
    {
        survivor.meters.reset(Meter::ExhaustionScenes);
        tick.removed.push(Condition::Exhaustion);
    }

    // Persistence counter for exhaustion, the single update site.
    if survivor.has_condition(Condition::Exhaustion) {
        survivor.meters.add(Meter::ExhaustionScenes, 1);
    } else {
        survivor.meters.reset(Meter::ExhaustionScenes);
    }

    let exhaustion_scenes = survivor.meters.value(Meter::ExhaustionScenes);
    for condition in survivor.conditions.clone() {
        let drain = condition_drain(condition, ctx.difficulty, exhaustion_scenes);
        tick.drain.merge(&drain);
    }
    survivor.stats.apply(&tick.drain);
    tick
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TempBand;

    fn ctx() -> ConditionContext {
        ConditionContext {
            thirst_delta: 0,
            archetype: None,
            difficulty: Difficulty::Standard,
        }
    }

    fn healthy() -> Survivor {
        let mut survivor = Survivor::default();
        survivor.env.temp_band = TempBand::Mild;
        survivor
    }

    #[test]
    fn dehydration_needs_three_parched_scenes() {
        let mut survivor = healthy();
        survivor.stats.thirst = 90;
        let tick = advance(&mut survivor, &ctx());
        assert!(tick.added.is_empty());
        survivor.stats.thirst = 90;
        advance(&mut survivor, &ctx());
        survivor.stats.thirst = 90;
        let tick = advance(&mut survivor, &ctx());
        assert_eq!(tick.added, vec![Condition::Dehydration]);
    }

    #[test]
    fn parched_streak_breaks_on_one_good_scene() {
        let mut survivor = healthy();
        survivor.stats.thirst = 90;
        advance(&mut survivor, &ctx());
        advance(&mut survivor, &ctx());
        survivor.stats.thirst = 50;
        advance(&mut survivor, &ctx());
        survivor.stats.thirst = 90;
        survivor.stats.health = 100;
        let tick = advance(&mut survivor, &ctx());
        assert!(!survivor.has_condition(Condition::Dehydration));
        assert!(tick.added.is_empty());
    }

    #[test]
    fn dehydration_release_needs_low_thirst_and_recovery_streak() {
        let mut survivor = healthy();
        survivor.add_condition(Condition::Dehydration);
        // Low thirst alone does not release.
        survivor.stats.thirst = 30;
        advance(&mut survivor, &ctx());
        assert!(survivor.has_condition(Condition::Dehydration));
        // Two hydrating scenes at low thirst do.
        let hydrating = ConditionContext {
            thirst_delta: -12,
            ..ctx()
        };
        survivor.stats.thirst = 30;
        advance(&mut survivor, &hydrating);
        survivor.stats.thirst = 30;
        let tick = advance(&mut survivor, &hydrating);
        assert_eq!(tick.removed, vec![Condition::Dehydration]);
        assert_eq!(survivor.meters.value(Meter::HydrationRecovery), 0);
    }

    #[test]
    fn hypothermia_triggers_and_releases_with_hysteresis() {
        let mut survivor = healthy();
        survivor.env.temp_band = TempBand::Freezing;
        advance(&mut survivor, &ctx());
        advance(&mut survivor, &ctx());
        let tick = advance(&mut survivor, &ctx());
        assert_eq!(tick.added, vec![Condition::Hypothermia]);
        // Three warm scenes are not enough to release.
        survivor.env.temp_band = TempBand::Mild;
        survivor.stats.health = 100;
        for _ in 0..3 {
            advance(&mut survivor, &ctx());
            assert!(survivor.has_condition(Condition::Hypothermia));
        }
        let tick = advance(&mut survivor, &ctx());
        assert_eq!(tick.removed, vec![Condition::Hypothermia]);
    }

    #[test]
    fn storm_counts_as_cold_exposure() {
        let mut survivor = healthy();
        survivor.env.weather = Weather::Storm;
        advance(&mut survivor, &ctx());
        assert_eq!(survivor.meters.value(Meter::ColdExposure), 1);
    }

    #[test]
    fn fever_release_requires_medication_and_rest() {
        let mut survivor = healthy();
        survivor.add_condition(Condition::Fever);
        let resting = ConditionContext {
            archetype: Some(Archetype::Rest),
            ..ctx()
        };
        // Rest without medication never clears it.
        for _ in 0..8 {
            survivor.stats.health = 100;
            advance(&mut survivor, &resting);
        }
        assert!(survivor.has_condition(Condition::Fever));
        survivor.meters.set(Meter::FeverMedication, 3);
        let mut cleared = false;
        for _ in 0..8 {
            survivor.stats.health = 100;
            let tick = advance(&mut survivor, &resting);
            if tick.removed.contains(&Condition::Fever) {
                cleared = true;
                break;
            }
        }
        assert!(cleared);
        assert_eq!(survivor.meters.value(Meter::FeverRest), 0);
    }

    #[test]
    fn exhaustion_hysteresis_band() {
        let mut survivor = healthy();
        survivor.stats.fatigue = 85;
        let tick = advance(&mut survivor, &ctx());
        assert_eq!(tick.added, vec![Condition::Exhaustion]);
        // Fatigue between the release and trigger points keeps it.
        survivor.stats.fatigue = 60;
        advance(&mut survivor, &ctx());
        assert!(survivor.has_condition(Condition::Exhaustion));
        survivor.stats.fatigue = 50;
        let tick = advance(&mut survivor, &ctx());
        assert_eq!(tick.removed, vec![Condition::Exhaustion]);
        assert_eq!(survivor.meters.value(Meter::ExhaustionScenes), 0);
    }

    #[test]
    fn exhaustion_health_drain_is_delayed() {
        let mut survivor = healthy();
        survivor.stats.fatigue = 90;
        for expected_scenes in 1..=3 {
            survivor.stats.health = 100;
            survivor.stats.fatigue = 90;
            let tick = advance(&mut survivor, &ctx());
            assert_eq!(survivor.meters.value(Meter::ExhaustionScenes), expected_scenes);
            assert_eq!(tick.drain.health, 0, "scene {expected_scenes}");
        }
        survivor.stats.health = 100;
        survivor.stats.fatigue = 90;
        let tick = advance(&mut survivor, &ctx());
        assert_eq!(tick.drain.health, -1);
    }

    #[test]
    fn drains_scale_with_difficulty() {
        for (difficulty, expected) in [
            (Difficulty::Easy, -2),
            (Difficulty::Standard, -3),
            (Difficulty::Hard, -4),
        ] {
            let mut survivor = healthy();
            survivor.add_condition(Condition::Bleeding);
            let tick = advance(
                &mut survivor,
                &ConditionContext {
                    difficulty,
                    ..ctx()
                },
            );
            assert_eq!(tick.drain.health, expected, "{}", difficulty.key());
        }
    }

    #[test]
    fn ambient_meters_decay_each_scene() {
        let mut survivor = healthy();
        survivor.meters.set(Meter::Noise, 3);
        survivor.meters.set(Meter::Scent, 1);
        advance(&mut survivor, &ctx());
        assert_eq!(survivor.meters.value(Meter::Noise), 2);
        assert_eq!(survivor.meters.value(Meter::Scent), 0);
    }
}
