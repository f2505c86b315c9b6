//! Lastlight core simulation.
//!
//! Deterministic, IO-free turn logic for a narrative survival run: seed
//! streams, survivor generation, the infection arrival gate, event
//! selection, choice resolution, the condition state machine and the
//! custom-action interpreter. Persistence and narration live in other
//! crates; everything here is a pure function of seed and inputs.

pub mod arrival;
pub mod catalog;
pub mod choice;
pub mod conditions;
pub mod config;
mod constants;
pub mod custom;
pub mod generation;
pub mod history;
mod numbers;
pub mod seed;
pub mod selection;
pub mod snapshot;
pub mod state;

use std::collections::BTreeMap;

use anyhow::Context as _;

pub use crate::arrival::{compute_lad, derive_initial_lad, ArrivalFactors, LadAssignment};
pub use crate::catalog::{
    ArcDescriptor, CatalogError, ChoiceTemplate, EventBlueprint, EventCatalog, EventTier,
    LadRelation, OutcomeRange, Preconditions, Rarity, SkillGate,
};
pub use crate::choice::{
    adjust_risk, apply_choice, Archetype, Choice, ResolutionOutcome, RiskLevel,
};
pub use crate::conditions::{ConditionContext, ConditionTick};
pub use crate::config::{Difficulty, SimConfig, TextDensity};
pub use crate::custom::CustomActionError;
pub use crate::history::{EventHistory, HistoryUpdate};
pub use crate::seed::{derive, RunSeed, SeedError, Stream};
pub use crate::selection::{
    resolve_event, select_event, EventSelection, SelectionError, SelectionRequest, SelectionTrace,
};
pub use crate::state::{
    Condition, Environment, Meter, Skill, StatDelta, StatKey, Stats, Survivor, TraitId, World,
};

/// Something that can produce a validated event catalog.
pub trait CatalogSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and validate the catalog.
    ///
    /// # Errors
    ///
    /// Implementation-defined load or validation failure.
    fn load(&self) -> Result<EventCatalog, Self::Error>;
}

/// The catalog baked into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCatalog;

impl CatalogSource for DefaultCatalog {
    type Error = CatalogError;

    fn load(&self) -> Result<EventCatalog, Self::Error> {
        EventCatalog::load_default()
    }
}

/// Catalog parsed from caller-supplied JSON.
#[derive(Debug, Clone)]
pub struct JsonCatalog(pub String);

impl CatalogSource for JsonCatalog {
    type Error = CatalogError;

    fn load(&self) -> Result<EventCatalog, Self::Error> {
        EventCatalog::from_json(&self.0)
    }
}

/// Composition root for one run: catalog, config, world and history
/// behind a scene counter. Callers that need finer control can use the
/// module functions directly; the engine just sequences them.
#[derive(Debug, Clone)]
pub struct Engine {
    catalog: EventCatalog,
    config: SimConfig,
    world: World,
    history: EventHistory,
    scene: i64,
    replacements: u32,
}

impl Engine {
    /// Build an engine for a fresh run.
    ///
    /// # Errors
    ///
    /// Fails when the catalog cannot be loaded or the seed text is
    /// empty.
    pub fn new(
        source: &impl CatalogSource,
        config: SimConfig,
        seed_text: &str,
        rules_version: &str,
    ) -> anyhow::Result<Self> {
        let catalog = source.load().context("loading event catalog")?;
        let seed = RunSeed::new(seed_text).context("deriving run seed")?;
        let world = World::generate(seed, rules_version);
        Ok(Self {
            catalog,
            config,
            world,
            history: EventHistory::default(),
            scene: 0,
            replacements: 0,
        })
    }

    /// Generate the run's first survivor.
    #[must_use]
    pub fn spawn_first(&self) -> Survivor {
        let mut stream = self.world.seed.stream("survivor.first");
        generation::generate_first_survivor(&mut stream, &self.world)
    }

    /// Generate a replacement survivor after a death. Each call uses a
    /// fresh stream so replacements never repeat.
    pub fn spawn_replacement(&mut self) -> Survivor {
        self.replacements += 1;
        let label = format!("survivor.replacement.{}", self.replacements);
        let mut stream = self.world.seed.stream(&label);
        generation::generate_replacement(&mut stream, &self.world)
    }

    /// Run the lottery for the current scene.
    ///
    /// # Errors
    ///
    /// Propagates [`SelectionError`] from the lottery.
    pub fn next_event(&self, survivor: &Survivor) -> Result<EventSelection, SelectionError> {
        let label = format!("events.scene.{}", self.scene);
        let mut rng = self.world.seed.stream(&label);
        let req = SelectionRequest {
            survivor,
            config: &self.config,
            catalog: &self.catalog,
            history: &self.history,
            scene: self.scene,
        };
        select_event(&req, &mut rng)
    }

    /// Resolve a specific event id for the current scene.
    ///
    /// # Errors
    ///
    /// Propagates [`SelectionError`] from the repetition rules.
    pub fn event_by_id(
        &self,
        survivor: &Survivor,
        event_id: &str,
    ) -> Result<EventSelection, SelectionError> {
        let req = SelectionRequest {
            survivor,
            config: &self.config,
            catalog: &self.catalog,
            history: &self.history,
            scene: self.scene,
        };
        resolve_event(&req, event_id)
    }

    /// Interpret free text into a synthetic custom choice.
    ///
    /// # Errors
    ///
    /// Propagates [`CustomActionError`] from the interpreter gates.
    pub fn custom_action(
        &self,
        text: &str,
        survivor: &Survivor,
    ) -> Result<Choice, CustomActionError> {
        custom::interpret(text, survivor, &self.config, self.scene)
    }

    /// Commit a presented event to history.
    pub fn commit(&mut self, selection: &EventSelection) {
        self.history.apply(&selection.history_update(self.scene));
    }

    /// Resolve the chosen action and advance the scene counter.
    pub fn resolve(&mut self, survivor: &mut Survivor, choice: &Choice) -> ResolutionOutcome {
        let label = format!("resolve.scene.{}", self.scene);
        let mut rng = self.world.seed.stream(&label);
        let outcome = apply_choice(survivor, choice, &self.config, self.scene, &mut rng);
        self.scene += 1;
        outcome
    }

    /// Flat snapshot of survivor and world for narration layers.
    #[must_use]
    pub fn snapshot(&self, survivor: &Survivor) -> BTreeMap<String, String> {
        snapshot::survivor_snapshot(survivor, &self.world)
    }

    #[must_use]
    pub const fn scene(&self) -> i64 {
        self.scene
    }

    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    #[must_use]
    pub const fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn history(&self) -> &EventHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_builds_with_default_catalog() {
        let engine = Engine::new(&DefaultCatalog, SimConfig::default(), "smoke", "rules-v1")
            .expect("engine should build");
        assert_eq!(engine.scene(), 0);
        assert!(!engine.catalog().is_empty());
    }

    #[test]
    fn empty_seed_surfaces_at_the_boundary() {
        let result = Engine::new(&DefaultCatalog, SimConfig::default(), "  ", "rules-v1");
        assert!(result.is_err());
    }

    #[test]
    fn bad_json_surfaces_catalog_error() {
        let source = JsonCatalog(String::from("not json"));
        assert!(Engine::new(&source, SimConfig::default(), "seed", "rules-v1").is_err());
    }

    #[test]
    fn replacements_differ_per_spawn() {
        let mut engine =
            Engine::new(&DefaultCatalog, SimConfig::default(), "replacements", "rules-v1")
                .unwrap();
        let a = engine.spawn_replacement();
        let b = engine.spawn_replacement();
        assert_ne!((a.name.clone(), a.age, a.env.clone()), (b.name, b.age, b.env));
    }
}
