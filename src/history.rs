//! Per-run event and arc history feeding repetition control.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Firing record for a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventRecord {
    /// Scene the event last fired on.
    pub last_scene: i64,
    /// First scene the event is eligible again.
    pub cooldown_until: i64,
    /// Times the event has fired this run.
    pub fired: u32,
}

/// Progress marker for a multi-scene arc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcRecord {
    pub last_step: u32,
    pub last_scene: i64,
    pub last_event_id: String,
}

/// Arc progress carried inside a [`HistoryUpdate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcProgress {
    pub arc_id: String,
    pub step: u32,
    pub event_id: String,
}

/// The full update produced by committing one selected event. Selection
/// itself never mutates history; the caller applies this after the
/// scene is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryUpdate {
    pub event_id: String,
    pub scene: i64,
    pub cooldown_until: i64,
    pub arc: Option<ArcProgress>,
}

/// Append-only view of what has fired so far in this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventHistory {
    events: BTreeMap<String, EventRecord>,
    arcs: BTreeMap<String, ArcRecord>,
}

impl EventHistory {
    #[must_use]
    pub fn event(&self, id: &str) -> Option<&EventRecord> {
        self.events.get(id)
    }

    #[must_use]
    pub fn arc(&self, arc_id: &str) -> Option<&ArcRecord> {
        self.arcs.get(arc_id)
    }

    #[must_use]
    pub fn has_fired(&self, id: &str) -> bool {
        self.events.get(id).is_some_and(|record| record.fired > 0)
    }

    #[must_use]
    pub fn on_cooldown(&self, id: &str, scene: i64) -> bool {
        self.events
            .get(id)
            .is_some_and(|record| scene < record.cooldown_until)
    }

    /// Commit one selection's update.
    pub fn apply(&mut self, update: &HistoryUpdate) {
        let record = self.events.entry(update.event_id.clone()).or_default();
        record.last_scene = update.scene;
        record.cooldown_until = update.cooldown_until;
        record.fired += 1;
        if let Some(arc) = &update.arc {
            self.arcs.insert(
                arc.arc_id.clone(),
                ArcRecord {
                    last_step: arc.step,
                    last_scene: update.scene,
                    last_event_id: arc.event_id.clone(),
                },
            );
        }
    }
}
