//! Final outcome of each run, kept for retrieval after its stream closes.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::event_bus::{Platform, RunState};

/// Default number of outcomes kept
pub const DEFAULT_CAPACITY: usize = 1024;

/// Terminal result of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Run channel id
    pub run_id: String,
    /// Terminal state
    pub state: RunState,
    /// Platform the run analysed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    /// Narrative summary, when one was produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Error message, when the run failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
}

/// Bounded in-memory map from run id to outcome.
///
/// When full, the oldest outcome is evicted. Inserts are serialized so the
/// capacity is a hard bound; reads stay lock-free.
#[derive(Debug)]
pub struct RunResultStore {
    outcomes: DashMap<String, RunOutcome>,
    capacity: usize,
    insert_lock: Mutex<()>,
}

impl RunResultStore {
    /// Create a store keeping at most `capacity` outcomes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            outcomes: DashMap::new(),
            capacity: capacity.max(1),
            insert_lock: Mutex::new(()),
        }
    }

    /// Record an outcome, replacing any previous one for the same run.
    pub fn insert(&self, outcome: RunOutcome) {
        let _guard = self.insert_lock.lock().unwrap_or_else(|e| e.into_inner());
        if !self.outcomes.contains_key(&outcome.run_id) && self.outcomes.len() >= self.capacity {
            self.evict_oldest();
        }
        self.outcomes.insert(outcome.run_id.clone(), outcome);
    }

    /// Outcome of `run_id`, if recorded.
    #[must_use]
    pub fn get(&self, run_id: &str) -> Option<RunOutcome> {
        self.outcomes.get(run_id).map(|entry| entry.value().clone())
    }

    /// Number of stored outcomes
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn evict_oldest(&self) {
        let oldest = self
            .outcomes
            .iter()
            .min_by_key(|entry| entry.value().finished_at)
            .map(|entry| entry.key().clone());
        if let Some(run_id) = oldest {
            self.outcomes.remove(&run_id);
        }
    }
}

impl Default for RunResultStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
