//! Per-session run limiter
//!
//! Caps how many analysis runs one session may have in flight. Rejection is
//! immediate: a caller over the cap gets `false` (or `None`), never a queue
//! slot.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Limiter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Maximum simultaneous runs per session key
    #[serde(default = "default_max_per_session")]
    pub max_per_session: usize,
}

fn default_max_per_session() -> usize {
    2
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            max_per_session: default_max_per_session(),
        }
    }
}

/// Counts active runs per session key.
///
/// Entries exist only while their count is above zero.
#[derive(Debug)]
pub struct SessionLimiter {
    max: usize,
    active: Mutex<HashMap<String, usize>>,
}

impl SessionLimiter {
    /// Create a limiter; `max` is clamped to at least 1.
    #[must_use]
    pub fn new(config: LimiterConfig) -> Self {
        Self {
            max: config.max_per_session.max(1),
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Take a slot for `key` if one is free.
    pub fn try_acquire(&self, key: &str) -> bool {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        let count = active.entry(key.to_string()).or_insert(0);
        if *count < self.max {
            *count += 1;
            debug!(session_key = %key, active = *count, "Run slot acquired");
            true
        } else {
            debug!(session_key = %key, max = self.max, "Run slot denied");
            false
        }
    }

    /// Give back a slot for `key`. Unknown keys are ignored.
    pub fn release(&self, key: &str) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(count) = active.get_mut(key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                active.remove(key);
            }
            debug!(session_key = %key, "Run slot released");
        }
    }

    /// Take a slot that is released when the permit drops.
    #[must_use]
    pub fn acquire_permit(self: &Arc<Self>, key: &str) -> Option<SessionPermit> {
        self.try_acquire(key).then(|| SessionPermit {
            limiter: Arc::clone(self),
            key: key.to_string(),
        })
    }

    /// Active runs for `key`.
    #[must_use]
    pub fn active(&self, key: &str) -> usize {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// Number of keys with at least one active run.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.active.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Configured cap.
    #[must_use]
    pub fn max_per_session(&self) -> usize {
        self.max
    }
}

impl Default for SessionLimiter {
    fn default() -> Self {
        Self::new(LimiterConfig::default())
    }
}

/// A run slot that releases itself when dropped.
#[derive(Debug)]
pub struct SessionPermit {
    limiter: Arc<SessionLimiter>,
    key: String,
}

impl SessionPermit {
    /// Session key this permit counts against.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for SessionPermit {
    fn drop(&mut self) {
        self.limiter.release(&self.key);
    }
}
