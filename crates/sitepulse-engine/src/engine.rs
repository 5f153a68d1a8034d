//! Engine trait definition
//!
//! A task engine is invoked with a task key and a target URL and answers with
//! free-form text. Callers treat that text as untrusted and re-parse it.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Output of a single engine task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Raw result text as produced by the engine
    pub result: String,
    /// Any additional fields returned alongside the result
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TaskOutput {
    /// Create an output carrying only result text
    #[must_use]
    pub fn text(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Trait for task engines
#[async_trait::async_trait]
pub trait TaskEngine: Send + Sync {
    /// Get the engine name
    fn name(&self) -> &str;

    /// Run one task against a URL
    async fn run_task(&self, task_key: &str, url: &str) -> Result<TaskOutput>;
}
