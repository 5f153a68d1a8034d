//! Scripted engine for testing
//!
//! Replies are registered per task key; unknown keys answer with empty text.

use crate::engine::{TaskEngine, TaskOutput};
use crate::error::{Error, Result};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Reply for one task key
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Answer with this result text
    Text(String),
    /// Fail with an API error carrying this message
    Fail(String),
}

/// An engine that returns pre-registered replies.
#[derive(Clone, Default)]
pub struct ScriptedEngine {
    replies: Arc<Mutex<HashMap<String, ScriptedReply>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    delay: Option<Duration>,
}

impl ScriptedEngine {
    /// Create an engine with no replies registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a text reply for a task key.
    #[must_use]
    pub fn with_text(self, task_key: &str, text: impl Into<String>) -> Self {
        self.set(task_key, ScriptedReply::Text(text.into()));
        self
    }

    /// Register a failing reply for a task key.
    #[must_use]
    pub fn with_failure(self, task_key: &str, message: impl Into<String>) -> Self {
        self.set(task_key, ScriptedReply::Fail(message.into()));
        self
    }

    /// Sleep this long before answering each task.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace the reply for a task key.
    pub fn set(&self, task_key: &str, reply: ScriptedReply) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(task_key.to_string(), reply);
    }

    /// Task keys received so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(task, _)| task.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl TaskEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn run_task(&self, task_key: &str, url: &str) -> Result<TaskOutput> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((task_key.to_string(), url.to_string()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(task_key)
            .cloned();

        match reply {
            Some(ScriptedReply::Text(text)) => Ok(TaskOutput::text(text)),
            Some(ScriptedReply::Fail(message)) => Err(Error::Api(message)),
            None => Ok(TaskOutput::text("")),
        }
    }
}
