//! Pipeline core structure
//!
//! Contains the `AnalysisPipeline` struct, its builder methods and the entry
//! points that start runs.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use super::config::PipelineConfig;
use super::request::{AnalysisRequest, RunTicket};
use crate::error::Result;
use crate::event_bus::EventBus;
use crate::limiter::SessionLimiter;
use crate::run_store::RunResultStore;
use sitepulse_engine::TaskEngine;

/// Orchestrates analysis runs and publishes their events on the bus
pub struct AnalysisPipeline {
    pub(crate) bus: Arc<EventBus>,
    pub(crate) limiter: Arc<SessionLimiter>,
    pub(crate) engine: Arc<dyn TaskEngine>,
    pub(crate) results: Arc<RunResultStore>,
    pub(crate) config: PipelineConfig,
}

impl AnalysisPipeline {
    /// Create a pipeline with a default limiter and result store
    #[must_use]
    pub fn new(bus: Arc<EventBus>, engine: Arc<dyn TaskEngine>, config: PipelineConfig) -> Self {
        Self {
            bus,
            limiter: Arc::new(SessionLimiter::default()),
            engine,
            results: Arc::new(RunResultStore::default()),
            config,
        }
    }

    /// Set the session limiter
    #[must_use]
    pub fn with_limiter(mut self, limiter: Arc<SessionLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Set the run result store
    #[must_use]
    pub fn with_result_store(mut self, results: Arc<RunResultStore>) -> Self {
        self.results = results;
        self
    }

    /// Event bus runs publish on
    #[must_use]
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Session limiter
    #[must_use]
    pub fn limiter(&self) -> &Arc<SessionLimiter> {
        &self.limiter
    }

    /// Store of finished runs
    #[must_use]
    pub fn results(&self) -> &Arc<RunResultStore> {
        &self.results
    }

    /// Pipeline configuration
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Name of the configured engine
    #[must_use]
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Validate `request`, allocate a run id and start the run in the
    /// background. Returns as soon as the run is spawned.
    pub fn start_run(self: &Arc<Self>, request: AnalysisRequest) -> Result<RunTicket> {
        request.validate()?;

        let run_id = Uuid::new_v4().to_string();
        info!(run_id = %run_id, url = %request.url, "Run accepted");

        self.spawn_run(run_id.clone(), request);
        Ok(RunTicket { run_id })
    }

    /// Run `request` on channel `run_id` in a background task.
    pub fn spawn_run(self: &Arc<Self>, run_id: String, request: AnalysisRequest) -> JoinHandle<()> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            pipeline.run(&run_id, request).await;
        })
    }
}
