//! Server initialization
//!
//! Contains the main `run()` function that wires the bus, limiter, engine and
//! pipeline together and serves the HTTP API.

use super::config::AppConfig;
use super::loader::load_config;
use super::shutdown::wait_for_shutdown_signal;
use super::validation::{validate_config, validate_production_config};
use anyhow::{Context, Result};
use sitepulse_core::{AnalysisPipeline, EventBus, RunResultStore, SessionLimiter};
use sitepulse_engine::{HttpTaskEngine, TaskEngine};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Load and validate configuration
pub fn load_validated_config() -> Result<AppConfig> {
    let config = load_config().context("Failed to load configuration")?;
    validate_config(&config).context("Invalid configuration")?;
    validate_production_config(&config)?;
    Ok(config)
}

/// Create the HTTP task engine described by `config`
pub fn build_engine(config: &AppConfig) -> Result<Arc<HttpTaskEngine>> {
    let engine =
        HttpTaskEngine::new(config.engine_config()).context("Failed to create task engine")?;
    Ok(Arc::new(engine))
}

/// Wire a pipeline with its own bus, limiter and result store
pub fn build_pipeline(config: &AppConfig, engine: Arc<dyn TaskEngine>) -> Arc<AnalysisPipeline> {
    let bus = Arc::new(EventBus::new());
    let limiter = Arc::new(SessionLimiter::new(config.limiter_config()));
    let results = Arc::new(RunResultStore::default());

    Arc::new(
        AnalysisPipeline::new(bus, engine, config.pipeline_config())
            .with_limiter(limiter)
            .with_result_store(results),
    )
}

/// Run the server
pub async fn run() -> Result<()> {
    info!("Starting SitePulse v{}", env!("CARGO_PKG_VERSION"));

    let config = load_validated_config()?;
    info!("Configuration loaded");

    let engine = build_engine(&config)?;
    let engine_endpoint = engine.base_url().to_string();
    info!(engine = %engine.name(), base_url = %engine_endpoint, "Task engine configured");

    let pipeline = build_pipeline(&config, engine);
    info!(
        max_runs_per_session = pipeline.limiter().max_per_session(),
        categories = ?pipeline.config().categories,
        "Analysis pipeline ready"
    );

    let app = crate::api::app_router(pipeline, engine_endpoint);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("SitePulse shutdown complete");
    Ok(())
}
