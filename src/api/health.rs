//! Health check endpoints.
//!
//! Provides:
//! - `/health`: simple "healthy" + version (for load balancers)
//! - `/health/detailed`: bus, limiter and engine diagnostics

use axum::extract::Extension;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use sitepulse_core::AnalysisPipeline;
use std::sync::Arc;

use super::types::EngineEndpoint;

/// Simple health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Detailed health response
#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub event_bus: EventBusHealth,
    pub engine: EngineHealth,
    pub stored_results: usize,
}

#[derive(Debug, Serialize)]
pub struct EventBusHealth {
    pub channels: usize,
}

#[derive(Debug, Serialize)]
pub struct EngineHealth {
    pub name: String,
    pub base_url: String,
    pub max_runs_per_session: usize,
}

/// Simple health check (for load balancers)
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn detailed_health_check(
    Extension(pipeline): Extension<Arc<AnalysisPipeline>>,
    Extension(endpoint): Extension<EngineEndpoint>,
) -> Json<DetailedHealthResponse> {
    Json(DetailedHealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        event_bus: EventBusHealth {
            channels: pipeline.bus().channel_count(),
        },
        engine: EngineHealth {
            name: pipeline.engine_name().to_string(),
            base_url: endpoint.0,
            max_runs_per_session: pipeline.limiter().max_per_session(),
        },
        stored_results: pipeline.results().len(),
    })
}

/// Create health routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/detailed", get(detailed_health_check))
}
