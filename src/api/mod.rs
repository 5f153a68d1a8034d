//! Web API module for SitePulse
//!
//! Provides REST and SSE endpoints for:
//! - Starting analysis runs and fetching their results
//! - Streaming run and site events
//! - Health checks

pub mod health;
pub mod runs;
pub mod sites;
pub mod sse;
pub mod types;

use axum::{routing::get, Extension, Router};
use sitepulse_core::{AnalysisPipeline, StreamAdapter};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use health::health_routes;
pub use runs::runs_routes;
pub use sites::sites_routes;
pub use types::EngineEndpoint;

/// Create the full application router around a pipeline
pub fn app_router(pipeline: Arc<AnalysisPipeline>, engine_endpoint: String) -> Router {
    let adapter = StreamAdapter::new(pipeline.bus().clone());
    let results = pipeline.results().clone();

    Router::new()
        .merge(health_routes())
        .merge(runs_routes())
        .merge(sites_routes())
        .route("/", get(|| async { "SitePulse" }))
        // Layers (applied to all routes)
        .layer(Extension(adapter))
        .layer(Extension(results))
        .layer(Extension(EngineEndpoint(engine_endpoint)))
        .layer(Extension(pipeline))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests;
