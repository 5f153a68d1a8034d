//! Run endpoints
//!
//! - `POST /api/v1/runs`: start an analysis run
//! - `GET /api/v1/runs/:run_id/events`: SSE stream of one run
//! - `GET /api/v1/runs/:run_id/result`: stored outcome of a finished run

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use sitepulse_core::{
    AnalysisPipeline, AnalysisRequest, Error, RunOutcome, RunResultStore, RunTicket, StreamAdapter,
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::sse::sse_channel;
use super::types::ApiResponse;

/// Start a run and return its id without waiting for it
pub async fn create_run(
    Extension(pipeline): Extension<Arc<AnalysisPipeline>>,
    Json(request): Json<AnalysisRequest>,
) -> (StatusCode, Json<ApiResponse<RunTicket>>) {
    match pipeline.start_run(request) {
        Ok(ticket) => (StatusCode::ACCEPTED, Json(ApiResponse::success(ticket))),
        Err(Error::InvalidRequest(msg)) => {
            debug!("Run request rejected: {}", msg);
            (StatusCode::BAD_REQUEST, Json(ApiResponse::error(msg)))
        }
        Err(e) => {
            warn!("Failed to start run: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(e.public_message())),
            )
        }
    }
}

/// Stream a run's events until its summary and terminal status are delivered
pub async fn run_events(
    Extension(adapter): Extension<StreamAdapter>,
    Path(run_id): Path<String>,
) -> impl IntoResponse {
    let (sink, response) = sse_channel();
    tokio::spawn(async move {
        adapter.stream_run(&run_id, &sink).await;
    });
    response
}

/// Outcome of a finished run
pub async fn run_result(
    Extension(results): Extension<Arc<RunResultStore>>,
    Path(run_id): Path<String>,
) -> (StatusCode, Json<ApiResponse<RunOutcome>>) {
    match results.get(&run_id) {
        Some(outcome) => (StatusCode::OK, Json(ApiResponse::success(outcome))),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("No result for run {}", run_id))),
        ),
    }
}

/// Create run routes
pub fn runs_routes() -> Router {
    Router::new()
        .route("/api/v1/runs", post(create_run))
        .route("/api/v1/runs/:run_id/events", get(run_events))
        .route("/api/v1/runs/:run_id/result", get(run_result))
}
