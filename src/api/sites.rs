//! Site event stream
//!
//! `GET /api/v1/sites/:site_id/events` forwards everything published on the
//! site's channel until the client disconnects.

use axum::extract::{Extension, Path};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use sitepulse_core::StreamAdapter;

use super::sse::sse_channel;

async fn site_events(
    Extension(adapter): Extension<StreamAdapter>,
    Path(site_id): Path<String>,
) -> impl IntoResponse {
    let (sink, response) = sse_channel();
    tokio::spawn(async move {
        adapter.stream_site(&site_id, &sink).await;
    });
    response
}

/// Create site routes
pub fn sites_routes() -> Router {
    Router::new().route("/api/v1/sites/:site_id/events", get(site_events))
}
