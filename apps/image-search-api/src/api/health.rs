//! Health check endpoints

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    vector_index: bool,
}

/// Create a health check router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .with_state(state)
}

/// Readiness check - verifies the vector index connection
async fn readiness_check(State(state): State<AppState>) -> Json<ReadyResponse> {
    let index_healthy = state.service.ready().await;

    Json(ReadyResponse {
        status: if index_healthy { "ready" } else { "unhealthy" }.to_string(),
        vector_index: index_healthy,
    })
}
