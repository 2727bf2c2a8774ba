//! API routes module
//!
//! This module wires the similarity domain to HTTP routes.

pub mod health;

use axum::Router;
use domain_similarity::handlers;
use std::sync::Arc;

use crate::state::AppState;

/// Create all API routes
/// Note: These are nested under /api by axum_helpers::create_router
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .merge(handlers::router(Arc::clone(&state.service)))
        .merge(health::router(state.clone()))
}
