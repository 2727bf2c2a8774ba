//! Application state management

use domain_similarity::{QdrantVectorIndex, SimilarityService};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub service: Arc<SimilarityService<QdrantVectorIndex>>,
}
