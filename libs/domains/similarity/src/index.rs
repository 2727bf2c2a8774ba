use async_trait::async_trait;

use crate::error::SimilarityResult;
use crate::models::{Candidate, Embedding};

/// Capability seam over the approximate-nearest-neighbor store.
///
/// Implementations return candidates in the store's own ranking order
/// (descending similarity); the store's tie-break policy is authoritative and
/// must be passed through unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Top-`limit` approximate similarity query.
    ///
    /// `candidate_pool` bounds how many candidates the store considers
    /// internally before ranking (a recall/latency knob, not a result cap);
    /// `limit` caps the candidates this call returns.
    async fn query(
        &self,
        vector: &Embedding,
        candidate_pool: usize,
        limit: usize,
    ) -> SimilarityResult<Vec<Candidate>>;

    /// Whether the store is reachable (for readiness probes).
    async fn health_check(&self) -> bool;
}
