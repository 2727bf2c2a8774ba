use async_trait::async_trait;

use crate::error::SimilarityResult;
use crate::models::Embedding;

/// Capability seam over the vision model.
///
/// The real implementation keeps a resident model loaded at startup; tests
/// substitute in-memory fakes. Implementations must be safe to call from
/// concurrent requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageEmbedder: Send + Sync {
    /// Output dimensionality, guaranteed for every embedding produced.
    fn dimension(&self) -> usize;

    /// Convert raw image bytes into a normalized feature vector.
    async fn embed_image(&self, bytes: &[u8]) -> SimilarityResult<Embedding>;
}
