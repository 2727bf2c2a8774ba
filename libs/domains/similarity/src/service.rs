//! Similarity Service - pipeline orchestration
//!
//! Composes the embedding extractor, the vector index client and the
//! candidate filter into the two service operations. Each stage's failure
//! stays distinguishable at this boundary; the service never masks which
//! stage failed.

use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::embedding::ImageEmbedder;
use crate::error::SimilarityResult;
use crate::fetch::SourceFetcher;
use crate::index::VectorIndex;
use crate::models::{Embedding, SearchTuning};
use crate::ranking::rank_candidates;

/// High-level similarity operations over an injected extractor, fetcher and
/// vector index.
pub struct SimilarityService<I: VectorIndex> {
    embedder: Arc<dyn ImageEmbedder>,
    fetcher: Arc<dyn SourceFetcher>,
    index: Arc<I>,
    tuning: SearchTuning,
}

impl<I: VectorIndex> SimilarityService<I> {
    /// Tuning is validated here so a misconfigured threshold/limit pair can
    /// never serve traffic.
    pub fn new(
        embedder: Arc<dyn ImageEmbedder>,
        fetcher: Arc<dyn SourceFetcher>,
        index: I,
        tuning: SearchTuning,
    ) -> SimilarityResult<Self> {
        tuning.validate()?;

        Ok(Self {
            embedder,
            fetcher,
            index: Arc::new(index),
            tuning,
        })
    }

    pub fn tuning(&self) -> &SearchTuning {
        &self.tuning
    }

    /// Compute the embedding for a remote source image.
    ///
    /// Used when catalogue entries are ingested; storing the vector is the
    /// caller's responsibility. The extractor is never invoked when the
    /// fetch fails.
    #[instrument(skip(self))]
    pub async fn embed_from_source(&self, image_url: &str) -> SimilarityResult<Embedding> {
        let bytes = self.fetcher.fetch(image_url).await?;
        let embedding = self.embedder.embed_image(&bytes).await?;

        debug!(
            dimension = embedding.dimension(),
            "embedded source image"
        );

        Ok(embedding)
    }

    /// Find the catalogue entries most similar to an uploaded query image.
    ///
    /// Embeds the query bytes, runs the index query with the configured
    /// candidate pool and limit, then applies the similarity floor and the
    /// final top-N cap. An empty result means "no sufficiently similar
    /// match", not an error.
    #[instrument(skip(self, image_bytes), fields(payload_len = image_bytes.len()))]
    pub async fn search_by_image(&self, image_bytes: &[u8]) -> SimilarityResult<Vec<Uuid>> {
        let query = self.embedder.embed_image(image_bytes).await?;

        let candidates = self
            .index
            .query(&query, self.tuning.candidate_pool, self.tuning.limit)
            .await?;

        debug!(raw = candidates.len(), "index returned ranked candidates");

        let matches = rank_candidates(&candidates, self.tuning.min_score, self.tuning.top_n);

        info!(
            kept = matches.len(),
            threshold = self.tuning.min_score,
            "similarity search complete"
        );

        Ok(matches)
    }

    /// Whether the vector index is reachable (for readiness probes).
    pub async fn ready(&self) -> bool {
        self.index.health_check().await
    }
}

impl<I: VectorIndex> Clone for SimilarityService<I> {
    fn clone(&self) -> Self {
        Self {
            embedder: Arc::clone(&self.embedder),
            fetcher: Arc::clone(&self.fetcher),
            index: Arc::clone(&self.index),
            tuning: self.tuning.clone(),
        }
    }
}
