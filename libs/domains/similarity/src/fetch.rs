//! Remote source-image retrieval for ingestion-time embedding requests.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{SimilarityError, SimilarityResult};

/// Capability seam over image transport.
///
/// The pipeline never fetches on its own behalf: `EmbedFromSource` is handed
/// a URL by the caller and the fetch failure must be distinguishable from
/// everything downstream of it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Retrieve the raw bytes of a remote source image.
    async fn fetch(&self, url: &str) -> SimilarityResult<Vec<u8>>;
}

/// HTTP fetcher with a bounded request timeout.
pub struct HttpSourceFetcher {
    client: reqwest::Client,
}

impl HttpSourceFetcher {
    pub fn new(timeout: Duration) -> SimilarityResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SimilarityError::Config(format!("failed to build fetch client: {e}")))?;

        Ok(Self { client })
    }

    pub fn from_env() -> SimilarityResult<Self> {
        let timeout_secs: u64 = core_config::env_parse_or_default("SOURCE_FETCH_TIMEOUT_SECS", 10)?;
        Self::new(Duration::from_secs(timeout_secs))
    }
}

#[async_trait]
impl SourceFetcher for HttpSourceFetcher {
    async fn fetch(&self, url: &str) -> SimilarityResult<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(SimilarityError::SourceFetch(format!(
                "source returned HTTP {} for {}",
                response.status(),
                url
            )));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
