use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::qdrant::{self, PointId, SearchParams, SearchPointsBuilder};
use qdrant_client::Qdrant;
use uuid::Uuid;

use super::QdrantIndexConfig;
use crate::error::{SimilarityError, SimilarityResult};
use crate::index::VectorIndex;
use crate::models::{Candidate, Embedding};

/// Qdrant-backed implementation of `VectorIndex`.
pub struct QdrantVectorIndex {
    client: Qdrant,
    collection: String,
    vector_name: Option<String>,
    dimension: usize,
}

impl QdrantVectorIndex {
    pub async fn connect(config: QdrantIndexConfig) -> SimilarityResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| SimilarityError::Config(format!("failed to build qdrant client: {e}")))?;

        Ok(Self {
            client,
            collection: config.collection,
            vector_name: config.vector_name,
            dimension: config.dimension,
        })
    }

    pub fn from_client(client: Qdrant, config: QdrantIndexConfig) -> Self {
        Self {
            client,
            collection: config.collection,
            vector_name: config.vector_name,
            dimension: config.dimension,
        }
    }

    /// Startup check: the collection's vector size must equal the extractor
    /// dimensionality. A mismatch is a deployment configuration fault, not a
    /// runtime one, so the service refuses to come up.
    pub async fn verify_dimension(&self) -> SimilarityResult<()> {
        let info = self.client.collection_info(&self.collection).await?;

        let result = info.result.ok_or_else(|| {
            SimilarityError::Config(format!(
                "collection '{}' info missing result",
                self.collection
            ))
        })?;

        let stored = self.vector_size(&result.config).ok_or_else(|| {
            SimilarityError::Config(format!(
                "collection '{}' has no vector configuration",
                self.collection
            ))
        })?;

        if stored as usize != self.dimension {
            return Err(SimilarityError::Config(format!(
                "collection '{}' is configured for {}-dimensional vectors, the extractor produces {}",
                self.collection, stored, self.dimension
            )));
        }

        Ok(())
    }

    /// Extract the configured vector size, honoring named vectors when the
    /// collection uses them.
    fn vector_size(&self, config: &Option<qdrant::CollectionConfig>) -> Option<u64> {
        let vectors_config = config
            .as_ref()?
            .params
            .as_ref()?
            .vectors_config
            .as_ref()?
            .config
            .as_ref()?;

        match vectors_config {
            qdrant::vectors_config::Config::Params(p) => Some(p.size),
            qdrant::vectors_config::Config::ParamsMap(map) => match &self.vector_name {
                Some(name) => map.map.get(name).map(|p| p.size),
                None => map.map.values().next().map(|p| p.size),
            },
        }
    }

    fn point_id_to_uuid(point_id: &PointId) -> SimilarityResult<Uuid> {
        match &point_id.point_id_options {
            Some(qdrant::point_id::PointIdOptions::Uuid(uuid_str)) => Uuid::parse_str(uuid_str)
                .map_err(|e| {
                    SimilarityError::IndexUnavailable(format!("index returned invalid UUID: {e}"))
                }),
            Some(qdrant::point_id::PointIdOptions::Num(num)) => {
                // Numeric ids are folded into the UUID space
                Ok(Uuid::from_u128(*num as u128))
            }
            None => Err(SimilarityError::IndexUnavailable(
                "index returned a point without an id".to_string(),
            )),
        }
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn query(
        &self,
        vector: &Embedding,
        candidate_pool: usize,
        limit: usize,
    ) -> SimilarityResult<Vec<Candidate>> {
        // Invariant: only vectors of the deployed dimensionality may reach
        // the store. Checked before any network traffic.
        if vector.dimension() != self.dimension {
            return Err(SimilarityError::InvalidQueryVector {
                expected: self.dimension,
                actual: vector.dimension(),
            });
        }

        let params = SearchParams {
            hnsw_ef: Some(candidate_pool as u64),
            ..Default::default()
        };

        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector.values.clone(), limit as u64)
                .params(params)
                .with_payload(false);

        if let Some(name) = &self.vector_name {
            builder = builder.vector_name(name.clone());
        }

        let results = self.client.search_points(builder).await?;

        // The store's ranking, including its tie-break policy, is
        // authoritative: candidates are mapped in the order received and
        // never re-sorted.
        results
            .result
            .into_iter()
            .map(|point| {
                let id = point
                    .id
                    .as_ref()
                    .map(Self::point_id_to_uuid)
                    .transpose()?
                    .ok_or_else(|| {
                        SimilarityError::IndexUnavailable(
                            "index returned a point without an id".to_string(),
                        )
                    })?;

                Ok(Candidate::new(id, point.score))
            })
            .collect()
    }

    async fn health_check(&self) -> bool {
        self.client.health_check().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_index() -> QdrantVectorIndex {
        let config = QdrantIndexConfig::new(
            "http://localhost:6334".to_string(),
            "catalog_entries".to_string(),
            512,
        );
        let client = Qdrant::from_url(&config.url).build().unwrap();
        QdrantVectorIndex::from_client(client, config)
    }

    #[tokio::test]
    async fn test_query_rejects_wrong_dimension_before_any_network_call() {
        let index = test_index();

        // 511 components against a 512-dimensional deployment; no store is
        // listening, so reaching the network would fail differently.
        let short = Embedding::new(vec![0.0; 511]);
        let err = index.query(&short, 100, 10).await.unwrap_err();

        assert!(matches!(
            err,
            SimilarityError::InvalidQueryVector {
                expected: 512,
                actual: 511
            }
        ));
    }

    #[test]
    fn test_point_id_conversion_roundtrip() {
        let id = Uuid::new_v4();
        let point_id = PointId::from(id.to_string());
        assert_eq!(QdrantVectorIndex::point_id_to_uuid(&point_id).unwrap(), id);
    }

    #[test]
    fn test_numeric_point_id_is_folded_into_uuid_space() {
        let point_id = PointId::from(42u64);
        let uuid = QdrantVectorIndex::point_id_to_uuid(&point_id).unwrap();
        assert_eq!(uuid, Uuid::from_u128(42));
    }

    #[test]
    fn test_malformed_point_id_is_an_index_fault() {
        let point_id = PointId::from("not-a-uuid".to_string());
        let err = QdrantVectorIndex::point_id_to_uuid(&point_id).unwrap_err();
        assert!(matches!(err, SimilarityError::IndexUnavailable(_)));
    }
}
