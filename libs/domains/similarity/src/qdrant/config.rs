use crate::error::SimilarityResult;

/// Qdrant connection and collection configuration
#[derive(Debug, Clone)]
pub struct QdrantIndexConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Collection holding the catalogue entries
    pub collection: String,
    /// Named vector the ANN index is built over, if the collection uses
    /// named vectors
    pub vector_name: Option<String>,
    /// Embedding dimensionality the collection must be configured with
    pub dimension: usize,
}

impl QdrantIndexConfig {
    pub fn new(url: String, collection: String, dimension: usize) -> Self {
        Self {
            url,
            api_key: None,
            timeout_secs: 30,
            collection,
            vector_name: None,
            dimension,
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_vector_name(mut self, vector_name: String) -> Self {
        self.vector_name = Some(vector_name);
        self
    }

    pub fn from_env() -> SimilarityResult<Self> {
        let url = core_config::env_or_default("QDRANT_URL", "http://localhost:6334");
        let api_key = std::env::var("QDRANT_API_KEY").ok();
        let timeout_secs = core_config::env_parse_or_default("QDRANT_TIMEOUT_SECS", 30u64)?;
        let collection = core_config::env_or_default("SEARCH_COLLECTION", "catalog_entries");
        let vector_name = std::env::var("SEARCH_VECTOR_NAME").ok();
        let dimension = core_config::env_parse_or_default("EMBEDDING_DIMENSION", 512usize)?;

        Ok(Self {
            url,
            api_key,
            timeout_secs,
            collection,
            vector_name,
            dimension,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_defaults() {
        temp_env::with_vars(
            [
                ("QDRANT_URL", None::<&str>),
                ("QDRANT_API_KEY", None),
                ("QDRANT_TIMEOUT_SECS", None),
                ("SEARCH_COLLECTION", None),
                ("SEARCH_VECTOR_NAME", None),
                ("EMBEDDING_DIMENSION", None),
            ],
            || {
                let config = QdrantIndexConfig::from_env().unwrap();
                assert_eq!(config.url, "http://localhost:6334");
                assert_eq!(config.collection, "catalog_entries");
                assert_eq!(config.timeout_secs, 30);
                assert_eq!(config.dimension, 512);
                assert!(config.api_key.is_none());
                assert!(config.vector_name.is_none());
            },
        );
    }

    #[test]
    fn test_config_from_env_overrides() {
        temp_env::with_vars(
            [
                ("QDRANT_URL", Some("http://qdrant.internal:6334")),
                ("QDRANT_API_KEY", Some("secret")),
                ("SEARCH_COLLECTION", Some("products")),
                ("SEARCH_VECTOR_NAME", Some("image_embedding")),
                ("EMBEDDING_DIMENSION", Some("768")),
            ],
            || {
                let config = QdrantIndexConfig::from_env().unwrap();
                assert_eq!(config.url, "http://qdrant.internal:6334");
                assert_eq!(config.api_key.as_deref(), Some("secret"));
                assert_eq!(config.collection, "products");
                assert_eq!(config.vector_name.as_deref(), Some("image_embedding"));
                assert_eq!(config.dimension, 768);
            },
        );
    }

    #[test]
    fn test_config_builders() {
        let config = QdrantIndexConfig::new(
            "http://localhost:6334".to_string(),
            "catalog_entries".to_string(),
            512,
        )
        .with_api_key("key".to_string())
        .with_timeout(5)
        .with_vector_name("image_embedding".to_string());

        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.vector_name.as_deref(), Some("image_embedding"));
    }
}
