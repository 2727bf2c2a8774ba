use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{SimilarityError, SimilarityResult};

/// Fixed-length image feature vector.
///
/// The extractor guarantees the length equals the deployed model's
/// dimensionality; vectors of any other length must never reach the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

/// A ranked similarity hit returned by the vector index.
///
/// Higher score means more similar. The score scale is defined by the index's
/// distance metric; nothing here assumes a fixed numeric range beyond the
/// configured threshold's scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Candidate {
    pub id: Uuid,
    pub score: f32,
}

impl Candidate {
    pub fn new(id: Uuid, score: f32) -> Self {
        Self { id, score }
    }
}

/// Retrieval tuning, fixed per process and injected into the pipeline.
///
/// - `candidate_pool`: how many approximate candidates the index considers
///   internally before ranking (recall/latency trade-off, not a result cap)
/// - `limit`: maximum ranked candidates returned by the index query
/// - `min_score`: inclusive similarity floor applied after the query
/// - `top_n`: final cap on the number of returned identifiers
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchTuning {
    pub candidate_pool: usize,
    pub limit: usize,
    pub min_score: f32,
    pub top_n: usize,
}

impl Default for SearchTuning {
    fn default() -> Self {
        Self {
            candidate_pool: 100,
            limit: 10,
            min_score: 0.85,
            top_n: 10,
        }
    }
}

impl SearchTuning {
    pub fn new(candidate_pool: usize, limit: usize, min_score: f32, top_n: usize) -> Self {
        Self {
            candidate_pool,
            limit,
            min_score,
            top_n,
        }
    }

    pub fn from_env() -> SimilarityResult<Self> {
        let defaults = Self::default();

        let tuning = Self {
            candidate_pool: core_config::env_parse_or_default(
                "SEARCH_CANDIDATE_POOL",
                defaults.candidate_pool,
            )?,
            limit: core_config::env_parse_or_default("SEARCH_CANDIDATE_LIMIT", defaults.limit)?,
            min_score: core_config::env_parse_or_default("SEARCH_MIN_SCORE", defaults.min_score)?,
            top_n: core_config::env_parse_or_default("SEARCH_TOP_N", defaults.top_n)?,
        };

        tuning.validate()?;
        Ok(tuning)
    }

    /// Required invariants: `top_n <= limit <= candidate_pool`.
    ///
    /// A limit below the final top-N (or a pool below the limit) would
    /// silently change result semantics, so misconfiguration is rejected at
    /// startup instead of guessed at.
    pub fn validate(&self) -> SimilarityResult<()> {
        if self.top_n == 0 || self.limit == 0 || self.candidate_pool == 0 {
            return Err(SimilarityError::Config(
                "search tuning values must be non-zero".to_string(),
            ));
        }

        if self.limit < self.top_n {
            return Err(SimilarityError::Config(format!(
                "index query limit ({}) must be >= final top-N ({})",
                self.limit, self.top_n
            )));
        }

        if self.candidate_pool < self.limit {
            return Err(SimilarityError::Config(format!(
                "candidate pool ({}) must be >= index query limit ({})",
                self.candidate_pool, self.limit
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_reports_dimension() {
        let embedding = Embedding::new(vec![0.1, 0.2, 0.3]);
        assert_eq!(embedding.dimension(), 3);
        assert_eq!(embedding.as_slice(), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_tuning_defaults() {
        let tuning = SearchTuning::default();
        assert_eq!(tuning.candidate_pool, 100);
        assert_eq!(tuning.limit, 10);
        assert_eq!(tuning.min_score, 0.85);
        assert_eq!(tuning.top_n, 10);
        assert!(tuning.validate().is_ok());
    }

    #[test]
    fn test_tuning_rejects_limit_below_top_n() {
        let tuning = SearchTuning::new(100, 5, 0.85, 10);
        let err = tuning.validate().unwrap_err();
        assert!(err.to_string().contains("top-N"));
    }

    #[test]
    fn test_tuning_rejects_pool_below_limit() {
        let tuning = SearchTuning::new(5, 10, 0.85, 10);
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_tuning_rejects_zero_values() {
        let tuning = SearchTuning::new(100, 10, 0.85, 0);
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_tuning_from_env_with_defaults() {
        temp_env::with_vars(
            [
                ("SEARCH_CANDIDATE_POOL", None::<&str>),
                ("SEARCH_CANDIDATE_LIMIT", None),
                ("SEARCH_MIN_SCORE", None),
                ("SEARCH_TOP_N", None),
            ],
            || {
                let tuning = SearchTuning::from_env().unwrap();
                assert_eq!(tuning.candidate_pool, 100);
                assert_eq!(tuning.min_score, 0.85);
            },
        );
    }

    #[test]
    fn test_tuning_from_env_with_overrides() {
        temp_env::with_vars(
            [
                ("SEARCH_CANDIDATE_POOL", Some("200")),
                ("SEARCH_CANDIDATE_LIMIT", Some("50")),
                ("SEARCH_MIN_SCORE", Some("0.9")),
                ("SEARCH_TOP_N", Some("20")),
            ],
            || {
                let tuning = SearchTuning::from_env().unwrap();
                assert_eq!(tuning.candidate_pool, 200);
                assert_eq!(tuning.limit, 50);
                assert_eq!(tuning.min_score, 0.9);
                assert_eq!(tuning.top_n, 20);
            },
        );
    }

    #[test]
    fn test_tuning_from_env_rejects_inverted_knobs() {
        temp_env::with_vars(
            [
                ("SEARCH_CANDIDATE_POOL", Some("100")),
                ("SEARCH_CANDIDATE_LIMIT", Some("5")),
                ("SEARCH_MIN_SCORE", None::<&str>),
                ("SEARCH_TOP_N", Some("10")),
            ],
            || {
                assert!(SearchTuning::from_env().is_err());
            },
        );
    }
}
