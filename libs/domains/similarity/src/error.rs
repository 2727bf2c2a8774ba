use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::errors::{error_response, ErrorCode};
use thiserror::Error;

/// Failures of the similarity pipeline, one variant per stage so callers can
/// always tell which stage failed.
#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("image decode failed: {0}")]
    ImageDecode(String),

    #[error("source image fetch failed: {0}")]
    SourceFetch(String),

    #[error("embedding inference failed: {0}")]
    Inference(String),

    #[error("query vector dimension mismatch: expected {expected}, got {actual}")]
    InvalidQueryVector { expected: usize, actual: usize },

    #[error("vector index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type SimilarityResult<T> = Result<T, SimilarityError>;

impl From<qdrant_client::QdrantError> for SimilarityError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        SimilarityError::IndexUnavailable(err.to_string())
    }
}

impl From<reqwest::Error> for SimilarityError {
    fn from(err: reqwest::Error) -> Self {
        SimilarityError::SourceFetch(err.to_string())
    }
}

impl From<core_config::ConfigError> for SimilarityError {
    fn from(err: core_config::ConfigError) -> Self {
        SimilarityError::Config(err.to_string())
    }
}

impl SimilarityError {
    /// Decode and fetch failures are caller-input faults; inference and
    /// dimensionality bugs are service faults; index unavailability is the
    /// only failure callers should treat as retryable.
    fn status(&self) -> StatusCode {
        match self {
            SimilarityError::ImageDecode(_) | SimilarityError::SourceFetch(_) => {
                StatusCode::BAD_REQUEST
            }
            SimilarityError::Inference(_)
            | SimilarityError::InvalidQueryVector { .. }
            | SimilarityError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SimilarityError::IndexUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            SimilarityError::ImageDecode(_) => ErrorCode::ImageDecode,
            SimilarityError::SourceFetch(_) => ErrorCode::SourceFetch,
            SimilarityError::Inference(_) => ErrorCode::EmbeddingInference,
            SimilarityError::InvalidQueryVector { .. } => ErrorCode::QueryVectorMismatch,
            SimilarityError::IndexUnavailable(_) => ErrorCode::IndexUnavailable,
            SimilarityError::Config(_) => ErrorCode::PipelineConfig,
        }
    }
}

impl IntoResponse for SimilarityError {
    fn into_response(self) -> Response {
        match &self {
            // A dimension mismatch is a programming/configuration bug, never
            // a caller mistake: log it loudly.
            SimilarityError::InvalidQueryVector { expected, actual } => {
                tracing::error!(
                    error_code = self.error_code().code(),
                    expected,
                    actual,
                    "query vector rejected: dimensionality mismatch"
                );
            }
            SimilarityError::IndexUnavailable(msg) => {
                tracing::warn!(
                    error_code = self.error_code().code(),
                    "vector index unavailable: {}",
                    msg
                );
            }
            SimilarityError::Inference(msg) | SimilarityError::Config(msg) => {
                tracing::error!(error_code = self.error_code().code(), "{}", msg);
            }
            SimilarityError::ImageDecode(msg) | SimilarityError::SourceFetch(msg) => {
                tracing::info!(error_code = self.error_code().code(), "{}", msg);
            }
        }

        error_response(self.status(), self.to_string(), self.error_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_stage_has_a_distinct_code() {
        let errors = [
            SimilarityError::ImageDecode("x".into()),
            SimilarityError::SourceFetch("x".into()),
            SimilarityError::Inference("x".into()),
            SimilarityError::InvalidQueryVector {
                expected: 512,
                actual: 511,
            },
            SimilarityError::IndexUnavailable("x".into()),
            SimilarityError::Config("x".into()),
        ];

        let mut codes: Vec<i32> = errors.iter().map(|e| e.error_code().code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_caller_input_faults_are_bad_requests() {
        assert_eq!(
            SimilarityError::ImageDecode("not an image".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SimilarityError::SourceFetch("connection refused".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_index_unavailability_signals_retryable() {
        assert_eq!(
            SimilarityError::IndexUnavailable("timeout".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_messages_are_stage_labeled() {
        let err = SimilarityError::InvalidQueryVector {
            expected: 512,
            actual: 256,
        };
        assert_eq!(
            err.to_string(),
            "query vector dimension mismatch: expected 512, got 256"
        );

        let err = SimilarityError::Inference("bad tensor shape".into());
        assert!(err.to_string().starts_with("embedding inference failed"));
    }
}
