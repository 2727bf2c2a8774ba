//! Type-safe error codes for API responses.
//!
//! Single source of truth for error codes used across the application. Each
//! error code includes:
//! - String representation for client consumption (e.g., "IMAGE_DECODE")
//! - Integer code for logging and monitoring (e.g., 2001)
//! - Default human-readable message

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
///
/// Combines string identifiers (for clients), integer codes (for monitoring),
/// and default messages (for consistency). Codes are organized into ranges:
/// - 1000-1999: generic client/server errors
/// - 2000-2999: similarity pipeline errors
/// - 4000-4999: I/O errors
/// - 5000-5999: serialization errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Generic errors (1000-1999)
    /// Request validation failed
    ValidationError,

    /// Invalid UUID format in path or query parameter
    InvalidUuid,

    /// JSON extraction from request body failed
    JsonExtraction,

    /// Requested resource was not found
    NotFound,

    /// An unexpected internal server error occurred
    InternalError,

    /// Request payload is semantically incorrect
    UnprocessableEntity,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    // Similarity pipeline errors (2000-2999)
    /// Uploaded or fetched payload is not a decodable image
    ImageDecode,

    /// Remote source image could not be retrieved
    SourceFetch,

    /// Embedding model inference failed
    EmbeddingInference,

    /// Query vector dimensionality does not match the deployed index
    QueryVectorMismatch,

    /// Vector index is unreachable or timed out
    IndexUnavailable,

    /// Pipeline configuration is invalid
    PipelineConfig,

    // I/O errors (4000s)
    /// File system I/O error
    IoError,

    // JSON parsing errors (5000s)
    /// JSON serialization/deserialization error
    SerdeJsonError,
}

impl ErrorCode {
    /// Get the string representation for client consumption.
    ///
    /// Returns a SCREAMING_SNAKE_CASE identifier that clients can use to
    /// programmatically handle specific error types.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidUuid => "INVALID_UUID",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
            Self::UnprocessableEntity => "UNPROCESSABLE_ENTITY",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::ImageDecode => "IMAGE_DECODE",
            Self::SourceFetch => "SOURCE_FETCH",
            Self::EmbeddingInference => "EMBEDDING_INFERENCE",
            Self::QueryVectorMismatch => "QUERY_VECTOR_MISMATCH",
            Self::IndexUnavailable => "INDEX_UNAVAILABLE",
            Self::PipelineConfig => "PIPELINE_CONFIG",
            Self::IoError => "IO_ERROR",
            Self::SerdeJsonError => "SERDE_JSON_ERROR",
        }
    }

    /// Get the integer code for logging and monitoring.
    pub fn code(&self) -> i32 {
        match self {
            // Generic errors (1000-1999)
            Self::ValidationError => 1001,
            Self::InvalidUuid => 1002,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::UnprocessableEntity => 1006,
            Self::ServiceUnavailable => 1007,

            // Similarity pipeline errors (2000-2999)
            Self::ImageDecode => 2001,
            Self::SourceFetch => 2002,
            Self::EmbeddingInference => 2003,
            Self::QueryVectorMismatch => 2004,
            Self::IndexUnavailable => 2005,
            Self::PipelineConfig => 2006,

            // I/O errors (4000s)
            Self::IoError => 4001,

            // JSON parsing errors (5000s)
            Self::SerdeJsonError => 5001,
        }
    }

    /// Get the default user-facing error message.
    ///
    /// Individual handlers can override these messages with more specific
    /// details.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidUuid => "Invalid UUID format",
            Self::JsonExtraction => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::InternalError => "An internal server error occurred",
            Self::UnprocessableEntity => "Request cannot be processed",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::ImageDecode => "Payload is not a decodable image",
            Self::SourceFetch => "Source image could not be retrieved",
            Self::EmbeddingInference => "Embedding inference failed",
            Self::QueryVectorMismatch => "Query vector dimensionality mismatch",
            Self::IndexUnavailable => "Vector index is unavailable",
            Self::PipelineConfig => "Pipeline configuration error",
            Self::IoError => "I/O error occurred",
            Self::SerdeJsonError => "JSON serialization error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_string_representation() {
        assert_eq!(ErrorCode::ValidationError.as_str(), "VALIDATION_ERROR");
        assert_eq!(ErrorCode::ImageDecode.as_str(), "IMAGE_DECODE");
        assert_eq!(ErrorCode::IndexUnavailable.as_str(), "INDEX_UNAVAILABLE");
    }

    #[test]
    fn test_error_code_integer_codes() {
        assert_eq!(ErrorCode::ValidationError.code(), 1001);
        assert_eq!(ErrorCode::ImageDecode.code(), 2001);
        assert_eq!(ErrorCode::QueryVectorMismatch.code(), 2004);
    }

    #[test]
    fn test_error_code_messages() {
        assert_eq!(
            ErrorCode::SourceFetch.default_message(),
            "Source image could not be retrieved"
        );
        assert_eq!(ErrorCode::NotFound.default_message(), "Resource not found");
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::EmbeddingInference.to_string(), "EMBEDDING_INFERENCE");
    }

    #[test]
    fn test_error_code_serialization() {
        let code = ErrorCode::ImageDecode;
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"IMAGE_DECODE\"");
    }

    #[test]
    fn test_error_code_deserialization() {
        let json = "\"INDEX_UNAVAILABLE\"";
        let code: ErrorCode = serde_json::from_str(json).unwrap();
        assert_eq!(code, ErrorCode::IndexUnavailable);
    }
}
