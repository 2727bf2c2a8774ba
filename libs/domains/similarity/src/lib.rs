//! Similarity Domain Library
//!
//! Domain implementation of the image-similarity pipeline: embedding
//! extraction from raw image bytes, approximate nearest-neighbor retrieval
//! against a Qdrant collection, and deterministic post-filtering of the
//! ranked candidates.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐
//! │ SimilarityService │  ← embed-from-source / search-by-image
//! └─────────┬─────────┘
//!           │
//! ┌─────────▼─────────┐   ┌───────────────┐   ┌─────────────┐
//! │   ImageEmbedder   │   │ SourceFetcher │   │ VectorIndex │   (traits)
//! └─────────┬─────────┘   └───────┬───────┘   └──────┬──────┘
//!           │                     │                  │
//! ┌─────────▼─────────┐  ┌────────▼────────┐  ┌──────▼────────────┐
//! │ ClipImageEmbedder │  │HttpSourceFetcher│  │ QdrantVectorIndex │
//! │   (ONNX Runtime)  │  │    (reqwest)    │  │                   │
//! └───────────────────┘  └─────────────────┘  └───────────────────┘
//! ```
//!
//! The three collaborators are injected as explicitly constructed
//! dependencies with a construct-once-at-startup lifecycle: the vision model
//! is loaded (and its output dimensionality verified) before the service is
//! built, and everything is shared read-only afterwards. The ranked-candidate
//! filter is a pure function, independently testable.

pub mod embedding;
pub mod error;
pub mod fetch;
pub mod handlers;
pub mod index;
pub mod models;
pub mod qdrant;
pub mod ranking;
pub mod service;

// Re-export commonly used types
pub use embedding::{ClipConfig, ClipImageEmbedder, ImageEmbedder};
pub use error::{SimilarityError, SimilarityResult};
pub use fetch::{HttpSourceFetcher, SourceFetcher};
pub use handlers::ApiDoc;
pub use index::VectorIndex;
pub use models::{Candidate, Embedding, SearchTuning};
pub use qdrant::{QdrantIndexConfig, QdrantVectorIndex};
pub use ranking::rank_candidates;
pub use service::SimilarityService;
