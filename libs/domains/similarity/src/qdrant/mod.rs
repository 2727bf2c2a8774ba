pub mod client;
pub mod config;

pub use client::QdrantVectorIndex;
pub use config::QdrantIndexConfig;
