//! Configuration for the Image Search API

use core_config::{app_info, server::ServerConfig, AppInfo, FromEnv};
use domain_similarity::{ClipConfig, QdrantIndexConfig, SearchTuning};

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub clip: ClipConfig,
    pub qdrant: QdrantIndexConfig,
    pub tuning: SearchTuning,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let clip = ClipConfig::from_env()?;
        let qdrant = QdrantIndexConfig::from_env()?;
        let tuning = SearchTuning::from_env()?;

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            clip,
            qdrant,
            tuning,
        })
    }
}
