use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_similarity::{
    ClipImageEmbedder, HttpSourceFetcher, QdrantVectorIndex, SimilarityService,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.environment);

    // Load the vision model before anything binds a port. A missing model or
    // a wrong output dimensionality must abort startup, never surface
    // per request.
    info!(
        "Loading vision encoder from {}",
        config.clip.model_path.display()
    );
    let embedder = ClipImageEmbedder::load(&config.clip)?;

    info!("Connecting to Qdrant at {}", config.qdrant.url);
    let index = QdrantVectorIndex::connect(config.qdrant.clone()).await?;

    // The ANN index must be built over vectors of exactly the extractor's
    // dimensionality; a mismatch is a deployment fault.
    index.verify_dimension().await?;
    info!(
        "Connected to Qdrant, collection '{}' verified for {} dimensions",
        config.qdrant.collection, config.qdrant.dimension
    );

    let fetcher = HttpSourceFetcher::from_env()?;

    let service = SimilarityService::new(
        Arc::new(embedder),
        Arc::new(fetcher),
        index,
        config.tuning.clone(),
    )?;

    // Initialize the application state
    let state = AppState {
        config,
        service: Arc::new(service),
    };

    // Build router with API routes
    let api_routes = api::routes(&state);

    // Create a router with OpenAPI docs
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // Merge health endpoints
    let app = router.merge(health_router(state.config.app));

    info!("Starting Image Search API with production-ready shutdown (30s timeout)");

    // Production-ready server with graceful shutdown
    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: releasing vector index client and model");
            drop(state.service);
            info!("Pipeline resources released");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Image Search API shutdown complete");
    Ok(())
}
