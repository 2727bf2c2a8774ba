//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Image Search API",
        version = "0.1.0",
        description = "Visual similarity search over the catalogue's image embeddings",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api", api = domain_similarity::ApiDoc)
    ),
    tags(
        (name = "similarity", description = "Image embedding and similarity search endpoints")
    )
)]
pub struct ApiDoc;
