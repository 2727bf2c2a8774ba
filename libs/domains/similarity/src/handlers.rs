//! REST handlers for the similarity pipeline

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::{SimilarityError, SimilarityResult};
use crate::index::VectorIndex;
use crate::service::SimilarityService;

/// OpenAPI documentation for the similarity API
#[derive(OpenApi)]
#[openapi(
    paths(search_by_image, embed_from_source),
    components(schemas(SearchResponse, EmbedRequest, EmbedResponse)),
    tags(
        (name = "similarity", description = "Image embedding and visual similarity search")
    )
)]
pub struct ApiDoc;

/// Create the similarity router with all HTTP endpoints
pub fn router<I: VectorIndex + 'static>(service: Arc<SimilarityService<I>>) -> Router {
    Router::new()
        .route("/search", post(search_by_image))
        .route("/embeddings", post(embed_from_source))
        .with_state(service)
}

// ===== Request/Response DTOs =====

/// Request to embed a remote source image
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmbedRequest {
    /// URL of the source image to embed
    pub image_url: String,
}

/// Embedding of a source image
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmbedResponse {
    pub embedding: Vec<f32>,
    pub dimension: usize,
}

/// Ranked identifiers of the most similar catalogue entries
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub entry_ids: Vec<Uuid>,
}

// ===== Handlers =====

/// Search the catalogue by a query image
///
/// Accepts a multipart upload with an `image` part, embeds it and returns the
/// identifiers of the most similar entries, best match first. An empty list
/// means no entry met the similarity threshold.
#[utoipa::path(
    post,
    path = "/search",
    tag = "similarity",
    request_body(
        description = "Multipart form with an `image` part containing the query image bytes",
        content_type = "multipart/form-data"
    ),
    responses(
        (status = 200, description = "Ranked matches, best first", body = SearchResponse),
        (status = 400, description = "Payload is not a decodable image"),
        (status = 500, description = "Embedding inference failed"),
        (status = 503, description = "Vector index unavailable, safe to retry")
    )
)]
async fn search_by_image<I: VectorIndex>(
    State(service): State<Arc<SimilarityService<I>>>,
    mut multipart: Multipart,
) -> SimilarityResult<Json<SearchResponse>> {
    let bytes = read_image_part(&mut multipart).await?;
    let entry_ids = service.search_by_image(&bytes).await?;
    Ok(Json(SearchResponse { entry_ids }))
}

/// Embed a remote source image
///
/// Fetches the image behind `image_url` and returns its embedding. Used at
/// catalogue ingestion time; persisting the vector is the caller's job.
#[utoipa::path(
    post,
    path = "/embeddings",
    tag = "similarity",
    request_body = EmbedRequest,
    responses(
        (status = 200, description = "Embedding of the source image", body = EmbedResponse),
        (status = 400, description = "Source fetch failed or payload is not a decodable image"),
        (status = 500, description = "Embedding inference failed")
    )
)]
async fn embed_from_source<I: VectorIndex>(
    State(service): State<Arc<SimilarityService<I>>>,
    Json(request): Json<EmbedRequest>,
) -> SimilarityResult<Json<EmbedResponse>> {
    let embedding = service.embed_from_source(&request.image_url).await?;

    Ok(Json(EmbedResponse {
        dimension: embedding.dimension(),
        embedding: embedding.values,
    }))
}

/// Pull the uploaded image bytes out of the multipart body.
///
/// Accepts the first part named `image`, or the first part carrying a file
/// name when the client didn't label it.
async fn read_image_part(multipart: &mut Multipart) -> SimilarityResult<Vec<u8>> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        SimilarityError::ImageDecode(format!("unreadable multipart upload: {e}"))
    })? {
        if field.name() == Some("image") || field.file_name().is_some() {
            let bytes = field.bytes().await.map_err(|e| {
                SimilarityError::ImageDecode(format!("failed to read image part: {e}"))
            })?;
            return Ok(bytes.to_vec());
        }
    }

    Err(SimilarityError::ImageDecode(
        "request contained no image part".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_request_deserializes() {
        let request: EmbedRequest =
            serde_json::from_str(r#"{"image_url": "http://catalog/img.png"}"#).unwrap();
        assert_eq!(request.image_url, "http://catalog/img.png");
    }

    #[test]
    fn test_search_response_serializes_ids_as_strings() {
        let id = Uuid::new_v4();
        let response = SearchResponse { entry_ids: vec![id] };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["entry_ids"][0], id.to_string());
    }

    #[test]
    fn test_embed_response_shape() {
        let response = EmbedResponse {
            embedding: vec![0.1, 0.2],
            dimension: 2,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["dimension"], 2);
        assert_eq!(json["embedding"].as_array().unwrap().len(), 2);
    }
}
