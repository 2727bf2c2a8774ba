//! Shared axum infrastructure: error responses, router assembly, health
//! endpoints and graceful shutdown.

pub mod errors;
pub mod server;

pub use errors::{error_response, AppError, ErrorCode, ErrorResponse};
pub use server::{create_app, create_production_app, create_router, health_router};
