// handlers/public/health.rs - GET /health liveness check

use axum::response::IntoResponse;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::ApiResponse;

/// GET /health - liveness only; does not touch the registry
pub async fn health() -> impl IntoResponse {
    tracing::debug!("Received request for health check handler");
    ApiResponse::success(json!({
        "message": "Running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Fallback for unrouted paths
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}
