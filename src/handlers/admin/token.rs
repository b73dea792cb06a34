// handlers/admin/token.rs - POST /admin/token handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(alias = "uid")]
    pub subject: String,
    /// Must be sent explicitly; a missing flag is a bad request, not `false`
    pub admin: Option<bool>,
}

/**
 * POST /admin/token - Issue a signed access token
 *
 * Callers are trusted components on the private network; nothing here
 * authenticates them.
 *
 * Expected Input:
 * ```json
 * { "subject": "user-id", "admin": false }
 * ```
 * (`uid` is accepted in place of `subject`)
 *
 * Expected Output (Success):
 * ```json
 * { "http_code": 200, "success": true, "token": "eyJhbGciOiJIUzI1NiI..." }
 * ```
 *
 * 400 on a malformed body, empty subject or missing admin flag;
 * 500 if signing fails.
 */
pub async fn token_post(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> ApiResult<Value> {
    tracing::info!("Received request for token");

    let Json(request) = payload.map_err(|e| {
        tracing::error!("Received invalid request body: {}", e);
        ApiError::invalid_request_body()
    })?;

    let admin = request.admin.ok_or_else(|| {
        tracing::error!("Received invalid request body: missing admin flag");
        ApiError::invalid_request_body()
    })?;
    if request.subject.trim().is_empty() {
        tracing::error!("Received invalid request body: empty subject");
        return Err(ApiError::invalid_request_body());
    }

    let token = state.tokens.issue(&request.subject, admin)?;
    tracing::info!(user = %request.subject, admin, "Issued token");

    Ok(ApiResponse::success(json!({ "token": token })))
}
