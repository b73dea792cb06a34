// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::TokenError;
use crate::proxy::ProxyError;
use crate::registry::RegistryError;

/// HTTP API error with appropriate status codes and client-safe messages.
///
/// Messages are deliberately generic; the underlying cause is logged where
/// the conversion happens and never sent to the caller.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (registry miss or unreachable backend)
    BadGateway(String),

    // 504 Gateway Timeout
    GatewayTimeout(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::BadGateway(msg)
            | ApiError::GatewayTimeout(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "http_code": self.status_code().as_u16(),
            "success": false,
            "message": self.message(),
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn invalid_request_body() -> Self {
        ApiError::BadRequest("Invalid request body".to_string())
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Unauthorized".to_string())
    }

    pub fn forbidden() -> Self {
        ApiError::Forbidden("Forbidden".to_string())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error() -> Self {
        ApiError::InternalServerError("Internal server error".to_string())
    }

    pub fn bad_gateway() -> Self {
        ApiError::BadGateway("Bad Gateway".to_string())
    }

    pub fn gateway_timeout() -> Self {
        ApiError::GatewayTimeout("Gateway Timeout".to_string())
    }
}

// Convert component errors to ApiError
impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::EmptySubject => ApiError::invalid_request_body(),
            TokenError::MissingSecret | TokenError::Signing(_) => {
                tracing::error!("Unable to generate token: {}", err);
                ApiError::internal_server_error()
            }
            TokenError::InvalidSignature | TokenError::Malformed(_) | TokenError::Expired => {
                tracing::debug!("Token rejected: {}", err);
                ApiError::unauthorized()
            }
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ModuleNotFound(ref name) => {
                tracing::warn!(module = %name, "Unable to retrieve module details: unknown module");
                ApiError::bad_gateway()
            }
            RegistryError::Unavailable(ref msg) => {
                tracing::error!("Module registry unavailable: {}", msg);
                ApiError::internal_server_error()
            }
            RegistryError::Duplicate(_) | RegistryError::InvalidEntry(_) => {
                tracing::error!("Module registry error: {}", err);
                ApiError::internal_server_error()
            }
        }
    }
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::Upstream(ref e) => {
                tracing::error!("Upstream request failed: {}", e);
                ApiError::bad_gateway()
            }
            ProxyError::Timeout(ref after) => {
                tracing::error!("Upstream did not respond within {:?}", after);
                ApiError::gateway_timeout()
            }
            ProxyError::InvalidTarget { .. } | ProxyError::Response(_) => {
                tracing::error!("Unable to proxy request: {}", err);
                ApiError::internal_server_error()
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
