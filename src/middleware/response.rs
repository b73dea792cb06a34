use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Success envelope: `{http_code, success: true, ...fields}`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self::with_status(data, StatusCode::OK)
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self { data, status_code }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let fields = match serde_json::to_value(&self.data) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => {
                let mut fields = Map::new();
                fields.insert("data".to_string(), other);
                fields
            }
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return crate::error::ApiError::internal_server_error().into_response();
            }
        };

        let mut envelope = Map::new();
        envelope.insert("http_code".to_string(), json!(self.status_code.as_u16()));
        envelope.insert("success".to_string(), json!(true));
        envelope.extend(fields);

        (self.status_code, Json(Value::Object(envelope))).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
