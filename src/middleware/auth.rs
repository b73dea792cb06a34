use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, info, warn};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::proxy::split_module_path;
use crate::state::AppState;

/// Authenticated caller, injected into request extensions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub subject: String,
    pub admin: bool,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.subject,
            admin: claims.admin,
        }
    }
}

/// JWT gate in front of the proxy.
///
/// Preflight requests pass without a token. Everything else needs a valid
/// bearer token, and an admin one where the admin policy says so. Failures
/// get a bare 401/403; the reason only goes to the log.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS {
        debug!("Received preflight request, returning");
        return Ok(StatusCode::OK.into_response());
    }

    debug!(path = %request.uri().path(), "Authenticating request");

    let token = extract_bearer_token(&headers).map_err(|msg| {
        warn!("Unable to authenticate user: {}", msg);
        ApiError::unauthorized()
    })?;

    let claims = state.tokens.verify(token).map_err(|e| {
        warn!("Unable to authenticate user: {}", e);
        ApiError::unauthorized()
    })?;

    let module = split_module_path(&state.config.proxy.route_prefix, request.uri().path()).map(|(m, _)| m);
    if state.admin_policy.requires_admin(module) && !claims.admin {
        warn!(user = %claims.subject, module = ?module, "Non-admin token on admin-only route");
        return Err(ApiError::forbidden());
    }

    info!(user = %claims.subject, "Received proxy request for user");
    request.extensions_mut().insert(AuthenticatedUser::from(claims));

    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let (scheme, token) = auth_str
        .split_once(' ')
        .ok_or("Authorization header must use Bearer token format")?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err("Authorization header must use Bearer token format");
    }

    let token = token.trim();
    if token.is_empty() {
        return Err("Empty JWT token");
    }
    Ok(token)
}
