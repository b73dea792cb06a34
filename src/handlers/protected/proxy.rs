// handlers/protected/proxy.rs - ANY {prefix}/:module[/*path]

use axum::{
    extract::{Extension, Request, State},
    response::Response,
};

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::proxy;
use crate::state::AppState;

/// Forward an authenticated request to the module named in its path.
///
/// `X-Authenticated-Userid` on the forwarded request is always the
/// verified subject, never a client-supplied value.
pub async fn proxy_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    request: Request,
) -> Result<Response, ApiError> {
    proxy::dispatch(
        state.registry.as_ref(),
        &state.proxy,
        &state.config.proxy,
        request,
        &user.subject,
    )
    .await
}
