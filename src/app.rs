use axum::{
    http::HeaderValue,
    middleware,
    routing::{any, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{admin, protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Public gateway: health plus the authenticated proxy routes
pub fn gateway_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(public::health))
        .merge(proxy_routes(state.clone()))
        .fallback(public::not_found)
        .layer(TraceLayer::new_for_http());

    with_cors(router, &state.config.security)
}

/// Private admin API: token issuance for trusted callers
pub fn admin_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(public::health))
        .route("/admin/health_check", get(public::health))
        .route("/admin/token", post(admin::token_post))
        .fallback(public::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn proxy_routes(state: AppState) -> Router {
    let prefix = state.config.proxy.route_prefix.clone();

    Router::new()
        .route(&format!("{}/:module", prefix), any(protected::proxy_handler))
        .route(&format!("{}/:module/*path", prefix), any(protected::proxy_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware))
        .with_state(state)
}

fn with_cors(router: Router, security: &SecurityConfig) -> Router {
    if !security.enable_cors {
        return router;
    }
    router.layer(cors_layer(security))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::auth::TokenService;
    use crate::config::AppConfig;
    use crate::registry::StaticModuleRegistry;

    fn state() -> AppState {
        let mut config = AppConfig::development();
        config.security.jwt_secret = "router-secret".to_string();
        let tokens = TokenService::new(&config.security.jwt_secret, 10).unwrap();
        let registry = StaticModuleRegistry::parse("billing=http://billing.internal;trim").unwrap();
        AppState::new(Arc::new(config), tokens, Arc::new(registry)).unwrap()
    }

    async fn status_of(router: Router, method: &str, uri: &str) -> StatusCode {
        let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        router.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn gateway_routes() {
        assert_eq!(status_of(gateway_router(state()), "GET", "/health").await, StatusCode::OK);
        assert_eq!(
            status_of(gateway_router(state()), "GET", "/api/billing/invoices").await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(gateway_router(state()), "GET", "/api/billing").await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(gateway_router(state()), "GET", "/elsewhere").await, StatusCode::NOT_FOUND);
        assert_eq!(status_of(gateway_router(state()), "OPTIONS", "/api/ghost/x").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_routes() {
        assert_eq!(status_of(admin_router(state()), "GET", "/admin/health_check").await, StatusCode::OK);
        assert_eq!(status_of(admin_router(state()), "POST", "/admin/token").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_of(admin_router(state()), "GET", "/api/billing/x").await, StatusCode::NOT_FOUND);
    }

    async fn preflight_allow_origin(router: Router, origin: &str) -> Option<String> {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/billing/invoices")
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn cors_allows_only_listed_origins() {
        let mut state = state();
        let mut config = (*state.config).clone();
        config.security.enable_cors = true;
        config.security.cors_origins = vec!["https://app.example.com".to_string(), "bad\norigin".to_string()];
        state.config = Arc::new(config);

        assert_eq!(
            preflight_allow_origin(gateway_router(state.clone()), "https://app.example.com").await,
            Some("https://app.example.com".to_string())
        );
        assert_eq!(preflight_allow_origin(gateway_router(state), "https://evil.example").await, None);
    }
}
