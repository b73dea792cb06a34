#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Map, Value};

use lifelink_gateway::app::{admin_router, gateway_router};
use lifelink_gateway::auth::TokenService;
use lifelink_gateway::config::AppConfig;
use lifelink_gateway::registry::{Module, ModuleRegistry, RegistryError, StaticModuleRegistry};
use lifelink_gateway::state::AppState;

pub const SECRET: &str = "integration-secret";

/// Gateway and admin API running in-process on local ports
pub struct TestGateway {
    pub base_url: String,
    pub admin_url: String,
    pub tokens: TokenService,
}

impl TestGateway {
    pub fn token(&self, subject: &str, admin: bool) -> String {
        self.tokens.issue(subject, admin).expect("issue token")
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = SECRET.to_string();
    config.registry.static_modules = Some(String::new());
    config.proxy.upstream_timeout_secs = 5;
    config.proxy.connect_timeout_secs = 2;
    config
}

pub fn module(name: &str, target: &str, trim_name: bool) -> Module {
    Module {
        name: name.to_string(),
        target_base_url: target.to_string(),
        trim_name,
        description: String::new(),
    }
}

pub fn static_registry(modules: Vec<Module>) -> Arc<dyn ModuleRegistry> {
    Arc::new(StaticModuleRegistry::new(modules).expect("unique module names"))
}

/// Registry whose backing store is down
pub struct FailingRegistry;

#[async_trait]
impl ModuleRegistry for FailingRegistry {
    async fn resolve(&self, _name: &str) -> Result<Module, RegistryError> {
        Err(RegistryError::Unavailable("connection refused".to_string()))
    }
}

async fn serve(router: Router) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://127.0.0.1:{}", port))
}

pub async fn spawn_gateway(config: AppConfig, registry: Arc<dyn ModuleRegistry>) -> Result<TestGateway> {
    let config = Arc::new(config);
    let tokens = TokenService::new(&config.security.jwt_secret, config.security.token_expiry_minutes)?;
    let state = AppState::new(config, tokens.clone(), registry)?;

    let base_url = serve(gateway_router(state.clone())).await?;
    let admin_url = serve(admin_router(state)).await?;
    wait_ready(&base_url, Duration::from_secs(5)).await?;
    wait_ready(&admin_url, Duration::from_secs(5)).await?;

    Ok(TestGateway { base_url, admin_url, tokens })
}

async fn wait_ready(base_url: &str, timeout: Duration) -> Result<()> {
    let client = reqwest::Client::new();
    let deadline = Instant::now() + timeout;
    loop {
        if Instant::now() > deadline {
            break;
        }
        if let Ok(resp) = client.get(format!("{}/health", base_url)).send().await {
            if resp.status() == reqwest::StatusCode::OK {
                return Ok(());
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    anyhow::bail!("server did not become ready on {} within {:?}", base_url, timeout)
}

/// Backend that reports what it received.
///
/// Paths ending in `/slow` answer after three seconds; paths ending in
/// `/created` answer 201 with an extra header.
pub async fn spawn_echo_backend() -> Result<String> {
    serve(Router::new().fallback(echo)).await
}

async fn echo(request: Request) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);
    let headers = header_map_json(request.headers());

    if path.ends_with("/slow") {
        tokio::time::sleep(Duration::from_secs(3)).await;
    }

    let body = to_bytes(request.into_body(), usize::MAX).await.unwrap_or_default();
    let report = Json(json!({
        "method": method,
        "path": path,
        "query": query,
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }));

    if path.ends_with("/created") {
        return (StatusCode::CREATED, [("x-backend", "echo")], report).into_response();
    }
    report.into_response()
}

fn header_map_json(headers: &HeaderMap) -> Value {
    let mut map = Map::new();
    for (name, value) in headers {
        map.insert(name.to_string(), json!(value.to_str().unwrap_or_default()));
    }
    Value::Object(map)
}

/// Marks set by the slow backend as its handler progresses
#[derive(Default)]
pub struct RequestTracker {
    started: AtomicBool,
    finished: AtomicBool,
}

impl RequestTracker {
    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

/// Backend that takes two seconds to answer and records whether the
/// handler ran to completion. A dropped connection cancels the handler.
pub async fn spawn_tracking_backend() -> Result<(String, Arc<RequestTracker>)> {
    let tracker = Arc::new(RequestTracker::default());
    let url = serve(Router::new().fallback(tracked).with_state(tracker.clone())).await?;
    Ok((url, tracker))
}

async fn tracked(State(tracker): State<Arc<RequestTracker>>) -> &'static str {
    tracker.started.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(2)).await;
    tracker.finished.store(true, Ordering::SeqCst);
    "done"
}
