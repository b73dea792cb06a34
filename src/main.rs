use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use lifelink_gateway::app::{admin_router, gateway_router};
use lifelink_gateway::auth::TokenService;
use lifelink_gateway::config::{self, AppConfig};
use lifelink_gateway::registry::{ModuleRegistry, PgModuleRegistry, StaticModuleRegistry};
use lifelink_gateway::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up JWT_SECRET, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!("Starting Lifelink gateway in {:?} mode", config.environment);

    // Configuration problems abort startup rather than surfacing per request
    config.validate().context("invalid configuration")?;
    let config = Arc::new(config.clone());

    let tokens = TokenService::new(&config.security.jwt_secret, config.security.token_expiry_minutes)
        .context("failed to initialise token service")?;
    let (registry, pg) = build_registry(&config).await?;
    let state = AppState::new(config.clone(), tokens, registry).context("failed to build proxy client")?;

    let gateway_listener = tokio::net::TcpListener::bind(&config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen_addr))?;
    let admin_listener = tokio::net::TcpListener::bind(&config.server.admin_listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.admin_listen_addr))?;

    tracing::info!("Gateway listening on http://{}", config.server.listen_addr);
    tracing::info!("Admin API listening on http://{}", config.server.admin_listen_addr);

    let gateway = axum::serve(gateway_listener, gateway_router(state.clone()))
        .with_graceful_shutdown(shutdown_signal());
    let admin = axum::serve(admin_listener, admin_router(state)).with_graceful_shutdown(shutdown_signal());

    let result = tokio::try_join!(
        async { gateway.await.context("gateway server failed") },
        async { admin.await.context("admin server failed") },
    );

    if let Some(pg) = pg {
        pg.close().await;
    }
    result.map(|_| ())
}

/// Postgres when DATABASE_URL is set, otherwise the static module table
async fn build_registry(config: &AppConfig) -> anyhow::Result<(Arc<dyn ModuleRegistry>, Option<PgModuleRegistry>)> {
    if let Some(url) = &config.registry.database_url {
        let registry = PgModuleRegistry::connect(url, &config.registry)
            .await
            .context("module registry unreachable")?;
        return Ok((Arc::new(registry.clone()), Some(registry)));
    }

    let spec = config.registry.static_modules.as_deref().unwrap_or_default();
    let registry = StaticModuleRegistry::parse(spec).context("invalid GATEWAY_STATIC_MODULES")?;
    tracing::info!("Using static module registry with {} module(s)", registry.len());
    Ok((Arc::new(registry), None))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
