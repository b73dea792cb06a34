use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::{AdminPolicy, AppConfig};
use crate::proxy::{ProxyClient, ProxyError};
use crate::registry::ModuleRegistry;

/// Shared, read-only state handed to every request.
///
/// Everything in here is fixed at startup, so requests never contend on it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub registry: Arc<dyn ModuleRegistry>,
    pub proxy: ProxyClient,
    pub admin_policy: Arc<AdminPolicy>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        tokens: TokenService,
        registry: Arc<dyn ModuleRegistry>,
    ) -> Result<Self, ProxyError> {
        let proxy = ProxyClient::new(&config.proxy)?;
        let admin_policy = Arc::new(config.security.admin_policy());
        Ok(Self {
            config,
            tokens: Arc::new(tokens),
            registry,
            proxy,
            admin_policy,
        })
    }
}
