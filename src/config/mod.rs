use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub registry: RegistryConfig,
    pub proxy: ProxyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Public gateway listener
    pub listen_addr: String,
    /// Private admin listener (token issuance)
    pub admin_listen_addr: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing, default)]
    pub jwt_secret: String,
    pub token_expiry_minutes: i64,
    /// CORS on the gateway listener (`SECURITY_ENABLE_CORS`). Turning it off is
    /// an opt-out for deployments behind an edge that owns CORS: preflights
    /// still answer 200 unauthenticated, but carry no CORS headers.
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    /// Modules that require an admin token. `*` marks every module.
    pub admin_modules: Vec<String>,
}

// Keep the signing secret out of logs.
impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_expiry_minutes", &self.token_expiry_minutes)
            .field("enable_cors", &self.enable_cors)
            .field("cors_origins", &self.cors_origins)
            .field("admin_modules", &self.admin_modules)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    /// Fixed module table (`name=url[;trim],...`) used instead of Postgres
    pub static_modules: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub route_prefix: String,
    pub upstream_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set")]
    MissingSecret,

    #[error("token expiry must be positive, got {0} minutes")]
    InvalidTokenExpiry(i64),

    #[error("no module registry configured: set DATABASE_URL or GATEWAY_STATIC_MODULES")]
    MissingRegistry,

    #[error("route prefix must be empty or start with '/': {0}")]
    InvalidRoutePrefix(String),
}

/// Which routes the auth middleware holds to admin tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminPolicy {
    None,
    All,
    Modules(HashSet<String>),
}

impl AdminPolicy {
    pub fn requires_admin(&self, module: Option<&str>) -> bool {
        match self {
            AdminPolicy::None => false,
            AdminPolicy::All => true,
            AdminPolicy::Modules(names) => module.is_some_and(|m| names.contains(m)),
        }
    }
}

impl SecurityConfig {
    pub fn admin_policy(&self) -> AdminPolicy {
        if self.admin_modules.is_empty() {
            AdminPolicy::None
        } else if self.admin_modules.iter().any(|m| m == "*") {
            AdminPolicy::All
        } else {
            AdminPolicy::Modules(self.admin_modules.iter().cloned().collect())
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("LISTEN_ADDR") {
            self.server.listen_addr = v;
        }
        if let Ok(v) = env::var("ADMIN_LISTEN_ADDR") {
            self.server.admin_listen_addr = v;
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_TOKEN_EXPIRY_MINUTES") {
            self.security.token_expiry_minutes = v.parse().unwrap_or(self.security.token_expiry_minutes);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        if let Ok(v) = env::var("SECURITY_ADMIN_MODULES") {
            self.security.admin_modules = split_list(&v);
        }

        // Registry overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.registry.database_url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.registry.max_connections = v.parse().unwrap_or(self.registry.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.registry.connection_timeout = v.parse().unwrap_or(self.registry.connection_timeout);
        }
        if let Ok(v) = env::var("GATEWAY_STATIC_MODULES") {
            self.registry.static_modules = Some(v);
        }

        // Proxy overrides
        if let Ok(v) = env::var("PROXY_ROUTE_PREFIX") {
            self.proxy.route_prefix = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("PROXY_UPSTREAM_TIMEOUT_SECS") {
            self.proxy.upstream_timeout_secs = v.parse().unwrap_or(self.proxy.upstream_timeout_secs);
        }
        if let Ok(v) = env::var("PROXY_CONNECT_TIMEOUT_SECS") {
            self.proxy.connect_timeout_secs = v.parse().unwrap_or(self.proxy.connect_timeout_secs);
        }

        self
    }

    /// Startup checks. Any failure here aborts the process.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.security.token_expiry_minutes <= 0 {
            return Err(ConfigError::InvalidTokenExpiry(self.security.token_expiry_minutes));
        }
        if self.registry.database_url.is_none() && self.registry.static_modules.is_none() {
            return Err(ConfigError::MissingRegistry);
        }
        let prefix = &self.proxy.route_prefix;
        if !prefix.is_empty() && !prefix.starts_with('/') {
            return Err(ConfigError::InvalidRoutePrefix(prefix.clone()));
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                listen_addr: "0.0.0.0:8080".to_string(),
                admin_listen_addr: "127.0.0.1:8081".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                token_expiry_minutes: 180,
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
                admin_modules: Vec::new(),
            },
            registry: RegistryConfig {
                database_url: None,
                max_connections: 5,
                connection_timeout: 30,
                static_modules: None,
            },
            proxy: ProxyConfig {
                route_prefix: "/api".to_string(),
                upstream_timeout_secs: 60,
                connect_timeout_secs: 10,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                listen_addr: "0.0.0.0:8080".to_string(),
                admin_listen_addr: "0.0.0.0:8081".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                token_expiry_minutes: 180,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                admin_modules: Vec::new(),
            },
            registry: RegistryConfig {
                database_url: None,
                max_connections: 10,
                connection_timeout: 10,
                static_modules: None,
            },
            proxy: ProxyConfig {
                route_prefix: "/api".to_string(),
                upstream_timeout_secs: 30,
                connect_timeout_secs: 5,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                listen_addr: "0.0.0.0:8080".to_string(),
                admin_listen_addr: "0.0.0.0:8081".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                token_expiry_minutes: 60,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                admin_modules: Vec::new(),
            },
            registry: RegistryConfig {
                database_url: None,
                max_connections: 20,
                connection_timeout: 5,
                static_modules: None,
            },
            proxy: ProxyConfig {
                route_prefix: "/api".to_string(),
                upstream_timeout_secs: 30,
                connect_timeout_secs: 3,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
