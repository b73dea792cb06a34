use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::{debug, info};

use super::{Module, ModuleRegistry, RegistryError};
use crate::config::RegistryConfig;

/// Registry backed by the `modules` table
#[derive(Clone)]
pub struct PgModuleRegistry {
    pool: PgPool,
}

impl PgModuleRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and ping. An unreachable store at startup is fatal to the caller.
    pub async fn connect(database_url: &str, config: &RegistryConfig) -> Result<Self, RegistryError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(database_url)
            .await?;

        let registry = Self::new(pool);
        registry.health_check().await?;
        info!("Connected to module registry");
        Ok(registry)
    }

    pub async fn health_check(&self) -> Result<(), RegistryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed module registry pool");
    }
}

#[async_trait]
impl ModuleRegistry for PgModuleRegistry {
    async fn resolve(&self, name: &str) -> Result<Module, RegistryError> {
        debug!(module = %name, "Fetching module details");

        let query = r#"
            SELECT name, target_base_url, trim_name, description
            FROM modules
            WHERE name = $1
            LIMIT 1
        "#;

        sqlx::query_as::<_, Module>(query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RegistryError::ModuleNotFound(name.to_string()))
    }
}
