use sqlx::PgPool;
use tracing::info;

use super::{Module, RegistryError};

/// Schema for the `modules` table
pub const SCHEMA_SQL: &str = include_str!("../../sql/modules.sql");

/// Write access to the registry for operator tooling.
///
/// The gateway process never constructs one of these.
#[derive(Clone)]
pub struct ModuleStore {
    pool: PgPool,
}

impl ModuleStore {
    pub async fn connect(database_url: &str) -> Result<Self, RegistryError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> Result<(), RegistryError> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        info!("Module registry schema applied");
        Ok(())
    }

    /// Insert a new module. Names are unique.
    pub async fn add(&self, module: &Module) -> Result<(), RegistryError> {
        validate(module)?;

        let query = r#"
            INSERT INTO modules (name, target_base_url, trim_name, description)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(&module.name)
            .bind(&module.target_base_url)
            .bind(module.trim_name)
            .bind(&module.description)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RegistryError::Duplicate(module.name.clone()));
        }
        info!(module = %module.name, target = %module.target_base_url, "Registered module");
        Ok(())
    }

    pub async fn get(&self, name: &str) -> Result<Module, RegistryError> {
        sqlx::query_as::<_, Module>(
            "SELECT name, target_base_url, trim_name, description FROM modules WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RegistryError::ModuleNotFound(name.to_string()))
    }

    pub async fn list(&self) -> Result<Vec<Module>, RegistryError> {
        let modules = sqlx::query_as::<_, Module>(
            "SELECT name, target_base_url, trim_name, description FROM modules ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(modules)
    }

    pub async fn remove(&self, name: &str) -> Result<(), RegistryError> {
        let result = sqlx::query("DELETE FROM modules WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RegistryError::ModuleNotFound(name.to_string()));
        }
        info!(module = %name, "Removed module");
        Ok(())
    }
}

/// Entry checks applied before anything is written
pub fn validate(module: &Module) -> Result<(), RegistryError> {
    if module.name.is_empty() || module.name.contains('/') {
        return Err(RegistryError::InvalidEntry(format!("bad module name '{}'", module.name)));
    }
    let target = url::Url::parse(&module.target_base_url)
        .map_err(|e| RegistryError::InvalidEntry(format!("bad target '{}': {}", module.target_base_url, e)))?;
    if !matches!(target.scheme(), "http" | "https") || target.host_str().is_none() {
        return Err(RegistryError::InvalidEntry(format!(
            "target must be an http(s) URL with a host: {}",
            module.target_base_url
        )));
    }
    Ok(())
}
