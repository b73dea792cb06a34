//! Module registry: maps an application name to where its backend lives.
//!
//! The gateway only ever reads the registry, and reads it on every proxied
//! request. There is no cache, so a route edited by an operator takes
//! effect on the next request. Writes belong to the operator tooling in
//! [`store`].

pub mod memory;
pub mod postgres;
pub mod store;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::StaticModuleRegistry;
pub use postgres::PgModuleRegistry;
pub use store::ModuleStore;

/// A routing registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Module {
    pub name: String,
    pub target_base_url: String,
    /// Strip `/{name}` from the forwarded path
    pub trim_name: bool,
    pub description: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("module '{0}' not found")]
    ModuleNotFound(String),

    #[error("module registry unavailable: {0}")]
    Unavailable(String),

    #[error("module '{0}' already exists")]
    Duplicate(String),

    #[error("invalid module entry: {0}")]
    InvalidEntry(String),
}

impl From<sqlx::Error> for RegistryError {
    fn from(err: sqlx::Error) -> Self {
        RegistryError::Unavailable(err.to_string())
    }
}

/// Read-only lookup used by the proxy dispatcher
#[async_trait]
pub trait ModuleRegistry: Send + Sync {
    /// Exact, case-sensitive lookup by module name
    async fn resolve(&self, name: &str) -> Result<Module, RegistryError>;
}
