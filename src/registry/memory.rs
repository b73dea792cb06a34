use async_trait::async_trait;
use std::collections::HashMap;

use super::{Module, ModuleRegistry, RegistryError};

/// Fixed module table, built once and never mutated.
///
/// Selected with `GATEWAY_STATIC_MODULES` for local runs; also what the
/// integration tests route through.
#[derive(Debug, Clone, Default)]
pub struct StaticModuleRegistry {
    modules: HashMap<String, Module>,
}

impl StaticModuleRegistry {
    pub fn new(modules: impl IntoIterator<Item = Module>) -> Result<Self, RegistryError> {
        let mut table = HashMap::new();
        for module in modules {
            if table.contains_key(&module.name) {
                return Err(RegistryError::Duplicate(module.name));
            }
            table.insert(module.name.clone(), module);
        }
        Ok(Self { modules: table })
    }

    /// Parse `name=url[;trim]` entries separated by commas
    pub fn parse(spec: &str) -> Result<Self, RegistryError> {
        let mut modules = Vec::new();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, rest) = entry
                .split_once('=')
                .ok_or_else(|| RegistryError::InvalidEntry(entry.to_string()))?;
            let (target, flags) = match rest.split_once(';') {
                Some((target, flags)) => (target, flags),
                None => (rest, ""),
            };

            let name = name.trim();
            let target = target.trim();
            if name.is_empty() || name.contains('/') || target.is_empty() {
                return Err(RegistryError::InvalidEntry(entry.to_string()));
            }
            let trim_name = match flags.trim() {
                "" => false,
                "trim" => true,
                _ => return Err(RegistryError::InvalidEntry(entry.to_string())),
            };

            modules.push(Module {
                name: name.to_string(),
                target_base_url: target.to_string(),
                trim_name,
                description: String::new(),
            });
        }
        Self::new(modules)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[async_trait]
impl ModuleRegistry for StaticModuleRegistry {
    async fn resolve(&self, name: &str) -> Result<Module, RegistryError> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::ModuleNotFound(name.to_string()))
    }
}
