//! Catalog configuration loading

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::catalog::{ModelRecord, ModelRegistry};
use crate::error::{Error, Result};

/// Environment variable naming an extra catalog file to merge at startup
pub const MODELS_CONFIG_ENV: &str = "KVCALC_MODELS_CONFIG";

const BUILTIN_CATALOG: &str = include_str!("../config/models.yaml");

/// Parsed catalog file: an ordered list of model records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub models: Vec<ModelRecord>,
}

impl CatalogConfig {
    /// Parse a catalog from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a catalog file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&contents)?;
        info!(
            "Loaded {} model(s) from {}",
            config.models.len(),
            path.display()
        );
        Ok(config)
    }

    /// The catalog shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// Validate the records into a fresh registry
    pub fn into_registry(self) -> Result<ModelRegistry> {
        ModelRegistry::build(self.models)
    }
}

/// Catalog file named by `KVCALC_MODELS_CONFIG`, if set to a non-empty value.
pub fn default_config_path() -> Option<PathBuf> {
    let from_env = std::env::var(MODELS_CONFIG_ENV).ok()?;
    let trimmed = from_env.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

/// Build a registry from the built-in catalog, then merge each extra file in order.
pub fn load_registry<P: AsRef<Path>>(extra: &[P]) -> Result<ModelRegistry> {
    let mut registry = CatalogConfig::builtin()?.into_registry()?;
    for path in extra {
        registry.merge(CatalogConfig::from_path(path)?.models)?;
    }
    Ok(registry)
}
