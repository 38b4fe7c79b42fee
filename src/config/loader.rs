//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from a YAML file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{EngineError, EngineResult};

use super::types::{CollectionIds, EngineConfig};

/// Name of the configuration file inside the configuration directory.
pub const CONFIG_FILE: &str = "engine.yaml";

/// Loads and provides access to the engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/
/// └── engine.yaml   # Collection ids, subsidy, cash-out defaults, cache, server
/// ```
///
/// # Example
///
/// ```no_run
/// use entitlement_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// println!("Meal subsidy per day: {}", loader.config().lunch.per_diem);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `engine.yaml` is missing
    /// - `engine.yaml` contains invalid YAML or mistyped values
    ///
    /// # Example
    ///
    /// ```no_run
    /// use entitlement_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config")?;
    /// # Ok::<(), entitlement_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let config = Self::load_yaml::<EngineConfig>(&path.as_ref().join(CONFIG_FILE))?;
        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        // An empty file deserializes to YAML null; treat it as "all defaults".
        let content = if content.trim().is_empty() { "{}" } else { &content };

        serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }

    /// Returns the configured collection ids.
    pub fn collections(&self) -> &CollectionIds {
        &self.config.collections
    }

    /// Returns the read cache entry lifetime.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config.cache.ttl_secs)
    }
}
