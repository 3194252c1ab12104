//! Bridge configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    /// Upstream endpoint, e.g. `http://localhost:3000`
    pub base_url: String,
    pub timeout_secs: u64,
    /// Extra headers sent with every upstream request
    pub headers: BTreeMap<String, String>,
    pub log_level: String,
}

impl BridgeConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(Error::Validation("Base URL cannot be empty".to_string()));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(Error::Validation(format!(
                "Base URL '{}' must start with http:// or https://",
                url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(Error::Validation(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        for name in self.headers.keys() {
            if name.trim().is_empty() || name.chars().any(char::is_whitespace) {
                return Err(Error::Validation(format!("Invalid header name '{}'", name)));
            }
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(Error::Validation(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.log_level,
                valid_log_levels.join(", ")
            )));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            headers: BTreeMap::new(),
            log_level: "info".to_string(),
        }
    }
}

/// Loads [`BridgeConfig`] from a JSON file.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/rpcbridge/config.json`, if the platform has a config dir.
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join("rpcbridge").join("config.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing and empty files both yield the defaults.
    pub fn load(&self) -> Result<BridgeConfig> {
        if !self.path.exists() {
            return Ok(BridgeConfig::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BridgeConfig::default());
        }

        let config: BridgeConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}
