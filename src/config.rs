//! Bridge configuration
//!
//! Sources, later ones win:
//! 1. Built-in defaults
//! 2. JSON config file (`--config`, or `~/.config/spinnaker-datadog-bridge/config.json` if present)
//! 3. Environment: `DATADOG_API_KEY`, `DATADOG_APP_KEY`, `DATADOG_HOST`, `DOGSTATSD_ADDR`

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_DATADOG_HOST: &str = "https://api.datadoghq.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DOGSTATSD_ADDR: &str = "127.0.0.1:8125";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Datadog HTTP API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatadogConfig {
    pub api_key: String,
    /// Only needed by accounts that enforce application keys on event intake
    pub app_key: Option<String>,
    pub host: String,
    pub timeout_secs: u64,
}

impl Default for DatadogConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            app_key: None,
            host: DEFAULT_DATADOG_HOST.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// DogStatsD agent settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsdConfig {
    pub addr: String,
}

impl Default for StatsdConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_DOGSTATSD_ADDR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub datadog: DatadogConfig,
    pub statsd: StatsdConfig,
}

impl BridgeConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/spinnaker-datadog-bridge/config.json"))
    }

    /// Load from an explicit file (must exist) or the default location (optional),
    /// then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Apply overrides from a key lookup; empty values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("DATADOG_API_KEY") {
            self.datadog.api_key = key;
        }
        if let Some(key) = get("DATADOG_APP_KEY") {
            self.datadog.app_key = Some(key);
        }
        if let Some(host) = get("DATADOG_HOST") {
            self.datadog.host = host;
        }
        if let Some(addr) = get("DOGSTATSD_ADDR") {
            self.statsd.addr = addr;
        }
    }
}
