//! Layered configuration: defaults, then `config.toml`, then environment.

use crate::series::{TimeRange, DEFAULT_FEED_URL};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime configuration for the price feed and local storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the historical price feed
    pub feed_url: String,
    /// API key sent with every feed request
    pub api_key: String,
    /// Symbol charted when none is given
    pub default_symbol: String,
    pub default_range: TimeRange,
    /// Custom metrics file; falls back to `MetricStore::default_path`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            api_key: String::new(),
            default_symbol: "AAPL".to_string(),
            default_range: TimeRange::default(),
            metrics_file: None,
        }
    }
}

impl Config {
    /// Load from the default location with environment overrides applied.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_path(&Self::default_path())?;
        config.apply_env();
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// `PRYSM_CONFIG` overrides the platform config directory.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("PRYSM_CONFIG") {
            return PathBuf::from(path);
        }

        directories::ProjectDirs::from("", "", "prysm")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("prysm.toml"))
    }

    /// Parse a TOML file, or return defaults if it does not exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay `PRYSM_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| env::var(key).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("PRYSM_API_KEY").or_else(|| non_empty("FMP_API_KEY")) {
            self.api_key = key;
        }
        if let Some(symbol) = non_empty("PRYSM_DEFAULT_SYMBOL") {
            self.default_symbol = symbol.to_uppercase();
        }
        if let Some(url) = non_empty("PRYSM_FEED_URL") {
            self.feed_url = url;
        }
        if let Some(path) = non_empty("PRYSM_METRICS_FILE") {
            self.metrics_file = Some(PathBuf::from(path));
        }
    }
}
