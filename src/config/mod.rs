//! Configuration management for flashnews.
//!
//! Configuration is read from `~/.config/flashnews/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod interval;

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetcher::{DEFAULT_COUNTRY, DEFAULT_PAGE_SIZE};
use crate::repository::{FreshnessPolicy, RepositoryOptions, DEFAULT_FRESHNESS_WINDOW};

/// Environment variable that overrides `api.api_key`.
pub const API_KEY_ENV: &str = "NEWS_API_KEY";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
}

/// Remote headline API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Country used when none is given on the command line
    pub country: String,
    pub category: Option<String>,
    pub page_size: u32,
    /// Request timeout in seconds; 0 leaves it to the transport default
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org".to_string(),
            api_key: None,
            country: DEFAULT_COUNTRY.to_string(),
            category: None,
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: 30,
            user_agent: concat!("flashnews/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    /// The API key from the environment, falling back to the config file.
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long cached headlines are served before a refresh
    #[serde(deserialize_with = "interval::deserialize_duration")]
    pub freshness_window: Duration,
    pub single_flight: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness_window: DEFAULT_FRESHNESS_WINDOW,
            single_flight: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/flashnews/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("flashnews").join("config.toml"))
    }

    pub fn repository_options(&self) -> RepositoryOptions {
        RepositoryOptions {
            freshness: FreshnessPolicy::new(self.cache.freshness_window),
            category: self.api.category.clone(),
            page_size: self.api.page_size,
            single_flight: self.cache.single_flight,
        }
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# flashnews configuration
#
# Intervals accept s, m, h and d suffixes: "90s", "30m", "1h", "1d".

[api]
base_url = "https://newsapi.org"

# API key for the headline service. NEWS_API_KEY in the environment wins.
# api_key = "your-key"

# Default country code for headlines
country = "us"

# Optional category: business, entertainment, general, health, science,
# sports, technology
# category = "technology"

page_size = 20

# Request timeout in seconds (0 = transport default)
timeout_secs = 30

[cache]
# Cached headlines older than this are refreshed on the next request
freshness_window = "1h"

# Join concurrent refreshes of the same country/category
single_flight = true

[storage]
# Defaults to <data dir>/flashnews/flashnews.db
# db_path = "/path/to/flashnews.db"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
