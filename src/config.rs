//! Configuration management.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::post::is_valid_date_format;
use crate::services::theme::ThemeConfig;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

/// Backend API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the blog backend, without a trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://backend-blog-rmrt.onrender.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Date format used in post summaries
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Date and time format used on detail pages
    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,
    /// Characters of content shown in a summary before the ellipsis
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
    /// Quiet period after the last search keystroke before fetching
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            datetime_format: default_datetime_format(),
            excerpt_chars: default_excerpt_chars(),
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

fn default_datetime_format() -> String {
    "%d/%m/%Y %H:%M".to_string()
}

fn default_excerpt_chars() -> usize {
    100
}

fn default_search_debounce_ms() -> u64 {
    300
}

/// Local storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file holding the `user` and `token` entries
    /// (default: <data dir>/blogdev/local_storage.db)
    #[serde(default)]
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from default location.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if config_path.exists() {
            Self::from_file(&config_path.to_string_lossy())
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: &str) -> Result<Self> {
        let expanded = expand_path(path);
        let content = std::fs::read_to_string(&expanded)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail later, mid-draw.
    pub fn validate(&self) -> Result<()> {
        for (key, format) in [
            ("display.date_format", &self.display.date_format),
            ("display.datetime_format", &self.display.datetime_format),
        ] {
            if !is_valid_date_format(format) {
                bail!("Invalid {} {:?}: unknown strftime specifier", key, format);
            }
        }
        Ok(())
    }

    /// Get the default config path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("blogdev")
            .join("config.toml")
    }

    /// Get the data directory for local storage and logs.
    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("blogdev")
    }

    /// Resolve the local storage database path.
    pub fn storage_path(&self) -> PathBuf {
        match &self.storage.path {
            Some(path) => PathBuf::from(expand_path(path)),
            None => Self::data_dir().join("local_storage.db"),
        }
    }

    /// Base URL with any trailing slash removed.
    pub fn api_base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }
}

/// Expand ~ to home directory.
fn expand_path(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path.to_string()
}
