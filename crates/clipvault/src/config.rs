//! Configuration management for clipvault.
//!
//! Configuration is loaded with figment from defaults, an optional TOML file,
//! and `CLIPVAULT_`-prefixed environment variables.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::capture::{CaptureConfig, DEFAULT_MAX_ITEMS};
use crate::error::{Error, Result};
use crate::privacy::PrivacyFilter;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "clipvault";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "history.db";

/// Application configuration.
///
/// Loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `CLIPVAULT_`, sections separated
///    by a double underscore, e.g. `CLIPVAULT_STORAGE__MAX_ITEMS`)
/// 2. TOML config file at `~/.config/clipvault/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Clipboard watching configuration.
    pub watch: WatchConfig,
    /// Privacy configuration.
    pub privacy: PrivacyConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/clipvault/history.db`
    pub database_path: Option<PathBuf>,
    /// Maximum number of items to retain. Pinned items may push the live
    /// count above this.
    pub max_items: usize,
}

/// Clipboard watching configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Enable the system clipboard watcher. When disabled, `watch` reports
    /// an unsupported error instead of silently doing nothing.
    pub enabled: bool,
    /// Interval between clipboard polls in milliseconds.
    pub poll_interval_ms: u64,
    /// Skip a capture whose fingerprint equals the previous accepted one.
    pub dedupe_consecutive: bool,
}

/// Privacy-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    /// Patterns for content that must never be stored.
    pub ignore_patterns: Vec<String>,
    /// Treat patterns as regexes instead of case-insensitive substrings.
    pub use_regex: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // resolved at runtime
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: 350,
            dedupe_consecutive: true,
        }
    }
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: default_ignore_patterns(),
            use_regex: false,
        }
    }
}

/// Default substring patterns for sensitive content.
fn default_ignore_patterns() -> Vec<String> {
    vec![
        "password=".to_string(),
        "token=".to_string(),
        "apikey=".to_string(),
        "secret=".to_string(),
        "authorization: bearer".to_string(),
    ]
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing, or validation
    /// fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing, or validation
    /// fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("CLIPVAULT_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid, including
    /// any non-compiling regex pattern in regex mode.
    pub fn validate(&self) -> Result<()> {
        if self.storage.max_items == 0 {
            return Err(Error::ConfigValidation {
                message: "storage.max_items must be greater than 0".to_string(),
            });
        }

        if self.watch.poll_interval_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "watch.poll_interval_ms must be greater than 0".to_string(),
            });
        }

        if self.privacy.use_regex {
            for pattern in &self.privacy.ignore_patterns {
                if pattern.trim().is_empty() {
                    continue;
                }
                if regex::Regex::new(pattern).is_err() {
                    return Err(Error::ConfigValidation {
                        message: format!("invalid regex ignore pattern: {pattern}"),
                    });
                }
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the clipboard poll interval as a Duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.watch.poll_interval_ms)
    }

    /// Build the capture pipeline configuration.
    #[must_use]
    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            max_items: self.storage.max_items,
            dedupe_consecutive: self.watch.dedupe_consecutive,
        }
    }

    /// Build the privacy filter, or `None` when no patterns are configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if a non-blank regex pattern fails
    /// to compile.
    pub fn privacy_filter(&self) -> Result<Option<PrivacyFilter>> {
        if self.privacy.ignore_patterns.is_empty() {
            return Ok(None);
        }
        let filter = PrivacyFilter::new(
            self.privacy.ignore_patterns.clone(),
            self.privacy.use_regex,
        )?;
        Ok(Some(filter))
    }
}
