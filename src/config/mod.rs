//! Configuration module for anchor-replay
//!
//! # Locations
//!
//! The configuration file is `config.toml` in the platform config directory
//! under `dev.anchor-replay`:
//! - **Linux**: `~/.config/dev.anchor-replay/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.anchor-replay/config.toml`
//! - **Windows**: `%APPDATA%\dev.anchor-replay\config.toml`
//!
//! Recordings default to the platform cache directory
//! (`~/.cache/dev.anchor-replay/recordings` on Linux).
//!
//! # Example
//!
//! ```ignore
//! use anchor_replay::config::AppConfig;
//!
//! let config = AppConfig::load_or_default();
//! let dir = config.storage.resolved_recordings_dir()?;
//! ```

use crate::error::{AnchorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.anchor-replay";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the recordings directory
pub const RECORDINGS_DIR_ENV: &str = "ANCHOR_REPLAY_DIR";

/// Default recording file prefix
pub const DEFAULT_FILE_PREFIX: &str = "AnchorTransforms";

/// Default recording file extension
pub const DEFAULT_FILE_EXTENSION: &str = "json";

/// Default log filter
pub const DEFAULT_LOG_FILTER: &str = "info,anchor_replay=debug";

// ==================== Directories ====================

/// Get the application config directory path
pub fn app_config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the config file
pub fn config_path() -> Option<PathBuf> {
    app_config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Default folder for recordings
pub fn default_recordings_dir() -> Option<PathBuf> {
    dirs_next::cache_dir().map(|p| p.join(APP_ID).join("recordings"))
}

// ==================== App Config ====================

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// Where and how recordings are written
    #[serde(default)]
    pub storage: StorageConfig,

    /// Recorder behaviour
    #[serde(default)]
    pub recorder: RecorderConfig,

    /// Logging setup for the binary
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file; a missing file yields defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AnchorError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        toml::from_str(&content).map_err(|e| {
            AnchorError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })
    }

    /// Load from the default location, returning defaults on any error
    pub fn load_or_default() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save configuration as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AnchorError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AnchorError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| AnchorError::Config(format!("Failed to write config file {:?}: {}", path, e)))
    }
}

// ==================== Storage Config ====================

/// Recording file settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Folder holding recordings; the platform cache dir when unset
    #[serde(default)]
    pub recordings_dir: Option<PathBuf>,

    /// Filename prefix before the start timestamp
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Extension of recording files; the catalog only reads these
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Write indented JSON
    #[serde(default)]
    pub pretty: bool,
}

fn default_file_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

fn default_file_extension() -> String {
    DEFAULT_FILE_EXTENSION.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            recordings_dir: None,
            file_prefix: default_file_prefix(),
            file_extension: default_file_extension(),
            pretty: false,
        }
    }
}

impl StorageConfig {
    /// Recordings folder: `ANCHOR_REPLAY_DIR`, then the configured dir, then the cache dir
    pub fn resolved_recordings_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(RECORDINGS_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = &self.recordings_dir {
            return Ok(dir.clone());
        }
        default_recordings_dir().ok_or_else(|| {
            AnchorError::Config("Could not determine recordings directory".to_string())
        })
    }
}

// ==================== Recorder Config ====================

/// Recorder settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecorderConfig {
    /// Maximum number of frames per session (0 = unlimited)
    #[serde(default)]
    pub max_frames: usize,

    /// Capacity of the provider subscription channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    crate::provider::DEFAULT_SUBSCRIBER_CAPACITY
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            max_frames: 0,
            channel_capacity: default_channel_capacity(),
        }
    }
}

// ==================== Logging Config ====================

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Also write daily-rotated log files into this folder
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            directory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.storage.file_prefix, "AnchorTransforms");
        assert_eq!(config.storage.file_extension, "json");
        assert_eq!(config.recorder.max_frames, 0);
        assert_eq!(config.recorder.channel_capacity, 256);
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [storage]
            recordings_dir = "/tmp/anchors"

            [recorder]
            max_frames = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.recordings_dir, Some(PathBuf::from("/tmp/anchors")));
        assert_eq!(config.storage.file_extension, "json");
        assert_eq!(config.recorder.max_frames, 5000);
        assert_eq!(config.recorder.channel_capacity, 256);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = AppConfig::default();
        config.storage.pretty = true;
        config.logging.directory = Some(dir.path().join("logs"));
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[recorder]\nmax_frames = \"many\"").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(AnchorError::Config(_))));
    }
}
