//! Configuration file support for rslabel.
//!
//! This module provides serialization and deserialization of application settings:
//! editing preferences, the keybinding table and the label class table.

use rslabel_raster::NormType;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BUCKET_TOLERANCE, DEFAULT_HISTORY_CAPACITY, DEFAULT_KMEANS_K, DEFAULT_PEN_SIZE,
    DEFAULT_WORKER_TIMEOUT_MS,
};
use crate::keybindings::{KeyBinding, KeyBindings};
use crate::model::{ClassTable, LabelClass, default_classes};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Get all log levels in order from least to most verbose.
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration that can be exported and imported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Keybinding table
    #[serde(default = "default_keybindings")]
    pub keybindings: Vec<KeyBinding>,

    /// Label classes
    #[serde(default = "default_classes")]
    pub classes: Vec<LabelClass>,
}

fn default_app_name() -> String {
    "rslabel".to_string()
}

fn default_keybindings() -> Vec<KeyBinding> {
    KeyBindings::default().bindings().to_vec()
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Brush edge length in pixels
    #[serde(default = "default_pen_size")]
    pub pen_size: u32,

    /// Bucket fill colour-distance tolerance
    #[serde(default = "default_bucket_tolerance")]
    pub bucket_tolerance: f64,

    /// Number of history checkpoints kept
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Seed for k-means initialization
    #[serde(default)]
    pub kmeans_seed: u64,

    /// Cluster count used when none is given
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Time after which an outstanding worker job is abandoned
    #[serde(default = "default_worker_timeout_ms")]
    pub worker_timeout_ms: u64,

    /// Normalization used for a freshly loaded scene
    #[serde(default)]
    pub default_normalization: NormType,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_pen_size() -> u32 {
    DEFAULT_PEN_SIZE
}

fn default_bucket_tolerance() -> f64 {
    DEFAULT_BUCKET_TOLERANCE
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_k() -> usize {
    DEFAULT_KMEANS_K
}

fn default_worker_timeout_ms() -> u64 {
    DEFAULT_WORKER_TIMEOUT_MS
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            pen_size: default_pen_size(),
            bucket_tolerance: default_bucket_tolerance(),
            history_capacity: default_history_capacity(),
            kmeans_seed: 0,
            default_k: default_k(),
            worker_timeout_ms: default_worker_timeout_ms(),
            default_normalization: NormType::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: UserPreferences::default(),
            keybindings: default_keybindings(),
            classes: default_classes(),
        }
    }

    /// Keybinding table with defaults filled in for unbound actions.
    pub fn key_bindings(&self) -> KeyBindings {
        KeyBindings::from_bindings(self.keybindings.clone())
    }

    /// Label class table.
    pub fn class_table(&self) -> ClassTable {
        ClassTable::new(self.classes.clone())
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "rslabel-config.json"
    }

    /// Get the default config file path for auto-load/save.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("rslabel").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("rslabel")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from a file.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: &std::path::Path) -> Option<Self> {
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {:?}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Try to load configuration from the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        Self::load_from_path(&Self::default_path()?)
    }

    /// Save configuration to a file, creating parent directories.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to_path(&path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
