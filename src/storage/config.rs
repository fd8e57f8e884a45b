//! Application configuration.
//!
//! Loaded from TOML in the platform config directory. Only preferences live
//! here; the workout plan itself is never written to disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audio::AudioConfig;
use crate::workouts::driver::{DriverSettings, TickMode, DEFAULT_TICK_INTERVAL};
use crate::workouts::engine::EngineSettings;
use crate::workouts::types::{SetConfig, SetLimits};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Tick cadence and cue behaviour
    pub timer: TimerSettings,
    /// Template for new sets and for reset
    pub default_set: SetConfig,
    /// Bounds applied to set edits
    pub limits: SetLimits,
    /// Cue audio
    pub audio: AudioConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timer: TimerSettings::default(),
            default_set: SetConfig::default(),
            limits: SetLimits::default(),
            audio: AudioConfig::default(),
        }
    }
}

/// Timer-related settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerSettings {
    /// Driver cadence in milliseconds
    pub tick_interval_ms: u64,
    /// Fixed or measured tick deltas
    pub tick_mode: TickMode,
    #[serde(flatten)]
    pub engine: EngineSettings,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            tick_mode: TickMode::Fixed,
            engine: EngineSettings::default(),
        }
    }
}

impl TimerSettings {
    pub fn driver_settings(&self) -> DriverSettings {
        DriverSettings {
            tick_interval: Duration::from_millis(self.tick_interval_ms.max(1)),
            mode: self.tick_mode,
        }
    }
}

/// Get the application config directory.
pub fn get_config_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "rustinterval", "RustInterval")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.toml")
}

/// Load configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_config_path())
}

/// Load configuration from `path`; a missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config
        .default_set
        .validate()
        .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Save configuration to `path`.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
