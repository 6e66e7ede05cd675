//! Configuration management for gpio-recorder.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        AudioConfig, CONFIG_PATH_ENV, GpioConfig, MAX_TIMEOUT_SECS, MIN_DEBOUNCE_MS,
        RecordingConfig, TimeoutConfig,
    },
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Button and LED lines.
    #[serde(default)]
    pub gpio: GpioConfig,
    /// Audio device configuration.
    #[serde(default)]
    pub audio: AudioConfig,
    /// Inactivity budgets.
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Artifact output location.
    #[serde(default)]
    pub recording: RecordingConfig,
}

impl Config {
    /// Load configuration from the default location, creating it if missing.
    ///
    /// `GPIO_RECORDER_CONFIG` overrides the location.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_or_create(&config_path)
    }

    /// Load configuration from `path`, writing defaults there if missing.
    #[track_caller]
    #[instrument]
    pub fn load_or_create(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            info!(config_path = ?path, "No config found, creating default");
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        config.validate()?;

        info!(config_path = ?path, "Configuration loaded");

        Ok(config)
    }

    /// Reject settings the recorder cannot run with.
    #[track_caller]
    pub fn validate(&self) -> AppResult<()> {
        let reason = if self.gpio.debounce_ms < MIN_DEBOUNCE_MS {
            Some(format!(
                "debounce_ms must be at least {} (got {})",
                MIN_DEBOUNCE_MS, self.gpio.debounce_ms
            ))
        } else if self.gpio.button_pin == self.gpio.led_pin {
            Some(format!(
                "button_pin and led_pin must differ (both {})",
                self.gpio.button_pin
            ))
        } else if self.audio.buffer_frames == 0 {
            Some("buffer_frames must be greater than zero".to_string())
        } else if self.timeouts.startup_secs == 0 || self.timeouts.idle_secs == 0 {
            Some("timeouts must be greater than zero".to_string())
        } else if self.timeouts.startup_secs > MAX_TIMEOUT_SECS
            || self.timeouts.idle_secs > MAX_TIMEOUT_SECS
        {
            Some(format!(
                "timeouts must not exceed {} seconds (got startup {}, idle {})",
                MAX_TIMEOUT_SECS, self.timeouts.startup_secs, self.timeouts.idle_secs
            ))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(AppError::ConfigError {
                reason,
                location: ErrorLocation::from(Location::caller()),
            }),
            None => Ok(()),
        }
    }

    /// Save configuration to `path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
                debug!(config_dir = ?dir, "Created config directory");
            }
        }

        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        // Atomic write: write to temp file then rename
        let temp_path = path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            debug!(config_path = ?path, "Config path taken from environment");
            return Ok(path);
        }

        let proj_dirs = ProjectDirs::from("com", "gpio-recorder", "GPIO-Recorder").ok_or_else(
            || AppError::ConfigError {
                reason: "Failed to get config directory".to_string(),
                location: ErrorLocation::from(Location::caller()),
            },
        )?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}
