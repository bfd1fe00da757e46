//! Lumen shell configuration
//!
//! Centralized settings for the shell driver, loaded from `lumen.toml` with
//! environment variable overrides for temporary tweaks on a dev box or in a
//! device test harness.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main configuration structure for the Lumen shell
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    /// Display output settings
    pub display: DisplayConfig,
    /// Frame loop settings
    pub timing: TimingConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Display output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
}

/// Frame loop configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// Target update rate in frames per second
    pub frame_rate: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Tracing filter directive (e.g. "info" or "lumen_scene=debug")
    pub filter: Option<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { frame_rate: 30 }
    }
}

/// Failure while loading configuration from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ShellConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from the default location (lumen.toml in the
    /// current directory) or return default configuration if the file
    /// doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("lumen.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Ok(val) = std::env::var("LUMEN_DISPLAY_WIDTH") {
            if let Ok(width) = val.parse::<u32>() {
                self.display.width = width;
            }
        }
        if let Ok(val) = std::env::var("LUMEN_DISPLAY_HEIGHT") {
            if let Ok(height) = val.parse::<u32>() {
                self.display.height = height;
            }
        }
        if let Ok(val) = std::env::var("LUMEN_FRAME_RATE") {
            if let Ok(rate) = val.parse::<u32>() {
                if rate > 0 {
                    self.timing.frame_rate = rate;
                }
            }
        }
        if let Ok(filter) = std::env::var("LUMEN_LOG") {
            self.logging.filter = Some(filter);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from lumen.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
