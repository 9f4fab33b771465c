//! Configuration management for casement
//!
//! This module handles loading, parsing, and validating configuration
//! from TOML files. Every field has a default, so an empty file (or no file
//! at all) yields a working setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration struct containing all casement settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CasementConfig {
    /// Event translation behaviour
    #[serde(default)]
    pub input: InputConfig,

    /// Damage flushing cadence
    #[serde(default)]
    pub damage: DamageConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Event translation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    /// Width (pixels) of the strip along the left, right and bottom edges of
    /// a toplevel where button presses start a native resize (0 = disabled)
    #[serde(default = "InputConfig::default_resize_border")]
    pub resize_border: i32,

    /// Send a synthesized motion event after a window gains focus
    #[serde(default = "InputConfig::default_true")]
    pub synthesize_motion_on_focus: bool,

    /// Break all grabs when the application is deactivated
    #[serde(default = "InputConfig::default_true")]
    pub break_grabs_on_deactivate: bool,
}

/// Damage flush pacing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DamageConfig {
    /// Number of recent flush intervals averaged by the pacer
    #[serde(default = "DamageConfig::default_flush_window")]
    pub flush_window: usize,

    /// Minimum average interval between flushes (milliseconds)
    #[serde(default = "DamageConfig::default_min_flush_interval_ms")]
    pub min_flush_interval_ms: u64,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Default filter ("error", "warn", "info", "debug", "trace"),
    /// overridden by RUST_LOG
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Prefix log lines with a timestamp
    #[serde(default = "LoggingConfig::default_timestamps")]
    pub timestamps: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            resize_border: Self::default_resize_border(),
            synthesize_motion_on_focus: true,
            break_grabs_on_deactivate: true,
        }
    }
}

impl InputConfig {
    fn default_resize_border() -> i32 {
        5
    }
    fn default_true() -> bool {
        true
    }
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            flush_window: Self::default_flush_window(),
            min_flush_interval_ms: Self::default_min_flush_interval_ms(),
        }
    }
}

impl DamageConfig {
    fn default_flush_window() -> usize {
        4
    }
    fn default_min_flush_interval_ms() -> u64 {
        40
    }

    /// The flush floor as a `Duration`
    pub fn min_flush_interval(&self) -> Duration {
        Duration::from_millis(self.min_flush_interval_ms)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            timestamps: true,
        }
    }
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
    fn default_timestamps() -> bool {
        true
    }
}

const VALID_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

impl CasementConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Expand ~ to home directory
        let expanded_path = if path.to_string_lossy().starts_with('~') {
            let home = std::env::var("HOME").context("Failed to get HOME environment variable")?;
            let rest = path.strip_prefix("~").unwrap_or(path);
            Path::new(&home).join(rest)
        } else {
            path.to_path_buf()
        };

        let contents = fs::read_to_string(&expanded_path)
            .with_context(|| format!("Failed to read config file: {}", expanded_path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to load config file: {}", expanded_path.display()))
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: CasementConfig =
            toml::from_str(contents).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.input.resize_border < 0 || self.input.resize_border > 64 {
            anyhow::bail!(
                "Invalid resize_border: {} (must be between 0 and 64)",
                self.input.resize_border
            );
        }

        if self.damage.flush_window == 0 || self.damage.flush_window > 120 {
            anyhow::bail!(
                "Invalid flush_window: {} (must be between 1 and 120)",
                self.damage.flush_window
            );
        }

        if self.damage.min_flush_interval_ms > 1000 {
            anyhow::bail!(
                "Invalid min_flush_interval_ms: {} (must be at most 1000)",
                self.damage.min_flush_interval_ms
            );
        }

        let level = self.logging.level.to_ascii_lowercase();
        if !VALID_LEVELS.contains(&level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, contents).context("Failed to write configuration file")?;

        Ok(())
    }
}
