//! Application configuration management.
//!
//! This module handles loading, parsing, and validating the application configuration
//! from a TOML file and `SENSOR_READINGS__*` environment variables, with support for
//! runtime overrides from CLI arguments.

use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::Cli;
use crate::error::ConfigError;

/// Prefix of environment variable overrides, e.g. `SENSOR_READINGS__DISPLAY__WIDTH`.
pub const ENV_PREFIX: &str = "SENSOR_READINGS";

/// Top-level application configuration
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub display: DisplayConfig,
    pub sensor: SensorConfig,
    pub logging: LoggingConfig,
}

/// Window and frame settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    pub fullscreen: bool,
    /// Key that toggles fullscreen instead of quitting
    pub toggle_key: String,
    pub frame_interval_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorDriver {
    Simulated,
    Mpu6500,
}

/// Motion sensor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub driver: SensorDriver,
    /// I2C bus device node
    pub bus: String,
    pub address: u8,
    pub accel_range: u16,
    pub gyro_range: u16,
    pub sample_rate_hz: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub format: LogFormat,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: "Sensor readings".to_string(),
            width: 800,
            height: 600,
            fullscreen: false,
            toggle_key: "F10".to_string(),
            frame_interval_ms: 16,
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            driver: SensorDriver::Simulated,
            bus: "/dev/i2c-1".to_string(),
            address: 0x68,
            accel_range: 16,
            gyro_range: 2000,
            sample_rate_hz: 100,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            format: LogFormat::Pretty,
        }
    }
}

impl DisplayConfig {
    pub fn toggle_key(&self) -> Result<KeyCode, ConfigError> {
        parse_key(&self.toggle_key)
            .ok_or_else(|| ConfigError::invalid("display.toggle_key", format!("unknown key '{}'", self.toggle_key)))
    }
}

/// Parse a key name such as `F10`, `Esc`, `Space` or a single character.
pub fn parse_key(name: &str) -> Option<KeyCode> {
    let name = name.trim();
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }

    let lower = name.to_ascii_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        return (1..=24).contains(&n).then_some(KeyCode::F(n));
    }

    match lower.as_str() {
        "esc" | "escape" => Some(KeyCode::Esc),
        "enter" | "return" => Some(KeyCode::Enter),
        "tab" => Some(KeyCode::Tab),
        "space" => Some(KeyCode::Char(' ')),
        "backspace" => Some(KeyCode::Backspace),
        "insert" => Some(KeyCode::Insert),
        "delete" => Some(KeyCode::Delete),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        _ => None,
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file plus environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path.as_ref())
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display.width == 0 {
            return Err(ConfigError::invalid("display.width", "must be greater than 0"));
        }
        if self.display.height == 0 {
            return Err(ConfigError::invalid("display.height", "must be greater than 0"));
        }
        if self.display.frame_interval_ms == 0 {
            return Err(ConfigError::invalid("display.frame_interval_ms", "must be greater than 0"));
        }
        self.display.toggle_key()?;

        if ![2, 4, 8, 16].contains(&self.sensor.accel_range) {
            return Err(ConfigError::invalid("sensor.accel_range", "must be 2, 4, 8 or 16"));
        }
        if ![250, 500, 1000, 2000].contains(&self.sensor.gyro_range) {
            return Err(ConfigError::invalid("sensor.gyro_range", "must be 250, 500, 1000 or 2000"));
        }
        if !(4..=1000).contains(&self.sensor.sample_rate_hz) {
            return Err(ConfigError::invalid("sensor.sample_rate_hz", "must be between 4 and 1000"));
        }
        if self.sensor.address > 0x7F {
            return Err(ConfigError::invalid("sensor.address", "must be a 7-bit I2C address"));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid("logging.level", "cannot be empty"));
        }

        Ok(())
    }

    /// Apply CLI argument overrides to configuration
    pub fn apply_cli_overrides(&mut self, cli: &Cli) -> Result<(), ConfigError> {
        if let Some(level) = &cli.log_level {
            self.logging.level = level.clone();
        }

        if let Some(driver) = &cli.driver {
            self.sensor.driver = match driver.to_ascii_lowercase().as_str() {
                "simulated" => SensorDriver::Simulated,
                "mpu6500" => SensorDriver::Mpu6500,
                other => {
                    return Err(ConfigError::invalid("--driver", format!("unknown driver '{other}'")));
                }
            };
        }

        if cli.fullscreen {
            self.display.fullscreen = true;
        }

        if let Some(interval) = cli.frame_interval {
            self.display.frame_interval_ms = interval;
        }

        self.validate()
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
