//! Custom error types for the sensor-readings application.
//!
//! This module defines domain-specific error types using thiserror,
//! providing clear error messages and proper error context propagation.

use thiserror::Error;

/// Errors raised by the host collaborators (terminal, sensor bus, signals)
#[derive(Debug, Error)]
pub enum HostError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("I2C communication failed: {0}")]
    I2c(String),

    #[error("unsupported sensor driver: {0}")]
    UnsupportedDriver(String),

    #[error("signal handling failed: {0}")]
    Signal(String),
}

/// Errors related to application configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Fatal failures while bringing the application up. No partial mode exists.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("couldn't create window and renderer: {0}")]
    Window(#[source] HostError),

    #[error("could not initialize sensor API: {0}")]
    Sensors(#[source] HostError),

    #[error("invalid display configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Application-level errors that can wrap other error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Startup error: {0}")]
    Startup(#[from] StartupError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;
