//! Tracing subscriber setup.
//!
//! The terminal belongs to the overlay while the application runs, so logs go
//! to a file when one is configured and to stderr only when stderr is not a
//! terminal (redirected or piped).

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::{LogFormat, LoggingConfig};

/// Where log output ends up for a given configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(String),
    Stderr,
    Disabled,
}

pub fn target_for(config: &LoggingConfig, stderr_is_tty: bool) -> LogTarget {
    match &config.file {
        Some(path) => LogTarget::File(path.clone()),
        None if stderr_is_tty => LogTarget::Disabled,
        None => LogTarget::Stderr,
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init(config: &LoggingConfig) -> Result<LogTarget> {
    let target = target_for(config, atty::is(atty::Stream::Stderr));

    let writer = match &target {
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {path}"))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogTarget::Disabled => return Ok(target),
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("invalid log level '{}'", config.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true)
        .with_ansi(false);

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.compact().try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(target)
}
