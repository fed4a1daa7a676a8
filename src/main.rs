//! Live accelerometer and gyroscope readout.
//!
//! Startup order:
//! 1. Parse the command line and load configuration (file, environment, flags).
//! 2. Install logging.
//! 3. Open the terminal window and the motion sensor, then run the event loop
//!    until a key press, quit request or termination signal.

use anyhow::Result;

mod app;
mod cli;
mod config;
mod dispatcher;
mod error;
mod event;
mod host;
mod logging;
mod reading;
mod renderer;
mod sensors;
mod service;
mod ui;

use cli::Cli;
use config::AppConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let mut config = AppConfig::load(&cli.config)?;
    config.apply_cli_overrides(&cli)?;

    if cli.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let target = logging::init(&config.logging)?;
    tracing::info!(
        config = %cli.config.display(),
        log = ?target,
        driver = ?config.sensor.driver,
        "starting sensor-readings"
    );

    if let Err(e) = service::serve(&config).await {
        tracing::error!(error = %e, "fatal error");
        return Err(e.into());
    }

    tracing::info!("exited cleanly");
    Ok(())
}
