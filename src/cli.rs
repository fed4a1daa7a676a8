//! Command-line interface argument parsing.
//!
//! This module defines the CLI structure using gumdrop. Every flag overrides
//! the matching configuration file value.

use gumdrop::Options;
use std::path::PathBuf;

/// Sensor-readings: live accelerometer and gyroscope overlay
#[derive(Debug, Options)]
pub struct Cli {
    #[options(help = "print help message")]
    pub help: bool,

    #[options(help = "path to configuration file", meta = "PATH", default = "sensor-readings.toml")]
    pub config: PathBuf,

    #[options(help = "log level or filter directive (trace, debug, info, warn, error)", meta = "LEVEL")]
    pub log_level: Option<String>,

    #[options(help = "sensor driver (simulated, mpu6500)", meta = "NAME")]
    pub driver: Option<String>,

    #[options(help = "start in fullscreen mode")]
    pub fullscreen: bool,

    #[options(no_short, help = "frame interval in milliseconds", meta = "MS")]
    pub frame_interval: Option<u64>,

    #[options(no_short, help = "print the effective configuration as TOML and exit")]
    pub dump_config: bool,
}

impl Cli {
    /// Parse process arguments, exiting with usage on error or `--help`
    pub fn parse_args() -> Self {
        Self::parse_args_default_or_exit()
    }

    /// Parse an explicit argument list (without the program name)
    pub fn try_parse_from<S: AsRef<str>>(args: &[S]) -> Result<Self, gumdrop::Error> {
        Self::parse_args_default(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let cli = Cli::try_parse_from::<&str>(&[]).unwrap();
        assert_eq!(cli.config, PathBuf::from("sensor-readings.toml"));
        assert_eq!(cli.log_level, None);
        assert_eq!(cli.driver, None);
        assert!(!cli.fullscreen);
        assert!(!cli.dump_config);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from(&[
            "-c",
            "/etc/readings.toml",
            "--log-level",
            "debug",
            "--driver",
            "mpu6500",
            "-f",
            "--frame-interval",
            "20",
            "--dump-config",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/readings.toml"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.driver.as_deref(), Some("mpu6500"));
        assert!(cli.fullscreen);
        assert_eq!(cli.frame_interval, Some(20));
        assert!(cli.dump_config);
    }

    #[test]
    fn test_rejects_unknown_flag() {
        assert!(Cli::try_parse_from(&["--broker", "x"]).is_err());
    }
}
