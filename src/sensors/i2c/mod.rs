use crate::config::SensorConfig;
use crate::error::HostError;

use super::SensorDevice;

pub mod mpu6500;

/// Open the configured I2C bus and wrap it in an MPU-6500 driver.
#[cfg(target_os = "linux")]
pub fn open_mpu6500(config: &SensorConfig) -> Result<Box<dyn SensorDevice + Send>, HostError> {
    let i2c = linux_embedded_hal::I2cdev::new(&config.bus)
        .map_err(|e| HostError::I2c(format!("failed to open {}: {}", config.bus, e)))?;
    let settings = mpu6500::Mpu6500Settings::from(config);
    Ok(Box::new(mpu6500::Mpu6500::new(i2c, config.address, settings)))
}

#[cfg(not(target_os = "linux"))]
pub fn open_mpu6500(_config: &SensorConfig) -> Result<Box<dyn SensorDevice + Send>, HostError> {
    Err(HostError::UnsupportedDriver(
        "mpu6500 needs the Linux i2c-dev interface".to_string(),
    ))
}
