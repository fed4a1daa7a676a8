//! Synthetic IMU for machines without motion hardware.

use std::time::Instant;

use super::{MotionSample, SensorDevice};
use crate::error::HostError;

/// Standard gravity in m/s².
pub const STANDARD_GRAVITY: f32 = 9.80665;

/// Slow wobble around "lying flat": gravity on Z with small periodic tilt
/// and rotation.
pub struct SimulatedImu {
    started: Instant,
}

impl SimulatedImu {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Sample at `t` seconds after start.
    pub fn sample_at(t: f32) -> MotionSample {
        MotionSample {
            accel: [
                0.8 * (t * 0.7).sin(),
                0.6 * (t * 0.5).cos(),
                STANDARD_GRAVITY + 0.2 * (t * 1.3).sin(),
            ],
            gyro: [
                0.5 * (t * 0.7).cos(),
                -0.3 * (t * 0.5).sin(),
                0.1 * (t * 0.2).sin(),
            ],
        }
    }
}

impl Default for SimulatedImu {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorDevice for SimulatedImu {
    fn init(&mut self) -> Result<(), HostError> {
        self.started = Instant::now();
        Ok(())
    }

    fn read(&mut self) -> Result<MotionSample, HostError> {
        Ok(Self::sample_at(self.started.elapsed().as_secs_f32()))
    }

    fn info(&self) -> String {
        "Simulated IMU".to_string()
    }
}
