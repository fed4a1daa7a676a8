use embedded_hal::i2c::I2c;

use crate::config::SensorConfig;
use crate::error::HostError;
use crate::sensors::simulated::STANDARD_GRAVITY;
use crate::sensors::{MotionSample, SensorDevice};

const SMPLRT_DIV: u8 = 0x19;
const GYRO_CONFIG: u8 = 0x1B;
const ACCEL_CONFIG: u8 = 0x1C;
const ACCEL_XOUT_H: u8 = 0x3B;
const PWR_MGMT_1: u8 = 0x6B;
const WHO_AM_I: u8 = 0x75;

const MPU6500_ID: u8 = 0x70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mpu6500Settings {
    /// Full scale in g: 2, 4, 8 or 16.
    pub accel_range: u16,
    /// Full scale in °/s: 250, 500, 1000 or 2000.
    pub gyro_range: u16,
    pub sample_rate: u16,
}

impl From<&SensorConfig> for Mpu6500Settings {
    fn from(config: &SensorConfig) -> Self {
        Self {
            accel_range: config.accel_range,
            gyro_range: config.gyro_range,
            sample_rate: config.sample_rate_hz,
        }
    }
}

impl Mpu6500Settings {
    fn accel_config(&self) -> u8 {
        match self.accel_range {
            2 => 0x00,
            4 => 0x08,
            8 => 0x10,
            _ => 0x18, // ±16g
        }
    }

    fn gyro_config(&self) -> u8 {
        match self.gyro_range {
            250 => 0x00,
            500 => 0x08,
            1000 => 0x10,
            _ => 0x18, // ±2000°/s
        }
    }

    /// LSB per g
    fn accel_scale(&self) -> f32 {
        match self.accel_range {
            2 => 16384.0,
            4 => 8192.0,
            8 => 4096.0,
            _ => 2048.0,
        }
    }

    /// LSB per °/s
    fn gyro_scale(&self) -> f32 {
        match self.gyro_range {
            250 => 131.0,
            500 => 65.5,
            1000 => 32.8,
            _ => 16.4,
        }
    }

    fn sample_rate_divider(&self) -> u8 {
        let rate = u32::from(self.sample_rate.clamp(4, 1000));
        (1000 / rate - 1) as u8
    }
}

/// InvenSense MPU-6500 on an I2C bus.
pub struct Mpu6500<I> {
    i2c: I,
    address: u8,
    settings: Mpu6500Settings,
}

impl<I: I2c> Mpu6500<I> {
    pub fn new(i2c: I, address: u8, settings: Mpu6500Settings) -> Self {
        Self {
            i2c,
            address,
            settings,
        }
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), HostError> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(|e| HostError::I2c(format!("write 0x{register:02X}: {e:?}")))
    }

    fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> Result<(), HostError> {
        self.i2c
            .write_read(self.address, &[register], buf)
            .map_err(|e| HostError::I2c(format!("read 0x{register:02X}: {e:?}")))
    }

    /// Accel XYZ then gyro XYZ, raw counts. Temperature is skipped.
    fn read_raw(&mut self) -> Result<[i16; 6], HostError> {
        let mut buf = [0u8; 14];
        self.read_registers(ACCEL_XOUT_H, &mut buf)?;
        let word = |i: usize| i16::from_be_bytes([buf[i], buf[i + 1]]);
        Ok([word(0), word(2), word(4), word(8), word(10), word(12)])
    }
}

impl<I: I2c> SensorDevice for Mpu6500<I> {
    fn init(&mut self) -> Result<(), HostError> {
        let mut id = [0u8; 1];
        self.read_registers(WHO_AM_I, &mut id)?;
        if id[0] != MPU6500_ID {
            tracing::warn!(who_am_i = id[0], "unexpected MPU-6500 identity, continuing");
        }

        // Wake up the device
        self.write_register(PWR_MGMT_1, 0x00)?;
        self.write_register(SMPLRT_DIV, self.settings.sample_rate_divider())?;
        self.write_register(ACCEL_CONFIG, self.settings.accel_config())?;
        self.write_register(GYRO_CONFIG, self.settings.gyro_config())?;
        Ok(())
    }

    fn read(&mut self) -> Result<MotionSample, HostError> {
        let raw = self.read_raw()?;
        let accel_scale = self.settings.accel_scale();
        let gyro_scale = self.settings.gyro_scale();

        let mut sample = MotionSample::default();
        for i in 0..3 {
            sample.accel[i] = f32::from(raw[i]) / accel_scale * STANDARD_GRAVITY;
            sample.gyro[i] = (f32::from(raw[i + 3]) / gyro_scale).to_radians();
        }
        Ok(sample)
    }

    fn info(&self) -> String {
        format!(
            "MPU6500 (addr: 0x{:02X}) ±{}g ±{}°/s",
            self.address, self.settings.accel_range, self.settings.gyro_range
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorType, Operation};
    use std::convert::Infallible;

    /// Register file behind a fake bus.
    struct FakeBus {
        registers: [u8; 128],
        pointer: usize,
    }

    impl FakeBus {
        fn new() -> Self {
            let mut registers = [0u8; 128];
            registers[WHO_AM_I as usize] = MPU6500_ID;
            registers[PWR_MGMT_1 as usize] = 0x40;
            Self {
                registers,
                pointer: 0,
            }
        }

        fn set_word(&mut self, register: u8, value: i16) {
            let [hi, lo] = value.to_be_bytes();
            self.registers[register as usize] = hi;
            self.registers[register as usize + 1] = lo;
        }
    }

    impl ErrorType for FakeBus {
        type Error = Infallible;
    }

    impl I2c for FakeBus {
        fn transaction(
            &mut self,
            _address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        if let Some((&register, values)) = bytes.split_first() {
                            self.pointer = register as usize;
                            for (offset, value) in values.iter().enumerate() {
                                self.registers[self.pointer + offset] = *value;
                            }
                        }
                    }
                    Operation::Read(buf) => {
                        let len = buf.len();
                        buf.copy_from_slice(&self.registers[self.pointer..self.pointer + len]);
                    }
                }
            }
            Ok(())
        }
    }

    fn settings() -> Mpu6500Settings {
        Mpu6500Settings {
            accel_range: 16,
            gyro_range: 2000,
            sample_rate: 100,
        }
    }

    #[test]
    fn test_init_configures_device() {
        let mut sensor = Mpu6500::new(FakeBus::new(), 0x68, settings());
        sensor.init().unwrap();

        let regs = &sensor.i2c.registers;
        assert_eq!(regs[PWR_MGMT_1 as usize], 0x00);
        assert_eq!(regs[SMPLRT_DIV as usize], 9);
        assert_eq!(regs[ACCEL_CONFIG as usize], 0x18);
        assert_eq!(regs[GYRO_CONFIG as usize], 0x18);
    }

    #[test]
    fn test_read_converts_units() {
        let mut bus = FakeBus::new();
        bus.set_word(ACCEL_XOUT_H, 2048); // 1 g
        bus.set_word(ACCEL_XOUT_H + 2, -1024); // -0.5 g
        bus.set_word(ACCEL_XOUT_H + 4, 0);
        bus.set_word(ACCEL_XOUT_H + 6, 12345); // temperature, ignored
        bus.set_word(ACCEL_XOUT_H + 8, 1640); // 100 °/s
        bus.set_word(ACCEL_XOUT_H + 10, 0);
        bus.set_word(ACCEL_XOUT_H + 12, -164); // -10 °/s

        let mut sensor = Mpu6500::new(bus, 0x68, settings());
        let sample = sensor.read().unwrap();

        assert!((sample.accel[0] - STANDARD_GRAVITY).abs() < 1e-4);
        assert!((sample.accel[1] + STANDARD_GRAVITY / 2.0).abs() < 1e-4);
        assert_eq!(sample.accel[2], 0.0);
        assert!((sample.gyro[0] - 100f32.to_radians()).abs() < 1e-4);
        assert_eq!(sample.gyro[1], 0.0);
        assert!((sample.gyro[2] + 10f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn test_range_encoding() {
        let narrow = Mpu6500Settings {
            accel_range: 2,
            gyro_range: 250,
            sample_rate: 1000,
        };
        assert_eq!(narrow.accel_config(), 0x00);
        assert_eq!(narrow.gyro_config(), 0x00);
        assert_eq!(narrow.accel_scale(), 16384.0);
        assert_eq!(narrow.sample_rate_divider(), 0);
    }

    #[test]
    fn test_info() {
        let sensor = Mpu6500::new(FakeBus::new(), 0x68, settings());
        assert_eq!(sensor.info(), "MPU6500 (addr: 0x68) ±16g ±2000°/s");
    }
}
