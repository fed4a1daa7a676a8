//! Sensor subsystem: device drivers, the id registry and the sample pump.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Interval, MissedTickBehavior};

use crate::config::{SensorConfig, SensorDriver};
use crate::error::HostError;
use crate::event::{EventSource, HostEvent};
use crate::reading::SensorClass;

pub mod i2c;
pub mod simulated;

/// Host-assigned identifier carried by every sensor event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorId(pub u32);

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Physical type reported by the sensor subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
    Other,
}

impl SensorKind {
    /// Reading class this kind feeds, if any.
    pub fn class(self) -> Option<SensorClass> {
        match self {
            SensorKind::Accelerometer => Some(SensorClass::Accelerometer),
            SensorKind::Gyroscope => Some(SensorClass::Gyroscope),
            SensorKind::Other => None,
        }
    }
}

/// A resolved sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorHandle {
    id: SensorId,
    kind: SensorKind,
    name: String,
}

impl SensorHandle {
    pub fn id(&self) -> SensorId {
        self.id
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Maps sensor ids to handles. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct SensorRegistry {
    sensors: HashMap<SensorId, SensorHandle>,
    next_id: u32,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: SensorKind, name: impl Into<String>) -> SensorId {
        self.next_id += 1;
        let id = SensorId(self.next_id);
        let handle = SensorHandle {
            id,
            kind,
            name: name.into(),
        };
        tracing::info!(sensor = %id, kind = ?kind, name = %handle.name, "sensor registered");
        self.sensors.insert(id, handle);
        id
    }

    pub fn resolve(&self, id: SensorId) -> Option<&SensorHandle> {
        self.sensors.get(&id)
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

/// One combined reading from an IMU, in m/s² and rad/s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionSample {
    pub accel: [f32; 3],
    pub gyro: [f32; 3],
}

/// A 6-axis motion device.
pub trait SensorDevice {
    fn init(&mut self) -> Result<(), HostError>;
    fn read(&mut self) -> Result<MotionSample, HostError>;
    fn info(&self) -> String;
}

/// Polls a device at its sample rate and emits one event per logical sensor.
pub struct SensorPump {
    device: Box<dyn SensorDevice + Send>,
    accel_id: SensorId,
    gyro_id: SensorId,
    period: Duration,
    ticker: Option<Interval>,
    pending: VecDeque<HostEvent>,
}

impl SensorPump {
    fn sample(&mut self) {
        match self.device.read() {
            Ok(sample) => {
                self.pending.push_back(HostEvent::SensorUpdate {
                    sensor_id: self.accel_id,
                    data: sample.accel.to_vec(),
                });
                self.pending.push_back(HostEvent::SensorUpdate {
                    sensor_id: self.gyro_id,
                    data: sample.gyro.to_vec(),
                });
            }
            Err(e) => tracing::warn!(error = %e, "sensor read failed, sample skipped"),
        }
    }
}

#[async_trait]
impl EventSource for SensorPump {
    fn name(&self) -> &'static str {
        "sensors"
    }

    async fn next_event(&mut self) -> Option<HostEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            let period = self.period;
            let ticker = self.ticker.get_or_insert_with(|| {
                let mut ticker = tokio::time::interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                ticker
            });
            ticker.tick().await;
            self.sample();
        }
    }
}

/// Result of sensor subsystem initialisation.
pub struct SensorSubsystem {
    pub registry: SensorRegistry,
    pub pump: SensorPump,
}

impl SensorSubsystem {
    /// Register the accelerometer and gyroscope of `device` and wrap it in a pump.
    pub fn new(device: Box<dyn SensorDevice + Send>, period: Duration) -> Self {
        let info = device.info();
        let mut registry = SensorRegistry::new();
        let accel_id = registry.register(SensorKind::Accelerometer, format!("{info} accelerometer"));
        let gyro_id = registry.register(SensorKind::Gyroscope, format!("{info} gyroscope"));

        Self {
            registry,
            pump: SensorPump {
                device,
                accel_id,
                gyro_id,
                period,
                ticker: None,
                pending: VecDeque::new(),
            },
        }
    }
}

/// Open and initialise the configured device.
pub fn open(config: &SensorConfig) -> Result<SensorSubsystem, HostError> {
    let mut device: Box<dyn SensorDevice + Send> = match config.driver {
        SensorDriver::Simulated => Box::new(simulated::SimulatedImu::new()),
        SensorDriver::Mpu6500 => i2c::open_mpu6500(config)?,
    };
    device.init()?;
    tracing::info!(device = %device.info(), "sensor device initialised");

    let period = Duration::from_secs_f64(1.0 / f64::from(config.sample_rate_hz.max(1)));
    Ok(SensorSubsystem::new(device, period))
}
