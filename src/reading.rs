//! Latest-value store for accelerometer and gyroscope readings.

/// One 3-axis sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Takes the first three data channels of a sensor event.
    pub fn from_channels(data: &[f32]) -> Option<Self> {
        match data {
            [x, y, z, ..] => Some(Self::new(*x, *y, *z)),
            _ => None,
        }
    }
}

/// Which reading triple an update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorClass {
    Accelerometer,
    Gyroscope,
}

/// Copy of the store taken at render time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReadingSnapshot {
    pub accel: Vector3,
    pub rotation: Vector3,
}

/// Holds the most recent sample per sensor class. Nothing older survives.
#[derive(Debug, Default)]
pub struct SensorReadingStore {
    current: ReadingSnapshot,
    accel_seen: bool,
    gyro_seen: bool,
}

impl SensorReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole triple of `class`. Values are stored verbatim.
    pub fn update(&mut self, class: SensorClass, value: Vector3) {
        match class {
            SensorClass::Accelerometer => {
                self.current.accel = value;
                self.accel_seen = true;
            }
            SensorClass::Gyroscope => {
                self.current.rotation = value;
                self.gyro_seen = true;
            }
        }
    }

    pub fn snapshot(&self) -> ReadingSnapshot {
        self.current
    }

    pub fn has_observed(&self, class: SensorClass) -> bool {
        match class {
            SensorClass::Accelerometer => self.accel_seen,
            SensorClass::Gyroscope => self.gyro_seen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_zeroed() {
        let store = SensorReadingStore::new();
        assert_eq!(store.snapshot(), ReadingSnapshot::default());
        assert_eq!(store.snapshot().accel, Vector3::ZERO);
        assert!(!store.has_observed(SensorClass::Accelerometer));
        assert!(!store.has_observed(SensorClass::Gyroscope));
    }

    #[test]
    fn test_latest_update_wins() {
        let mut store = SensorReadingStore::new();
        for i in 0..10 {
            store.update(SensorClass::Accelerometer, Vector3::new(i as f32, -(i as f32), 0.5));
        }
        assert_eq!(store.snapshot().accel, Vector3::new(9.0, -9.0, 0.5));
    }

    #[test]
    fn test_classes_are_independent() {
        let mut store = SensorReadingStore::new();
        store.update(SensorClass::Gyroscope, Vector3::new(0.1, 0.2, 0.3));
        store.update(SensorClass::Accelerometer, Vector3::new(1.0, 2.0, 3.0));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.rotation, Vector3::new(0.1, 0.2, 0.3));
        assert_eq!(snapshot.accel, Vector3::new(1.0, 2.0, 3.0));
        assert!(store.has_observed(SensorClass::Gyroscope));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut store = SensorReadingStore::new();
        store.update(SensorClass::Accelerometer, Vector3::new(1.0, 1.0, 1.0));
        let before = store.snapshot();
        store.update(SensorClass::Accelerometer, Vector3::new(2.0, 2.0, 2.0));

        assert_eq!(before.accel, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(store.snapshot().accel, Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_garbage_passes_through() {
        let mut store = SensorReadingStore::new();
        store.update(SensorClass::Gyroscope, Vector3::new(f32::NAN, f32::INFINITY, 1e30));
        let rotation = store.snapshot().rotation;
        assert!(rotation.x.is_nan());
        assert_eq!(rotation.y, f32::INFINITY);
        assert_eq!(rotation.z, 1e30);
    }

    #[test]
    fn test_from_channels_needs_three() {
        assert_eq!(Vector3::from_channels(&[1.0, 2.0]), None);
        assert_eq!(
            Vector3::from_channels(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            Some(Vector3::new(1.0, 2.0, 3.0))
        );
    }
}
