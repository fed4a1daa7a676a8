//! Event classification and routing.

use crossterm::event::KeyCode;

use crate::event::HostEvent;
use crate::host::Window;
use crate::reading::{SensorReadingStore, Vector3};
use crate::sensors::{SensorId, SensorRegistry};

/// What the loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Terminate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Running,
    Terminated,
}

/// Applies host events to the reading store.
///
/// Any key other than the toggle key ends the program, as does a quit
/// request. `Terminated` is final: later events are not looked at.
#[derive(Debug)]
pub struct EventDispatcher {
    state: DispatchState,
    toggle_key: KeyCode,
}

impl EventDispatcher {
    pub fn new(toggle_key: KeyCode) -> Self {
        Self {
            state: DispatchState::Running,
            toggle_key,
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn handle_event<W>(
        &mut self,
        event: HostEvent,
        store: &mut SensorReadingStore,
        window: &mut W,
        sensors: &SensorRegistry,
    ) -> Flow
    where
        W: Window + ?Sized,
    {
        if self.state == DispatchState::Terminated {
            return Flow::Terminate;
        }

        match event {
            HostEvent::Quit => self.terminate("quit requested"),
            HostEvent::KeyDown { key } if key == self.toggle_key => {
                toggle_fullscreen(window);
                Flow::Continue
            }
            HostEvent::KeyDown { key } => {
                tracing::debug!(?key, "key pressed");
                self.terminate("key pressed")
            }
            HostEvent::SensorUpdate { sensor_id, data } => {
                route_sample(sensor_id, &data, store, sensors);
                Flow::Continue
            }
            HostEvent::Resize { width, height } => {
                tracing::trace!(width, height, "surface resized");
                Flow::Continue
            }
            HostEvent::Other => Flow::Continue,
        }
    }

    fn terminate(&mut self, reason: &'static str) -> Flow {
        tracing::info!(reason, "terminating");
        self.state = DispatchState::Terminated;
        Flow::Terminate
    }
}

/// Flip fullscreen. Failures are not surfaced.
fn toggle_fullscreen<W: Window + ?Sized>(window: &mut W) {
    let fullscreen = !window.flags().fullscreen;
    match window.set_fullscreen(fullscreen) {
        Ok(()) => tracing::info!(fullscreen, "display mode changed"),
        Err(e) => tracing::debug!(error = %e, fullscreen, "display mode change failed"),
    }
}

fn route_sample(
    sensor_id: SensorId,
    data: &[f32],
    store: &mut SensorReadingStore,
    sensors: &SensorRegistry,
) {
    let Some(sensor) = sensors.resolve(sensor_id) else {
        tracing::trace!(sensor = %sensor_id, "update from unknown sensor ignored");
        return;
    };
    let Some(class) = sensor.kind().class() else {
        return;
    };
    let Some(value) = Vector3::from_channels(data) else {
        tracing::debug!(sensor = %sensor_id, channels = data.len(), "short sensor update ignored");
        return;
    };

    if !store.has_observed(class) {
        tracing::info!(sensor = %sensor.id(), name = sensor.name(), ?class, "first sample received");
    }
    store.update(class, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::host::{MockWindow, WindowFlags};
    use crate::reading::ReadingSnapshot;
    use crate::sensors::SensorKind;

    /// Window that remembers its display mode.
    #[derive(Default)]
    struct FakeWindow {
        flags: WindowFlags,
        changes: usize,
    }

    impl Window for FakeWindow {
        fn flags(&self) -> WindowFlags {
            self.flags
        }

        fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), HostError> {
            self.flags.fullscreen = fullscreen;
            self.changes += 1;
            Ok(())
        }
    }

    struct Fixture {
        dispatcher: EventDispatcher,
        store: SensorReadingStore,
        window: FakeWindow,
        sensors: SensorRegistry,
        accel: SensorId,
        gyro: SensorId,
        light: SensorId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut sensors = SensorRegistry::new();
            let accel = sensors.register(SensorKind::Accelerometer, "accel");
            let gyro = sensors.register(SensorKind::Gyroscope, "gyro");
            let light = sensors.register(SensorKind::Other, "ambient light");
            Self {
                dispatcher: EventDispatcher::new(KeyCode::F(10)),
                store: SensorReadingStore::new(),
                window: FakeWindow::default(),
                sensors,
                accel,
                gyro,
                light,
            }
        }

        fn send(&mut self, event: HostEvent) -> Flow {
            self.dispatcher
                .handle_event(event, &mut self.store, &mut self.window, &self.sensors)
        }

        fn sample(&mut self, sensor_id: SensorId, data: &[f32]) -> Flow {
            self.send(HostEvent::SensorUpdate {
                sensor_id,
                data: data.to_vec(),
            })
        }
    }

    #[test]
    fn test_starts_running() {
        let fixture = Fixture::new();
        assert_eq!(fixture.dispatcher.state(), DispatchState::Running);
    }

    #[test]
    fn test_accel_latest_wins() {
        let mut f = Fixture::new();
        let accel = f.accel;
        assert_eq!(f.sample(accel, &[1.0, 1.0, 1.0]), Flow::Continue);
        assert_eq!(f.sample(accel, &[2.0, 2.0, 2.0]), Flow::Continue);
        assert_eq!(f.sample(accel, &[3.5, -1.5, 0.25]), Flow::Continue);

        assert_eq!(f.store.snapshot().accel, Vector3::new(3.5, -1.5, 0.25));
    }

    #[test]
    fn test_classes_routed_independently() {
        let mut f = Fixture::new();
        let (accel, gyro) = (f.accel, f.gyro);
        f.sample(gyro, &[0.1, 0.2, 0.3]);
        f.sample(accel, &[9.0, 8.0, 7.0]);

        let snapshot = f.store.snapshot();
        assert_eq!(snapshot.rotation, Vector3::new(0.1, 0.2, 0.3));
        assert_eq!(snapshot.accel, Vector3::new(9.0, 8.0, 7.0));

        f.sample(accel, &[1.0, 1.0, 1.0]);
        assert_eq!(f.store.snapshot().rotation, Vector3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_extra_channels_ignored() {
        let mut f = Fixture::new();
        let gyro = f.gyro;
        f.sample(gyro, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(f.store.snapshot().rotation, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_other_and_unknown_sensors_ignored() {
        let mut f = Fixture::new();
        let (light, accel) = (f.light, f.accel);
        assert_eq!(f.sample(light, &[300.0, 0.0, 0.0]), Flow::Continue);
        assert_eq!(f.sample(SensorId(42), &[1.0, 2.0, 3.0]), Flow::Continue);
        assert_eq!(f.sample(accel, &[1.0, 2.0]), Flow::Continue);

        assert_eq!(f.store.snapshot(), ReadingSnapshot::default());
        assert_eq!(f.dispatcher.state(), DispatchState::Running);
    }

    #[test]
    fn test_quit_terminates() {
        let mut f = Fixture::new();
        assert_eq!(f.send(HostEvent::Quit), Flow::Terminate);
        assert_eq!(f.dispatcher.state(), DispatchState::Terminated);
    }

    #[test]
    fn test_any_other_key_terminates() {
        for key in [KeyCode::Char('q'), KeyCode::Esc, KeyCode::F(11), KeyCode::Enter] {
            let mut f = Fixture::new();
            assert_eq!(f.send(HostEvent::KeyDown { key }), Flow::Terminate);
            assert_eq!(f.dispatcher.state(), DispatchState::Terminated);
        }
    }

    #[test]
    fn test_nothing_processed_after_termination() {
        let mut f = Fixture::new();
        let accel = f.accel;
        f.send(HostEvent::Quit);

        assert_eq!(f.sample(accel, &[5.0, 5.0, 5.0]), Flow::Terminate);
        assert_eq!(f.send(HostEvent::KeyDown { key: KeyCode::F(10) }), Flow::Terminate);
        assert_eq!(f.store.snapshot(), ReadingSnapshot::default());
        assert_eq!(f.window.changes, 0);
    }

    #[test]
    fn test_toggle_key_flips_and_continues() {
        let mut f = Fixture::new();
        let toggle = HostEvent::KeyDown { key: KeyCode::F(10) };

        assert_eq!(f.send(toggle.clone()), Flow::Continue);
        assert!(f.window.flags.fullscreen);
        assert_eq!(f.send(toggle), Flow::Continue);
        assert!(!f.window.flags.fullscreen);
        assert_eq!(f.window.changes, 2);
        assert_eq!(f.dispatcher.state(), DispatchState::Running);
    }

    #[test]
    fn test_toggle_failure_is_silent() {
        let mut window = MockWindow::new();
        window
            .expect_flags()
            .times(1)
            .returning(|| WindowFlags { fullscreen: true });
        window
            .expect_set_fullscreen()
            .withf(|fullscreen| !*fullscreen)
            .times(1)
            .returning(|_| Err(HostError::Io(std::io::Error::other("no display"))));

        let mut dispatcher = EventDispatcher::new(KeyCode::F(10));
        let mut store = SensorReadingStore::new();
        let flow = dispatcher.handle_event(
            HostEvent::KeyDown { key: KeyCode::F(10) },
            &mut store,
            &mut window,
            &SensorRegistry::new(),
        );

        assert_eq!(flow, Flow::Continue);
        assert_eq!(dispatcher.state(), DispatchState::Running);
    }

    #[test]
    fn test_resize_and_other_are_noops() {
        let mut f = Fixture::new();
        assert_eq!(f.send(HostEvent::Resize { width: 120, height: 40 }), Flow::Continue);
        assert_eq!(f.send(HostEvent::Other), Flow::Continue);
        assert_eq!(f.window.changes, 0);
    }
}
