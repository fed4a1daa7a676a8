//! Application context: the reading store plus everything that touches it.
//!
//! `SensorApp` replaces the callback quartet of a host framework with an
//! explicit state machine: `init`, then any interleaving of `handle_event`
//! and `render`, then exactly one `shutdown`.

use crate::config::DisplayConfig;
use crate::dispatcher::{DispatchState, EventDispatcher, Flow};
use crate::error::StartupError;
use crate::event::HostEvent;
use crate::host::{Host, Surface, WindowFlags};
use crate::reading::{ReadingSnapshot, SensorReadingStore};
use crate::renderer::FrameRenderer;
use crate::sensors::{SensorPump, SensorRegistry};

pub struct SensorApp<S: Surface> {
    surface: S,
    sensors: SensorRegistry,
    store: SensorReadingStore,
    dispatcher: EventDispatcher,
    renderer: FrameRenderer,
    events_handled: u64,
    frames_rendered: u64,
}

impl<S: Surface> SensorApp<S> {
    /// Create the window, bring up the sensor subsystem and allocate the
    /// reading store. Any failure aborts startup.
    pub fn init<H>(host: &mut H, display: &DisplayConfig) -> Result<(Self, SensorPump), StartupError>
    where
        H: Host<Surface = S>,
    {
        let toggle_key = display.toggle_key()?;

        let flags = WindowFlags {
            fullscreen: display.fullscreen,
        };
        let surface = host
            .create_window(&display.title, display.width, display.height, flags)
            .map_err(StartupError::Window)?;

        let subsystem = host.init_sensors().map_err(StartupError::Sensors)?;
        tracing::info!(sensors = subsystem.registry.len(), "sensor subsystem ready");

        let app = Self {
            surface,
            sensors: subsystem.registry,
            store: SensorReadingStore::new(),
            dispatcher: EventDispatcher::new(toggle_key),
            renderer: FrameRenderer::new(),
            events_handled: 0,
            frames_rendered: 0,
        };
        Ok((app, subsystem.pump))
    }

    pub fn handle_event(&mut self, event: HostEvent) -> Flow {
        if self.dispatcher.state() == DispatchState::Running {
            self.events_handled += 1;
        }
        self.dispatcher
            .handle_event(event, &mut self.store, &mut self.surface, &self.sensors)
    }

    /// Paint the current readings. Does nothing once terminated.
    pub fn render(&mut self) {
        if self.dispatcher.state() == DispatchState::Terminated {
            return;
        }
        let snapshot = self.store.snapshot();
        self.renderer.render(&snapshot, &mut self.surface);
        self.frames_rendered += 1;
    }

    pub fn state(&self) -> DispatchState {
        self.dispatcher.state()
    }

    pub fn snapshot(&self) -> ReadingSnapshot {
        self.store.snapshot()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Release the surface and sensor handles.
    pub fn shutdown(self) {
        tracing::info!(
            events = self.events_handled,
            frames = self.frames_rendered,
            "shutting down"
        );
        drop(self);
    }
}
