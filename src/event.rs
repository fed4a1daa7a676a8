//! Host events and the async sources that produce them.

use async_trait::async_trait;
use crossterm::event::KeyCode;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::sensors::SensorId;

/// Everything the dispatcher can be handed by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The host asked the application to end (window close, SIGTERM, ...).
    Quit,
    /// A key was pressed.
    KeyDown { key: KeyCode },
    /// A sample from one logical sensor. `data` carries at least the three
    /// axis channels.
    SensorUpdate { sensor_id: SensorId, data: Vec<f32> },
    /// The output surface changed size.
    Resize { width: u16, height: u16 },
    /// Anything else the host reports; ignored.
    Other,
}

/// Something that yields host events until it runs dry.
#[async_trait]
pub trait EventSource: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Next event, or `None` once the source is exhausted.
    async fn next_event(&mut self) -> Option<HostEvent>;
}

/// Forward events from `source` into the application queue until the source
/// ends, the queue closes or `cancel` fires.
pub fn spawn_source<E>(
    mut source: E,
    tx: mpsc::Sender<HostEvent>,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    E: EventSource + 'static,
{
    tokio::spawn(async move {
        let name = source.name();
        tracing::debug!(source = name, "event source started");
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => break,
                event = source.next_event() => event,
            };
            let Some(event) = event else {
                tracing::debug!(source = name, "event source exhausted");
                break;
            };
            if tx.send(event).await.is_err() {
                break;
            }
        }
        tracing::debug!(source = name, "event source stopped");
    })
}
