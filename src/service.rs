//! Event loop and process lifecycle.
//!
//! Every event source runs as its own task and feeds one bounded queue. The
//! loop drains that queue ahead of the frame timer, so all events delivered
//! before a frame are reflected in it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::app::SensorApp;
use crate::config::AppConfig;
use crate::dispatcher::Flow;
use crate::error::Result;
use crate::event::{spawn_source, HostEvent};
use crate::host::Surface;
use crate::ui::{TerminalHost, TerminalInput};

/// Capacity of the shared event queue.
pub const EVENT_QUEUE_DEPTH: usize = 256;

#[cfg(unix)]
mod signals {
    use async_trait::async_trait;
    use futures_util::StreamExt;
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook_tokio::Signals;

    use crate::error::HostError;
    use crate::event::{EventSource, HostEvent};

    /// Termination signals, delivered as quit requests.
    pub struct SignalSource {
        signals: Signals,
    }

    impl SignalSource {
        pub fn new() -> Result<Self, HostError> {
            let signals = Signals::new([SIGINT, SIGTERM, SIGHUP])
                .map_err(|e| HostError::Signal(e.to_string()))?;
            Ok(Self { signals })
        }
    }

    #[async_trait]
    impl EventSource for SignalSource {
        fn name(&self) -> &'static str {
            "signals"
        }

        async fn next_event(&mut self) -> Option<HostEvent> {
            let signal = self.signals.next().await?;
            tracing::info!(signal, "received shutdown signal");
            Some(HostEvent::Quit)
        }
    }
}

/// Run until the application terminates or every source has gone away.
pub async fn run<S: Surface>(
    mut app: SensorApp<S>,
    mut events: mpsc::Receiver<HostEvent>,
    frame_interval: Duration,
) -> SensorApp<S> {
    let mut frames = tokio::time::interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            event = events.recv() => match event {
                Some(event) => {
                    if app.handle_event(event) == Flow::Terminate {
                        break;
                    }
                }
                None => {
                    tracing::warn!("all event sources closed");
                    break;
                }
            },
            _ = frames.tick() => app.render(),
        }
    }
    app
}

/// Bring up the terminal and sensors, run the loop, then tear everything down.
pub async fn serve(config: &AppConfig) -> Result<()> {
    #[cfg(unix)]
    let signals = signals::SignalSource::new()?;

    let mut host = TerminalHost::new(config.sensor.clone());
    let (app, pump) = SensorApp::init(&mut host, &config.display)?;

    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    let cancel = CancellationToken::new();
    #[allow(unused_mut)]
    let mut sources = vec![
        spawn_source(pump, tx.clone(), cancel.clone()),
        spawn_source(TerminalInput::new(), tx.clone(), cancel.clone()),
    ];
    #[cfg(unix)]
    sources.push(spawn_source(signals, tx.clone(), cancel.clone()));
    drop(tx);

    let frame_interval = Duration::from_millis(config.display.frame_interval_ms);
    tracing::info!(?frame_interval, "event loop started");
    let app = run(app, rx, frame_interval).await;

    cancel.cancel();
    for source in sources {
        if let Err(e) = source.await {
            tracing::warn!(error = %e, "event source task failed");
        }
    }
    app.shutdown();
    Ok(())
}
