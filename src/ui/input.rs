//! Keyboard and resize input from the terminal.

use async_trait::async_trait;
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures_util::StreamExt;

use crate::event::{EventSource, HostEvent};

/// Terminal events as an [`EventSource`].
pub struct TerminalInput {
    events: EventStream,
}

impl TerminalInput {
    pub fn new() -> Self {
        Self {
            events: EventStream::new(),
        }
    }
}

impl Default for TerminalInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSource for TerminalInput {
    fn name(&self) -> &'static str {
        "terminal"
    }

    async fn next_event(&mut self) -> Option<HostEvent> {
        loop {
            match self.events.next().await? {
                Ok(event) => {
                    if let Some(event) = map_terminal_event(event) {
                        return Some(event);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "terminal input failed");
                    return None;
                }
            }
        }
    }
}

/// Map a terminal event to a host event. Key releases and repeats are dropped.
fn map_terminal_event(event: Event) -> Option<HostEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(HostEvent::KeyDown { key: key.code }),
        Event::Key(_) => None,
        Event::Resize(width, height) => Some(HostEvent::Resize { width, height }),
        _ => Some(HostEvent::Other),
    }
}
