//! Streaming resolution events.
//!
//! A streamed resolution publishes its events on a broadcast channel so any
//! number of independent consumers can subscribe to one invocation without
//! re-triggering the underlying work. Dropped consumers never block or
//! corrupt the resolution.

use serde::Serialize;
use tokio::sync::broadcast;

/// Kind of a streamed resolution event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Lifecycle status update (rephrasing, stage transitions, ...).
    Status,
    /// Text produced by the decision stage.
    Text,
    /// A delegated tool/research call completed.
    Tool,
    /// Terminal: the resolution finished successfully.
    Result,
    /// Terminal: the resolution failed.
    Error,
}

impl EventKind {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Result | Self::Error)
    }
}

/// A single event in a streamed resolution. Exactly one terminal event
/// (`Result` or `Error`) is published per invocation.
#[derive(Debug, Clone)]
pub struct ResolveEvent {
    pub kind: EventKind,
    pub text: String,
}

impl ResolveEvent {
    pub fn status(text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Status,
            text: text.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Text,
            text: text.into(),
        }
    }

    pub fn tool(text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Tool,
            text: text.into(),
        }
    }

    pub fn result(text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Result,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Error,
            text: text.into(),
        }
    }
}

/// Publishing half of a streamed resolution, held by the pipeline task.
pub(crate) struct EventPublisher {
    sender: broadcast::Sender<ResolveEvent>,
}

impl EventPublisher {
    pub(crate) fn channel(capacity: usize) -> (Self, ResolutionStream) {
        let (sender, primary) = broadcast::channel(capacity);
        let stream = ResolutionStream {
            primary,
            sender: sender.clone(),
        };
        (Self { sender }, stream)
    }

    /// Create a publisher with no attached stream, for one-shot resolution.
    pub(crate) fn disconnected() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    /// Publish an event. Consumers abandoning the stream early is normal;
    /// send failures are ignored and the resolution continues.
    pub(crate) fn publish(&self, event: ResolveEvent) {
        let _ = self.sender.send(event);
    }
}

/// Consuming handle for a streamed resolution.
pub struct ResolutionStream {
    primary: broadcast::Receiver<ResolveEvent>,
    sender: broadcast::Sender<ResolveEvent>,
}

impl ResolutionStream {
    /// Receive the next event, in publication order. Returns `None` once the
    /// publishing side has finished and all events were consumed.
    pub async fn next_event(&mut self) -> Option<ResolveEvent> {
        loop {
            match self.primary.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Closed) => return None,
                // Slow consumer fell behind the channel capacity; skip to
                // the oldest retained event.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
            }
        }
    }

    /// Attach an additional independent consumer to this invocation. The new
    /// receiver observes events published after the call.
    pub fn subscribe(&self) -> broadcast::Receiver<ResolveEvent> {
        self.sender.subscribe()
    }

    /// Drain the stream, collecting every remaining event.
    pub async fn collect_events(mut self) -> Vec<ResolveEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            let terminal = event.kind.is_terminal();
            events.push(event);
            if terminal {
                break;
            }
        }
        events
    }
}
