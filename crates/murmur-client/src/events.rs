//! Change notifications for the presentation layer.

use serde::Serialize;
use tokio::sync::broadcast;

use murmur_shared::{MessageRecord, PeerId};

/// Receiver half handed to subscribers.
pub type EventStream = broadcast::Receiver<TranscriptEvent>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum TranscriptEvent {
    /// A conversation's transcript or unread count changed.
    Updated {
        peer_id: PeerId,
        unread_count: usize,
        latest_message: Option<MessageRecord>,
    },
    /// A conversation was dropped (e.g. unmatch).
    Removed { peer_id: PeerId },
    /// Every conversation was dropped (e.g. sign-out).
    Cleared,
}

impl TranscriptEvent {
    pub fn peer_id(&self) -> Option<&PeerId> {
        match self {
            Self::Updated { peer_id, .. } | Self::Removed { peer_id } => Some(peer_id),
            Self::Cleared => None,
        }
    }
}

/// Fan-out of [`TranscriptEvent`]s to any number of subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TranscriptEvent>,
}

impl EventBus {
    pub fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> EventStream {
        self.tx.subscribe()
    }

    /// Best-effort; lagging subscribers lose the oldest events.
    pub fn emit(&self, event: TranscriptEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("no subscribers for transcript event");
        }
    }
}
