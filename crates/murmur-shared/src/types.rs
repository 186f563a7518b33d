use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a conversation partner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for log lines.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PeerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Who originated a message and whether delivery is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Sent by us and acknowledged by the backend.
    Sent,
    /// Sent by the peer.
    Received,
    /// Sent by us, awaiting acknowledgement.
    Pending,
    /// Sent by us, delivery failed.
    Broken,
}

impl Direction {
    /// `Pending` and `Broken` are local messages whose delivery is unsettled.
    pub fn is_unconfirmed(self) -> bool {
        matches!(self, Self::Pending | Self::Broken)
    }

    /// Whether a stored message in direction `self` should take `incoming`
    /// when the same id shows up again. Only a backend acknowledgement
    /// (`Sent`) may overwrite an unsettled local message.
    pub fn yields_to(self, incoming: Direction) -> bool {
        self.is_unconfirmed() && incoming == Self::Sent
    }
}

/// A single chat message. Equal ids denote the same message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageRecord {
    /// Idempotency key, stable across redelivery.
    pub id: String,
    pub direction: Direction,
    /// Message body. Never inspected by the engine.
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl MessageRecord {
    pub fn new(
        id: impl Into<String>,
        direction: Direction,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            direction,
            text: text.into(),
            timestamp,
        }
    }

    pub fn sent(id: impl Into<String>, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(id, Direction::Sent, text, timestamp)
    }

    pub fn received(
        id: impl Into<String>,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(id, Direction::Received, text, timestamp)
    }

    /// A locally originated message with a freshly generated id.
    pub fn pending(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Uuid::new_v4().to_string(), Direction::Pending, text, timestamp)
    }
}
