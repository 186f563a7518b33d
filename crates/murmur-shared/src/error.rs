use thiserror::Error;

use crate::types::Direction;

/// Errors produced by the transcript engine.
///
/// Merging and unread computation never fail; these variants cover the
/// lookups and state transitions that address a specific message or peer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// No conversation exists for the given peer.
    #[error("Unknown conversation: {0}")]
    UnknownConversation(String),

    /// The peer's transcript has no message with this id.
    #[error("Message {id} not found in conversation {peer}")]
    MessageNotFound { peer: String, id: String },

    /// The requested direction change is not allowed from the current state.
    #[error("Message {id} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        id: String,
        from: Direction,
        to: Direction,
    },

    /// A day-boundary offset outside of (-24h, +24h).
    #[error("Invalid day offset: {0} minutes")]
    InvalidDayOffset(i32),

    /// The relationship gate refused an outbound message.
    #[error("Chatting with {0} is not allowed")]
    ChatNotAllowed(String),

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, SyncError>;
