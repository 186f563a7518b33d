//! # murmur-client
//!
//! Entry point of the transcript synchronization engine. Transport callbacks
//! feed a [`ConversationRegistry`], which keeps one day-bucketed transcript
//! and unread counter per peer and announces every change on a
//! [`TranscriptEvent`] stream.
//!
//! ```no_run
//! use murmur_client::{init_tracing, ConversationRegistry, SyncConfig};
//!
//! let config = SyncConfig::from_env();
//! init_tracing(&config.log_filter);
//! let registry = ConversationRegistry::new(&config);
//! let mut events = registry.subscribe();
//! # let _ = &mut events;
//! ```

pub mod config;
pub mod events;
pub mod logging;
pub mod registry;

pub use config::SyncConfig;
pub use events::{EventBus, EventStream, TranscriptEvent};
pub use logging::init_tracing;
pub use registry::{ChatGate, ConversationRegistry, ConversationSnapshot};

pub use murmur_shared::{DayKey, DayRule, Direction, MessageRecord, PeerId, Result, SyncError};
pub use murmur_store::{MergeOutcome, TranscriptSnapshot};
