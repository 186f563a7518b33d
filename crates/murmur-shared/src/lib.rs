//! # murmur-shared
//!
//! Types shared by every Murmur crate: message records, peer identifiers,
//! calendar-day keys and the workspace error type.

pub mod calendar;
pub mod constants;
pub mod types;

mod error;

pub use calendar::{DayKey, DayRule};
pub use error::{Result, SyncError};
pub use types::{Direction, MessageRecord, PeerId};
