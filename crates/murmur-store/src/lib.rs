//! # murmur-store
//!
//! In-memory, day-bucketed chat transcripts.
//!
//! A [`Transcript`] holds one conversation as a sorted run of
//! [`DayBucket`]s and merges batches of messages into it idempotently. The
//! [`UnreadTracker`] answers "how many messages since t" against it. Nothing
//! here touches disk; [`TranscriptSnapshot`] is the plain-data form handed to
//! whatever persistence layer the caller uses.

pub mod bucket;
pub mod transcript;
pub mod unread;

pub use bucket::{DayBucket, MergePath};
pub use transcript::{MergeOutcome, Transcript, TranscriptSnapshot};
pub use unread::UnreadTracker;
