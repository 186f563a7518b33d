//! Unread counting against a "last read" instant.

use chrono::{DateTime, Utc};

use crate::transcript::Transcript;

/// Read-only view that counts messages newer than a given instant.
///
/// Cost is two binary searches (day, then message) plus an O(1) suffix-sum
/// lookup for every later day.
#[derive(Debug, Clone, Copy)]
pub struct UnreadTracker<'a> {
    transcript: &'a Transcript,
}

impl<'a> UnreadTracker<'a> {
    pub fn new(transcript: &'a Transcript) -> Self {
        Self { transcript }
    }

    /// Number of stored messages with `timestamp > last_read`.
    pub fn unread_after(&self, last_read: DateTime<Utc>) -> usize {
        let key = self.transcript.rule().day_key(last_read);
        match self.transcript.locate(key) {
            Ok(idx) => {
                let same_day = self.transcript.buckets()[idx].count_after(last_read);
                same_day + self.transcript.messages_from(idx + 1)
            }
            // no activity that day; everything from the next day on is unread
            Err(idx) => self.transcript.messages_from(idx),
        }
    }
}
