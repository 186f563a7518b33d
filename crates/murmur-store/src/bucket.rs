//! One calendar day of a transcript.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use murmur_shared::{DayKey, MessageRecord};

/// Which strategy [`DayBucket::absorb`] used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePath {
    /// Every incoming message is at or after the bucket's last message.
    Append,
    /// Every incoming message is strictly before the bucket's first message.
    Prepend,
    /// Runs overlap; full two-way merge.
    Interleave,
}

/// All messages of one day, ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    key: DayKey,
    messages: Vec<MessageRecord>,
}

impl DayBucket {
    pub fn new(key: DayKey) -> Self {
        Self {
            key,
            messages: Vec::new(),
        }
    }

    pub fn key(&self) -> DayKey {
        self.key
    }

    pub fn messages(&self) -> &[MessageRecord] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn first(&self) -> Option<&MessageRecord> {
        self.messages.first()
    }

    pub fn last(&self) -> Option<&MessageRecord> {
        self.messages.last()
    }

    /// Number of messages strictly after `instant`.
    pub fn count_after(&self, instant: DateTime<Utc>) -> usize {
        let first_unread = self.messages.partition_point(|m| m.timestamp <= instant);
        self.messages.len() - first_unread
    }

    pub(crate) fn push(&mut self, message: MessageRecord) {
        self.messages.push(message);
    }

    pub(crate) fn find_mut(&mut self, id: &str) -> Option<&mut MessageRecord> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    pub(crate) fn into_messages(self) -> Vec<MessageRecord> {
        self.messages
    }

    /// Merge a timestamp-sorted run of same-day messages into this bucket.
    ///
    /// Ties keep existing messages first, so the append and prepend shortcuts
    /// produce exactly what the interleaving merge would. The shortcuts
    /// assume `incoming` carries no id already held by this bucket (the
    /// owning transcript filters those out); the interleaving merge drops
    /// such ids itself.
    pub(crate) fn absorb(&mut self, incoming: Vec<MessageRecord>) -> MergePath {
        let (new_first, new_last) = match (incoming.first(), incoming.last()) {
            (Some(first), Some(last)) => (first.timestamp, last.timestamp),
            _ => return MergePath::Append,
        };
        let (old_first, old_last) = match (self.messages.first(), self.messages.last()) {
            (Some(first), Some(last)) => (first.timestamp, last.timestamp),
            _ => {
                self.messages = incoming;
                return MergePath::Append;
            }
        };

        if new_first >= old_last {
            self.messages.extend(incoming);
            MergePath::Append
        } else if new_last < old_first {
            self.messages.splice(0..0, incoming);
            MergePath::Prepend
        } else {
            self.interleave(incoming);
            MergePath::Interleave
        }
    }

    fn interleave(&mut self, incoming: Vec<MessageRecord>) {
        let existing = std::mem::take(&mut self.messages);
        let known: HashSet<String> = existing.iter().map(|m| m.id.clone()).collect();

        let mut merged = Vec::with_capacity(existing.len() + incoming.len());
        let mut old_iter = existing.into_iter().peekable();
        let mut new_iter = incoming
            .into_iter()
            .filter(|m| !known.contains(&m.id))
            .peekable();

        loop {
            let take_old = match (old_iter.peek(), new_iter.peek()) {
                (Some(old), Some(new)) => old.timestamp <= new.timestamp,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            let next = if take_old {
                old_iter.next()
            } else {
                new_iter.next()
            };
            if let Some(message) = next {
                merged.push(message);
            }
        }

        self.messages = merged;
    }
}
