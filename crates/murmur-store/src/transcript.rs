//! Day-bucketed transcript of one conversation and the merge-insert engine.
//!
//! Batches may arrive unsorted, overlap what is already stored, span several
//! days, or be redeliveries. [`Transcript::merge_insert`] normalizes all of
//! that so the store converges to the same state regardless of delivery
//! order:
//!
//! - buckets ascend by [`DayKey`] and no two share a key;
//! - messages inside a bucket ascend by timestamp, ties in arrival order;
//! - an id is stored at most once per conversation.
//!
//! Duplicate ids are resolved first-seen-wins: the stored text, timestamp
//! and position never change. The one exception is delivery confirmation:
//! a stored `Pending`/`Broken` record adopts `Sent` when the backend echoes
//! it back, so echo and local copy converge whichever arrives first.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use murmur_shared::{DayKey, DayRule, Direction, MessageRecord};

use crate::bucket::{DayBucket, MergePath};

/// What a merge did with its input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Messages added to the store.
    pub inserted: usize,
    /// Messages dropped because their id was already stored or repeated
    /// within the batch.
    pub duplicates: usize,
    /// Stored unconfirmed messages upgraded to `Sent` by an echo.
    pub confirmed: usize,
}

/// Plain-data copy of a transcript, for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptSnapshot {
    pub rule: DayRule,
    pub buckets: Vec<DayBucket>,
}

#[derive(Debug, Clone)]
pub struct Transcript {
    rule: DayRule,
    buckets: Vec<DayBucket>,
    /// id -> day of the bucket holding it
    index: HashMap<String, DayKey>,
    /// suffix[i] = number of messages in buckets[i..]; one longer than buckets
    suffix: Vec<usize>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(DayRule::default())
    }
}

impl Transcript {
    pub fn new(rule: DayRule) -> Self {
        Self {
            rule,
            buckets: Vec::new(),
            index: HashMap::new(),
            suffix: vec![0],
        }
    }

    pub fn rule(&self) -> DayRule {
        self.rule
    }

    pub fn buckets(&self) -> &[DayBucket] {
        &self.buckets
    }

    /// Total number of stored messages.
    pub fn len(&self) -> usize {
        self.messages_from(0)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// All messages in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = &MessageRecord> {
        self.buckets.iter().flat_map(|b| b.messages().iter())
    }

    pub fn latest(&self) -> Option<&MessageRecord> {
        self.buckets.last().and_then(DayBucket::last)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&MessageRecord> {
        let key = self.index.get(id)?;
        let idx = self.locate(*key).ok()?;
        self.buckets[idx].messages().iter().find(|m| m.id == id)
    }

    /// Binary search for the bucket of `key`.
    ///
    /// `Ok(i)` when `buckets[i]` has that key, `Err(i)` with the index a new
    /// bucket must be inserted at to keep the order.
    pub fn locate(&self, key: DayKey) -> Result<usize, usize> {
        self.buckets.binary_search_by(|b| b.key().cmp(&key))
    }

    /// Messages held by `buckets[bucket_index..]`. O(1).
    pub fn messages_from(&self, bucket_index: usize) -> usize {
        self.suffix.get(bucket_index).copied().unwrap_or(0)
    }

    /// Merge a batch into the store.
    ///
    /// With `sorted == true` the caller promises `messages` ascend by
    /// timestamp and the sort is skipped. Breaking that promise yields a
    /// misordered store, never a panic.
    pub fn merge_insert(&mut self, messages: Vec<MessageRecord>, sorted: bool) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        let mut fresh = self.drop_known(messages, &mut outcome);
        if fresh.is_empty() {
            return outcome;
        }

        if !sorted {
            // stable: equal timestamps keep arrival order
            fresh.sort_by_key(|m| m.timestamp);
        }
        outcome.inserted = fresh.len();

        let incoming = partition(self.rule, fresh);
        for bucket in &incoming {
            for message in bucket.messages() {
                self.index.insert(message.id.clone(), bucket.key());
            }
        }

        if self.buckets.is_empty() {
            self.buckets = incoming;
        } else {
            self.weave(incoming);
        }
        self.rebuild_suffix();

        debug!(
            inserted = outcome.inserted,
            duplicates = outcome.duplicates,
            confirmed = outcome.confirmed,
            days = self.buckets.len(),
            "merged batch into transcript"
        );
        outcome
    }

    /// Overwrite the direction of a stored message, returning the previous one.
    pub fn set_direction(&mut self, id: &str, direction: Direction) -> Option<Direction> {
        let key = *self.index.get(id)?;
        let idx = self.locate(key).ok()?;
        let message = self.buckets[idx].find_mut(id)?;
        Some(std::mem::replace(&mut message.direction, direction))
    }

    pub fn snapshot(&self) -> TranscriptSnapshot {
        TranscriptSnapshot {
            rule: self.rule,
            buckets: self.buckets.clone(),
        }
    }

    /// Rebuild a transcript from a snapshot under `rule`.
    ///
    /// Snapshots come from storage and are not trusted: every message is
    /// merged again, so repeated ids collapse first-seen-wins and misfiled
    /// or unordered buckets are re-sorted onto `rule`'s days.
    pub fn restore(snapshot: TranscriptSnapshot, rule: DayRule) -> Self {
        if snapshot.rule != rule {
            info!(from = ?snapshot.rule, to = ?rule, "restoring snapshot under a new day rule");
        }
        let messages: Vec<MessageRecord> = snapshot
            .buckets
            .into_iter()
            .flat_map(DayBucket::into_messages)
            .collect();

        let mut transcript = Self::new(rule);
        let outcome = transcript.merge_insert(messages, false);
        if outcome.duplicates > 0 {
            debug!(duplicates = outcome.duplicates, "dropped repeated ids from snapshot");
        }
        transcript
    }

    /// Re-derive every day key under `rule`.
    pub fn rebucket(&mut self, rule: DayRule) {
        if rule == self.rule {
            return;
        }
        info!(from = ?self.rule, to = ?rule, messages = self.len(), "re-bucketing transcript");

        let messages: Vec<MessageRecord> = std::mem::take(&mut self.buckets)
            .into_iter()
            .flat_map(DayBucket::into_messages)
            .collect();
        self.rule = rule;
        self.buckets = partition(rule, messages);
        self.rebuild_index();
        self.rebuild_suffix();
    }

    /// Filter out ids already stored or repeated within the batch, applying
    /// echo confirmation to the survivors.
    fn drop_known(
        &mut self,
        messages: Vec<MessageRecord>,
        outcome: &mut MergeOutcome,
    ) -> Vec<MessageRecord> {
        let mut fresh: Vec<MessageRecord> = Vec::with_capacity(messages.len());
        let mut positions: HashMap<String, usize> = HashMap::new();

        for message in messages {
            if self.contains(&message.id) {
                outcome.duplicates += 1;
                if self.confirm_stored(&message) {
                    outcome.confirmed += 1;
                }
                continue;
            }

            match positions.get(&message.id) {
                Some(&pos) => {
                    outcome.duplicates += 1;
                    let kept = &mut fresh[pos];
                    if kept.direction.yields_to(message.direction) {
                        kept.direction = message.direction;
                    }
                }
                None => {
                    positions.insert(message.id.clone(), fresh.len());
                    fresh.push(message);
                }
            }
        }

        fresh
    }

    fn confirm_stored(&mut self, incoming: &MessageRecord) -> bool {
        let upgrade = self
            .get(&incoming.id)
            .is_some_and(|stored| stored.direction.yields_to(incoming.direction));
        if upgrade {
            self.set_direction(&incoming.id, incoming.direction);
        }
        upgrade
    }

    /// Walk the new buckets against the existing ones in key order.
    fn weave(&mut self, incoming: Vec<DayBucket>) {
        let existing = std::mem::take(&mut self.buckets);
        let mut woven = Vec::with_capacity(existing.len() + incoming.len());
        let mut cursor = existing.into_iter().peekable();

        for bucket in incoming {
            while let Some(earlier) = cursor.next_if(|b| b.key() < bucket.key()) {
                woven.push(earlier);
            }
            match cursor.next_if(|b| b.key() == bucket.key()) {
                Some(mut same_day) => {
                    let key = bucket.key();
                    let path: MergePath = same_day.absorb(bucket.into_messages());
                    trace!(day = %key, ?path, "merged into existing day");
                    woven.push(same_day);
                }
                // past the end, or the next existing day is later
                None => woven.push(bucket),
            }
        }

        woven.extend(cursor);
        self.buckets = woven;
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for bucket in &self.buckets {
            for message in bucket.messages() {
                self.index.entry(message.id.clone()).or_insert(bucket.key());
            }
        }
    }

    fn rebuild_suffix(&mut self) {
        self.suffix.clear();
        self.suffix.resize(self.buckets.len() + 1, 0);
        for i in (0..self.buckets.len()).rev() {
            self.suffix[i] = self.suffix[i + 1] + self.buckets[i].len();
        }
    }
}

/// Split a timestamp-sorted run into consecutive day buckets.
fn partition(rule: DayRule, messages: Vec<MessageRecord>) -> Vec<DayBucket> {
    let mut buckets: Vec<DayBucket> = Vec::new();
    for message in messages {
        let key = rule.day_key(message.timestamp);
        match buckets.last_mut() {
            Some(bucket) if bucket.key() == key => bucket.push(message),
            _ => {
                let mut bucket = DayBucket::new(key);
                bucket.push(message);
                buckets.push(bucket);
            }
        }
    }
    buckets
}
