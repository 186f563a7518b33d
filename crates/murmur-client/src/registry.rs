//! Per-peer conversation state and the engine's single entry point.
//!
//! The [`ConversationRegistry`] owns one [`Transcript`] and one unread
//! counter per peer. Every mutation for a peer runs inside that peer's
//! mutex, so overlapping catch-ups for the same peer never interleave while
//! different peers proceed independently. Nothing here blocks on I/O.
//!
//! Removal marks the detached entry under its own lock, so a mutation that
//! resolved the entry just before removal retries against a fresh one
//! instead of writing into state nobody can reach.
//!
//! Readers never see live state: queries return copies and
//! [`ConversationRegistry::snapshot`] deep-copies the transcript.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use murmur_shared::{DayRule, Direction, MessageRecord, PeerId, Result, SyncError};
use murmur_store::{MergeOutcome, Transcript, TranscriptSnapshot, UnreadTracker};

use crate::config::SyncConfig;
use crate::events::{EventBus, EventStream, TranscriptEvent};

/// Relationship gate consulted before outbound sends.
pub trait ChatGate: Send + Sync {
    fn may_chat(&self, peer: &PeerId) -> bool;
}

impl<F> ChatGate for F
where
    F: Fn(&PeerId) -> bool + Send + Sync,
{
    fn may_chat(&self, peer: &PeerId) -> bool {
        self(peer)
    }
}

/// Everything needed to persist and later restore one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    pub peer_id: PeerId,
    pub unread_count: usize,
    pub transcript: TranscriptSnapshot,
}

#[derive(Debug)]
struct Conversation {
    transcript: Transcript,
    unread_count: usize,
    /// Set once the entry has been taken out of the registry map.
    removed: bool,
}

impl Conversation {
    fn new(rule: DayRule) -> Self {
        Self {
            transcript: Transcript::new(rule),
            unread_count: 0,
            removed: false,
        }
    }

    fn updated(&self, peer: &PeerId) -> TranscriptEvent {
        TranscriptEvent::Updated {
            peer_id: peer.clone(),
            unread_count: self.unread_count,
            latest_message: self.transcript.latest().cloned(),
        }
    }
}

type Entry = Arc<Mutex<Conversation>>;

pub struct ConversationRegistry {
    day_rule: DayRule,
    conversations: RwLock<HashMap<PeerId, Entry>>,
    /// Conversation currently on screen; received messages there are not
    /// counted as unread.
    displayed: RwLock<Option<PeerId>>,
    events: EventBus,
}

impl Default for ConversationRegistry {
    fn default() -> Self {
        Self::new(&SyncConfig::default())
    }
}

impl ConversationRegistry {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            day_rule: config.day_rule,
            conversations: RwLock::new(HashMap::new()),
            displayed: RwLock::new(None),
            events: EventBus::new(config.event_buffer),
        }
    }

    pub fn day_rule(&self) -> DayRule {
        self.day_rule
    }

    pub fn subscribe(&self) -> EventStream {
        self.events.subscribe()
    }

    pub fn set_displayed(&self, peer: Option<PeerId>) {
        *self.displayed.write() = peer;
    }

    pub fn displayed(&self) -> Option<PeerId> {
        self.displayed.read().clone()
    }

    // -- Ingestion --

    /// Store one sent or received message.
    ///
    /// A newly stored `Received` message bumps the unread count unless its
    /// conversation is the displayed one.
    pub fn record_sent_or_received(&self, peer: &PeerId, message: MessageRecord) -> MergeOutcome {
        self.record_into(self.entry(peer), peer, message)
    }

    fn record_into(&self, entry: Entry, peer: &PeerId, message: MessageRecord) -> MergeOutcome {
        let counts_as_unread = message.direction == Direction::Received;
        self.locked(peer, entry, |conversation| {
            let outcome = conversation.transcript.merge_insert(vec![message], true);
            if counts_as_unread && outcome.inserted > 0 && !self.is_displayed(peer) {
                conversation.unread_count += 1;
            }

            debug!(
                peer = %peer.short(),
                inserted = outcome.inserted,
                unread = conversation.unread_count,
                "recorded message"
            );
            self.events.emit(conversation.updated(peer));
            outcome
        })
    }

    /// Bulk backfill after reconnect.
    ///
    /// `unread_delta` is trusted as given (derived by the caller from server
    /// counts) and not recomputed from the batch.
    pub fn catch_up(
        &self,
        peer: &PeerId,
        messages: Vec<MessageRecord>,
        sorted: bool,
        unread_delta: usize,
    ) -> MergeOutcome {
        let batch = messages.len();
        self.locked(peer, self.entry(peer), |conversation| {
            let outcome = conversation.transcript.merge_insert(messages, sorted);
            conversation.unread_count = conversation.unread_count.saturating_add(unread_delta);

            debug!(
                peer = %peer.short(),
                batch,
                sorted,
                inserted = outcome.inserted,
                duplicates = outcome.duplicates,
                unread = conversation.unread_count,
                "caught up conversation"
            );
            self.events.emit(conversation.updated(peer));
            outcome
        })
    }

    // -- Transport adapters --

    pub fn on_message_received(
        &self,
        peer: &PeerId,
        id: impl Into<String>,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> MergeOutcome {
        self.record_sent_or_received(peer, MessageRecord::received(id, text, timestamp))
    }

    pub fn on_message_sent(
        &self,
        peer: &PeerId,
        id: impl Into<String>,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> MergeOutcome {
        self.record_sent_or_received(peer, MessageRecord::sent(id, text, timestamp))
    }

    /// The server's unread count for the batch is applied as the delta.
    pub fn on_catch_up(
        &self,
        peer: &PeerId,
        messages: Vec<MessageRecord>,
        sorted: bool,
        server_unread_count: usize,
    ) -> MergeOutcome {
        self.catch_up(peer, messages, sorted, server_unread_count)
    }

    // -- Outbound lifecycle --

    /// Store a locally composed message as `Pending` and return it.
    pub fn send_pending(
        &self,
        peer: &PeerId,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> MessageRecord {
        let message = MessageRecord::pending(text, timestamp);
        self.record_sent_or_received(peer, message.clone());
        message
    }

    /// [`send_pending`](Self::send_pending), refused when `gate` says no.
    pub fn send_pending_gated(
        &self,
        gate: &dyn ChatGate,
        peer: &PeerId,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<MessageRecord> {
        if !gate.may_chat(peer) {
            return Err(SyncError::ChatNotAllowed(peer.to_string()));
        }
        Ok(self.send_pending(peer, text, timestamp))
    }

    /// Settle a `Pending` or `Broken` message as `Sent`. Already `Sent` is a
    /// no-op.
    pub fn confirm_sent(&self, peer: &PeerId, id: &str) -> Result<()> {
        self.transition(peer, id, Direction::Sent, |from| {
            from.is_unconfirmed() || from == Direction::Sent
        })
    }

    /// Flag a `Pending` message as failed.
    pub fn mark_broken(&self, peer: &PeerId, id: &str) -> Result<()> {
        self.transition(peer, id, Direction::Broken, |from| {
            from == Direction::Pending || from == Direction::Broken
        })
    }

    // -- Unread --

    /// Recompute the unread count as the number of messages after
    /// `last_read`. Emits only when the count changes.
    pub fn mark_read(&self, peer: &PeerId, last_read: DateTime<Utc>) -> usize {
        self.locked(peer, self.entry(peer), |conversation| {
            let unread = UnreadTracker::new(&conversation.transcript).unread_after(last_read);
            if unread != conversation.unread_count {
                conversation.unread_count = unread;
                self.events.emit(conversation.updated(peer));
            }
            unread
        })
    }

    pub fn unread_count(&self, peer: &PeerId) -> usize {
        self.existing(peer)
            .map(|entry| entry.lock().unread_count)
            .unwrap_or(0)
    }

    // -- Queries --

    pub fn latest_message(&self, peer: &PeerId) -> Option<MessageRecord> {
        let entry = self.existing(peer)?;
        let conversation = entry.lock();
        conversation.transcript.latest().cloned()
    }

    pub fn message_count(&self, peer: &PeerId) -> usize {
        self.existing(peer)
            .map(|entry| entry.lock().transcript.len())
            .unwrap_or(0)
    }

    /// Peers with a conversation entry, sorted.
    pub fn peers(&self) -> Vec<PeerId> {
        let mut peers: Vec<PeerId> = self.conversations.read().keys().cloned().collect();
        peers.sort();
        peers
    }

    // -- Lifecycle --

    /// Drop a peer's state (e.g. unmatch). Returns whether it existed.
    pub fn remove_conversation(&self, peer: &PeerId) -> bool {
        let Some(entry) = self.conversations.write().remove(peer) else {
            return false;
        };
        {
            let mut displayed = self.displayed.write();
            if displayed.as_ref() == Some(peer) {
                *displayed = None;
            }
        }

        let mut conversation = entry.lock();
        conversation.removed = true;
        info!(peer = %peer.short(), "removed conversation");
        self.events.emit(TranscriptEvent::Removed {
            peer_id: peer.clone(),
        });
        true
    }

    /// Drop every conversation (e.g. sign-out).
    pub fn clear_all(&self) {
        let drained: Vec<Entry> = self.conversations.write().drain().map(|(_, e)| e).collect();
        *self.displayed.write() = None;

        // Held until Cleared is out so no Updated for a dropped peer follows it.
        let mut guards: Vec<_> = drained.iter().map(|entry| entry.lock()).collect();
        for conversation in &mut guards {
            conversation.removed = true;
        }
        info!(conversations = drained.len(), "cleared all conversations");
        self.events.emit(TranscriptEvent::Cleared);
    }

    // -- Persistence hooks --

    pub fn snapshot(&self, peer: &PeerId) -> Option<ConversationSnapshot> {
        let entry = self.existing(peer)?;
        let conversation = entry.lock();
        if conversation.removed {
            return None;
        }
        Some(ConversationSnapshot {
            peer_id: peer.clone(),
            unread_count: conversation.unread_count,
            transcript: conversation.transcript.snapshot(),
        })
    }

    /// Replace a peer's state with a snapshot. A snapshot taken under a
    /// different day rule is re-bucketed to this registry's rule.
    pub fn restore(&self, snapshot: ConversationSnapshot) {
        let ConversationSnapshot {
            peer_id,
            unread_count,
            transcript,
        } = snapshot;

        let conversation = Conversation {
            transcript: Transcript::restore(transcript, self.day_rule),
            unread_count,
            removed: false,
        };
        info!(
            peer = %peer_id.short(),
            messages = conversation.transcript.len(),
            unread = unread_count,
            "restored conversation"
        );

        self.locked(&peer_id, self.entry(&peer_id), |current| {
            *current = conversation;
            self.events.emit(current.updated(&peer_id));
        });
    }

    // -- Internals --

    fn is_displayed(&self, peer: &PeerId) -> bool {
        self.displayed.read().as_ref() == Some(peer)
    }

    fn existing(&self, peer: &PeerId) -> Option<Entry> {
        self.conversations.read().get(peer).cloned()
    }

    /// Entry for `peer`, created empty on first reference.
    fn entry(&self, peer: &PeerId) -> Entry {
        if let Some(entry) = self.existing(peer) {
            return entry;
        }
        self.conversations
            .write()
            .entry(peer.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Conversation::new(self.day_rule))))
            .clone()
    }

    /// Run `apply` under the peer's lock, starting from `entry`. An entry
    /// removed before the lock was won is replaced by the live one.
    fn locked<R>(
        &self,
        peer: &PeerId,
        mut entry: Entry,
        apply: impl FnOnce(&mut Conversation) -> R,
    ) -> R {
        loop {
            {
                let mut conversation = entry.lock();
                if !conversation.removed {
                    return apply(&mut conversation);
                }
            }
            trace!(peer = %peer.short(), "entry removed before lock, retrying");
            entry = self.entry(peer);
        }
    }

    fn transition(
        &self,
        peer: &PeerId,
        id: &str,
        to: Direction,
        allowed: impl Fn(Direction) -> bool,
    ) -> Result<()> {
        let entry = self
            .existing(peer)
            .ok_or_else(|| SyncError::UnknownConversation(peer.to_string()))?;
        let mut conversation = entry.lock();
        if conversation.removed {
            return Err(SyncError::UnknownConversation(peer.to_string()));
        }

        let from = conversation
            .transcript
            .get(id)
            .map(|m| m.direction)
            .ok_or_else(|| SyncError::MessageNotFound {
                peer: peer.to_string(),
                id: id.to_string(),
            })?;
        if !allowed(from) {
            return Err(SyncError::InvalidTransition {
                id: id.to_string(),
                from,
                to,
            });
        }
        if from == to {
            return Ok(());
        }

        conversation.transcript.set_direction(id, to);
        debug!(peer = %peer.short(), id, ?from, ?to, "message direction changed");
        self.events.emit(conversation.updated(peer));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, day, h, m, 0).unwrap()
    }

    fn received(id: &str, day: u32, h: u32, m: u32) -> MessageRecord {
        MessageRecord::received(id, format!("text {id}"), at(day, h, m))
    }

    fn alice() -> PeerId {
        PeerId::from("alice")
    }

    fn ids(registry: &ConversationRegistry, peer: &PeerId) -> Vec<Vec<String>> {
        registry
            .snapshot(peer)
            .map(|s| {
                s.transcript
                    .buckets
                    .iter()
                    .map(|b| b.messages().iter().map(|m| m.id.clone()).collect())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn drain(stream: &mut EventStream) -> Vec<TranscriptEvent> {
        let mut events = Vec::new();
        while let Ok(event) = stream.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_unsorted_single_day() {
        let registry = ConversationRegistry::default();
        registry.record_sent_or_received(&alice(), received("a", 1, 10, 0));
        registry.record_sent_or_received(&alice(), received("b", 1, 10, 5));
        registry.record_sent_or_received(&alice(), received("c", 1, 9, 50));
        assert_eq!(ids(&registry, &alice()), vec![vec!["c", "a", "b"]]);
    }

    #[test]
    fn test_backfill_into_earlier_and_new_day() {
        let registry = ConversationRegistry::default();
        registry.record_sent_or_received(&alice(), received("m1", 1, 10, 0));
        registry.catch_up(
            &alice(),
            vec![received("m2", 1, 9, 0), received("m3", 2, 8, 0)],
            false,
            0,
        );
        assert_eq!(
            ids(&registry, &alice()),
            vec![vec!["m2".to_string(), "m1".into()], vec!["m3".into()]]
        );
    }

    #[test]
    fn test_mark_read_and_duplicate_catch_up() {
        let registry = ConversationRegistry::default();
        let batch: Vec<_> = (0..5).map(|i| received(&format!("m{i}"), 1, 9, i * 7)).collect();
        registry.catch_up(&alice(), batch.clone(), true, 5);
        assert_eq!(registry.unread_count(&alice()), 5);

        assert_eq!(registry.mark_read(&alice(), batch[2].timestamp), 2);
        assert_eq!(registry.unread_count(&alice()), 2);

        let outcome = registry.catch_up(&alice(), batch, true, 0);
        assert_eq!(outcome.inserted, 0);
        assert_eq!(registry.message_count(&alice()), 5);
    }

    #[test]
    fn test_echo_keeps_received_direction() {
        let registry = ConversationRegistry::default();
        registry.on_message_received(&alice(), "x", "hi", at(1, 12, 0));
        registry.on_message_sent(&alice(), "x", "hi", at(1, 12, 0));
        assert_eq!(registry.message_count(&alice()), 1);
        assert_eq!(
            registry.latest_message(&alice()).unwrap().direction,
            Direction::Received
        );
    }

    #[test]
    fn test_received_counts_unread_unless_displayed() {
        let registry = ConversationRegistry::default();
        let bob = PeerId::from("bob");
        registry.set_displayed(Some(bob.clone()));

        registry.on_message_received(&alice(), "a1", "", at(1, 8, 0));
        registry.on_message_received(&bob, "b1", "", at(1, 8, 0));
        registry.on_message_sent(&alice(), "a2", "", at(1, 8, 1));
        // redelivery does not count twice
        registry.on_message_received(&alice(), "a1", "", at(1, 8, 0));

        assert_eq!(registry.unread_count(&alice()), 1);
        assert_eq!(registry.unread_count(&bob), 0);
        assert_eq!(registry.displayed(), Some(bob));
    }

    #[test]
    fn test_catch_up_adds_delta_verbatim() {
        let registry = ConversationRegistry::default();
        registry.on_message_received(&alice(), "a", "", at(1, 8, 0));
        registry.on_catch_up(&alice(), vec![received("b", 1, 9, 0)], true, 7);
        assert_eq!(registry.unread_count(&alice()), 8);
    }

    #[test]
    fn test_mark_read_emits_only_on_change() {
        let registry = ConversationRegistry::default();
        registry.catch_up(&alice(), vec![received("a", 1, 8, 0)], true, 1);
        let mut events = registry.subscribe();

        assert_eq!(registry.mark_read(&alice(), at(1, 9, 0)), 0);
        assert_eq!(registry.mark_read(&alice(), at(1, 10, 0)), 0);

        let events = drain(&mut events);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            TranscriptEvent::Updated { unread_count: 0, latest_message: Some(m), .. } if m.id == "a"
        ));
    }

    #[test]
    fn test_remove_and_clear() {
        let registry = ConversationRegistry::default();
        let bob = PeerId::from("bob");
        registry.on_message_received(&alice(), "a", "", at(1, 8, 0));
        registry.on_message_received(&bob, "b", "", at(1, 8, 0));
        registry.set_displayed(Some(alice()));
        let mut events = registry.subscribe();

        assert!(registry.remove_conversation(&alice()));
        assert!(!registry.remove_conversation(&alice()));
        assert_eq!(registry.displayed(), None);
        assert_eq!(registry.peers(), vec![bob.clone()]);
        assert_eq!(registry.message_count(&alice()), 0);

        registry.clear_all();
        assert!(registry.peers().is_empty());
        assert_eq!(
            drain(&mut events),
            vec![
                TranscriptEvent::Removed { peer_id: alice() },
                TranscriptEvent::Cleared,
            ]
        );
    }

    #[test]
    fn test_pending_lifecycle() {
        let registry = ConversationRegistry::default();
        let pending = registry.send_pending(&alice(), "hello", at(1, 8, 0));
        assert_eq!(registry.unread_count(&alice()), 0);

        registry.mark_broken(&alice(), &pending.id).unwrap();
        assert_eq!(
            registry.latest_message(&alice()).unwrap().direction,
            Direction::Broken
        );

        registry.confirm_sent(&alice(), &pending.id).unwrap();
        registry.confirm_sent(&alice(), &pending.id).unwrap();
        assert_eq!(
            registry.latest_message(&alice()).unwrap().direction,
            Direction::Sent
        );

        assert_eq!(
            registry.mark_broken(&alice(), &pending.id),
            Err(SyncError::InvalidTransition {
                id: pending.id.clone(),
                from: Direction::Sent,
                to: Direction::Broken,
            })
        );
    }

    #[test]
    fn test_echo_confirms_pending() {
        let registry = ConversationRegistry::default();
        let pending = registry.send_pending(&alice(), "hello", at(1, 8, 0));
        let outcome = registry.on_message_sent(&alice(), pending.id.clone(), "hello", at(1, 8, 2));
        assert_eq!(outcome.confirmed, 1);
        assert_eq!(registry.message_count(&alice()), 1);
        assert_eq!(
            registry.latest_message(&alice()).unwrap().direction,
            Direction::Sent
        );
    }

    #[test]
    fn test_transition_errors() {
        let registry = ConversationRegistry::default();
        assert_eq!(
            registry.confirm_sent(&alice(), "nope"),
            Err(SyncError::UnknownConversation("alice".into()))
        );
        registry.on_message_received(&alice(), "r", "", at(1, 8, 0));
        assert!(matches!(
            registry.confirm_sent(&alice(), "nope"),
            Err(SyncError::MessageNotFound { .. })
        ));
        assert!(matches!(
            registry.confirm_sent(&alice(), "r"),
            Err(SyncError::InvalidTransition { from: Direction::Received, .. })
        ));
    }

    #[test]
    fn test_gated_send() {
        let registry = ConversationRegistry::default();
        let gate = |peer: &PeerId| peer.as_str() != "blocked";

        assert!(registry
            .send_pending_gated(&gate, &alice(), "hi", at(1, 8, 0))
            .is_ok());
        assert_eq!(
            registry.send_pending_gated(&gate, &PeerId::from("blocked"), "hi", at(1, 8, 0)),
            Err(SyncError::ChatNotAllowed("blocked".into()))
        );
        assert_eq!(registry.peers(), vec![alice()]);
    }

    #[test]
    fn test_snapshot_restore() {
        let source = ConversationRegistry::default();
        source.catch_up(
            &alice(),
            vec![received("a", 1, 23, 0), received("b", 2, 1, 0)],
            true,
            2,
        );
        let snapshot = source.snapshot(&alice()).unwrap();
        assert!(source.snapshot(&PeerId::from("nobody")).is_none());

        let same_rule = ConversationRegistry::default();
        same_rule.restore(snapshot.clone());
        assert_eq!(same_rule.snapshot(&alice()), Some(snapshot.clone()));
        assert_eq!(same_rule.unread_count(&alice()), 2);

        let config = SyncConfig {
            day_rule: DayRule::from_offset_minutes(120).unwrap(),
            ..SyncConfig::default()
        };
        let shifted = ConversationRegistry::new(&config);
        shifted.restore(snapshot);
        assert_eq!(ids(&shifted, &alice()), vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_concurrent_overlapping_catch_ups() {
        let registry = ConversationRegistry::default();
        let all: Vec<_> = (0..200)
            .map(|i| received(&format!("m{i}"), 1 + (i / 50) as u32, (i % 24) as u32, (i % 60) as u32))
            .collect();

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let registry = &registry;
                let mut batch: Vec<_> = all.iter().skip(worker * 10).take(120).cloned().collect();
                if worker % 2 == 0 {
                    batch.reverse();
                }
                scope.spawn(move || {
                    for chunk in batch.chunks(13) {
                        registry.catch_up(&alice(), chunk.to_vec(), false, 0);
                    }
                });
            }
        });

        let mut expected = Transcript::default();
        expected.merge_insert(all.iter().take(190).cloned().collect(), false);

        let snapshot = registry.snapshot(&alice()).unwrap();
        assert_eq!(registry.message_count(&alice()), 190);
        assert_eq!(snapshot.transcript, expected.snapshot());
    }

    #[test]
    fn test_record_after_concurrent_remove_lands_in_live_entry() {
        let registry = ConversationRegistry::default();
        registry.on_message_received(&alice(), "a", "", at(1, 8, 0));
        let stale = registry.entry(&alice());
        let mut events = registry.subscribe();

        assert!(registry.remove_conversation(&alice()));
        let outcome = registry.record_into(stale, &alice(), received("b", 1, 9, 0));

        assert_eq!(outcome.inserted, 1);
        assert_eq!(registry.peers(), vec![alice()]);
        assert_eq!(ids(&registry, &alice()), vec![vec!["b"]]);
        assert_eq!(registry.unread_count(&alice()), 1);
        assert_eq!(
            drain(&mut events),
            vec![
                TranscriptEvent::Removed { peer_id: alice() },
                TranscriptEvent::Updated {
                    peer_id: alice(),
                    unread_count: 1,
                    latest_message: Some(received("b", 1, 9, 0)),
                },
            ]
        );
    }

    #[test]
    fn test_removed_entries_are_marked() {
        let registry = ConversationRegistry::default();
        let bob = PeerId::from("bob");
        registry.on_message_sent(&alice(), "a", "", at(1, 8, 0));
        registry.on_message_received(&bob, "b", "", at(1, 8, 0));
        let alice_entry = registry.entry(&alice());
        let bob_entry = registry.entry(&bob);

        registry.remove_conversation(&alice());
        assert!(alice_entry.lock().removed);
        assert!(!bob_entry.lock().removed);

        registry.clear_all();
        assert!(bob_entry.lock().removed);
    }

    #[test]
    fn test_transition_on_removed_entry_is_unknown() {
        let registry = ConversationRegistry::default();
        let pending = registry.send_pending(&alice(), "hi", at(1, 8, 0));
        registry.remove_conversation(&alice());
        assert_eq!(
            registry.confirm_sent(&alice(), &pending.id),
            Err(SyncError::UnknownConversation(alice().to_string()))
        );
        assert!(registry.peers().is_empty());
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConversationRegistry>();
    }
}
