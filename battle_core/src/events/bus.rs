//! Subscription registry and pending event queue

use super::{BattleEvent, EventEnvelope, EventKind, EventSource};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

/// What a subscriber does with the events it receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriberRole {
    /// State upkeep that must always run (experience, counters, defeat)
    Bookkeeping,
    /// Text output, gated by a narration flag read when the event fires
    Narration,
}

/// One registered interest in `(source, kind)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub source: EventSource,
    pub kind: EventKind,
    pub role: SubscriberRole,
}

/// Publish/subscribe registry keyed by (entity, event kind)
///
/// Publishing only records the event; delivery happens when the owner of the
/// bus drains [`next_pending`](EventBus::next_pending) and looks up
/// [`subscribers_for`](EventBus::subscribers_for). The subscriber list is
/// returned as a snapshot, so handlers may subscribe or unsubscribe while an
/// event is being delivered.
///
/// The bus outlives single battles, so the publish history is bounded: only
/// the most recent [`DEFAULT_HISTORY_LIMIT`] events are kept unless the limit
/// is changed with [`set_history_limit`](EventBus::set_history_limit).
#[derive(Debug)]
pub struct EventBus {
    next_sequence: u64,
    next_subscription: u64,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    pending: VecDeque<EventEnvelope>,
    history: Vec<EventEnvelope>,
    history_limit: usize,
}

/// Number of published events kept for inspection by default
pub const DEFAULT_HISTORY_LIMIT: usize = 4096;

impl Default for EventBus {
    fn default() -> Self {
        EventBus {
            next_sequence: 0,
            next_subscription: 0,
            subscriptions: BTreeMap::new(),
            pending: VecDeque::new(),
            history: Vec::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` events of history, dropping the oldest ones now
    /// if there are more. A limit of 0 turns history off.
    pub fn set_history_limit(&mut self, limit: usize) {
        self.history_limit = limit;
        self.trim_history();
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    fn trim_history(&mut self) {
        if self.history.len() > self.history_limit {
            let excess = self.history.len() - self.history_limit;
            self.history.drain(..excess);
        }
    }

    /// Publish an event from `source`
    pub fn publish(&mut self, source: EventSource, event: BattleEvent) {
        let envelope = EventEnvelope {
            sequence: self.next_sequence,
            source,
            event,
        };
        self.next_sequence += 1;
        tracing::trace!(sequence = envelope.sequence, source = ?source, event = ?envelope.event, "published");
        if self.history_limit > 0 {
            self.history.push(envelope.clone());
            self.trim_history();
        }
        self.pending.push_back(envelope);
    }

    /// Register interest in `kind` events published by `source`
    pub fn subscribe(
        &mut self,
        source: EventSource,
        kind: EventKind,
        role: SubscriberRole,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.insert(
            id,
            Subscription {
                id,
                source,
                kind,
                role,
            },
        );
        id
    }

    /// Remove one subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    /// Remove every subscription on `source`, returning how many were removed
    pub fn unsubscribe_source(&mut self, source: &EventSource) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|_, s| s.source != *source);
        before - self.subscriptions.len()
    }

    /// Snapshot of the subscriptions matching an envelope, in registration order
    pub fn subscribers_for(&self, envelope: &EventEnvelope) -> Vec<Subscription> {
        self.subscriptions
            .values()
            .filter(|s| s.source == envelope.source && s.kind == envelope.kind())
            .copied()
            .collect()
    }

    pub fn subscriptions_on(&self, source: &EventSource) -> usize {
        self.subscriptions
            .values()
            .filter(|s| s.source == *source)
            .count()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Pop the oldest undelivered event
    pub fn next_pending(&mut self) -> Option<EventEnvelope> {
        self.pending.pop_front()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drop undelivered events without routing them
    pub fn discard_pending(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    /// The most recent published events, in publish order
    pub fn history(&self) -> &[EventEnvelope] {
        &self.history
    }

    /// Drain the publish history
    pub fn take_history(&mut self) -> Vec<EventEnvelope> {
        std::mem::take(&mut self.history)
    }

    /// Events in the history published by `source` with kind `kind`
    pub fn history_of(&self, source: EventSource, kind: EventKind) -> Vec<&BattleEvent> {
        self.history
            .iter()
            .filter(|e| e.source == source && e.kind() == kind)
            .map(|e| &e.event)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CombatantId, GroupId};

    fn fighter(id: usize) -> EventSource {
        EventSource::combatant(CombatantId(id))
    }

    #[test]
    fn test_history_keeps_only_the_latest_events() {
        let mut bus = EventBus::new();
        assert_eq!(bus.history_limit(), DEFAULT_HISTORY_LIMIT);
        bus.set_history_limit(3);
        for round in 1..=5 {
            bus.publish(fighter(0), BattleEvent::RoundEnded { round });
        }

        let sequences: Vec<u64> = bus.history().iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![2, 3, 4]);
        // Delivery is unaffected by trimming
        let mut delivered = 0;
        while bus.next_pending().is_some() {
            delivered += 1;
        }
        assert_eq!(delivered, 5);

        bus.set_history_limit(1);
        assert_eq!(bus.history().len(), 1);
        assert_eq!(bus.history()[0].sequence, 4);

        bus.set_history_limit(0);
        bus.publish(fighter(0), BattleEvent::Killed);
        assert!(bus.history().is_empty());
    }

    #[test]
    fn test_publish_records_history_and_pending() {
        let mut bus = EventBus::new();
        bus.publish(fighter(0), BattleEvent::Killed);
        bus.publish(fighter(1), BattleEvent::TurnEnded);

        assert_eq!(bus.history().len(), 2);
        let first = bus.next_pending().unwrap();
        assert_eq!(first.sequence, 0);
        assert_eq!(first.event, BattleEvent::Killed);
        assert!(bus.has_pending());
        bus.next_pending();
        assert!(!bus.has_pending());
    }

    #[test]
    fn test_subscribers_match_source_and_kind() {
        let mut bus = EventBus::new();
        let kill = bus.subscribe(fighter(0), EventKind::Killed, SubscriberRole::Bookkeeping);
        bus.subscribe(fighter(0), EventKind::Healed, SubscriberRole::Narration);
        bus.subscribe(fighter(1), EventKind::Killed, SubscriberRole::Narration);

        bus.publish(fighter(0), BattleEvent::Killed);
        let envelope = bus.next_pending().unwrap();
        let subs = bus.subscribers_for(&envelope);

        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].id, kill);
        assert_eq!(subs[0].role, SubscriberRole::Bookkeeping);
    }

    #[test]
    fn test_unsubscribe_source_removes_all() {
        let mut bus = EventBus::new();
        bus.subscribe(fighter(0), EventKind::Killed, SubscriberRole::Bookkeeping);
        bus.subscribe(fighter(0), EventKind::Healed, SubscriberRole::Narration);
        let group = EventSource::group(GroupId(0));
        bus.subscribe(group, EventKind::TeamDefeated, SubscriberRole::Bookkeeping);

        assert_eq!(bus.unsubscribe_source(&fighter(0)), 2);
        assert_eq!(bus.subscription_count(), 1);
        assert_eq!(bus.subscriptions_on(&group), 1);
    }

    #[test]
    fn test_unsubscribe_twice() {
        let mut bus = EventBus::new();
        let id = bus.subscribe(fighter(3), EventKind::Killed, SubscriberRole::Bookkeeping);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn test_history_of_filters() {
        let mut bus = EventBus::new();
        bus.publish(fighter(0), BattleEvent::Healed { amount: 3 });
        bus.publish(fighter(1), BattleEvent::Healed { amount: 4 });
        bus.publish(fighter(0), BattleEvent::Killed);

        let heals = bus.history_of(fighter(0), EventKind::Healed);
        assert_eq!(heals, vec![&BattleEvent::Healed { amount: 3 }]);
    }
}
