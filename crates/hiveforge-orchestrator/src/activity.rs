// hiveforge-orchestrator/src/activity.rs
// ============================================================================
// Module: Activity Bus
// Description: In-process pub/sub fan-out with bounded ring-buffer history
//              and per-subscriber drop-newest backpressure (§4.11).
// Dependencies: hiveforge_core::{Clock, Timestamp}, tokio::sync::mpsc
// ============================================================================

//! ## Overview
//! The activity bus is the colony's live narration channel: every agent
//! publishes [`ActivityEvent`]s as it works, and any number of subscribers
//! — a CLI progress view, a conference transcript, a test harness — can
//! listen without slowing the publisher down. "Subscribers receive
//! `ActivityEvent` records and either consume or drop on backpressure
//! (drop-newest)" (§4.11): a subscriber's queue is bounded, and a publish
//! that would block is simply skipped for that subscriber rather than
//! evicting what it already holds.
//!
//! Subscriptions also carry an `agent_id` and an optional `parent_agent_id`,
//! letting [`ActivityBus::agent_hierarchy`] roll the flat subscriber list up
//! into the tree a human would recognize as "Beekeeper → Queen Bee →
//! Worker Bee".

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use hiveforge_core::Payload;
use hiveforge_core::Timestamp;
use tokio::sync::mpsc;

/// Opaque handle returned by [`ActivityBus::subscribe`].
pub type SubscriptionId = u64;

/// One published activity record (§4.11).
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEvent {
    /// Monotonic publish order, assigned by the bus.
    pub sequence: u64,
    /// When the event was published.
    pub timestamp: Timestamp,
    /// The publishing agent's id (e.g. `"queen-c1"`, `"worker-t1"`).
    pub source: String,
    /// A short, human-readable activity kind (e.g. `"task_started"`).
    pub kind: String,
    /// Arbitrary structured detail about the activity.
    pub payload: Payload,
}

/// A live subscription's receiving half. Dropping it unregisters the
/// subscriber from future publishes lazily, the next time the bus prunes
/// closed channels.
pub struct Subscription {
    /// This subscription's handle.
    pub id: SubscriptionId,
    receiver: mpsc::Receiver<ActivityEvent>,
}

impl Subscription {
    /// Awaits the next event for this subscriber, or `None` once the bus
    /// itself is dropped.
    pub async fn recv(&mut self) -> Option<ActivityEvent> {
        self.receiver.recv().await
    }

    /// Drains every event currently queued for this subscriber without
    /// waiting for more.
    pub fn drain(&mut self) -> Vec<ActivityEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            drained.push(event);
        }
        drained
    }
}

/// A node in the rolled-up agent hierarchy (§4.11).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentHierarchyView {
    /// The agent id this node represents.
    pub agent_id: String,
    /// Subscribers whose `parent_agent_id` named this node.
    pub children: Vec<AgentHierarchyView>,
}

struct SubscriberEntry {
    id: SubscriptionId,
    agent_id: String,
    parent_agent_id: Option<String>,
    sender: mpsc::Sender<ActivityEvent>,
}

/// Bounded-history capacity and per-subscriber queue depth the bus uses
/// when neither is specified explicitly.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1024;
/// Default per-subscriber channel depth.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// In-process fan-out publisher (§4.11). Retains a bounded tail of recent
/// events and fans each publish out to every live subscriber under one
/// lock, matching "one mutex around the ring buffer" (§5).
pub struct ActivityBus {
    /// Recent published events, newest last, capped at `history_capacity`.
    history: Mutex<std::collections::VecDeque<ActivityEvent>>,
    /// Maximum number of events `history` retains.
    history_capacity: usize,
    /// Live subscribers, in subscription order.
    subscribers: Mutex<Vec<SubscriberEntry>>,
    /// Source of publish sequence numbers.
    next_sequence: AtomicU64,
    /// Source of subscription ids.
    next_subscription_id: AtomicU64,
}

impl ActivityBus {
    /// Builds a bus retaining up to `history_capacity` recent events.
    #[must_use]
    pub fn new(history_capacity: usize) -> Self {
        Self {
            history: Mutex::new(std::collections::VecDeque::with_capacity(history_capacity.min(4096))),
            history_capacity,
            subscribers: Mutex::new(Vec::new()),
            next_sequence: AtomicU64::new(0),
            next_subscription_id: AtomicU64::new(0),
        }
    }

    /// Registers a new subscriber with a `queue_capacity`-deep channel,
    /// identified by `agent_id` and rolled up under `parent_agent_id` in
    /// [`Self::agent_hierarchy`].
    #[must_use]
    pub fn subscribe(&self, agent_id: impl Into<String>, parent_agent_id: Option<String>, queue_capacity: usize) -> Subscription {
        let id = self.next_subscription_id.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        #[expect(clippy::unwrap_used, reason = "poisoned only if an earlier caller panicked while holding the lock")]
        self.subscribers.lock().unwrap().push(SubscriberEntry { id, agent_id: agent_id.into(), parent_agent_id, sender });
        Subscription { id, receiver }
    }

    /// Unregisters a subscriber so future publishes no longer consider it.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        #[expect(clippy::unwrap_used, reason = "poisoned only if an earlier caller panicked while holding the lock")]
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|entry| entry.id != id);
    }

    /// Publishes one activity record: appends it to history (trimming the
    /// oldest entry past capacity) and fans it out to every subscriber,
    /// dropping the new event — never a queued one — for any subscriber
    /// whose channel is full (§4.11 "drop-newest").
    pub fn publish(&self, source: impl Into<String>, kind: impl Into<String>, payload: Payload, now: Timestamp) -> ActivityEvent {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        let event = ActivityEvent { sequence, timestamp: now, source: source.into(), kind: kind.into(), payload };

        {
            #[expect(clippy::unwrap_used, reason = "poisoned only if an earlier caller panicked while holding the lock")]
            let mut history = self.history.lock().unwrap();
            if history.len() >= self.history_capacity {
                history.pop_front();
            }
            history.push_back(event.clone());
        }

        #[expect(clippy::unwrap_used, reason = "poisoned only if an earlier caller panicked while holding the lock")]
        let subscribers = self.subscribers.lock().unwrap();
        for entry in subscribers.iter() {
            let _ = entry.sender.try_send(event.clone());
        }

        event
    }

    /// Returns the most recent `limit` published events (oldest first), or
    /// the full retained history if `limit` exceeds it.
    #[must_use]
    pub fn recent_events(&self, limit: usize) -> Vec<ActivityEvent> {
        #[expect(clippy::unwrap_used, reason = "poisoned only if an earlier caller panicked while holding the lock")]
        let history = self.history.lock().unwrap();
        let skip = history.len().saturating_sub(limit);
        history.iter().skip(skip).cloned().collect()
    }

    /// Rolls the flat subscriber list up into a forest of [`AgentHierarchyView`]
    /// nodes, rooted at subscribers with no `parent_agent_id` (or whose
    /// parent never itself subscribed).
    #[must_use]
    pub fn agent_hierarchy(&self) -> Vec<AgentHierarchyView> {
        #[expect(clippy::unwrap_used, reason = "poisoned only if an earlier caller panicked while holding the lock")]
        let subscribers = self.subscribers.lock().unwrap();

        let known: std::collections::HashSet<&str> = subscribers.iter().map(|entry| entry.agent_id.as_str()).collect();
        let mut children_of: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut roots: Vec<&str> = Vec::new();

        for entry in subscribers.iter() {
            match entry.parent_agent_id.as_deref() {
                Some(parent) if known.contains(parent) => children_of.entry(parent).or_default().push(entry.agent_id.as_str()),
                _ => roots.push(entry.agent_id.as_str()),
            }
        }
        roots.sort_unstable();
        roots.dedup();

        roots.into_iter().map(|root| build_node(root, &children_of)).collect()
    }
}

fn build_node(agent_id: &str, children_of: &HashMap<&str, Vec<&str>>) -> AgentHierarchyView {
    let mut child_ids = children_of.get(agent_id).cloned().unwrap_or_default();
    child_ids.sort_unstable();
    child_ids.dedup();
    AgentHierarchyView {
        agent_id: agent_id.to_string(),
        children: child_ids.into_iter().map(|child| build_node(child, children_of)).collect(),
    }
}

impl Default for ActivityBus {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> Timestamp {
        Timestamp::new(time::OffsetDateTime::UNIX_EPOCH)
    }

    #[tokio::test]
    async fn a_subscriber_receives_published_events() {
        let bus = ActivityBus::new(16);
        let mut sub = bus.subscribe("worker-1", None, 4);
        bus.publish("worker-1", "task_started", Payload::new(), now());
        let event = sub.recv().await.expect("event delivered");
        assert_eq!(event.kind, "task_started");
    }

    #[test]
    fn history_is_capped_and_keeps_the_newest_events() {
        let bus = ActivityBus::new(2);
        bus.publish("a", "one", Payload::new(), now());
        bus.publish("a", "two", Payload::new(), now());
        bus.publish("a", "three", Payload::new(), now());
        let recent = bus.recent_events(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].kind, "two");
        assert_eq!(recent[1].kind, "three");
    }

    #[test]
    fn a_full_subscriber_queue_drops_the_newest_event_without_panicking() {
        let bus = ActivityBus::new(16);
        let mut sub = bus.subscribe("worker-1", None, 1);
        bus.publish("worker-1", "one", Payload::new(), now());
        bus.publish("worker-1", "two", Payload::new(), now());
        let drained = sub.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].kind, "one");
    }

    #[test]
    fn agent_hierarchy_rolls_up_by_parent_agent_id() {
        let bus = ActivityBus::new(16);
        let _beekeeper = bus.subscribe("beekeeper", None, 4);
        let _queen = bus.subscribe("queen-c1", Some("beekeeper".to_string()), 4);
        let _worker = bus.subscribe("worker-t1", Some("queen-c1".to_string()), 4);

        let roots = bus.agent_hierarchy();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].agent_id, "beekeeper");
        assert_eq!(roots[0].children.len(), 1);
        assert_eq!(roots[0].children[0].agent_id, "queen-c1");
        assert_eq!(roots[0].children[0].children[0].agent_id, "worker-t1");
    }

    #[test]
    fn unsubscribed_agents_no_longer_appear_in_the_hierarchy() {
        let bus = ActivityBus::new(16);
        let sub = bus.subscribe("worker-1", None, 4);
        bus.unsubscribe(sub.id);
        assert!(bus.agent_hierarchy().is_empty());
    }
}
