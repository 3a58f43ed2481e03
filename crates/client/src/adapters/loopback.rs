// In-process presence hub.
//
// Topics live in a shared map; every subscribe/track/leave rebroadcasts the
// full topic state to all subscribers, matching the real transport's
// "sync is authoritative" contract. A channel that is dropped without
// `leave` keeps its presence registered — deliberately, so leaked
// subscriptions (and the resulting stale-peer ghosting) are observable in
// tests instead of silently papered over.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use arbor_common::error::PresenceError;
use arbor_common::presence::{PresencePayload, TopicState};
use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{PresenceChannel, PresenceHub};

#[derive(Default)]
struct Topic {
    presences: BTreeMap<String, Vec<PresencePayload>>,
    subscribers: HashMap<u64, mpsc::UnboundedSender<TopicState>>,
}

#[derive(Default)]
struct HubShared {
    topics: Mutex<HashMap<String, Topic>>,
    next_subscriber_id: AtomicU64,
    fail_next_subscribes: AtomicU32,
}

/// In-process `PresenceHub` connecting every channel joined through it.
#[derive(Clone, Default)]
pub struct LoopbackHub {
    shared: Arc<HubShared>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` subscribe calls fail, to exercise the
    /// collaboration-unavailable path.
    pub fn fail_next_subscribes(&self, n: u32) {
        self.shared.fail_next_subscribes.store(n, Ordering::SeqCst);
    }

    /// Number of peers with presence registered on a topic.
    pub fn peer_count(&self, topic: &str) -> usize {
        self.shared
            .topics
            .lock()
            .map(|topics| topics.get(topic).map(|t| t.presences.len()).unwrap_or(0))
            .unwrap_or(0)
    }

    /// Number of live subscriptions on a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.shared
            .topics
            .lock()
            .map(|topics| topics.get(topic).map(|t| t.subscribers.len()).unwrap_or(0))
            .unwrap_or(0)
    }
}

#[async_trait]
impl PresenceHub for LoopbackHub {
    async fn join(&self, topic: &str) -> Result<Box<dyn PresenceChannel>, PresenceError> {
        Ok(Box::new(LoopbackChannel {
            shared: Arc::clone(&self.shared),
            topic: topic.to_string(),
            peer_key: Uuid::new_v4().to_string(),
            subscriber_id: self.shared.next_subscriber_id.fetch_add(1, Ordering::SeqCst),
            rx: None,
        }))
    }
}

struct LoopbackChannel {
    shared: Arc<HubShared>,
    topic: String,
    peer_key: String,
    subscriber_id: u64,
    rx: Option<mpsc::UnboundedReceiver<TopicState>>,
}

impl LoopbackChannel {
    fn broadcast_locked(topic: &Topic) {
        for sender in topic.subscribers.values() {
            let _ = sender.send(topic.presences.clone());
        }
    }

    fn with_topic<R>(
        &self,
        f: impl FnOnce(&mut Topic) -> R,
    ) -> Result<R, PresenceError> {
        let mut topics = self
            .shared
            .topics
            .lock()
            .map_err(|_| PresenceError::SubscriptionFailed {
                topic: self.topic.clone(),
                reason: "hub lock poisoned".into(),
            })?;
        let topic = topics.entry(self.topic.clone()).or_default();
        Ok(f(topic))
    }
}

#[async_trait]
impl PresenceChannel for LoopbackChannel {
    async fn subscribe(&mut self) -> Result<(), PresenceError> {
        let failures = &self.shared.fail_next_subscribes;
        if failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(PresenceError::SubscriptionFailed {
                topic: self.topic.clone(),
                reason: "injected subscribe failure".into(),
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.rx = Some(rx);
        self.with_topic(|topic| {
            topic.subscribers.insert(self.subscriber_id, tx);
            Self::broadcast_locked(topic);
        })
    }

    async fn track(&mut self, payload: PresencePayload) -> Result<(), PresenceError> {
        if self.rx.is_none() {
            return Err(PresenceError::TrackFailed("track before subscribe".into()));
        }
        self.with_topic(|topic| {
            topic.presences.insert(self.peer_key.clone(), vec![payload]);
            Self::broadcast_locked(topic);
        })
        .map_err(|_| PresenceError::TrackFailed("hub lock poisoned".into()))
    }

    async fn next_sync(&mut self) -> Option<TopicState> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    async fn leave(&mut self) -> Result<(), PresenceError> {
        self.rx = None;
        self.with_topic(|topic| {
            topic.subscribers.remove(&self.subscriber_id);
            topic.presences.remove(&self.peer_key);
            Self::broadcast_locked(topic);
        })
    }
}
