//! Subscriber registry and fan-out.

use crate::error::Result;
use crate::types::{Item, StreamEvent};
use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::types::{BrokerConfig, Payload, SubscriptionHandle, SubscriptionId};

/// Internal subscription state.
struct Subscription {
    sender: Sender<Payload>,
}

impl Subscription {
    /// Try to queue a payload. Returns false if the queue is full or the
    /// receiver is gone; either way the subscriber will be dropped.
    fn try_send(&self, payload: Payload) -> bool {
        match self.sender.try_send(payload) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Fan-out hub for item snapshots.
///
/// Owns no item state; it only relays what it is given. The registry has
/// its own lock, independent of the item store.
pub struct Broker {
    /// Active subscriptions by ID.
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
    config: BrokerConfig,
}

impl Broker {
    /// Create a new broker.
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            config,
        }
    }

    /// Register a new subscriber with a bounded queue.
    pub fn subscribe(&self) -> SubscriptionHandle {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(self.config.buffer_size);

        self.subscriptions.write().insert(id, Subscription { sender });
        tracing::debug!(subscription = %id, "subscriber registered");

        SubscriptionHandle { id, receiver }
    }

    /// Deregister a subscriber. Unknown IDs are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        if self.subscriptions.write().remove(&id).is_some() {
            tracing::debug!(subscription = %id, "subscriber removed");
        }
    }

    /// Get subscription count.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Whether `id` is still registered.
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.subscriptions.read().contains_key(&id)
    }

    /// Serialize the full collection as an `update` event and publish it.
    pub fn publish_items(&self, items: &[Item]) -> Result<()> {
        let event = StreamEvent::Update {
            items: items.to_vec(),
        };
        let payload: Payload = serde_json::to_string(&event)?.into();
        self.publish(payload);
        Ok(())
    }

    /// Queue `payload` for every subscriber without blocking.
    ///
    /// Subscribers that cannot take it are evicted.
    pub fn publish(&self, payload: Payload) {
        let mut to_remove = Vec::new();

        {
            let subs = self.subscriptions.read();
            for (id, sub) in subs.iter() {
                if !sub.try_send(Arc::clone(&payload)) {
                    to_remove.push(*id);
                }
            }
        }

        if !to_remove.is_empty() {
            let mut subs = self.subscriptions.write();
            for id in to_remove {
                if subs.remove(&id).is_some() {
                    tracing::debug!(subscription = %id, "evicted slow subscriber");
                }
            }
        }
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(BrokerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_subscribe_unsubscribe() {
        let broker = Broker::default();

        let handle = broker.subscribe();
        assert_eq!(broker.subscription_count(), 1);

        broker.unsubscribe(handle.id);
        assert_eq!(broker.subscription_count(), 0);

        // Idempotent
        broker.unsubscribe(handle.id);
        assert_eq!(broker.subscription_count(), 0);
    }

    #[test]
    fn test_publish_reaches_everyone_in_order() {
        let broker = Broker::default();
        let a = broker.subscribe();
        let b = broker.subscribe();

        broker.publish("one".into());
        broker.publish("two".into());

        for handle in [&a, &b] {
            assert_eq!(&*handle.recv_timeout(Duration::from_millis(100)).unwrap(), "one");
            assert_eq!(&*handle.recv_timeout(Duration::from_millis(100)).unwrap(), "two");
        }
    }

    #[test]
    fn test_no_replay_for_late_subscriber() {
        let broker = Broker::default();
        broker.publish("early".into());

        let late = broker.subscribe();
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn test_drop_slow_subscriber() {
        let broker = Broker::new(BrokerConfig { buffer_size: 2 });
        let slow = broker.subscribe();
        let fast = broker.subscribe();

        for i in 0..5 {
            broker.publish(format!("event-{i}").into());
            // fast drains as it goes
            assert!(fast.recv_timeout(Duration::from_millis(100)).is_ok());
        }

        assert!(!broker.is_subscribed(slow.id));
        assert!(broker.is_subscribed(fast.id));

        // Evicted receiver drains its backlog, then disconnects.
        assert_eq!(&*slow.recv().unwrap(), "event-0");
        assert_eq!(&*slow.recv().unwrap(), "event-1");
        assert!(slow.recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_is_evicted() {
        let broker = Broker::default();
        let handle = broker.subscribe();
        drop(handle);

        broker.publish("x".into());
        assert_eq!(broker.subscription_count(), 0);
    }

    #[test]
    fn test_publish_items_payload() {
        let broker = Broker::default();
        let handle = broker.subscribe();

        broker.publish_items(&[Item::new("Copper Ingot", 9)]).unwrap();

        let payload = handle.recv_timeout(Duration::from_millis(100)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["type"], "update");
        assert_eq!(value["items"][0]["target"], 9);
    }
}
