//! In-process notification bus.
//!
//! One bus per application, owned by the kernel and cloned into views.
//! Delivery is synchronous, at most once, in registration order within a
//! topic, with no persistence or replay.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::topics::Topic;

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub topic: Topic,
    pub payload: Option<Value>,
}

type Handler = Arc<dyn Fn(&Notification) -> anyhow::Result<()> + Send + Sync>;

struct Entry {
    id: u64,
    topic: Topic,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Entry>,
}

impl Registry {
    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    fn take(&mut self, id: u64) -> Option<Entry> {
        let ix = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(ix))
    }
}

#[derive(Clone, Default)]
pub struct NotificationBus {
    registry: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("subscribers", &lock(&self.registry).entries.len())
            .finish()
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `topic`. Dropping the returned guard
    /// unsubscribes it.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&Notification) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.entries.push(Entry {
            id,
            topic,
            handler: Arc::new(handler),
        });
        debug!(%topic, id, "subscribed");
        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
            topic,
        }
    }

    /// Delivers to every current subscriber of `topic` and returns how many
    /// handlers ran. A failing or panicking handler is logged and skipped.
    pub fn publish(&self, topic: Topic, payload: Option<Value>) -> usize {
        let snapshot: Vec<(u64, Handler)> = lock(&self.registry)
            .entries
            .iter()
            .filter(|e| e.topic == topic)
            .map(|e| (e.id, e.handler.clone()))
            .collect();

        if snapshot.is_empty() {
            debug!(%topic, "published with no subscribers");
            return 0;
        }

        let note = Notification { topic, payload };
        let mut delivered = 0;
        for (id, handler) in snapshot {
            // An earlier handler may have unsubscribed this one.
            if !lock(&self.registry).contains(id) {
                continue;
            }
            delivered += 1;
            match catch_unwind(AssertUnwindSafe(|| handler(&note))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(%topic, id, "subscriber failed: {e:#}"),
                Err(_) => warn!(%topic, id, "subscriber panicked"),
            }
        }
        delivered
    }

    /// Publishes by legacy event name. Unknown names are dropped.
    pub fn publish_wire(&self, name: &str, payload: Option<Value>) -> usize {
        match Topic::from_wire(name) {
            Some(topic) => self.publish(topic, payload),
            None => {
                warn!(name, "dropping notification for unknown topic");
                0
            }
        }
    }

    /// Publishes from a background task once `delay` has elapsed.
    pub fn publish_after(
        &self,
        delay: Duration,
        topic: Topic,
        payload: Option<Value>,
    ) -> tokio::task::JoinHandle<usize> {
        let bus = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            bus.publish(topic, payload)
        })
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        lock(&self.registry)
            .entries
            .iter()
            .filter(|e| e.topic == topic)
            .count()
    }
}

/// Live registration on a [`NotificationBus`]; unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    id: u64,
    topic: Topic,
}

impl Subscription {
    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            // The handler may own other subscriptions; drop it unlocked.
            let removed = lock(&registry).take(self.id);
            drop(removed);
            debug!(topic = %self.topic, id = self.id, "unsubscribed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_the_guard_unsubscribes() {
        let bus = NotificationBus::new();
        let sub = bus.subscribe(Topic::RefreshAll, |_| Ok(()));
        assert_eq!(bus.subscriber_count(Topic::RefreshAll), 1);
        drop(sub);
        assert_eq!(bus.subscriber_count(Topic::RefreshAll), 0);
    }

    #[test]
    fn guard_outliving_the_bus_is_harmless() {
        let bus = NotificationBus::new();
        let sub = bus.subscribe(Topic::RefreshAll, |_| Ok(()));
        drop(bus);
        sub.unsubscribe();
    }
}
