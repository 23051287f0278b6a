//! Local event emitter.
//!
//! Subscribers run synchronously on the publishing task, in registration
//! order. Each publish works on a snapshot of the subscriber list, so
//! subscribing during a publish only affects later publishes, while
//! unsubscribing takes effect immediately for subscribers not yet reached.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{error, trace};

type Callback = Arc<dyn Fn(&Value) + Send + Sync>;

struct Subscriber {
    id: u64,
    once: bool,
    active: AtomicBool,
    callback: Callback,
}

#[derive(Default)]
struct EmitterInner {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<String, Vec<Arc<Subscriber>>>>,
}

impl EmitterInner {
    fn detach(&self, event: &str, id: u64) {
        let mut subscribers = self.subscribers.lock();
        if let Some(list) = subscribers.get_mut(event) {
            list.retain(|s| s.id != id);
            if list.is_empty() {
                subscribers.remove(event);
            }
        }
    }
}

/// Publish/subscribe keyed by event name.
#[derive(Clone, Default)]
pub struct EventEmitter {
    inner: Arc<EmitterInner>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, event: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.add(event.into(), Arc::new(callback), false)
    }

    /// Subscribe for a single delivery.
    pub fn subscribe_once<F>(&self, event: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.add(event.into(), Arc::new(callback), true)
    }

    fn add(&self, event: String, callback: Callback, once: bool) -> Subscription {
        let subscriber = Arc::new(Subscriber {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
            once,
            active: AtomicBool::new(true),
            callback,
        });
        self.inner
            .subscribers
            .lock()
            .entry(event.clone())
            .or_default()
            .push(subscriber.clone());

        Subscription {
            event,
            subscriber: Arc::downgrade(&subscriber),
            emitter: Arc::downgrade(&self.inner),
        }
    }

    /// Invoke every current subscriber of `event`. Returns how many ran.
    ///
    /// A panicking subscriber is logged and skipped; it never reaches the
    /// publisher or prevents the remaining subscribers from running.
    pub fn publish(&self, event: &str, payload: &Value) -> usize {
        let snapshot = match self.inner.subscribers.lock().get(event) {
            Some(list) => list.clone(),
            None => return 0,
        };

        let mut invoked = 0;
        for subscriber in snapshot {
            if subscriber.once {
                if !subscriber.active.swap(false, Ordering::AcqRel) {
                    continue;
                }
                self.inner.detach(event, subscriber.id);
            } else if !subscriber.active.load(Ordering::Acquire) {
                continue;
            }

            invoked += 1;
            let callback = subscriber.callback.clone();
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| callback(payload))) {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!("Event subscriber for '{}' panicked: {}", event, reason);
            }
        }

        trace!("Published '{}' to {} subscriber(s)", event, invoked);
        invoked
    }

    /// Remove the subscribers of one event, or of every event.
    pub fn remove_all(&self, event: Option<&str>) {
        let removed: Vec<Arc<Subscriber>> = {
            let mut subscribers = self.inner.subscribers.lock();
            match event {
                Some(event) => subscribers.remove(event).unwrap_or_default(),
                None => subscribers.drain().flat_map(|(_, list)| list).collect(),
            }
        };
        for subscriber in removed {
            subscriber.active.store(false, Ordering::Release);
        }
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        self.inner
            .subscribers
            .lock()
            .get(event)
            .map(|list| list.len())
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let events: Vec<String> = self.inner.subscribers.lock().keys().cloned().collect();
        f.debug_struct("EventEmitter").field("events", &events).finish()
    }
}

/// Handle returned by [`EventEmitter::subscribe`].
///
/// Dropping the handle keeps the callback registered.
#[derive(Debug, Clone)]
pub struct Subscription {
    event: String,
    subscriber: Weak<Subscriber>,
    emitter: Weak<EmitterInner>,
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber").field("id", &self.id).finish()
    }
}

impl std::fmt::Debug for EmitterInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EmitterInner")
    }
}

impl Subscription {
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Stop receiving events. Calling it again has no effect.
    pub fn unsubscribe(&self) {
        let Some(subscriber) = self.subscriber.upgrade() else {
            return;
        };
        if !subscriber.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(emitter) = self.emitter.upgrade() {
            emitter.detach(&self.event, subscriber.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.subscriber
            .upgrade()
            .map(|s| s.active.load(Ordering::Acquire))
            .unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
