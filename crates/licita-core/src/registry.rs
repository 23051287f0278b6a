//! Handler registry.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use licita_protocols::{MessageHandler, RouteKey};

/// Maps routing keys to handlers.
///
/// Lookups clone the handler `Arc` and release the shard lock before the
/// handler runs, so handlers may register or unregister routes themselves.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: DashMap<RouteKey, Arc<dyn MessageHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. A later registration for the same key replaces
    /// the earlier one; returns `true` when that happened.
    pub fn register(&self, key: RouteKey, handler: Arc<dyn MessageHandler>) -> bool {
        let replaced = self.handlers.insert(key.clone(), handler).is_some();
        if replaced {
            warn!("Handler for {} replaced", key);
        } else {
            debug!("Registered handler for {}", key);
        }
        replaced
    }

    pub fn unregister(&self, key: &RouteKey) -> bool {
        self.handlers.remove(key).is_some()
    }

    pub fn get(&self, key: &RouteKey) -> Option<Arc<dyn MessageHandler>> {
        self.handlers.get(key).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, key: &RouteKey) -> bool {
        self.handlers.contains_key(key)
    }

    /// Registered keys, sorted by their `category:action` form.
    pub fn keys(&self) -> Vec<RouteKey> {
        let mut keys: Vec<RouteKey> = self.handlers.iter().map(|e| e.key().clone()).collect();
        keys.sort_by_key(|k| k.to_string());
        keys
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("routes", &self.len())
            .finish()
    }
}
