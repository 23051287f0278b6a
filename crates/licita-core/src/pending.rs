//! Outstanding request bookkeeping.

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;

use licita_protocols::{MessageId, MessagingError, RouteKey};

pub type RequestOutcome = Result<Value, MessagingError>;

struct PendingRequest {
    route: RouteKey,
    sent_at: Instant,
    tx: oneshot::Sender<RequestOutcome>,
}

/// Requests sent by this context that have not reached a terminal outcome.
///
/// Each entry is removed exactly once: by its response, its error, or its
/// timeout, whichever comes first.
#[derive(Default)]
pub struct PendingRequests {
    entries: Mutex<HashMap<MessageId, PendingRequest>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: MessageId, route: RouteKey) -> oneshot::Receiver<RequestOutcome> {
        let (tx, rx) = oneshot::channel();
        self.entries.lock().insert(
            id,
            PendingRequest {
                route,
                sent_at: Instant::now(),
                tx,
            },
        );
        rx
    }

    /// Deliver the outcome for `id`. Returns `false` for unknown or already
    /// settled ids.
    pub fn complete(&self, id: &str, outcome: RequestOutcome) -> bool {
        let Some(entry) = self.entries.lock().remove(id) else {
            return false;
        };
        tracing::trace!(
            "Request {} ({}) settled after {:?}",
            id,
            entry.route,
            entry.sent_at.elapsed()
        );
        entry.tx.send(outcome).is_ok()
    }

    pub fn remove(&self, id: &str) -> bool {
        self.entries.lock().remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use licita_protocols::{ErrorCode, SystemAction};
    use serde_json::json;

    #[tokio::test]
    async fn test_complete_resolves_receiver() {
        let pending = PendingRequests::new();
        let rx = pending.insert("r1".to_string(), SystemAction::Ping.into());
        assert!(pending.contains("r1"));

        assert!(pending.complete("r1", Ok(json!({"ok": true}))));
        assert_eq!(rx.await.unwrap().unwrap(), json!({"ok": true}));
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_error_outcome() {
        let pending = PendingRequests::new();
        let rx = pending.insert("r1".to_string(), SystemAction::Ping.into());
        pending.complete("r1", Err(MessagingError::action_failed("nope")));
        let err = rx.await.unwrap().unwrap_err();
        assert_eq!(err.code, ErrorCode::ActionFailed);
    }

    #[test]
    fn test_second_completion_is_ignored() {
        let pending = PendingRequests::new();
        let _rx = pending.insert("r1".to_string(), SystemAction::Ping.into());
        assert!(pending.complete("r1", Ok(json!(1))));
        assert!(!pending.complete("r1", Ok(json!(2))));
    }

    #[test]
    fn test_unknown_id() {
        let pending = PendingRequests::new();
        assert!(!pending.complete("missing", Ok(json!(null))));
        assert!(!pending.remove("missing"));
    }

    #[test]
    fn test_remove_after_timeout() {
        let pending = PendingRequests::new();
        let _rx = pending.insert("r1".to_string(), SystemAction::Ping.into());
        assert!(pending.remove("r1"));
        assert!(!pending.complete("r1", Ok(json!(1))));
        assert_eq!(pending.len(), 0);
    }
}
