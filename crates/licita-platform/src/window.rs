//! Per-tab window channel.
//!
//! The page script and the content script of a tab share one window. A
//! message posted on it reaches every listener in that window, including
//! the poster.

use serde_json::Value;
use tokio::sync::broadcast;

pub type WindowId = u64;

const WINDOW_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct WindowMessage {
    /// Window the message was posted from. Frames embedded in the page post
    /// with their own id.
    pub source: WindowId,
    pub data: Value,
}

#[derive(Debug, Clone)]
pub struct WindowChannel {
    id: WindowId,
    tx: broadcast::Sender<WindowMessage>,
}

impl WindowChannel {
    pub(crate) fn new(id: WindowId) -> Self {
        let (tx, _) = broadcast::channel(WINDOW_CAPACITY);
        Self { id, tx }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Post from this window. Returns how many listeners saw it.
    pub fn post_message(&self, data: Value) -> usize {
        self.post_from(self.id, data)
    }

    /// Post as if from another window, such as an embedded frame.
    pub fn post_from(&self, source: WindowId, data: Value) -> usize {
        self.tx.send(WindowMessage { source, data }).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WindowMessage> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_post_reaches_all_listeners() {
        let channel = WindowChannel::new(7);
        let mut a = channel.subscribe();
        let mut b = channel.subscribe();

        assert_eq!(channel.post_message(json!({"n": 1})), 2);

        let got = a.recv().await.unwrap();
        assert_eq!(got.source, 7);
        assert_eq!(got.data["n"], 1);
        assert_eq!(b.recv().await.unwrap(), got);
    }

    #[test]
    fn test_post_without_listeners() {
        let channel = WindowChannel::new(1);
        assert_eq!(channel.post_from(99, json!(null)), 0);
    }
}
