//! Listener plumbing shared by runtime and tab messaging.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use tokio::sync::oneshot;

use licita_protocols::TabId;

use crate::host::FrameId;

/// Identifies a registered message listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Who sent a message, as seen by the receiving listener.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSender {
    pub frame_id: FrameId,
    /// Set when the sender is a content script.
    pub tab_id: Option<TabId>,
    pub url: Option<String>,
}

/// Reply slot handed to a listener with each message.
///
/// A listener must either answer now, [`defer`](ReplyHandle::defer) the
/// answer, or [`decline`](ReplyHandle::decline). Dropping the handle is the
/// same as declining.
#[must_use = "a listener must send, defer or decline"]
pub struct ReplyHandle {
    tx: oneshot::Sender<Option<Value>>,
}

impl ReplyHandle {
    pub(crate) fn new() -> (Self, oneshot::Receiver<Option<Value>>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    pub fn send(self, reply: Value) {
        let _ = self.tx.send(Some(reply));
    }

    /// Keep the channel open and answer later.
    pub fn defer(self) -> DeferredReply {
        DeferredReply { tx: Some(self.tx) }
    }

    pub fn decline(self) {
        let _ = self.tx.send(None);
    }
}

/// A reply the listener promised to send later.
///
/// Dropping it without sending closes the channel with no reply.
pub struct DeferredReply {
    tx: Option<oneshot::Sender<Option<Value>>>,
}

impl DeferredReply {
    pub fn send(mut self, reply: Value) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Some(reply));
        }
    }

    pub fn close(mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(None);
        }
    }
}

impl Drop for DeferredReply {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(None);
        }
    }
}

pub(crate) type ListenerFn = dyn Fn(Value, MessageSender, ReplyHandle) + Send + Sync;

#[derive(Clone)]
pub(crate) struct Listener {
    pub id: ListenerId,
    pub frame_id: FrameId,
    pub callback: Arc<ListenerFn>,
}

/// Hand `message` to every listener and resolve with the first reply.
///
/// Listeners are called before any await, in registration order. Each gets
/// its own copy of the message.
pub(crate) async fn dispatch_first_reply(
    listeners: Vec<Listener>,
    message: Value,
    sender: MessageSender,
) -> Option<Value> {
    let mut replies = FuturesUnordered::new();
    for listener in listeners {
        let (handle, rx) = ReplyHandle::new();
        (listener.callback)(message.clone(), sender.clone(), handle);
        replies.push(rx);
    }

    while let Some(reply) = replies.next().await {
        if let Ok(Some(value)) = reply {
            return Some(value);
        }
    }
    None
}
