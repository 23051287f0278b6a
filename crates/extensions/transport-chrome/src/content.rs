//! Content script transport.
//!
//! Talks to the background over runtime messaging and to the page script
//! over the tab's window channel. Window traffic is tagged in both
//! directions: inbound posts must carry the inbound tag and come from the
//! content script's own window, outbound posts carry the page tag.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{trace, warn};

use licita_platform::{ExtensionHost, Frame, WindowChannel, WindowId};
use licita_protocols::{
    DeliveryReport, Destination, InboundSink, Message, Transport, TransportError,
};

use crate::listener::{transport_error, ListenerSlot};

/// Tags marking window messages for this extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTags {
    /// Tag an inbound post must carry.
    pub inbound: String,
    /// Tag put on posts to the page.
    pub outbound: String,
}

impl PageTags {
    /// Inbound `tag`, outbound `{tag}-page`.
    pub fn new(tag: impl Into<String>) -> Self {
        let inbound = tag.into();
        let outbound = format!("{}-page", inbound);
        Self { inbound, outbound }
    }
}

impl Default for PageTags {
    fn default() -> Self {
        Self::new("naval-auction-assistant")
    }
}

pub struct ContentTransport {
    slot: ListenerSlot,
    window: WindowChannel,
    tags: PageTags,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl ContentTransport {
    /// `frame` must be a content script frame.
    pub fn new(host: ExtensionHost, frame: Frame, tags: PageTags) -> Result<Self, TransportError> {
        let tab_id = frame.tab_id().ok_or_else(|| {
            TransportError::Unsupported(format!("frame {} is not a content script", frame.id))
        })?;
        let window = host.window(tab_id).map_err(transport_error)?;
        Ok(Self {
            slot: ListenerSlot::new(host, frame),
            window,
            tags,
            pump: Mutex::new(None),
        })
    }

    pub fn tags(&self) -> &PageTags {
        &self.tags
    }

    fn post_to_page(&self, message: &Message) -> DeliveryReport {
        post_tagged(&self.window, &self.tags.outbound, message);
        DeliveryReport::single(None)
    }
}

fn post_tagged(window: &WindowChannel, tag: &str, message: &Message) {
    window.post_message(json!({
        "target": tag,
        "message": message.to_wire(),
    }));
}

/// Accept a window post only if it comes from `own_window`, carries `tag`
/// and wraps a valid message.
fn page_message(source: WindowId, own_window: WindowId, data: &Value, tag: &str) -> Option<Message> {
    if source != own_window {
        return None;
    }
    if data.get("target").and_then(Value::as_str) != Some(tag) {
        return None;
    }
    Message::from_wire(data.get("message")?.clone()).ok()
}

#[async_trait]
impl Transport for ContentTransport {
    async fn deliver(
        &self,
        message: &Message,
        destination: Destination,
    ) -> Result<DeliveryReport, TransportError> {
        match destination {
            Destination::Page => Ok(self.post_to_page(message)),
            Destination::Default | Destination::Tab(_) => self
                .slot
                .host()
                .runtime_send(self.slot.frame(), message.to_wire())
                .await
                .map(DeliveryReport::single)
                .map_err(transport_error),
        }
    }

    fn listen(&self, sink: Arc<dyn InboundSink>) -> Result<(), TransportError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TransportError::Platform(e.to_string()))?;
        self.slot.listen(sink.clone())?;

        let window = self.window.clone();
        let tags = self.tags.clone();
        let mut posts = BroadcastStream::new(window.subscribe());

        let pump = runtime.spawn(async move {
            while let Some(post) = posts.next().await {
                let post = match post {
                    Ok(post) => post,
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!("Window listener lagged, {} posts skipped", skipped);
                        continue;
                    }
                };
                let Some(message) = page_message(post.source, window.id(), &post.data, &tags.inbound)
                else {
                    trace!("Ignoring window post from {}", post.source);
                    continue;
                };

                let sink = sink.clone();
                let window = window.clone();
                let outbound = tags.outbound.clone();
                tokio::spawn(async move {
                    if let Some(reply) = sink.receive(message).await {
                        post_tagged(&window, &outbound, &reply);
                    }
                });
            }
        });
        *self.pump.lock() = Some(pump);
        Ok(())
    }
}

impl Drop for ContentTransport {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.lock().take() {
            pump.abort();
        }
    }
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod tests;
