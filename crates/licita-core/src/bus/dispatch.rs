//! Inbound message dispatch.

use std::panic::AssertUnwindSafe;
use std::sync::Weak;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, error};

use licita_protocols::{InboundSink, Message, MessageBody, MessageKind, MessagingError};

use super::{BusInner, MessageBus};

impl MessageBus {
    /// Process one inbound message. Returns the reply for requests.
    ///
    /// A request id this bus has already answered is ignored, so a handler
    /// never runs twice for the same request.
    pub async fn receive(&self, message: Message) -> Option<Message> {
        self.log_traffic("Received", &message);

        match message.kind() {
            MessageKind::Request => {
                if !self.inner.handled.lock().first_time(&message.id) {
                    debug!("Ignoring duplicate request {}", message.id);
                    return None;
                }
                let reply = self.dispatch_request(message).await;
                self.log_traffic("Replying", &reply);
                Some(reply)
            }
            MessageKind::Response | MessageKind::Error => {
                if !self.settle(&message) {
                    debug!(
                        "Dropped {} for unknown or expired request {}",
                        message.kind().as_str(),
                        message.request_id().unwrap_or_default()
                    );
                }
                None
            }
            MessageKind::Event => {
                if let MessageBody::Event(body) = &message.body {
                    let payload = body.payload.clone().unwrap_or(Value::Null);
                    self.inner.events.publish(&body.event_name, &payload);
                }
                None
            }
        }
    }

    /// Complete the pending request a response or error refers to.
    pub(super) fn settle(&self, message: &Message) -> bool {
        match &message.body {
            MessageBody::Response(body) => self
                .inner
                .pending
                .complete(&body.request_id, Ok(body.payload.clone())),
            MessageBody::Error(body) => self
                .inner
                .pending
                .complete(&body.request_id, Err(body.error.clone())),
            _ => false,
        }
    }

    async fn dispatch_request(&self, request: Message) -> Message {
        let source = self.inner.source;
        let route = request.route();

        let Some(handler) = self.inner.handlers.get(&route) else {
            debug!("No handler for {}", route);
            return Message::error_for(&request, source, MessagingError::handler_not_found(&route));
        };

        match AssertUnwindSafe(handler.handle(request.clone()))
            .catch_unwind()
            .await
        {
            Ok(Ok(payload)) => Message::response_to(&request, source, payload),
            Ok(Err(err)) => {
                let err = MessagingError::from_unknown(err);
                debug!("Handler for {} failed: {}", route, err);
                Message::error_for(&request, source, err)
            }
            Err(panic) => {
                let err = MessagingError::from_panic(panic);
                error!("Handler for {} panicked: {}", route, err.message);
                Message::error_for(&request, source, err)
            }
        }
    }
}

/// Transport-facing side of a bus.
///
/// Holds the bus weakly so a transport listener never keeps it alive.
pub(super) struct BusSink {
    bus: Weak<BusInner>,
}

impl BusSink {
    pub(super) fn new(bus: Weak<BusInner>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl InboundSink for BusSink {
    async fn receive(&self, message: Message) -> Option<Message> {
        let inner = self.bus.upgrade()?;
        MessageBus { inner }.receive(message).await
    }
}
