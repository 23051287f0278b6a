//! Popup transport.

use std::sync::Arc;

use async_trait::async_trait;

use licita_platform::{ExtensionHost, Frame};
use licita_protocols::{
    DeliveryReport, Destination, InboundSink, Message, Transport, TransportError,
};

use crate::listener::{transport_error, ListenerSlot};

/// Always sends to the background. A target tab travels inside the message
/// as `tabId` and the background forwards it.
///
/// The popup shares the runtime channel with the background, so it only
/// listens for events and never answers requests.
pub struct PopupTransport {
    slot: ListenerSlot,
}

impl PopupTransport {
    pub fn new(host: ExtensionHost, frame: Frame) -> Self {
        Self {
            slot: ListenerSlot::events_only(host, frame),
        }
    }
}

#[async_trait]
impl Transport for PopupTransport {
    async fn deliver(
        &self,
        message: &Message,
        destination: Destination,
    ) -> Result<DeliveryReport, TransportError> {
        if destination == Destination::Page {
            return Err(TransportError::Unsupported(
                "the popup has no page channel".to_string(),
            ));
        }
        self.slot
            .host()
            .runtime_send(self.slot.frame(), message.to_wire())
            .await
            .map(DeliveryReport::single)
            .map_err(transport_error)
    }

    fn listen(&self, sink: Arc<dyn InboundSink>) -> Result<(), TransportError> {
        self.slot.listen(sink)
    }
}
