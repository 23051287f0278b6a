//! Background service worker transport.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use tracing::debug;

use licita_platform::{ExtensionHost, Frame};
use licita_protocols::{
    DeliveryReport, Destination, InboundSink, Message, TabId, Transport, TransportError,
};

use crate::listener::{transport_error, ListenerSlot};

/// Sends to content scripts, one tab or all of them. Never targets popups;
/// they only ever talk to the background by request.
pub struct BackgroundTransport {
    slot: ListenerSlot,
}

impl BackgroundTransport {
    pub fn new(host: ExtensionHost, frame: Frame) -> Self {
        Self {
            slot: ListenerSlot::new(host, frame),
        }
    }

    async fn send_to_tab(
        &self,
        tab_id: TabId,
        wire: Value,
    ) -> Result<DeliveryReport, TransportError> {
        self.slot
            .host()
            .tabs_send(self.slot.frame(), tab_id, wire)
            .await
            .map(DeliveryReport::single)
            .map_err(transport_error)
    }

    /// Deliver to every open tab. A tab that cannot be reached is recorded
    /// in the report and does not affect the others.
    ///
    /// Returns as soon as one tab replies; tabs still answering count as
    /// reached and finish on their own task, so a slow tab never holds back
    /// a reply that is already there.
    async fn broadcast(&self, wire: Value) -> DeliveryReport {
        let mut sends: FuturesUnordered<_> = self
            .slot
            .host()
            .tabs_query()
            .into_iter()
            .map(|tab| {
                let host = self.slot.host().clone();
                let frame = self.slot.frame().clone();
                let wire = wire.clone();
                async move { (tab.id, host.tabs_send(&frame, tab.id, wire).await) }
            })
            .collect();

        let mut report = DeliveryReport::default();
        while let Some((tab_id, outcome)) = sends.next().await {
            match outcome {
                Ok(reply) => {
                    report.delivered += 1;
                    if let Some(reply) = reply {
                        report.replies.push(reply);
                        break;
                    }
                }
                Err(e) => {
                    debug!("Broadcast to tab {} failed: {}", tab_id, e);
                    report.failed.push((tab_id, transport_error(e).to_string()));
                }
            }
        }

        if !sends.is_empty() {
            report.delivered += sends.len();
            tokio::spawn(async move {
                while let Some((tab_id, outcome)) = sends.next().await {
                    if let Err(e) = outcome {
                        debug!("Broadcast to tab {} failed: {}", tab_id, e);
                    }
                }
            });
        }
        report
    }
}

#[async_trait]
impl Transport for BackgroundTransport {
    async fn deliver(
        &self,
        message: &Message,
        destination: Destination,
    ) -> Result<DeliveryReport, TransportError> {
        let wire = message.to_wire();
        match destination {
            Destination::Tab(tab_id) => self.send_to_tab(tab_id, wire).await,
            Destination::Default => Ok(self.broadcast(wire).await),
            Destination::Page => Err(TransportError::Unsupported(
                "the background has no page channel".to_string(),
            )),
        }
    }

    fn listen(&self, sink: Arc<dyn InboundSink>) -> Result<(), TransportError> {
        self.slot.listen(sink)
    }
}

#[cfg(test)]
#[path = "background_tests.rs"]
mod tests;
