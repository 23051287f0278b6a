//! Transport trait.
//!
//! A transport moves messages between one context and the others. The bus
//! never talks to the platform directly; it hands outbound messages to its
//! transport and receives inbound ones through an [`InboundSink`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::types::{Message, TabId};

/// Where an outbound message should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    /// The context's natural peer: background for content and popup, every
    /// open tab for background.
    #[default]
    Default,
    /// One tab's content script.
    Tab(TabId),
    /// The page script sharing the content script's window.
    Page,
}

impl Destination {
    pub fn from_tab(tab_id: Option<TabId>) -> Self {
        tab_id.map(Destination::Tab).unwrap_or_default()
    }
}

/// Outcome of a delivery.
///
/// Broadcasts reach several receivers; each failure is recorded without
/// affecting the others.
#[derive(Debug, Clone, Default)]
pub struct DeliveryReport {
    /// Raw replies returned by receivers that answered synchronously.
    pub replies: Vec<Value>,
    /// Receivers that could not be reached.
    pub failed: Vec<(TabId, String)>,
    /// Number of receivers the message reached.
    pub delivered: usize,
}

impl DeliveryReport {
    pub fn single(reply: Option<Value>) -> Self {
        Self {
            replies: reply.into_iter().collect(),
            failed: Vec::new(),
            delivered: 1,
        }
    }

    pub fn merge(&mut self, other: DeliveryReport) {
        self.replies.extend(other.replies);
        self.failed.extend(other.failed);
        self.delivered += other.delivered;
    }
}

/// Receiver side of a transport, implemented by the bus.
#[async_trait]
pub trait InboundSink: Send + Sync {
    /// Process an inbound message. Requests yield the reply to send back.
    async fn receive(&self, message: Message) -> Option<Message>;
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver a message and collect any replies.
    async fn deliver(
        &self,
        message: &Message,
        destination: Destination,
    ) -> Result<DeliveryReport, TransportError>;

    /// Start feeding inbound messages to `sink`. Called once per transport.
    fn listen(&self, sink: Arc<dyn InboundSink>) -> Result<(), TransportError>;
}
