//! Content script lifecycle.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use licita_core::{BusConfig, MessageBus, SendOptions, Subscription};
use licita_platform::{ExtensionHost, Frame};
use licita_protocols::route::{Ping, PingResponse};
use licita_protocols::{MessagingError, Source, TabId, DEFAULT_TIMEOUT_MS};
use licita_transport_chrome::{ContentTransport, PageTags};

use crate::handlers;
use crate::page::PageDocument;

/// A content script injected into one tab.
pub struct ContentContext {
    host: ExtensionHost,
    frame: Frame,
    bus: MessageBus,
    page: Arc<PageDocument>,
    _subscriptions: Vec<Subscription>,
    handshake: JoinHandle<()>,
}

impl ContentContext {
    /// Inject into `tab_id`, register handlers and start listening. A ping
    /// to the background is sent in the background; its outcome is only
    /// logged.
    pub fn start(
        host: ExtensionHost,
        tab_id: TabId,
        page: PageDocument,
        tags: PageTags,
        config: BusConfig,
    ) -> Result<Self, MessagingError> {
        let frame = host
            .inject_content_script(tab_id)
            .map_err(|_| MessagingError::tab_not_found(tab_id))?;
        let transport = Arc::new(ContentTransport::new(host.clone(), frame.clone(), tags)?);
        let bus = MessageBus::with_config(Source::Content, transport, config);
        let page = Arc::new(page);

        handlers::register(&bus, &page);
        let subscriptions = handlers::listen(&bus);
        bus.init()?;
        info!("[Content] Messaging system initialized in tab {}", tab_id);

        let pinger = bus.clone();
        let handshake = tokio::spawn(async move {
            match ping(&pinger).await {
                Ok(pong) => info!("[Content] Connected to background ({})", pong.timestamp),
                Err(e) => error!("[Content] Failed to connect to background: {}", e),
            }
        });

        Ok(Self {
            host,
            frame,
            bus,
            page,
            _subscriptions: subscriptions,
            handshake,
        })
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub fn page(&self) -> &PageDocument {
        &self.page
    }

    pub fn tab_id(&self) -> Option<TabId> {
        self.frame.tab_id()
    }

    pub async fn ping_background(&self) -> Result<PingResponse, MessagingError> {
        ping(&self.bus).await
    }
}

async fn ping(bus: &MessageBus) -> Result<PingResponse, MessagingError> {
    bus.request(Ping, (), SendOptions::new().timeout_ms(DEFAULT_TIMEOUT_MS))
        .await
}

impl Drop for ContentContext {
    fn drop(&mut self) {
        self.handshake.abort();
        self.host.detach(self.frame.id);
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
