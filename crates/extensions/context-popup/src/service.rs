//! Typed client for the popup UI.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use licita_core::{BusConfig, MessageBus, SendOptions, Subscription};
use licita_platform::{ExtensionHost, Frame};
use licita_protocols::route::{
    Ack, AnalyzeAuction, AuctionDetailsRequest, AuctionList, AuctionSnapshot, AuthStatus,
    BadgeRequest, CheckAuthStatus, DocumentRequest, ExtensionStatus, FetchAuctionDetails,
    FetchAuctionList, FetchDocument, GetSettings, GetStatus, HighlightDocument, HighlightRequest,
    Ping, PingResponse, SetDebug, SetDebugRequest, SetDebugResponse, SetSettings, Settings,
    SettingsPatch, UpdateBadge, DEFAULT_HIGHLIGHT_COLOR,
};
use licita_protocols::{AuctionEvent, MessagingError, Source, SystemEvent, TabId};
use licita_transport_chrome::PopupTransport;

pub struct MessagingService {
    host: ExtensionHost,
    frame: Frame,
    bus: MessageBus,
}

impl MessagingService {
    /// Open a popup frame and start its bus.
    pub fn open(host: ExtensionHost, config: BusConfig) -> Result<Self, MessagingError> {
        let frame = host.open_popup();
        let transport = Arc::new(PopupTransport::new(host.clone(), frame.clone()));
        let bus = MessageBus::with_config(Source::Popup, transport, config);
        bus.init()?;

        Ok(Self { host, frame, bus })
    }

    /// Check the background is reachable. The outcome is logged and
    /// returned; a failure does not close the popup.
    pub async fn initialize(&self) -> Result<PingResponse, MessagingError> {
        let outcome = self.ping_background().await;
        match &outcome {
            Ok(pong) => info!("[Popup] Connected to background ({})", pong.timestamp),
            Err(e) => error!("[Popup] Failed to connect to background: {}", e),
        }
        outcome
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub async fn ping_background(&self) -> Result<PingResponse, MessagingError> {
        self.bus.request(Ping, (), SendOptions::new()).await
    }

    pub async fn extension_status(&self) -> Result<ExtensionStatus, MessagingError> {
        self.bus.request(GetStatus, (), SendOptions::new()).await
    }

    pub async fn set_debug(&self, enabled: bool) -> Result<SetDebugResponse, MessagingError> {
        self.bus
            .request(SetDebug, SetDebugRequest { enabled }, SendOptions::new())
            .await
    }

    pub async fn settings(&self) -> Result<Settings, MessagingError> {
        self.bus.request(GetSettings, (), SendOptions::new()).await
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<Ack, MessagingError> {
        self.bus.request(SetSettings, patch, SendOptions::new()).await
    }

    pub async fn fetch_auctions(&self) -> Result<AuctionList, MessagingError> {
        self.bus.request(FetchAuctionList, (), SendOptions::new()).await
    }

    pub async fn fetch_auction_details(
        &self,
        auction_id: impl Into<String>,
    ) -> Result<Value, MessagingError> {
        let request = AuctionDetailsRequest {
            auction_id: auction_id.into(),
        };
        self.bus
            .request(FetchAuctionDetails, request, SendOptions::new())
            .await
    }

    /// Analyze the auction page in `tab_id`, or in whichever tab answers
    /// first when no tab is given.
    pub async fn analyze_auction(
        &self,
        tab_id: Option<TabId>,
    ) -> Result<AuctionSnapshot, MessagingError> {
        self.bus
            .request(AnalyzeAuction, (), tab_options(tab_id))
            .await
    }

    pub async fn fetch_document(
        &self,
        document_id: impl Into<String>,
    ) -> Result<Value, MessagingError> {
        let request = DocumentRequest {
            document_id: Some(document_id.into()),
        };
        self.bus
            .request(FetchDocument, request, SendOptions::new())
            .await
    }

    /// Highlight `selector` on the page in `tab_id`. The colour defaults
    /// to yellow.
    pub async fn highlight_elements(
        &self,
        tab_id: TabId,
        selector: impl Into<String>,
        color: Option<&str>,
    ) -> Result<Ack, MessagingError> {
        let request = HighlightRequest {
            selector: selector.into(),
            color: color.unwrap_or(DEFAULT_HIGHLIGHT_COLOR).to_string(),
        };
        self.bus
            .request(HighlightDocument, request, SendOptions::new().to_tab(tab_id))
            .await
    }

    pub async fn check_auth_status(&self) -> Result<AuthStatus, MessagingError> {
        self.bus.request(CheckAuthStatus, (), SendOptions::new()).await
    }

    pub async fn update_badge(
        &self,
        text: impl Into<String>,
        background_color: Option<&str>,
    ) -> Result<Ack, MessagingError> {
        let request = BadgeRequest {
            text: text.into(),
            background_color: background_color.map(str::to_string),
        };
        self.bus.request(UpdateBadge, request, SendOptions::new()).await
    }

    pub fn on_event<F>(&self, event_name: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.bus.on_event(event_name, callback)
    }

    pub fn on_auction_event<F>(&self, event: AuctionEvent, callback: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.bus.on_event(event.as_str(), callback)
    }

    pub fn on_system_event<F>(&self, event: SystemEvent, callback: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.bus.on_event(event.as_str(), callback)
    }
}

fn tab_options(tab_id: Option<TabId>) -> SendOptions {
    match tab_id {
        Some(tab_id) => SendOptions::new().to_tab(tab_id),
        None => SendOptions::new(),
    }
}

impl Drop for MessagingService {
    fn drop(&mut self) {
        self.host.detach(self.frame.id);
    }
}

impl std::fmt::Debug for MessagingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagingService")
            .field("frame", &self.frame.id)
            .finish()
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
