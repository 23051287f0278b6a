//! Request handlers and event listeners of the content bus.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use licita_core::{MessageBus, Subscription};
use licita_protocols::route::{Ack, AnalyzeAuction, HighlightDocument, Ping, PingResponse};
use licita_protocols::{now_millis, Source, SystemEvent};

use crate::page::PageDocument;

pub(crate) fn register(bus: &MessageBus, page: &Arc<PageDocument>) {
    let url = page.url().to_string();
    bus.register_route(Ping, move |(), _request| {
        let url = url.clone();
        async move {
            Ok(PingResponse {
                timestamp: now_millis(),
                source: Source::Content,
                url: Some(url),
            })
        }
    });

    let analyzed = page.clone();
    bus.register_route(AnalyzeAuction, move |(), _request| {
        let snapshot = analyzed.snapshot();
        async move { Ok(snapshot) }
    });

    let highlighted = page.clone();
    bus.register_route(HighlightDocument, move |request, _message| {
        let success = highlighted.highlight(&request.selector, &request.color);
        async move { Ok(Ack { success }) }
    });
}

/// Follow system events announced by the background.
pub(crate) fn listen(bus: &MessageBus) -> Vec<Subscription> {
    let disabled = bus.on_event(SystemEvent::ExtensionDisabled.as_str(), |_| {
        info!("[Content] Extension was disabled");
    });

    let weak = bus.downgrade();
    let debug = bus.on_event(SystemEvent::DebugModeChanged.as_str(), move |payload| {
        let enabled = payload
            .get("enabled")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if let Some(bus) = weak.upgrade() {
            bus.set_debug(enabled);
        }
        info!(
            "[Content] Debug mode {}",
            if enabled { "enabled" } else { "disabled" }
        );
    });

    vec![disabled, debug]
}
