//! Request handlers registered on the background bus.

mod auction;
mod auth;
mod document;
mod settings;
mod system;
mod ui;

use serde_json::Value;

use licita_core::{EventOptions, MessageBus, SendOptions, WeakMessageBus};
use licita_platform::ExtensionHost;
use licita_protocols::{ErrorCode, Message, MessagingError, RouteKey};

use crate::settings::SettingsStore;

/// What background handlers share.
#[derive(Clone)]
pub(crate) struct Shared {
    pub host: ExtensionHost,
    pub settings: SettingsStore,
    bus: WeakMessageBus,
}

impl Shared {
    pub fn bus(&self) -> Result<MessageBus, MessagingError> {
        self.bus.upgrade().ok_or_else(|| {
            MessagingError::new(ErrorCode::ConnectionClosed, "Background bus is shut down")
        })
    }
}

pub(crate) fn register_all(bus: &MessageBus, host: &ExtensionHost) {
    let shared = Shared {
        host: host.clone(),
        settings: SettingsStore::new(host.clone()),
        bus: bus.downgrade(),
    };

    system::register(bus, &shared);
    auction::register(bus, &shared);
    document::register(bus, &shared);
    settings::register(bus, &shared);
    ui::register(bus, &shared);
    auth::register(bus);
}

/// Publish an event on the background emitter and broadcast it to every
/// tab.
pub(crate) fn announce(bus: &MessageBus, key: impl Into<RouteKey>, event: &str, payload: Value) {
    bus.emit_local(event, payload.clone());
    bus.send_event(key, event, Some(payload), EventOptions::new());
}

/// Options for relaying `request` to the content script of its tab, or to
/// every tab when it names none.
pub(crate) fn forward_options(request: &Message) -> SendOptions {
    match request.tab_id() {
        Some(tab_id) => SendOptions::new().to_tab(tab_id),
        None => SendOptions::new(),
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
