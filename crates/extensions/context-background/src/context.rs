//! Background context lifecycle.

use std::sync::Arc;

use serde_json::json;
use tokio::task::JoinHandle;
use tracing::info;

use licita_core::{BusConfig, MessageBus};
use licita_platform::{ExtensionHost, Frame, InstallReason};
use licita_protocols::{now_millis, MessagingError, Source, SystemEvent};
use licita_transport_chrome::BackgroundTransport;

use crate::{handlers, lifecycle, storage};

/// The running background service worker.
///
/// Dropping it detaches the background from the host, after which popups
/// and content scripts get `CONNECTION_ERROR` for every request.
pub struct BackgroundContext {
    host: ExtensionHost,
    frame: Frame,
    bus: MessageBus,
    relay: Option<JoinHandle<()>>,
}

impl BackgroundContext {
    /// Attach to `host`, register every handler, then start listening.
    pub fn start(host: ExtensionHost, config: BusConfig) -> Result<Self, MessagingError> {
        let frame = host.attach_background();
        let transport = Arc::new(BackgroundTransport::new(host.clone(), frame.clone()));
        let bus = MessageBus::with_config(Source::Background, transport, config);

        handlers::register_all(&bus, &host);
        bus.init()?;
        let relay = storage::spawn_change_relay(&host, &bus);

        info!("Background messaging initialized");
        bus.emit_local(
            SystemEvent::ExtensionEnabled.as_str(),
            json!({ "timestamp": now_millis() }),
        );

        Ok(Self {
            host,
            frame,
            bus,
            relay,
        })
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub fn host(&self) -> &ExtensionHost {
        &self.host
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn handle_installed(&self, reason: &InstallReason) -> Result<(), MessagingError> {
        lifecycle::handle_installed(&self.bus, &self.host, reason)
    }

    pub fn cleanup_storage(&self) -> Result<(), MessagingError> {
        lifecycle::cleanup_storage(&self.host)
    }
}

impl Drop for BackgroundContext {
    fn drop(&mut self) {
        if let Some(relay) = self.relay.take() {
            relay.abort();
        }
        self.host.detach(self.frame.id);
    }
}

impl std::fmt::Debug for BackgroundContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundContext")
            .field("frame", &self.frame.id)
            .field("bus", &self.bus)
            .finish()
    }
}
