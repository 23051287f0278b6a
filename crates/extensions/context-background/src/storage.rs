//! Storage access helpers and the change relay.

use futures::stream::{select_all, StreamExt};
use serde_json::json;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use licita_core::{MessageBus, WeakMessageBus};
use licita_platform::{AreaName, ExtensionHost, PlatformError, StorageArea};
use licita_protocols::{MessagingError, StorageEvent};

pub(crate) fn storage_error(err: PlatformError) -> MessagingError {
    match err {
        PlatformError::PermissionDenied(permission) => MessagingError::permission_denied(permission),
        PlatformError::QuotaExceeded { area, needed, quota } => MessagingError::action_failed(
            format!("Storage quota exceeded in {} area", area),
        )
        .with_details(json!({ "area": area, "needed": needed, "quota": quota })),
        other => MessagingError::action_failed(other.to_string()),
    }
}

pub(crate) fn area(host: &ExtensionHost, name: AreaName) -> Result<&StorageArea, MessagingError> {
    host.storage(name).map_err(storage_error)
}

/// Republish every storage change on the bus as a local
/// `storage.changed` event carrying `{changes, area}`.
///
/// Returns `None` when storage is not available to the extension.
pub(crate) fn spawn_change_relay(host: &ExtensionHost, bus: &MessageBus) -> Option<JoinHandle<()>> {
    let mut streams = Vec::new();
    for name in [AreaName::Local, AreaName::Sync, AreaName::Session] {
        match host.storage(name) {
            Ok(area) => streams.push(BroadcastStream::new(area.subscribe())),
            Err(e) => {
                warn!("Storage changes will not be relayed: {}", e);
                return None;
            }
        }
    }

    let bus: WeakMessageBus = bus.downgrade();
    let mut changes = select_all(streams);
    Some(tokio::spawn(async move {
        while let Some(item) = changes.next().await {
            let changes = match item {
                Ok(changes) => changes,
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!("Storage relay lagged, {} change sets skipped", skipped);
                    continue;
                }
            };
            let Some(bus) = bus.upgrade() else {
                break;
            };
            debug!("Storage changes in {}: {} keys", changes.area, changes.changes.len());
            let payload = json!({ "changes": changes.changes, "area": changes.area });
            bus.emit_local(StorageEvent::Changed.as_str(), payload);
        }
    }))
}
