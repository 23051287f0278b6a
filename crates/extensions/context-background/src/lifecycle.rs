//! Install, update and cleanup of persisted state.

use serde_json::{json, Map, Value};
use tracing::info;

use licita_core::MessageBus;
use licita_platform::{AreaName, ExtensionHost, InstallReason};
use licita_protocols::{now_millis, MessagingError, SystemEvent};

use crate::storage::{area, storage_error};

/// Keys that survive [`cleanup_storage`].
pub const KEPT_KEYS: [&str; 2] = ["preferences", "version"];

/// Local storage written on first install.
pub fn default_storage(version: &str) -> Map<String, Value> {
    let defaults = json!({
        "preferences": {
            "autoFill": true,
            "notifyNewAuctions": true,
            "downloadPath": "downloads",
            "theme": "light",
        },
        "history": [],
        "lastSync": null,
        "version": version,
    });
    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// React to the extension being installed or updated.
///
/// Install seeds local storage and publishes `extension.installed`. Update
/// rewrites the stored version and publishes `extension.updated` with
/// `{previousVersion, currentVersion}`. Both events are local to the
/// background.
pub fn handle_installed(
    bus: &MessageBus,
    host: &ExtensionHost,
    reason: &InstallReason,
) -> Result<(), MessagingError> {
    let version = host.manifest().version.clone();
    let local = area(host, AreaName::Local)?;

    match reason {
        InstallReason::Install => {
            local.set(default_storage(&version)).map_err(storage_error)?;
            info!("Extension installed, storage initialized for {}", version);
            bus.emit_local(
                SystemEvent::ExtensionInstalled.as_str(),
                json!({ "version": version, "timestamp": now_millis() }),
            );
        }
        InstallReason::Update { previous_version } => {
            let mut items = Map::new();
            items.insert("version".to_string(), Value::String(version.clone()));
            local.set(items).map_err(storage_error)?;
            info!("Extension updated from {} to {}", previous_version, version);
            bus.emit_local(
                SystemEvent::ExtensionUpdated.as_str(),
                json!({ "previousVersion": previous_version, "currentVersion": version }),
            );
        }
    }
    Ok(())
}

/// Drop everything from local storage except [`KEPT_KEYS`].
pub fn cleanup_storage(host: &ExtensionHost) -> Result<(), MessagingError> {
    let local = area(host, AreaName::Local)?;
    let kept: Map<String, Value> = local
        .get(Some(&KEPT_KEYS[..]))
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .collect();

    info!("Cleaning up local storage, keeping {} keys", kept.len());
    local.clear();
    local.set(kept).map_err(storage_error)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
