//! Settings kept in sync storage.

use serde_json::{Map, Value};
use tracing::warn;

use licita_platform::{AreaName, ExtensionHost};
use licita_protocols::route::{Settings, SettingsPatch};
use licita_protocols::MessagingError;

use crate::storage::area;

/// Storage key holding the settings object.
pub const SETTINGS_KEY: &str = "settings";

/// Reads and writes [`Settings`] in the sync area. Stored values are
/// layered over the defaults, so a partial object is always complete once
/// loaded.
#[derive(Clone)]
pub struct SettingsStore {
    host: ExtensionHost,
}

impl SettingsStore {
    pub fn new(host: ExtensionHost) -> Self {
        Self { host }
    }

    pub fn load(&self) -> Result<Settings, MessagingError> {
        let stored = area(&self.host, AreaName::Sync)?.get_one(SETTINGS_KEY);
        let mut merged = defaults();
        match stored {
            Some(Value::Object(stored)) => merged.extend(stored),
            Some(other) => warn!("Ignoring malformed stored settings: {}", other),
            None => {}
        }
        decode(merged).or_else(|e| {
            warn!("Stored settings are invalid, using defaults: {}", e);
            Ok(Settings::default())
        })
    }

    /// Merge `patch` into the current settings and store the result.
    ///
    /// A patch giving a known setting the wrong type fails with
    /// `INVALID_DATA` and stores nothing.
    pub fn update(&self, patch: SettingsPatch) -> Result<Settings, MessagingError> {
        let mut merged = encode(&self.load()?);
        merged.extend(patch);
        let settings = decode(merged)?;
        self.save(&settings)?;
        Ok(settings)
    }

    pub fn reset(&self) -> Result<Settings, MessagingError> {
        let settings = Settings::default();
        self.save(&settings)?;
        Ok(settings)
    }

    fn save(&self, settings: &Settings) -> Result<(), MessagingError> {
        let mut items = Map::new();
        items.insert(SETTINGS_KEY.to_string(), Value::Object(encode(settings)));
        area(&self.host, AreaName::Sync)?
            .set(items)
            .map_err(crate::storage::storage_error)
    }
}

fn defaults() -> Map<String, Value> {
    encode(&Settings::default())
}

fn encode(settings: &Settings) -> Map<String, Value> {
    match serde_json::to_value(settings) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn decode(map: Map<String, Value>) -> Result<Settings, MessagingError> {
    serde_json::from_value(Value::Object(map))
        .map_err(|e| MessagingError::invalid_data(format!("Invalid settings: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use licita_platform::Manifest;
    use licita_protocols::ErrorCode;
    use serde_json::json;

    fn store() -> SettingsStore {
        SettingsStore::new(ExtensionHost::new(Manifest::default()))
    }

    fn patch(value: Value) -> SettingsPatch {
        match value {
            Value::Object(map) => map,
            _ => panic!("patch must be an object"),
        }
    }

    #[test]
    fn test_defaults_when_empty() {
        let settings = store().load().unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.theme, "light");
        assert!(settings.notifications);
        assert!(!settings.auto_refresh);
    }

    #[test]
    fn test_update_merges_and_keeps_extra_keys() {
        let store = store();
        store.update(patch(json!({"theme": "dark"}))).unwrap();
        let settings = store
            .update(patch(json!({"autoRefresh": true, "pageSize": 50})))
            .unwrap();

        assert_eq!(settings.theme, "dark");
        assert!(settings.auto_refresh);
        assert_eq!(settings.extra["pageSize"], 50);
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_update_rejects_wrong_type() {
        let store = store();
        let err = store.update(patch(json!({"notifications": "yes"}))).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidData);
        assert!(store.load().unwrap().notifications);
    }

    #[test]
    fn test_reset() {
        let store = store();
        store.update(patch(json!({"theme": "dark"}))).unwrap();
        assert_eq!(store.reset().unwrap(), Settings::default());
        assert_eq!(store.load().unwrap().theme, "light");
    }

    #[test]
    fn test_without_storage_permission() {
        let store = SettingsStore::new(ExtensionHost::new(Manifest::new("x", "1.0.0", ["tabs"])));
        let err = store.load().unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }
}
