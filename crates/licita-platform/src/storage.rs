//! Key-value storage areas.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::PlatformError;

const CHANGES_CAPACITY: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaName {
    Local,
    Sync,
    Session,
}

impl AreaName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Sync => "sync",
            Self::Session => "session",
        }
    }
}

impl std::fmt::Display for AreaName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Old and new value of one key. A missing side means the key was absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

/// Every key changed by one storage operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageChanges {
    pub area: AreaName,
    pub changes: BTreeMap<String, StorageChange>,
}

/// One storage area.
///
/// Size accounting follows the browser: each item costs the length of its
/// key plus the length of its JSON encoding.
pub struct StorageArea {
    name: AreaName,
    quota: u64,
    items: Mutex<Map<String, Value>>,
    changes: broadcast::Sender<StorageChanges>,
}

impl StorageArea {
    pub(crate) fn new(name: AreaName, quota: u64) -> Self {
        let (changes, _) = broadcast::channel(CHANGES_CAPACITY);
        Self {
            name,
            quota,
            items: Mutex::new(Map::new()),
            changes,
        }
    }

    pub fn name(&self) -> AreaName {
        self.name
    }

    pub fn quota(&self) -> u64 {
        self.quota
    }

    /// Read the given keys, or every item when `keys` is `None`. Missing
    /// keys are left out of the result.
    pub fn get(&self, keys: Option<&[&str]>) -> Map<String, Value> {
        let items = self.items.lock();
        match keys {
            None => items.clone(),
            Some(keys) => keys
                .iter()
                .filter_map(|k| items.get(*k).map(|v| (k.to_string(), v.clone())))
                .collect(),
        }
    }

    /// Read one key.
    pub fn get_one(&self, key: &str) -> Option<Value> {
        self.items.lock().get(key).cloned()
    }

    /// Write every entry of `values`. Nothing is written if the result would
    /// exceed the quota.
    pub fn set(&self, values: Map<String, Value>) -> Result<(), PlatformError> {
        let changes = {
            let mut items = self.items.lock();

            let mut next = items.clone();
            for (key, value) in &values {
                next.insert(key.clone(), value.clone());
            }
            let needed = usage(&next, None);
            if needed > self.quota {
                return Err(PlatformError::QuotaExceeded {
                    area: self.name.to_string(),
                    needed,
                    quota: self.quota,
                });
            }

            let mut changes = BTreeMap::new();
            for (key, value) in values {
                let old_value = items.get(&key).cloned();
                if old_value.as_ref() == Some(&value) {
                    continue;
                }
                changes.insert(
                    key,
                    StorageChange {
                        old_value,
                        new_value: Some(value),
                    },
                );
            }
            *items = next;
            changes
        };

        self.announce(changes);
        Ok(())
    }

    pub fn remove(&self, keys: &[&str]) {
        let changes = {
            let mut items = self.items.lock();
            keys.iter()
                .filter_map(|key| {
                    items.remove(*key).map(|old| {
                        (
                            key.to_string(),
                            StorageChange {
                                old_value: Some(old),
                                new_value: None,
                            },
                        )
                    })
                })
                .collect()
        };
        self.announce(changes);
    }

    pub fn clear(&self) {
        let changes = {
            let mut items = self.items.lock();
            std::mem::take(&mut *items)
                .into_iter()
                .map(|(key, old)| {
                    (
                        key,
                        StorageChange {
                            old_value: Some(old),
                            new_value: None,
                        },
                    )
                })
                .collect()
        };
        self.announce(changes);
    }

    /// Bytes used by the given keys, or by the whole area.
    pub fn bytes_in_use(&self, keys: Option<&[&str]>) -> u64 {
        usage(&self.items.lock(), keys)
    }

    /// Receive every change made to this area from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StorageChanges> {
        self.changes.subscribe()
    }

    fn announce(&self, changes: BTreeMap<String, StorageChange>) {
        if changes.is_empty() {
            return;
        }
        debug!("{} storage changed: {} keys", self.name, changes.len());
        let _ = self.changes.send(StorageChanges {
            area: self.name,
            changes,
        });
    }
}

fn usage(items: &Map<String, Value>, keys: Option<&[&str]>) -> u64 {
    items
        .iter()
        .filter(|(key, _)| keys.is_none_or(|keys| keys.contains(&key.as_str())))
        .map(|(key, value)| (key.len() + value.to_string().len()) as u64)
        .sum()
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod tests;
