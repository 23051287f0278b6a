//! Configuration schema definitions.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::loader::ConfigLoader;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub messaging: MessagingConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub extension: ExtensionConfig,
}

/// Message bus defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,

    #[serde(default)]
    pub default_retries: u32,

    #[serde(default)]
    pub debug: bool,

    /// Tag inbound window messages must carry. Replies to the page use the
    /// same tag with a `-page` suffix.
    #[serde(default = "default_page_channel_tag")]
    pub page_channel_tag: String,
}

impl MessagingConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn page_reply_tag(&self) -> String {
        format!("{}-page", self.page_channel_tag)
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            default_retries: 0,
            debug: false,
            page_channel_tag: default_page_channel_tag(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_page_channel_tag() -> String {
    "naval-auction-assistant".to_string()
}

/// Storage area quotas, in bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_sync_quota")]
    pub sync_quota_bytes: u64,

    #[serde(default = "default_local_quota")]
    pub local_quota_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sync_quota_bytes: default_sync_quota(),
            local_quota_bytes: default_local_quota(),
        }
    }
}

fn default_sync_quota() -> u64 {
    102_400
}

fn default_local_quota() -> u64 {
    10_485_760
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_dir")]
    pub dir: String,
}

impl LoggingConfig {
    /// Log directory with `~` expanded.
    pub fn resolved_dir(&self) -> PathBuf {
        ConfigLoader::expand_path(&self.dir)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "~/.licita/logs".to_string()
}

/// Manifest values the simulated platform exposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_permissions")]
    pub permissions: Vec<String>,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            permissions: default_permissions(),
        }
    }
}

fn default_name() -> String {
    "Naval Auction Assistant".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_permissions() -> Vec<String> {
    ["storage", "downloads", "tabs"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
