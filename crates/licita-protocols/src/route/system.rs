use serde::{Deserialize, Serialize};

use super::Ack;
use crate::types::{Source, SystemAction};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingResponse {
    pub timestamp: i64,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionStatus {
    pub is_enabled: bool,
    pub version: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDebugRequest {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDebugResponse {
    pub success: bool,
    pub debug_enabled: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRequest {
    #[serde(default)]
    pub level: LogLevel,
    pub content: String,
}

route!(
    /// Connectivity check.
    Ping, SystemAction::Ping, () => PingResponse
);
route!(GetStatus, SystemAction::GetStatus, () => ExtensionStatus);
route!(SetDebug, SystemAction::SetDebug, SetDebugRequest => SetDebugResponse);
route!(
    /// Forward a log line to the background context.
    Log, SystemAction::Log, LogRequest => Ack
);
