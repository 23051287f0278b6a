//! Closed enumeration of error codes carried on the wire.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "UNKNOWN_ERROR")]
    Unknown,
    #[serde(rename = "TIMEOUT_ERROR")]
    Timeout,
    #[serde(rename = "INVALID_MESSAGE")]
    InvalidMessage,

    #[serde(rename = "CONNECTION_ERROR")]
    ConnectionError,
    #[serde(rename = "CONNECTION_CLOSED")]
    ConnectionClosed,
    #[serde(rename = "TARGET_UNAVAILABLE")]
    TargetUnavailable,

    #[serde(rename = "HANDLER_NOT_FOUND")]
    HandlerNotFound,
    #[serde(rename = "HANDLER_EXECUTION_ERROR")]
    HandlerExecutionError,

    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied,

    #[serde(rename = "TAB_NOT_FOUND")]
    TabNotFound,
    #[serde(rename = "INJECT_SCRIPT_FAILED")]
    InjectScriptFailed,

    #[serde(rename = "INVALID_DATA")]
    InvalidData,
    #[serde(rename = "DATA_PARSING_ERROR")]
    DataParsingError,

    #[serde(rename = "AUTH_REQUIRED")]
    AuthRequired,
    #[serde(rename = "AUTH_FAILED")]
    AuthFailed,

    #[serde(rename = "ACTION_FAILED")]
    ActionFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN_ERROR",
            Self::Timeout => "TIMEOUT_ERROR",
            Self::InvalidMessage => "INVALID_MESSAGE",
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::ConnectionClosed => "CONNECTION_CLOSED",
            Self::TargetUnavailable => "TARGET_UNAVAILABLE",
            Self::HandlerNotFound => "HANDLER_NOT_FOUND",
            Self::HandlerExecutionError => "HANDLER_EXECUTION_ERROR",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::TabNotFound => "TAB_NOT_FOUND",
            Self::InjectScriptFailed => "INJECT_SCRIPT_FAILED",
            Self::InvalidData => "INVALID_DATA",
            Self::DataParsingError => "DATA_PARSING_ERROR",
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::AuthFailed => "AUTH_FAILED",
            Self::ActionFailed => "ACTION_FAILED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
