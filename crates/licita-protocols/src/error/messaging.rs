//! The error shape that crosses context boundaries.

use std::any::Any;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use super::{ErrorCode, TransportError};
use crate::types::TabId;

/// Error carried inside `error` messages and returned by the bus.
///
/// Everything a handler or transport fails with is normalized into this type
/// before it leaves the context that produced it.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct MessagingError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl MessagingError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Timeout, message)
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConnectionError, message)
    }

    pub fn handler_not_found(action: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::HandlerNotFound,
            format!("No handler found for action: {}", action),
        )
    }

    pub fn permission_denied(permission: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::PermissionDenied,
            format!("Permission denied: {}", permission),
        )
    }

    pub fn tab_not_found(tab_id: TabId) -> Self {
        Self::new(ErrorCode::TabNotFound, format!("Tab not found: {}", tab_id))
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidData, message)
    }

    pub fn invalid_message(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidMessage, message)
    }

    pub fn data_parsing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DataParsingError, message)
    }

    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthRequired, message)
    }

    pub fn action_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ActionFailed, message)
    }

    /// Normalize an arbitrary failure.
    ///
    /// A `MessagingError` passes through unchanged and a `TransportError` is
    /// converted. Anything else becomes `UNKNOWN_ERROR` with the root cause
    /// and the full error chain in `details`.
    pub fn from_unknown(err: anyhow::Error) -> Self {
        let err = match err.downcast::<MessagingError>() {
            Ok(messaging) => return messaging,
            Err(err) => err,
        };
        let err = match err.downcast::<TransportError>() {
            Ok(transport) => return transport.into(),
            Err(err) => err,
        };

        Self::new(ErrorCode::Unknown, err.to_string()).with_details(json!({
            "originalError": err.root_cause().to_string(),
            "stack": format!("{:?}", err),
        }))
    }

    /// Normalize a panic payload caught from a handler.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let text = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "handler panicked".to_string()
        };
        Self::new(ErrorCode::Unknown, text.clone())
            .with_details(json!({ "originalError": text, "panic": true }))
    }

    pub fn is_code(&self, code: ErrorCode) -> bool {
        self.code == code
    }

    /// Only timeouts are worth sending again.
    pub fn is_retryable(&self) -> bool {
        self.code == ErrorCode::Timeout
    }
}

#[cfg(test)]
#[path = "messaging_tests.rs"]
mod tests;
