//! Transport errors.

use serde_json::json;
use thiserror::Error;

use super::{ErrorCode, MessagingError};
use crate::types::TabId;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Target unavailable: {0}")]
    TargetUnavailable(String),

    #[error("Tab not found: {0}")]
    TabNotFound(TabId),

    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Unsupported destination: {0}")]
    Unsupported(String),

    #[error("Transport is already listening")]
    AlreadyListening,
}

impl TransportError {
    fn kind(&self) -> &'static str {
        match self {
            Self::TargetUnavailable(_) => "targetUnavailable",
            Self::TabNotFound(_) => "tabNotFound",
            Self::ConnectionClosed(_) => "connectionClosed",
            Self::Platform(_) => "platform",
            Self::Unsupported(_) => "unsupported",
            Self::AlreadyListening => "alreadyListening",
        }
    }
}

/// Every undeliverable send surfaces to callers as `CONNECTION_ERROR`.
impl From<TransportError> for MessagingError {
    fn from(err: TransportError) -> Self {
        MessagingError::new(
            ErrorCode::ConnectionError,
            format!("Failed to send message: {}", err),
        )
        .with_details(json!({ "reason": err.kind() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::TabNotFound(9);
        assert_eq!(err.to_string(), "Tab not found: 9");

        let err = TransportError::TargetUnavailable("no popup".to_string());
        assert!(err.to_string().contains("Target unavailable"));
    }

    #[test]
    fn test_into_messaging_error() {
        let err: MessagingError = TransportError::ConnectionClosed("port gone".to_string()).into();
        assert_eq!(err.code, ErrorCode::ConnectionError);
        assert!(err.message.contains("port gone"));
        assert_eq!(err.details.unwrap()["reason"], "connectionClosed");
    }
}
