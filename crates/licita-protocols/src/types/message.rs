//! Message envelope.
//!
//! The wire form is plain JSON so it survives structured cloning between
//! contexts: strings, numbers, booleans, null, objects and arrays only.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{new_message_id, now_millis, Category, MessageId, RouteKey, Source, TabId};
use crate::error::MessagingError;

/// Envelope shared by all message variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message ID.
    pub id: MessageId,
    /// Context that built the message.
    pub source: Source,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub category: Category,
    pub action: String,
    #[serde(flatten)]
    pub body: MessageBody,
}

/// Variant-specific part of a message, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageBody {
    Request(RequestBody),
    Response(ResponseBody),
    Error(ErrorBody),
    Event(EventBody),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(rename = "data", default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
    #[serde(rename = "timeout", default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    pub request_id: MessageId,
    #[serde(rename = "data", default)]
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub request_id: MessageId,
    pub error: MessagingError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBody {
    #[serde(rename = "event")]
    pub event_name: String,
    #[serde(rename = "data", default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// Message variant without its data, for logging and matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Response,
    Error,
    Event,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
            Self::Error => "error",
            Self::Event => "event",
        }
    }
}

impl Message {
    fn envelope(source: Source, route: &RouteKey, body: MessageBody) -> Self {
        Self {
            id: new_message_id(),
            source,
            timestamp: now_millis(),
            category: route.category,
            action: route.action.clone(),
            body,
        }
    }

    /// Build a request message with a fresh id.
    pub fn request(
        source: Source,
        route: &RouteKey,
        payload: Option<Value>,
        tab_id: Option<TabId>,
        timeout_ms: Option<u64>,
    ) -> Self {
        Self::envelope(
            source,
            route,
            MessageBody::Request(RequestBody {
                payload,
                tab_id,
                timeout_ms,
            }),
        )
    }

    /// Build the response answering `request`.
    pub fn response_to(request: &Message, source: Source, payload: Value) -> Self {
        Self::envelope(
            source,
            &request.route(),
            MessageBody::Response(ResponseBody {
                request_id: request.id.clone(),
                payload,
            }),
        )
    }

    /// Build the error reply for `request`.
    pub fn error_for(request: &Message, source: Source, error: MessagingError) -> Self {
        Self::envelope(
            source,
            &request.route(),
            MessageBody::Error(ErrorBody {
                request_id: request.id.clone(),
                error,
            }),
        )
    }

    /// Build a fire-and-forget event message.
    pub fn event(
        source: Source,
        route: &RouteKey,
        event_name: impl Into<String>,
        payload: Option<Value>,
    ) -> Self {
        Self::envelope(
            source,
            route,
            MessageBody::Event(EventBody {
                event_name: event_name.into(),
                payload,
            }),
        )
    }

    /// Parse and validate a message received from another context.
    ///
    /// Every common field must be present and the id must be non-empty.
    pub fn from_wire(value: Value) -> Result<Self, MessagingError> {
        let message: Message = serde_json::from_value(value)
            .map_err(|e| MessagingError::invalid_message(e.to_string()))?;
        if message.id.is_empty() {
            return Err(MessagingError::invalid_message("message id is empty"));
        }
        if let Some(request_id) = message.request_id() {
            if request_id.is_empty() {
                return Err(MessagingError::invalid_message("requestId is empty"));
            }
        }
        Ok(message)
    }

    /// Serialize into the JSON wire form.
    pub fn to_wire(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Routing key of this message.
    pub fn route(&self) -> RouteKey {
        RouteKey::new(self.category, self.action.clone())
    }

    pub fn kind(&self) -> MessageKind {
        match self.body {
            MessageBody::Request(_) => MessageKind::Request,
            MessageBody::Response(_) => MessageKind::Response,
            MessageBody::Error(_) => MessageKind::Error,
            MessageBody::Event(_) => MessageKind::Event,
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(self.body, MessageBody::Request(_))
    }

    /// Correlation id for responses and errors.
    pub fn request_id(&self) -> Option<&str> {
        match &self.body {
            MessageBody::Response(r) => Some(&r.request_id),
            MessageBody::Error(e) => Some(&e.request_id),
            _ => None,
        }
    }

    /// Data carried by the message, if any.
    pub fn payload(&self) -> Option<&Value> {
        match &self.body {
            MessageBody::Request(r) => r.payload.as_ref(),
            MessageBody::Response(r) => Some(&r.payload),
            MessageBody::Event(e) => e.payload.as_ref(),
            MessageBody::Error(_) => None,
        }
    }

    /// Target tab of a request, if any.
    pub fn tab_id(&self) -> Option<TabId> {
        match &self.body {
            MessageBody::Request(r) => r.tab_id,
            _ => None,
        }
    }

    /// Compact description for log lines.
    pub fn summary(&self) -> String {
        format!(
            "{} {} {}:{} from {}",
            self.kind().as_str(),
            self.id,
            self.category,
            self.action,
            self.source
        )
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
