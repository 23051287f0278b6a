//! Context identity and identifiers.

use serde::{Deserialize, Serialize};

/// Browser tab identifier.
pub type TabId = i64;

/// Unique message identifier (UUID v4 rendered as a string).
pub type MessageId = String;

/// Which execution context originated a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Background,
    Content,
    Popup,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Content => "content",
            Self::Popup => "popup",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generate a fresh, collision-resistant message id.
pub fn new_message_id() -> MessageId {
    uuid::Uuid::new_v4().to_string()
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
