//! Platform errors.

use licita_protocols::TabId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Could not establish connection. Receiving end does not exist.")]
    ReceivingEndMissing,

    #[error("No tab with id: {0}")]
    NoSuchTab(TabId),

    #[error("Missing permission: {0}")]
    PermissionDenied(String),

    #[error("QUOTA_BYTES quota exceeded for {area} storage ({needed} > {quota} bytes)")]
    QuotaExceeded {
        area: String,
        needed: u64,
        quota: u64,
    },

    #[error("Frame {0} is not attached")]
    FrameDetached(u64),
}
