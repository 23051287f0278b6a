//! # Licita Platform
//!
//! An in-process stand-in for the browser extension APIs the messaging core
//! talks to. It keeps the observable behavior the transports depend on:
//!
//! - runtime messages reach extension pages (background, popup) but never
//!   the sending frame, and the first listener to reply wins
//! - tab messages reach only the content scripts injected in that tab
//! - a send with no listener fails with "Receiving end does not exist"
//! - each tab has a window channel shared by its page and content script
//! - storage areas enforce quotas and announce changes
//!
//! Values crossing the host are `serde_json::Value`s and are cloned on
//! delivery, so no memory is shared between frames.

mod error;
mod host;
mod manifest;
mod messaging;
mod storage;
mod window;

pub use error::PlatformError;
pub use host::{
    Badge, ExtensionHost, Frame, FrameId, FrameKind, InstallReason, TabInfo, LOCAL_QUOTA_BYTES,
    SYNC_QUOTA_BYTES,
};
pub use manifest::{Manifest, Permission};
pub use messaging::{DeferredReply, ListenerId, MessageSender, ReplyHandle};
pub use storage::{AreaName, StorageArea, StorageChange, StorageChanges};
pub use window::{WindowChannel, WindowId, WindowMessage};
