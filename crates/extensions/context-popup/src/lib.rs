//! # Popup context
//!
//! The popup talks only to the background. [`MessagingService`] wraps the
//! popup bus with one typed method per request the popup UI makes; requests
//! meant for a tab carry the tab id and are forwarded by the background.

mod service;

pub use service::MessagingService;
