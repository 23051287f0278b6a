//! # Background context
//!
//! The extension's hub. Owns the background [`MessageBus`], answers requests
//! from popups and content scripts, forwards tab-bound requests to the right
//! content script, keeps settings in storage and relays storage changes as
//! local `storage.changed` events.
//!
//! ## Handlers
//!
//! - `system`: `ping`, `getStatus`, `setDebug`, `log`
//! - `auction`: `fetchList`, `analyze` (forwarded to the tab)
//! - `document`: `fetch`, `highlight` (forwarded to the tab)
//! - `settings`: `get`, `set`, `reset`
//! - `ui`: `updateBadge`
//! - `auth`: `checkStatus`
//!
//! [`MessageBus`]: licita_core::MessageBus

pub mod context;
mod handlers;
pub mod lifecycle;
pub mod settings;
mod storage;

pub use context::BackgroundContext;
pub use settings::SettingsStore;
