//! # Licita Core
//!
//! Per-context messaging runtime.
//!
//! ## Components
//!
//! - [`MessageBus`] - Request/response correlation, handler dispatch and event fan-out
//! - [`HandlerRegistry`] - Routing key to handler map
//! - [`EventEmitter`] - In-process publish/subscribe, local to one context
//! - [`PendingRequests`] - Outstanding requests awaiting a terminal outcome

pub mod bus;
pub mod event;
pub mod pending;
pub mod registry;

pub use bus::{BusConfig, EventOptions, MessageBus, SendOptions, WeakMessageBus};
pub use event::{EventEmitter, Subscription};
pub use pending::PendingRequests;
pub use registry::HandlerRegistry;
