//! # Licita Protocols
//!
//! Shared contract between the three extension contexts (background service
//! worker, content script, popup). Contains only data definitions and traits -
//! no behavior beyond parsing and validation.
//!
//! ## Core Items
//!
//! - [`Message`] - The wire envelope (request / response / error / event)
//! - [`RouteKey`] - The `(category, action)` pair used for handler lookup
//! - [`Route`] - Typed binding of a route key to its payload types
//! - [`MessagingError`] - The only error shape that crosses a context boundary
//! - [`MessageHandler`] - Trait for request handlers
//! - [`Transport`] - Trait implemented once per execution context

pub mod error;
pub mod handler;
pub mod route;
pub mod transport;
pub mod types;

pub use error::{ErrorCode, MessagingError, TransportError};
pub use handler::{HandlerError, HandlerResult, MessageHandler};
pub use route::Route;
pub use transport::{DeliveryReport, Destination, InboundSink, Transport};
pub use types::*;

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Short request timeout in milliseconds.
pub const SHORT_TIMEOUT_MS: u64 = 1_000;

/// Long request timeout in milliseconds.
pub const LONG_TIMEOUT_MS: u64 = 15_000;
