//! Error types for the messaging protocol.

mod code;
mod messaging;
mod transport;

pub use code::*;
pub use messaging::*;
pub use transport::*;
