//! Envelope types shared by every context.

mod category;
mod events;
mod message;
mod source;

pub use category::*;
pub use events::*;
pub use message::*;
pub use source::*;
