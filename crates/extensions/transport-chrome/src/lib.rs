//! Transports for the three extension contexts.
//!
//! ```text
//!  popup ──runtime──► background ──tabs──► content ──window──► page
//!    ▲                    │  ▲                │  ▲
//!    └──── reply ─────────┘  └──── reply ─────┘  └── tagged post
//! ```
//!
//! Each transport registers one platform listener. Inbound requests are
//! answered through a deferred reply once the bus has produced one; other
//! inbound messages are declined immediately. Anything that does not parse
//! as a message is dropped without a reply.

mod background;
mod content;
mod listener;
mod popup;

pub use background::BackgroundTransport;
pub use content::{ContentTransport, PageTags};
pub use popup::PopupTransport;
