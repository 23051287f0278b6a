//! # Content context
//!
//! Runs inside an e-licitatie.ro tab. Answers requests about the page it is
//! injected into, follows debug mode changes announced by the background,
//! and bridges the page script over the window channel.

pub mod context;
mod handlers;
pub mod page;

pub use context::ContentContext;
pub use page::PageDocument;
