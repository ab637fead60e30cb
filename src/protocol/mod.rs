//! Page protocol
//!
//! Typed request/response messages between a page and its host (popup,
//! crawler), and the [`PageAgent`] that answers them for one page.

mod server;
/// Protocol message types
pub mod types;

pub use server::PageAgent;
pub use types::{PageRequest, PageResponse, RequestEnvelope, ResponseEnvelope};
