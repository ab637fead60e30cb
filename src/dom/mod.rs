//! Page tree abstraction
//!
//! The extraction engine is written against the [`DomTree`] trait; the
//! [`Document`] type provides it for HTML parsed with `scraper`.

pub mod document;
pub mod tree;

pub use document::{Document, NodeId};
pub use tree::{DomTree, NodeKind, TextNode};
