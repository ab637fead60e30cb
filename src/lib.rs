//! Contact Scout - Heuristic Contact Extraction for Web Pages
//!
//! This crate finds email addresses and phone numbers in rendered pages,
//! groups each email with the phones printed next to it, and reports the
//! remaining phones as loose numbers.
//!
//! # Features
//!
//! - **Extraction engine**: regex matchers with false-positive filtering,
//!   bounded ancestor search for email/phone association, time-sliced runs
//! - **Page agent**: typed line-delimited JSON protocol for page hosts
//! - **Crawler**: multi-page runs with same-site deep-link discovery
//! - **Export**: CSV and clipboard formats
//!
//! # Architecture
//!
//! ```text
//! Page (DomTree) ──▶ ScanPlan ──▶ spans ──▶ matchers
//!                                              │
//!                                              ▼
//!                    ExtractionJob ◀── ProximityAssociator
//!                          │
//!                          ▼
//!                   ExtractionReport { groups, loosePhones }
//!                          │
//!              ┌───────────┼────────────┐
//!              ▼           ▼            ▼
//!          PageAgent    Crawler       Export
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use contact_scout::dom::Document;
//! use contact_scout::extraction::extract_report;
//! use contact_scout::ScanConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let page = Document::parse("<p>Contact: jane@acme.com, call +1 415-555-0199</p>");
//!     let report = extract_report(&page, &ScanConfig::default()).await;
//!
//!     for group in &report.groups {
//!         println!("{} {:?}", group.email, group.phones);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod crawler;
pub mod dom;
pub mod error;
pub mod export;
pub mod extraction;
pub mod protocol;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports for convenience
pub use config::ScanConfig;
pub use crawler::{CrawlQueue, CrawlRunner, HttpPageSource, PageContacts};
pub use dom::{Document, DomTree};
pub use error::{Error, Result};
pub use extraction::{extract_report, ContactGroup, ExtractionJob, ExtractionReport, LinkExtractor};
pub use protocol::PageAgent;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
