//! Multi-page crawling
//!
//! Visits a queue of URLs one at a time, runs the extraction engine on each
//! page, and queues the same-site contact pages it discovers along the way.

pub mod queue;
pub mod runner;
pub mod source;

pub use queue::{parse_queue_file, CrawlQueue};
pub use runner::{CrawlRunner, CrawlSummary};
pub use source::{FetchedPage, HttpPageSource, PageSource};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What one crawled page yielded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContacts {
    /// Page URL as queued
    pub url: String,
    /// Distinct emails, report order
    pub emails: Vec<String>,
    /// Distinct phones, grouped first then loose
    pub phones: Vec<String>,
    /// When the page was scanned
    pub scanned_at: DateTime<Utc>,
}

impl PageContacts {
    /// Whether the page yielded nothing
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.phones.is_empty()
    }
}
