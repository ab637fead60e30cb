//! Page protocol types
//!
//! One JSON object per line in each direction. Requests carry an optional
//! `id` echoed back in the response and an `action` tag selecting the
//! operation; responses carry a `kind` tag.

use crate::extraction::{BadgeUpdate, ExtractionReport};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error code for a line that is not JSON
pub const PARSE_ERROR: i32 = -32700;
/// Error code for JSON that is not a known request
pub const INVALID_REQUEST: i32 = -32600;
/// Error code for a request the page cannot serve
pub const UNAVAILABLE: i32 = -32000;

/// Operations a page agent serves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PageRequest {
    /// Run an extraction and return the report with the saved scroll offset
    GetReport,
    /// Same-site contact-like links of the page
    GetDeepLinks,
    /// Remember the popup scroll offset
    SaveScrollPosition {
        /// Vertical offset in pixels
        #[serde(rename = "scrollY", default)]
        scroll_y: f64,
    },
    /// Current badge count
    GetBadge,
    /// Replace the blacklist
    SetBlacklist {
        /// Domains to hide
        #[serde(default)]
        domains: Vec<String>,
    },
    /// Distinct emails of a text selection
    ExtractSelection {
        /// Selected text
        text: String,
    },
}

/// A request line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Correlation id, echoed back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// The operation
    #[serde(flatten)]
    pub request: PageRequest,
}

/// Answers of a page agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PageResponse {
    /// Extraction result
    Report {
        /// Blacklist-filtered report
        data: ExtractionReport,
        /// Last saved popup scroll offset
        #[serde(rename = "popupScrollY")]
        popup_scroll_y: f64,
    },
    /// Deep links in document order
    DeepLinks {
        /// Absolute URLs
        links: Vec<String>,
    },
    /// Scroll offset stored
    ScrollSaved {
        /// Stored offset
        #[serde(rename = "scrollY")]
        scroll_y: f64,
    },
    /// Badge state
    Badge {
        /// Current count
        count: usize,
        /// Update to publish; absent when the count did not change
        #[serde(default, skip_serializing_if = "Option::is_none")]
        update: Option<BadgeUpdate>,
    },
    /// Blacklist replaced
    BlacklistUpdated {
        /// Number of listed domains
        domains: usize,
        /// Badge update forced by the change
        #[serde(default, skip_serializing_if = "Option::is_none")]
        badge: Option<BadgeUpdate>,
    },
    /// Emails of a selection
    Emails {
        /// Distinct emails, first occurrence order
        emails: Vec<String>,
    },
    /// The request failed
    Error {
        /// Error code
        code: i32,
        /// Error message
        message: String,
    },
}

impl PageResponse {
    /// Create an error response
    pub fn error(code: i32, message: impl Into<String>) -> Self {
        PageResponse::Error {
            code,
            message: message.into(),
        }
    }

    /// Whether this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, PageResponse::Error { .. })
    }
}

/// A response line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Id of the request being answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// The answer
    #[serde(flatten)]
    pub response: PageResponse,
}

impl ResponseEnvelope {
    /// Pair a response with a request id
    pub fn new(id: Option<Value>, response: PageResponse) -> Self {
        Self { id, response }
    }

    /// Response to a line that is not JSON
    pub fn parse_error() -> Self {
        Self::new(None, PageResponse::error(PARSE_ERROR, "Parse error"))
    }
}
