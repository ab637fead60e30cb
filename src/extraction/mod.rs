//! Contact extraction engine
//!
//! Finds emails and phone numbers in a page, ties each email to the phones
//! around it, and reports what is left over as loose phones:
//!
//! - [`patterns`]: email/phone matchers and the phone validity filter
//! - [`scanner`]: scan plan and text spans with their context anchors
//! - [`associator`]: bounded ancestor climb from an email to nearby phones
//! - [`scheduler`]: time-sliced driver of one extraction run
//! - [`aggregate`]: report building and blacklist filtering
//! - [`badge`]: lightweight email counting for the badge
//! - [`links`]: link classification and deep-link discovery

pub mod aggregate;
pub mod associator;
pub mod badge;
pub mod context;
pub mod links;
pub mod patterns;
pub mod scanner;
pub mod scheduler;

pub use aggregate::{aggregate, Blacklist, ContactGroup, ExtractionReport};
pub use associator::ProximityAssociator;
pub use badge::{badge_count, count_emails, BadgeState, BadgeUpdate, BadgeWatcher, PageEvent};
pub use context::ScanContext;
pub use links::{ExtractedLink, LinkExtractor, LinkType};
pub use patterns::{
    is_valid_phone_candidate, match_emails, match_phone_candidates, unique_emails,
    EmailCandidate, PhoneCandidate,
};
pub use scanner::{ScanMode, ScanPlan, ScanUnit, TextSpan};
pub use scheduler::{extract_report, extract_report_sync, ExtractionJob, JobState, Step};
