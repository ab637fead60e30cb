//! Result aggregation
//!
//! Folds the state of a finished run into an [`ExtractionReport`], and
//! post-processes reports (blacklist filtering, flattening for the crawler).

use crate::extraction::context::ScanContext;
use crate::extraction::patterns::email_domain;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// One email and the phones found near it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactGroup {
    /// Email as first seen on the page
    pub email: String,
    /// Associated phones, raw text, discovery order
    #[serde(default)]
    pub phones: Vec<String>,
}

impl ContactGroup {
    /// Create a group
    pub fn new(email: impl Into<String>, phones: Vec<String>) -> Self {
        Self {
            email: email.into(),
            phones,
        }
    }

    /// Lower-cased email domain
    pub fn domain(&self) -> Option<String> {
        email_domain(&self.email)
    }
}

/// Final result of one extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    /// Groups in discovery order
    #[serde(default)]
    pub groups: Vec<ContactGroup>,
    /// Valid phones not attached to any group
    #[serde(default)]
    pub loose_phones: Vec<String>,
}

impl ExtractionReport {
    /// Whether nothing was found
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.loose_phones.is_empty()
    }

    /// Emails in report order
    pub fn emails(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.email.as_str())
    }

    /// Grouped phones followed by loose phones
    pub fn all_phones(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.phones.iter())
            .chain(self.loose_phones.iter())
            .map(String::as_str)
    }

    /// Drop groups whose email domain is blacklisted
    ///
    /// Phones of dropped groups go with them; loose phones are kept.
    pub fn without_blacklisted(mut self, blacklist: &Blacklist) -> Self {
        if blacklist.is_empty() {
            return self;
        }
        let before = self.groups.len();
        self.groups.retain(|g| !blacklist.blocks(&g.email));
        debug!("Blacklist removed {} groups", before - self.groups.len());
        self
    }

    /// Emails and phones of the report as flat lists
    pub fn flatten(&self) -> (Vec<String>, Vec<String>) {
        (
            self.emails().map(String::from).collect(),
            self.all_phones().map(String::from).collect(),
        )
    }
}

/// Build the report of a finished run
///
/// Page phones that some email claimed are removed from the loose list, so
/// no phone is reported twice.
pub fn aggregate<N>(ctx: ScanContext<N>) -> ExtractionReport {
    let (groups, page_phones, claimed) = ctx.into_parts();
    let loose_phones: Vec<String> = page_phones
        .into_iter()
        .filter(|phone| !claimed.contains(phone))
        .collect();

    debug!(
        "Aggregated {} groups, {} loose phones",
        groups.len(),
        loose_phones.len()
    );

    ExtractionReport {
        groups,
        loose_phones,
    }
}

/// Domains whose emails are hidden
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blacklist {
    domains: BTreeSet<String>,
}

impl Blacklist {
    /// Empty blacklist
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a domain, returning whether it was new
    pub fn insert(&mut self, domain: &str) -> bool {
        let domain = domain.trim().to_lowercase();
        !domain.is_empty() && self.domains.insert(domain)
    }

    /// Remove a domain, returning whether it was listed
    pub fn remove(&mut self, domain: &str) -> bool {
        self.domains.remove(&domain.trim().to_lowercase())
    }

    /// Whether an email's domain is listed (exact domain match)
    pub fn blocks(&self, email: &str) -> bool {
        email_domain(email).is_some_and(|domain| self.domains.contains(&domain))
    }

    /// Listed domains, sorted
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }

    /// Number of listed domains
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Whether nothing is listed
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Blacklist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut blacklist = Blacklist::new();
        for domain in iter {
            blacklist.insert(domain.as_ref());
        }
        blacklist
    }
}

/// Phones appearing in more than one place of a report
///
/// Always empty for reports produced by [`aggregate`].
pub fn duplicated_phones(report: &ExtractionReport) -> Vec<String> {
    let mut seen = HashSet::new();
    report
        .all_phones()
        .filter(|phone| !seen.insert(*phone))
        .map(String::from)
        .collect()
}
