//! Per-run scan state
//!
//! Created fresh for every extraction run and consumed by
//! [`aggregate`](crate::extraction::aggregate::aggregate). Nothing here is
//! shared between runs.

use crate::extraction::aggregate::ContactGroup;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use uuid::Uuid;

/// Mutable state of one extraction run
#[derive(Debug)]
pub struct ScanContext<N> {
    run_id: Uuid,
    /// Canonical (lower-cased) emails already grouped
    seen_emails: HashSet<String>,
    /// Raw phones attached to some group
    claimed_phones: HashSet<String>,
    groups: Vec<ContactGroup>,
    /// Valid phones of the scanned spans, discovery order
    page_phones: Vec<String>,
    page_phone_set: HashSet<String>,
    /// Valid phones of an ancestor's rendered text
    phone_cache: HashMap<N, Vec<String>>,
}

impl<N> ScanContext<N> {
    /// Empty context with a fresh run id
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            seen_emails: HashSet::new(),
            claimed_phones: HashSet::new(),
            groups: Vec::new(),
            page_phones: Vec::new(),
            page_phone_set: HashSet::new(),
            phone_cache: HashMap::new(),
        }
    }

    /// Identifier used in log spans
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Record an email; true only the first time its canonical form is seen
    pub fn first_sighting(&mut self, canonical: &str) -> bool {
        if self.seen_emails.contains(canonical) {
            return false;
        }
        self.seen_emails.insert(canonical.to_string())
    }

    /// Claim a phone for a group; false if someone else already has it
    pub fn claim(&mut self, phone: &str) -> bool {
        if self.claimed_phones.contains(phone) {
            return false;
        }
        self.claimed_phones.insert(phone.to_string())
    }

    /// Whether a phone is attached to some group
    pub fn is_claimed(&self, phone: &str) -> bool {
        self.claimed_phones.contains(phone)
    }

    /// Append a finished group
    pub fn push_group(&mut self, group: ContactGroup) {
        self.groups.push(group);
    }

    /// Remember a valid phone seen anywhere on the page
    pub fn record_page_phone(&mut self, phone: &str) {
        if self.page_phone_set.insert(phone.to_string()) {
            self.page_phones.push(phone.to_string());
        }
    }

    /// Groups so far
    pub fn groups(&self) -> &[ContactGroup] {
        &self.groups
    }

    pub(crate) fn into_parts(self) -> (Vec<ContactGroup>, Vec<String>, HashSet<String>) {
        (self.groups, self.page_phones, self.claimed_phones)
    }
}

impl<N: Copy + Eq + Hash> ScanContext<N> {
    /// Valid phones in the rendered text of `node`, computed once per run
    pub fn phones_at<F>(&mut self, node: N, compute: F) -> &[String]
    where
        F: FnOnce() -> Vec<String>,
    {
        self.phone_cache.entry(node).or_insert_with(compute)
    }
}

impl<N> Default for ScanContext<N> {
    fn default() -> Self {
        Self::new()
    }
}
