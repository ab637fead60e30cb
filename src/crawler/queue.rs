//! Crawl queue
//!
//! FIFO of page URLs. A URL enters the queue at most once per crawl, so deep
//! links that point back at already queued or visited pages are dropped.

use crate::error::Result;
use crate::extraction::links::normalize_page_url;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Pending pages of a crawl
#[derive(Debug, Default)]
pub struct CrawlQueue {
    pending: VecDeque<Url>,
    known: HashSet<String>,
    visited: usize,
}

impl CrawlQueue {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue from user-supplied entries; entries without a scheme get `https://`
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut queue = Self::new();
        for entry in entries {
            queue.push(entry.as_ref())?;
        }
        Ok(queue)
    }

    /// Add a user-supplied entry; false if it was already known
    pub fn push(&mut self, raw: &str) -> Result<bool> {
        Ok(self.push_url(normalize_page_url(raw)?))
    }

    /// Add a parsed URL; false if it was already known
    pub fn push_url(&mut self, mut url: Url) -> bool {
        url.set_fragment(None);
        if !self.known.insert(url.to_string()) {
            return false;
        }
        self.pending.push_back(url);
        true
    }

    /// Take the next page to visit
    pub fn next_page(&mut self) -> Option<Url> {
        let url = self.pending.pop_front()?;
        self.visited += 1;
        Some(url)
    }

    /// Pages still waiting
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Pages handed out so far
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// Whether nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Entries of a queue file: one per line, blank lines and `#` comments skipped
pub fn parse_queue_file(contents: &str) -> Vec<&str> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}
