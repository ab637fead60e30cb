//! Badge counting
//!
//! The badge shows how many distinct, non-blacklisted emails a page holds.
//! It is recounted after page mutations settle, so the count only does email
//! matching and never touches phones or the tree structure.

use crate::dom::DomTree;
use crate::extraction::aggregate::Blacklist;
use crate::extraction::patterns::match_emails;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

/// Badge background color
pub const BADGE_COLOR: &str = "#4CAF50";

/// Distinct lower-cased emails of `text` whose domain is not blacklisted
pub fn count_emails(text: &str, blacklist: &Blacklist) -> usize {
    match_emails(text)
        .into_iter()
        .map(str::to_lowercase)
        .filter(|email| !blacklist.blocks(email))
        .collect::<HashSet<_>>()
        .len()
}

/// Badge count of a page's visible text
pub fn badge_count<T: DomTree>(tree: &T, blacklist: &Blacklist) -> usize {
    count_emails(&tree.text_of(tree.scan_root()), blacklist)
}

/// What the host shows on its badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeUpdate {
    /// Email count
    pub count: usize,
    /// Badge text, empty for zero
    pub text: String,
    /// Background color
    pub color: String,
}

impl BadgeUpdate {
    /// Update for a count
    pub fn for_count(count: usize) -> Self {
        Self {
            count,
            text: if count == 0 {
                String::new()
            } else {
                count.to_string()
            },
            color: BADGE_COLOR.to_string(),
        }
    }
}

/// Decides when a new count is worth publishing
#[derive(Debug, Clone, Default)]
pub struct BadgeState {
    last: Option<usize>,
}

impl BadgeState {
    /// New state; the first observation always publishes
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a count, returning an update when it should be published
    ///
    /// A zero count is republished every time so a badge cleared by the host
    /// gets resynchronized.
    pub fn observe(&mut self, count: usize) -> Option<BadgeUpdate> {
        if self.last == Some(count) && count != 0 {
            return None;
        }
        self.last = Some(count);
        Some(BadgeUpdate::for_count(count))
    }

    /// Forget the last count so the next observation publishes
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Last published count
    pub fn last(&self) -> Option<usize> {
        self.last
    }
}

/// Source of a page's current visible text
pub trait TextSource {
    /// Rendered text of the page right now
    fn visible_text(&self) -> String;
}

impl<F: Fn() -> String> TextSource for F {
    fn visible_text(&self) -> String {
        self()
    }
}

/// Something happened on the page
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// The tree changed
    Mutated,
    /// The blacklist was replaced
    BlacklistChanged(Blacklist),
}

/// Recounts the badge after page mutations settle
pub struct BadgeWatcher<S> {
    source: S,
    blacklist: Blacklist,
    debounce: Duration,
    state: BadgeState,
}

impl<S: TextSource> BadgeWatcher<S> {
    /// Create a watcher
    pub fn new(source: S, blacklist: Blacklist, debounce: Duration) -> Self {
        Self {
            source,
            blacklist,
            debounce,
            state: BadgeState::new(),
        }
    }

    /// Count now and return an update if one is due
    pub fn recount(&mut self) -> Option<BadgeUpdate> {
        let count = count_emails(&self.source.visible_text(), &self.blacklist);
        debug!("Badge recount: {} emails", count);
        self.state.observe(count)
    }

    /// Publish the initial count, then follow page events until the event
    /// channel closes or nobody listens for updates
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<PageEvent>,
        updates: mpsc::Sender<BadgeUpdate>,
    ) {
        info!("Badge watcher started (debounce {:?})", self.debounce);
        let mut deadline: Option<Instant> = None;

        if !self.publish(&updates).await {
            return;
        }

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(PageEvent::Mutated) => {
                        deadline = Some(Instant::now() + self.debounce);
                    }
                    Some(PageEvent::BlacklistChanged(blacklist)) => {
                        self.blacklist = blacklist;
                        self.state.invalidate();
                        deadline = None;
                        if !self.publish(&updates).await {
                            break;
                        }
                    }
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    if !self.publish(&updates).await {
                        break;
                    }
                }
            }
        }

        info!("Badge watcher stopped");
    }

    async fn publish(&mut self, updates: &mpsc::Sender<BadgeUpdate>) -> bool {
        match self.recount() {
            Some(update) => updates.send(update).await.is_ok(),
            None => true,
        }
    }
}
