//! Crawl loop

use crate::config::ScanConfig;
use crate::crawler::queue::CrawlQueue;
use crate::crawler::source::{FetchedPage, PageSource};
use crate::crawler::PageContacts;
use crate::dom::Document;
use crate::error::{FetchError, Result};
use crate::extraction::links::LinkExtractor;
use crate::extraction::{extract_report, Blacklist};
use chrono::Utc;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Outcome of a crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    /// Pages that yielded at least one email or phone, visit order
    pub results: Vec<PageContacts>,
    /// Pages requested
    pub visited: usize,
    /// Pages that failed to load
    pub failed: usize,
    /// Deep links added to the queue
    pub deep_links_added: usize,
}

/// Runs a crawl over a page source
pub struct CrawlRunner<S> {
    source: S,
    config: ScanConfig,
    blacklist: Blacklist,
}

impl<S: PageSource> CrawlRunner<S> {
    /// Create a runner; the blacklist comes from the config
    pub fn new(source: S, config: ScanConfig) -> Self {
        let blacklist = config.blacklist.iter().collect();
        Self {
            source,
            config,
            blacklist,
        }
    }

    /// Visit pages until the queue drains or the page cap is reached
    #[instrument(skip_all, fields(queued = queue.pending()))]
    pub async fn run(&self, mut queue: CrawlQueue) -> CrawlSummary {
        let crawl = &self.config.crawl;
        let mut summary = CrawlSummary::default();
        info!("Crawl started with {} pages queued", queue.pending());

        while summary.visited < crawl.max_pages {
            let Some(url) = queue.next_page() else { break };
            summary.visited += 1;
            info!("Visiting {}", url);

            match self.load(&url).await {
                Ok(page) => {
                    let document = Document::parse(&page.html);
                    if let Some(contacts) = self.scan(&url, &document).await {
                        info!(
                            "Found {} emails, {} phones",
                            contacts.emails.len(),
                            contacts.phones.len()
                        );
                        summary.results.push(contacts);
                    }
                    if crawl.follow_deep_links {
                        summary.deep_links_added += self.enqueue_deep_links(&document, &page.url, &mut queue);
                    }
                }
                Err(e) => {
                    warn!("Skipping {}: {}", url, e);
                    summary.failed += 1;
                }
            }

            if !queue.is_empty() && crawl.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(crawl.delay_ms)).await;
            }
        }

        info!(
            "Crawl finished: {} pages visited, {} with contacts, {} failed",
            summary.visited,
            summary.results.len(),
            summary.failed
        );
        summary
    }

    async fn load(&self, url: &Url) -> Result<FetchedPage> {
        let crawl = &self.config.crawl;
        let timeout = Duration::from_secs(crawl.page_timeout_secs);
        let page = tokio::time::timeout(timeout, self.source.fetch(url))
            .await
            .map_err(|_| FetchError::Timeout(crawl.page_timeout_secs))??;

        if crawl.settle_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(crawl.settle_delay_ms)).await;
        }
        Ok(page)
    }

    async fn scan(&self, url: &Url, document: &Document) -> Option<PageContacts> {
        let report = extract_report(document, &self.config)
            .await
            .without_blacklisted(&self.blacklist);
        let (emails, phones) = report.flatten();

        let contacts = PageContacts {
            url: url.to_string(),
            emails: dedup(emails),
            phones: dedup(phones),
            scanned_at: Utc::now(),
        };
        (!contacts.is_empty()).then_some(contacts)
    }

    fn enqueue_deep_links(&self, document: &Document, page_url: &Url, queue: &mut CrawlQueue) -> usize {
        let links = match LinkExtractor::deep_links(document, page_url) {
            Ok(links) => links,
            Err(e) => {
                warn!("Deep link discovery failed: {}", e);
                return 0;
            }
        };

        let added = links
            .into_iter()
            .filter_map(|link| Url::parse(&link).ok())
            .filter(|link| queue.push_url(link.clone()))
            .count();
        debug!("Queued {} deep links from {}", added, page_url);
        added
    }
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
