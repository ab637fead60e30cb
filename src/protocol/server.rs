//! Page agent
//!
//! Serves the page protocol for one loaded page over a line-delimited JSON
//! stream (stdio by default). Extraction runs are serialized: a second
//! `getReport` waits for the first to finish instead of interleaving with
//! it, so two runs never share claim state.

use crate::config::ScanConfig;
use crate::dom::Document;
use crate::error::{ProtocolError, Result};
use crate::extraction::links::LinkExtractor;
use crate::extraction::{badge_count, extract_report, unique_emails, BadgeState, Blacklist};
use crate::protocol::types::{
    PageRequest, PageResponse, RequestEnvelope, ResponseEnvelope, INVALID_REQUEST, UNAVAILABLE,
};
use parking_lot::{Mutex, RwLock};
use std::io::{self, BufRead, Write};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Protocol endpoint for one page
pub struct PageAgent {
    document: Document,
    page_url: Option<Url>,
    config: ScanConfig,
    blacklist: RwLock<Blacklist>,
    scroll_y: Mutex<f64>,
    badge: Mutex<BadgeState>,
    run_lock: tokio::sync::Mutex<()>,
}

impl PageAgent {
    /// Create an agent for a parsed page; the blacklist starts from the config
    pub fn new(document: Document, page_url: Option<Url>, config: ScanConfig) -> Self {
        let blacklist = config.blacklist.iter().collect();
        Self {
            document,
            page_url,
            config,
            blacklist: RwLock::new(blacklist),
            scroll_y: Mutex::new(0.0),
            badge: Mutex::new(BadgeState::new()),
            run_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Serve requests from stdin until it closes
    pub async fn run(&self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock()).await
    }

    /// Serve requests from `input`, writing one response line per request
    #[instrument(skip_all)]
    pub async fn serve<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<()> {
        info!(
            "Page agent ready ({})",
            self.page_url
                .as_ref()
                .map(Url::as_str)
                .unwrap_or("no page URL")
        );

        for line in input.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    error!("Failed to read line: {}", e);
                    continue;
                }
            };

            let Some(response) = self.handle_line(&line).await else {
                continue;
            };

            let json = serde_json::to_string(&response)?;
            debug!("Sending: {}", json);
            writeln!(output, "{}", json).map_err(|_| ProtocolError::ChannelClosed)?;
            output.flush().map_err(|_| ProtocolError::ChannelClosed)?;
        }

        info!("Page agent shutting down");
        Ok(())
    }

    /// Answer one request line; blank lines get no answer
    pub async fn handle_line(&self, line: &str) -> Option<ResponseEnvelope> {
        if line.trim().is_empty() {
            return None;
        }
        debug!("Received: {}", line);

        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                return Some(ResponseEnvelope::parse_error());
            }
        };
        let id = value.get("id").cloned();

        let envelope: RequestEnvelope = match serde_json::from_value(value) {
            Ok(env) => env,
            Err(e) => {
                let err = ProtocolError::InvalidRequest(e.to_string());
                warn!("{}", err);
                return Some(ResponseEnvelope::new(
                    id,
                    PageResponse::error(INVALID_REQUEST, err.to_string()),
                ));
            }
        };

        let response = self.handle_request(envelope.request).await;
        Some(ResponseEnvelope::new(envelope.id, response))
    }

    /// Answer one request
    #[instrument(skip(self))]
    pub async fn handle_request(&self, request: PageRequest) -> PageResponse {
        match request {
            PageRequest::GetReport => {
                let _run = self.run_lock.lock().await;
                let report = extract_report(&self.document, &self.config).await;
                let blacklist = self.blacklist.read().clone();
                PageResponse::Report {
                    data: report.without_blacklisted(&blacklist),
                    popup_scroll_y: *self.scroll_y.lock(),
                }
            }
            PageRequest::GetDeepLinks => {
                let Some(base) = &self.page_url else {
                    return PageResponse::error(UNAVAILABLE, "Page URL unknown");
                };
                match LinkExtractor::deep_links(&self.document, base) {
                    Ok(links) => PageResponse::DeepLinks { links },
                    Err(e) => {
                        warn!("Deep link discovery failed: {}", e);
                        PageResponse::DeepLinks { links: Vec::new() }
                    }
                }
            }
            PageRequest::SaveScrollPosition { scroll_y } => {
                let scroll_y = if scroll_y.is_finite() { scroll_y } else { 0.0 };
                *self.scroll_y.lock() = scroll_y;
                PageResponse::ScrollSaved { scroll_y }
            }
            PageRequest::GetBadge => {
                let count = badge_count(&self.document, &self.blacklist.read());
                let update = self.badge.lock().observe(count);
                PageResponse::Badge { count, update }
            }
            PageRequest::SetBlacklist { domains } => {
                let blacklist: Blacklist = domains.iter().collect();
                let listed = blacklist.len();
                let count = badge_count(&self.document, &blacklist);
                *self.blacklist.write() = blacklist;

                let mut badge = self.badge.lock();
                badge.invalidate();
                info!("Blacklist replaced ({} domains)", listed);
                PageResponse::BlacklistUpdated {
                    domains: listed,
                    badge: badge.observe(count),
                }
            }
            PageRequest::ExtractSelection { text } => PageResponse::Emails {
                emails: unique_emails(&text),
            },
        }
    }

    /// Blacklisted domains
    pub fn blacklist(&self) -> Vec<String> {
        self.blacklist.read().domains().map(String::from).collect()
    }

    /// Last saved scroll offset
    pub fn scroll_y(&self) -> f64 {
        *self.scroll_y.lock()
    }
}
