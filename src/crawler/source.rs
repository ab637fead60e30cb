//! Page sources
//!
//! The crawler does not care how a page gets loaded; it asks a
//! [`PageSource`] for the HTML of a URL. [`HttpPageSource`] fetches pages
//! over HTTP with `reqwest`.

use crate::config::CrawlConfig;
use crate::error::{Error, FetchError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// A loaded page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects; relative links resolve against it
    pub url: Url,
    /// Page markup
    pub html: String,
}

/// Loads pages for the crawler
pub trait PageSource {
    /// Load the page at `url`
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<FetchedPage>> + Send;
}

/// HTTP page loader
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpPageSource {
    /// Build a loader from crawl settings
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.page_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;
        Ok(Self {
            client,
            timeout_secs: config.page_timeout_secs,
        })
    }
}

impl PageSource for HttpPageSource {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.fetch_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpError {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(|e| self.fetch_error(e))?;
        debug!("Fetched {} bytes from {}", html.len(), final_url);

        Ok(FetchedPage {
            url: final_url,
            html,
        })
    }
}

impl HttpPageSource {
    fn fetch_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout_secs).into()
        } else {
            err.into()
        }
    }
}
