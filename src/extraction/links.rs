//! Link extraction
//!
//! Classifies the anchors of a page and picks out the same-site pages that
//! are likely to carry contact details (contact, about, careers and so on),
//! which the crawler queues after the page itself.

use crate::dom::DomTree;
use crate::error::{FetchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, instrument};
use url::Url;

/// Words that mark a link as a likely contact page
pub const DEEP_LINK_KEYWORDS: &[&str] = &[
    "contact",
    "about",
    "career",
    "job",
    "team",
    "staff",
    "people",
    "impressum",
    "support",
    "office",
    "location",
];

/// Type of link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Internal link (same site)
    Internal,
    /// External link (different site)
    External,
    /// Anchor link (same page)
    Anchor,
    /// mailto: link
    Email,
    /// tel: link
    Phone,
    /// JavaScript link
    JavaScript,
    /// Other/unknown
    Other,
}

/// An extracted link with context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedLink {
    /// Resolved URL, or the raw href when it does not resolve
    pub url: String,
    /// Link text content
    pub text: String,
    /// Title attribute
    pub title: Option<String>,
    /// Type of link
    pub link_type: LinkType,
    /// Rel attribute
    pub rel: Option<String>,
    /// Whether it opens in a new tab
    pub new_tab: bool,
    /// Position in document (order found)
    pub position: usize,
}

impl ExtractedLink {
    /// Whether the href or the visible text names a contact-like page
    pub fn mentions_contact_keyword(&self) -> bool {
        let url = self.url.to_lowercase();
        let text = self.text.to_lowercase();
        DEEP_LINK_KEYWORDS
            .iter()
            .any(|keyword| url.contains(keyword) || text.contains(keyword))
    }
}

/// Host without a leading `www.`
fn site_of(url: &Url) -> Option<String> {
    url.host_str().map(|host| {
        let host = host.to_ascii_lowercase();
        host.strip_prefix("www.").map(String::from).unwrap_or(host)
    })
}

/// Whether two URLs belong to the same site (`www.` ignored)
pub fn same_site(a: &Url, b: &Url) -> bool {
    matches!((site_of(a), site_of(b)), (Some(x), Some(y)) if x == y)
}

/// Classify an href relative to the page it appears on
pub fn classify(href: &str, base: &Url) -> (LinkType, Option<Url>) {
    let trimmed = href.trim();
    let lower = trimmed.to_ascii_lowercase();

    if trimmed.is_empty() || trimmed.starts_with('#') {
        return (LinkType::Anchor, None);
    }
    if lower.starts_with("mailto:") {
        return (LinkType::Email, None);
    }
    if lower.starts_with("tel:") {
        return (LinkType::Phone, None);
    }
    if lower.starts_with("javascript:") {
        return (LinkType::JavaScript, None);
    }

    match base.join(trimmed) {
        Ok(mut url) if matches!(url.scheme(), "http" | "https") => {
            url.set_fragment(None);
            let link_type = if same_site(&url, base) {
                LinkType::Internal
            } else {
                LinkType::External
            };
            (link_type, Some(url))
        }
        _ => (LinkType::Other, None),
    }
}

/// Link extraction functionality
pub struct LinkExtractor;

impl LinkExtractor {
    /// Extract all links of a page located at `base`
    #[instrument(skip(tree, base), fields(base = %base))]
    pub fn extract_all<T: DomTree>(tree: &T, base: &Url) -> Result<Vec<ExtractedLink>> {
        let anchors = tree.query_all("a[href]")?;

        let links: Vec<ExtractedLink> = anchors
            .into_iter()
            .enumerate()
            .map(|(position, node)| {
                let href = tree.attr(node, "href").unwrap_or_default();
                let (link_type, resolved) = classify(href, base);
                ExtractedLink {
                    url: resolved
                        .map(String::from)
                        .unwrap_or_else(|| href.trim().to_string()),
                    text: tree.text_of(node).chars().take(500).collect(),
                    title: tree.attr(node, "title").map(String::from),
                    link_type,
                    rel: tree.attr(node, "rel").map(String::from),
                    new_tab: tree.attr(node, "target") == Some("_blank"),
                    position,
                }
            })
            .collect();

        debug!("Extracted {} links", links.len());
        Ok(links)
    }

    /// Extract only internal links
    pub fn extract_internal<T: DomTree>(tree: &T, base: &Url) -> Result<Vec<ExtractedLink>> {
        Ok(Self::extract_all(tree, base)?
            .into_iter()
            .filter(|l| l.link_type == LinkType::Internal)
            .collect())
    }

    /// Same-site pages worth visiting for contact details, document order,
    /// deduplicated, the page itself excluded
    #[instrument(skip(tree, base), fields(base = %base))]
    pub fn deep_links<T: DomTree>(tree: &T, base: &Url) -> Result<Vec<String>> {
        let mut page = base.clone();
        page.set_fragment(None);

        let mut seen = HashSet::new();
        seen.insert(page.to_string());

        let links: Vec<String> = Self::extract_internal(tree, base)?
            .into_iter()
            .filter(ExtractedLink::mentions_contact_keyword)
            .map(|l| l.url)
            .filter(|url| seen.insert(url.clone()))
            .collect();

        debug!("Found {} deep links", links.len());
        Ok(links)
    }
}

/// Parse a page URL, defaulting to `https://` when no scheme is given
pub fn normalize_page_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let candidate = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };
    Url::parse(&candidate).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", raw, e)).into())
}
