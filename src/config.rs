//! Scan configuration
//!
//! Every heuristic the engine uses is tuned empirically, so each one lives
//! here instead of as a hard-coded constant. All fields default to the values
//! the extension ships with; a JSON file only needs to name what it changes.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable naming a JSON config file
pub const CONFIG_ENV_VAR: &str = "CONTACT_SCOUT_CONFIG";

/// Heuristics that decide whether a phone-shaped candidate is kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneHeuristics {
    /// Fewest digits a phone may have (default: 8)
    pub min_digits: usize,
    /// Most digits a phone may have (default: 15)
    pub max_digits: usize,
    /// Reject candidates that start with `<year>-` (default: true)
    pub reject_year_prefix: bool,
    /// Years treated as identifier prefixes (default: 2020..=2039)
    pub year_range: RangeInclusive<u32>,
    /// Digit prefixes of unseparated listing ids (default: `["305"]`)
    pub unseparated_id_prefixes: Vec<String>,
    /// Exact digit count of those listing ids (default: 10)
    pub unseparated_id_digits: usize,
}

impl Default for PhoneHeuristics {
    fn default() -> Self {
        Self {
            min_digits: 8,
            max_digits: 15,
            reject_year_prefix: true,
            year_range: 2020..=2039,
            unseparated_id_prefixes: vec!["305".to_string()],
            unseparated_id_digits: 10,
        }
    }
}

/// How emails pick up phones from their surroundings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociationPolicy {
    /// Ancestor levels inspected, the context anchor included (default: 4)
    pub max_depth: usize,
    /// Stop at the closest level holding a valid phone (default: true)
    pub stop_at_first_match: bool,
}

impl Default for AssociationPolicy {
    fn default() -> Self {
        Self {
            max_depth: 4,
            stop_at_first_match: true,
        }
    }
}

/// Multi-page crawl settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Upper bound on pages visited in one crawl (default: 50)
    pub max_pages: usize,
    /// Page-load timeout in seconds (default: 15)
    pub page_timeout_secs: u64,
    /// Wait after a page loads before scanning it (default: 0)
    pub settle_delay_ms: u64,
    /// Pause between pages (default: 1000)
    pub delay_ms: u64,
    /// Queue same-site contact/about/career pages (default: true)
    pub follow_deep_links: bool,
    /// User agent sent with page requests
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 50,
            page_timeout_secs: 15,
            settle_delay_ms: 0,
            delay_ms: 1000,
            follow_deep_links: true,
            user_agent: format!("contact-scout/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Configuration for one extraction context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Phone validity heuristics
    pub phone: PhoneHeuristics,
    /// Email-to-phone association policy
    pub association: AssociationPolicy,
    /// Text spans shorter than this are not scanned (default: 5)
    pub min_span_chars: usize,
    /// Page text size above which the whole body is scanned in one pass (default: 5 MB)
    pub oversized_text_bytes: usize,
    /// Scanning time per slice before yielding (default: 15)
    pub slice_budget_ms: u64,
    /// Selectors of known repeating list items, tried in order
    pub structured_selectors: Vec<String>,
    /// Delay between a page mutation and the badge recount (default: 300)
    pub badge_debounce_ms: u64,
    /// Group emails by domain when presenting results (default: false)
    pub grouping_enabled: bool,
    /// Domains whose emails are hidden from reports and badge counts
    pub blacklist: Vec<String>,
    /// Crawl settings
    pub crawl: CrawlConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            phone: PhoneHeuristics::default(),
            association: AssociationPolicy::default(),
            min_span_chars: 5,
            oversized_text_bytes: 5_000_000,
            slice_budget_ms: 15,
            structured_selectors: vec![".line-content pre".to_string()],
            badge_debounce_ms: 300,
            grouping_enabled: false,
            blacklist: Vec::new(),
            crawl: CrawlConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Create a new config builder
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Load a config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: ScanConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `CONTACT_SCOUT_CONFIG` if it is set, defaults otherwise
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR).ok().filter(|p| !p.is_empty()) {
            Some(path) => Self::load(path),
            None => {
                debug!("{} not set, using default config", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.association.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "association.max_depth",
                message: "must be at least 1".to_string(),
            });
        }
        if self.phone.min_digits > self.phone.max_digits {
            return Err(ConfigError::InvalidValue {
                field: "phone.min_digits",
                message: format!(
                    "{} exceeds max_digits {}",
                    self.phone.min_digits, self.phone.max_digits
                ),
            });
        }
        Ok(())
    }

    /// Time budget of one scheduler slice
    pub fn slice_budget(&self) -> Duration {
        Duration::from_millis(self.slice_budget_ms)
    }

    /// Debounce applied before a badge recount
    pub fn badge_debounce(&self) -> Duration {
        Duration::from_millis(self.badge_debounce_ms)
    }
}

/// Builder for ScanConfig
#[derive(Default)]
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl ScanConfigBuilder {
    /// Set the ancestor search depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.association.max_depth = depth;
        self
    }

    /// Keep climbing past the first level holding a phone
    pub fn stop_at_first_match(mut self, stop: bool) -> Self {
        self.config.association.stop_at_first_match = stop;
        self
    }

    /// Set the minimum span length
    pub fn min_span_chars(mut self, chars: usize) -> Self {
        self.config.min_span_chars = chars;
        self
    }

    /// Set the oversized-page threshold
    pub fn oversized_text_bytes(mut self, bytes: usize) -> Self {
        self.config.oversized_text_bytes = bytes;
        self
    }

    /// Set the per-slice time budget
    pub fn slice_budget_ms(mut self, ms: u64) -> Self {
        self.config.slice_budget_ms = ms;
        self
    }

    /// Replace the structured list-item selectors
    pub fn structured_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.structured_selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    /// Set phone heuristics
    pub fn phone(mut self, phone: PhoneHeuristics) -> Self {
        self.config.phone = phone;
        self
    }

    /// Add a blacklisted domain
    pub fn blacklist<S: Into<String>>(mut self, domain: S) -> Self {
        self.config.blacklist.push(domain.into().to_lowercase());
        self
    }

    /// Set the badge debounce delay
    pub fn badge_debounce_ms(mut self, ms: u64) -> Self {
        self.config.badge_debounce_ms = ms;
        self
    }

    /// Enable/disable grouping by domain
    pub fn grouping_enabled(mut self, enabled: bool) -> Self {
        self.config.grouping_enabled = enabled;
        self
    }

    /// Set crawl settings
    pub fn crawl(mut self, crawl: CrawlConfig) -> Self {
        self.config.crawl = crawl;
        self
    }

    /// Build the config
    pub fn build(self) -> ScanConfig {
        self.config
    }
}
