//! Pattern matchers
//!
//! Stateless recognizers for email and phone candidates plus the phone
//! validity filter. Regexes over-match on real pages (prices, dates, listing
//! ids look like phone numbers), so every phone candidate goes through
//! [`PhoneHeuristics::accepts`] before it is used anywhere.

use crate::config::PhoneHeuristics;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// `local@domain.tld`, final label at least two letters
const EMAIL_PATTERN: &str =
    r"(?-u:\b)[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}(?-u:\b)";

/// Optional `+` and country code, then digit groups separated by spaces,
/// dashes or parentheses. The lookbehind keeps it out of identifiers, URLs
/// and decimals; the lookahead refuses a trailing decimal or digit.
const PHONE_PATTERN: &str = concat!(
    r"(?<![A-Za-z0-9_/.=\-])",
    r"(?:",
    r"(?:\+?[0-9]{1,4}[ \-]?)?[0-9]{5}[ \-]?[0-9]{5}",
    r"|",
    r"(?:\+?[0-9]{1,4}[ \-]?)?(?:\(?[0-9]{2,5}\)?[ \-]?)?[0-9]{3,5}[ \-]?[0-9]{3,5}",
    r")",
    r"(?![.0-9])",
);

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"));

static PHONE_RE: LazyLock<fancy_regex::Regex> =
    LazyLock::new(|| fancy_regex::Regex::new(PHONE_PATTERN).expect("phone pattern is valid"));

static DEFAULT_HEURISTICS: LazyLock<PhoneHeuristics> = LazyLock::new(PhoneHeuristics::default);

/// All email-shaped substrings of `text`, in order, original casing kept
pub fn match_emails(text: &str) -> Vec<&str> {
    EMAIL_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// All phone-shaped substrings of `text`, in order, unvalidated
pub fn match_phone_candidates(text: &str) -> Vec<&str> {
    PHONE_RE
        .find_iter(text)
        .map_while(|found| match found {
            Ok(m) => Some(m.as_str()),
            Err(e) => {
                // The iterator does not advance past an engine error.
                debug!("Phone scan stopped early: {}", e);
                None
            }
        })
        .collect()
}

/// Validity check with the default heuristics
pub fn is_valid_phone_candidate(candidate: &str) -> bool {
    DEFAULT_HEURISTICS.accepts(candidate)
}

/// Distinct emails of a text selection, first occurrence order
pub fn unique_emails(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    match_emails(text)
        .into_iter()
        .filter(|email| seen.insert(*email))
        .map(String::from)
        .collect()
}

/// Digits of a phone string, separators dropped
pub fn phone_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Domain part of an email, lower-cased
pub fn email_domain(email: &str) -> Option<String> {
    email
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_ascii_lowercase())
        .filter(|domain| !domain.is_empty())
}

impl PhoneHeuristics {
    /// Whether a phone candidate survives every false-positive filter
    pub fn accepts(&self, candidate: &str) -> bool {
        PhoneCandidate::new(candidate).is_valid(self)
    }

    /// Valid, distinct phones of `text` in order of appearance
    pub fn valid_phones<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut seen = HashSet::new();
        match_phone_candidates(text)
            .into_iter()
            .map(PhoneCandidate::new)
            .filter(|candidate| candidate.is_valid(self))
            .map(|candidate| candidate.raw)
            .filter(|raw| seen.insert(*raw))
            .collect()
    }

    /// `2023-...`: a year immediately followed by a dash
    fn has_year_prefix(&self, candidate: &str) -> bool {
        let bytes = candidate.as_bytes();
        if bytes.len() < 5 || bytes[4] != b'-' || !bytes[..4].iter().all(u8::is_ascii_digit) {
            return false;
        }
        candidate[..4]
            .parse::<u32>()
            .map(|year| self.year_range.contains(&year))
            .unwrap_or(false)
    }

    /// Bare digit runs that recur as job/listing ids
    fn is_unseparated_listing_id(&self, candidate: &str, digits: &str) -> bool {
        digits.len() == self.unseparated_id_digits
            && self
                .unseparated_id_prefixes
                .iter()
                .any(|prefix| digits.starts_with(prefix.as_str()))
            && !candidate.contains(['-', ' '])
    }
}

/// An email occurrence found during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCandidate<N> {
    /// Matched text, original casing
    pub raw: String,
    /// Lower-cased form, the dedup key
    pub canonical: String,
    /// Context anchor the email was found in
    pub anchor: N,
}

impl<N> EmailCandidate<N> {
    /// Build a candidate from a raw match
    pub fn new(raw: &str, anchor: N) -> Self {
        Self {
            raw: raw.to_string(),
            canonical: raw.to_lowercase(),
            anchor,
        }
    }

    /// Lower-cased domain part
    pub fn domain(&self) -> Option<String> {
        email_domain(&self.canonical)
    }
}

/// A phone occurrence found during a scan
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneCandidate<'t> {
    /// Matched text with its original separators, the dedup key
    pub raw: &'t str,
    /// Digits only
    pub digits: String,
}

impl<'t> PhoneCandidate<'t> {
    /// Build a candidate from a raw match
    pub fn new(raw: &'t str) -> Self {
        Self {
            raw,
            digits: phone_digits(raw),
        }
    }

    /// Whether the candidate survives every false-positive filter
    pub fn is_valid(&self, heuristics: &PhoneHeuristics) -> bool {
        let len = self.digits.len();
        if len < heuristics.min_digits || len > heuristics.max_digits {
            return false;
        }
        if heuristics.reject_year_prefix && heuristics.has_year_prefix(self.raw) {
            return false;
        }
        !heuristics.is_unseparated_listing_id(self.raw, &self.digits)
    }
}
