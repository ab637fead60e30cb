//! Browser bindings
//!
//! Entry points for an extension content script. Results cross the boundary
//! as JSON strings so the script can hand them straight to its messaging
//! layer.

use crate::config::ScanConfig;
use crate::dom::Document;
use crate::extraction::{
    count_emails, extract_report_sync, is_valid_phone_candidate, unique_emails, Blacklist,
};
use wasm_bindgen::prelude::*;

/// Extraction report of an HTML document, as JSON
#[wasm_bindgen(js_name = extractReport)]
pub fn extract_report_json(html: &str) -> String {
    let document = Document::parse(html);
    let report = extract_report_sync(&document, &ScanConfig::default());
    serde_json::to_string(&report).unwrap_or_else(|_| r#"{"groups":[],"loosePhones":[]}"#.to_string())
}

/// Badge count of a page's visible text
#[wasm_bindgen(js_name = badgeCount)]
pub fn badge_count_js(text: &str, blacklist: Vec<String>) -> usize {
    let blacklist: Blacklist = blacklist.iter().collect();
    count_emails(text, &blacklist)
}

/// Distinct emails of a text selection
#[wasm_bindgen(js_name = selectionEmails)]
pub fn selection_emails(text: &str) -> Vec<String> {
    unique_emails(text)
}

/// Phone validity check
#[wasm_bindgen(js_name = isValidPhone)]
pub fn is_valid_phone(candidate: &str) -> bool {
    is_valid_phone_candidate(candidate)
}
