//! Browser binding tests
//!
//! Run with: `wasm-pack test --headless --chrome -- --features wasm`

#![cfg(all(target_arch = "wasm32", feature = "wasm"))]

use contact_scout::wasm::{extract_report_json, is_valid_phone, selection_emails};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

// =============================================================================
// Extraction
// =============================================================================

#[wasm_bindgen_test]
fn test_extract_report_in_browser() {
    let json = extract_report_json(
        "<html><body><div><p>jane@acme.com</p><p>+1 415-555-0199</p></div></body></html>",
    );
    let report: serde_json::Value = serde_json::from_str(&json).expect("report json");

    assert_eq!(report["groups"][0]["email"], "jane@acme.com");
    assert_eq!(report["groups"][0]["phones"][0], "+1 415-555-0199");
    assert_eq!(report["loosePhones"].as_array().map(Vec::len), Some(0));
}

#[wasm_bindgen_test]
fn test_extract_report_of_long_listing() {
    let mut html = String::from("<html><body>");
    for i in 0..50 {
        html.push_str(&format!(
            "<div class=\"line-content\"><pre>user{i}@corp.io 555-100-{i:04}</pre></div>"
        ));
    }
    html.push_str("</body></html>");

    let report: serde_json::Value =
        serde_json::from_str(&extract_report_json(&html)).expect("report json");
    assert_eq!(report["groups"].as_array().map(Vec::len), Some(50));
}

// =============================================================================
// Helpers
// =============================================================================

#[wasm_bindgen_test]
fn test_selection_and_phone_helpers() {
    assert_eq!(
        selection_emails("ann@acme.com, bob@acme.com ann@acme.com"),
        vec!["ann@acme.com".to_string(), "bob@acme.com".to_string()]
    );
    assert!(is_valid_phone("+1 415-555-0199"));
    assert!(!is_valid_phone("2023-0456789"));
}
