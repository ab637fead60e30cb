//! Property-based testing for the extraction engine.
//!
//! Generates random pages of nested blocks holding emails, phones and filler
//! text, and checks the invariants every report must satisfy.

use contact_scout::dom::Document;
use contact_scout::extraction::{
    extract_report_sync, is_valid_phone_candidate, match_emails, match_phone_candidates,
    ExtractionJob, Step,
};
use contact_scout::ScanConfig;
use proptest::prelude::*;
use std::collections::HashSet;
use std::time::Duration;

// ============================================================================
// STRATEGIES
// ============================================================================

/// Emails from a small pool, so pages repeat them in different casings
pub fn arb_email() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("ann"), Just("bob"), Just("sales"), Just("info")],
        prop_oneof![Just("acme.com"), Just("shop.io"), Just("mail.example.org")],
        any::<bool>(),
    )
        .prop_map(|(user, domain, upper)| {
            let email = format!("{user}@{domain}");
            if upper {
                email.to_uppercase()
            } else {
                email
            }
        })
}

/// Separated phone numbers in a few national shapes
pub fn arb_phone() -> impl Strategy<Value = String> {
    prop_oneof![
        "555-[0-9]{3}-[0-9]{4}",
        "\\+1 [2-9][0-9]{2}-555-[0-9]{4}",
        "\\+44 20 [0-9]{4} [0-9]{4}",
    ]
}

/// One block's text
pub fn arb_content() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_email(),
        arb_phone(),
        (arb_email(), arb_phone()).prop_map(|(e, p)| format!("{e} {p}")),
        "[a-z]{3,10}( [a-z]{3,10}){0,4}",
    ]
}

/// A page of blocks, each nested a random number of `div`s deep
pub fn arb_page() -> impl Strategy<Value = String> {
    prop::collection::vec((0usize..6, arb_content()), 0..24).prop_map(|blocks| {
        let mut html = String::from("<html><body>");
        for (depth, content) in blocks {
            html.push_str(&"<div>".repeat(depth));
            html.push_str(&format!("<p>{content}</p>"));
            html.push_str(&"</div>".repeat(depth));
        }
        html.push_str("</body></html>");
        html
    })
}

/// A structured listing of `line-content` rows
pub fn arb_listing() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_content(), 1..40).prop_map(|rows| {
        let mut html = String::from("<html><body>");
        for row in rows {
            html.push_str(&format!("<div class=\"line-content\"><pre>{row}</pre></div>"));
        }
        html.push_str("</body></html>");
        html
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // ========================================================================
    // Matchers
    // ========================================================================

    #[test]
    fn prop_email_matches_are_substrings(text in ".{0,200}") {
        for email in match_emails(&text) {
            prop_assert!(text.contains(email));
            prop_assert!(email.contains('@'));
        }
    }

    #[test]
    fn prop_valid_phones_have_digit_bounds(text in "[0-9 +()\\-a-z.]{0,60}") {
        for candidate in match_phone_candidates(&text) {
            if is_valid_phone_candidate(candidate) {
                let digits = candidate.chars().filter(char::is_ascii_digit).count();
                prop_assert!((8..=15).contains(&digits), "{} has {} digits", candidate, digits);
            }
        }
    }

    #[test]
    fn prop_generated_phones_are_valid(phone in arb_phone()) {
        prop_assert!(is_valid_phone_candidate(&phone));
        prop_assert_eq!(match_phone_candidates(&phone), vec![phone.as_str()]);
    }

    // ========================================================================
    // Report invariants
    // ========================================================================

    #[test]
    fn prop_emails_unique_case_insensitively(page in arb_page()) {
        let report = extract_report_sync(&Document::parse(&page), &ScanConfig::default());
        let canonical: HashSet<String> = report.emails().map(str::to_lowercase).collect();
        prop_assert_eq!(canonical.len(), report.groups.len());
    }

    #[test]
    fn prop_phones_claimed_at_most_once(page in arb_page()) {
        let report = extract_report_sync(&Document::parse(&page), &ScanConfig::default());

        let mut grouped = HashSet::new();
        for phone in report.groups.iter().flat_map(|g| g.phones.iter()) {
            prop_assert!(grouped.insert(phone.clone()), "{} claimed twice", phone);
        }
        for phone in &report.loose_phones {
            prop_assert!(!grouped.contains(phone), "{} is both grouped and loose", phone);
        }
    }

    #[test]
    fn prop_every_phone_is_valid(page in arb_page()) {
        let report = extract_report_sync(&Document::parse(&page), &ScanConfig::default());
        for phone in report.all_phones() {
            prop_assert!(is_valid_phone_candidate(phone));
        }
    }

    #[test]
    fn prop_extraction_is_idempotent(page in arb_page()) {
        let doc = Document::parse(&page);
        let config = ScanConfig::default();
        prop_assert_eq!(extract_report_sync(&doc, &config), extract_report_sync(&doc, &config));
    }

    #[test]
    fn prop_slicing_does_not_change_result(page in arb_listing()) {
        let doc = Document::parse(&page);
        let config = ScanConfig::default();

        let mut job = ExtractionJob::new(&doc, &config);
        let sliced = loop {
            if let Step::Done(report) = job.step(Duration::ZERO) {
                break report;
            }
        };

        prop_assert_eq!(sliced, extract_report_sync(&doc, &config));
    }
}
