//! Extraction engine tests
//!
//! End-to-end runs of the scanner, associator, scheduler and aggregator over
//! parsed HTML pages.

use contact_scout::dom::Document;
use contact_scout::extraction::{
    extract_report, extract_report_sync, Blacklist, ContactGroup, ExtractionJob,
    ExtractionReport, JobState, ScanMode, ScanPlan, Step,
};
use contact_scout::ScanConfig;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::time::Duration;

fn group(email: &str, phones: &[&str]) -> ContactGroup {
    ContactGroup::new(email, phones.iter().map(|p| p.to_string()).collect())
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn listing(rows: usize) -> String {
    let mut html = String::from("<html><body><div class=\"dataset\">");
    for i in 0..rows {
        html.push_str(&format!(
            "<div class=\"line-content\"><pre>{{\"name\": \"Row {i}\", \"email\": \"row{i}@list.io\", \"phone\": \"+1 212-555-{i:04}\"}}</pre></div>"
        ));
    }
    html.push_str("</div></body></html>");
    html
}

#[tokio::test]
async fn test_email_and_phone_in_same_container() {
    let doc = Document::parse(
        "<html><body><div class=\"card\">Contact: jane@acme.com, call +1 415-555-0199</div></body></html>",
    );
    let report = extract_report(&doc, &ScanConfig::default()).await;

    assert_eq!(
        report,
        ExtractionReport {
            groups: vec![group("jane@acme.com", &["+1 415-555-0199"])],
            loose_phones: vec![],
        }
    );
}

#[test]
fn test_email_between_cjk_text() {
    let doc = Document::parse(
        "<html><body><p>联系邮箱：jane@acme.com电话：+86 10-8888-6666</p></body></html>",
    );
    let report = extract_report_sync(&doc, &ScanConfig::default());

    assert_eq!(report.groups, vec![group("jane@acme.com", &["+86 10-8888-6666"])]);
    assert!(report.loose_phones.is_empty());
}

#[test]
fn test_nbsp_inside_phone_is_not_collapsed() {
    let doc = Document::parse(
        "<html><body><p>jane@acme.com tel +1&nbsp;415-555-0199</p></body></html>",
    );
    let report = extract_report_sync(&doc, &ScanConfig::default());

    assert_eq!(report.groups, vec![group("jane@acme.com", &["415-555-0199"])]);
    assert!(report.loose_phones.is_empty());
}

#[tokio::test]
async fn test_phone_beyond_depth_bound_stays_loose() {
    let doc = Document::parse(
        "<html><body><section>\
           <div><div><div><p>jane@acme.com</p></div></div></div>\
           <p>555-123-4567</p>\
         </section></body></html>",
    );
    let report = extract_report(&doc, &ScanConfig::default()).await;

    assert_eq!(report.groups, vec![group("jane@acme.com", &[])]);
    assert_eq!(report.loose_phones, strings(&["555-123-4567"]));
}

#[tokio::test]
async fn test_repeated_email_keeps_first_occurrence() {
    let doc = Document::parse(
        "<html><body>\
           <div><p>jane@acme.com</p><p>555-123-4567</p></div>\
           <div><p>JANE@acme.com</p><p>+1 415-555-0199</p></div>\
         </body></html>",
    );
    let report = extract_report(&doc, &ScanConfig::default()).await;

    assert_eq!(report.groups, vec![group("jane@acme.com", &["555-123-4567"])]);
    assert_eq!(report.loose_phones, strings(&["+1 415-555-0199"]));
}

#[tokio::test]
async fn test_first_email_claims_shared_phone() {
    let doc = Document::parse(
        "<html><body><div class=\"team\">\
           <p>ann@acme.com</p><p>bob@acme.com</p><p>Office: 555-123-4567</p>\
         </div></body></html>",
    );
    let report = extract_report(&doc, &ScanConfig::default()).await;

    assert_eq!(
        report.groups,
        vec![
            group("ann@acme.com", &["555-123-4567"]),
            group("bob@acme.com", &[]),
        ]
    );
    assert!(report.loose_phones.is_empty());
}

#[tokio::test]
async fn test_false_positive_numbers_are_dropped() {
    let doc = Document::parse(
        "<html><body>\
           <p>Ref 2023-0456789 posted</p>\
           <p>Job 3055551234 open</p>\
           <p>Price 1234.56 USD</p>\
           <p>Desk 305-555-1234</p>\
         </body></html>",
    );
    let report = extract_report(&doc, &ScanConfig::default()).await;

    assert!(report.groups.is_empty());
    assert_eq!(report.loose_phones, strings(&["305-555-1234"]));
}

#[tokio::test]
async fn test_scripts_and_styles_are_not_scanned() {
    let doc = Document::parse(
        "<html><head><style>.x{}</style></head><body>\
           <script>var admin = 'root@internal.io'; var tel = '555-000-1111';</script>\
           <p>sales@shop.io</p>\
         </body></html>",
    );
    let report = extract_report(&doc, &ScanConfig::default()).await;

    assert_eq!(report.groups, vec![group("sales@shop.io", &[])]);
    assert!(report.loose_phones.is_empty());
}

#[tokio::test]
async fn test_extraction_is_idempotent() {
    let doc = Document::parse(
        "<html><body>\
           <div><p>jane@acme.com</p><p>555-123-4567</p></div>\
           <div><p>bob@acme.com</p></div>\
           <footer>HQ +44 20 7946 0958</footer>\
         </body></html>",
    );
    let config = ScanConfig::default();
    let first = extract_report(&doc, &config).await;
    let second = extract_report(&doc, &config).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_structured_listing_chunked_equals_unbounded() {
    let doc = Document::parse(&listing(250));
    let chunked = ScanConfig::builder().slice_budget_ms(0).build();

    let plan = ScanPlan::for_tree(&doc, &chunked);
    assert_eq!(plan.mode(), ScanMode::Structured);
    assert_eq!(plan.len(), 250);

    let report = extract_report(&doc, &chunked).await;
    let unbounded = extract_report_sync(&doc, &ScanConfig::default());
    assert_eq!(report, unbounded);
    assert_eq!(report.groups.len(), 250);
    assert_eq!(report.groups[7], group("row7@list.io", &["+1 212-555-0007"]));
    assert!(report.loose_phones.is_empty());
}

#[test]
fn test_zero_budget_takes_one_slice_per_unit() {
    let doc = Document::parse(&listing(5));
    let config = ScanConfig::default();
    let mut job = ExtractionJob::new(&doc, &config);

    let mut yields = 0;
    let report = loop {
        match job.step(Duration::ZERO) {
            Step::Yield => yields += 1,
            Step::Done(report) => break report,
        }
    };

    assert_eq!(yields, 4);
    assert_eq!(job.state(), JobState::Done);
    assert_eq!(job.slices(), 5);
    assert_eq!(report.groups.len(), 5);
}

#[tokio::test]
async fn test_oversized_page_uses_body_context() {
    let config = ScanConfig::builder().oversized_text_bytes(32).build();
    let doc = Document::parse(
        "<html><body>\
           <div><p>jane@acme.com</p></div>\
           <div><div><div><div><p>Switchboard 555-123-4567</p></div></div></div></div>\
         </body></html>",
    );

    assert_eq!(ScanPlan::for_tree(&doc, &config).mode(), ScanMode::Oversized);
    let report = extract_report(&doc, &config).await;
    assert_eq!(report.groups, vec![group("jane@acme.com", &["555-123-4567"])]);
    assert!(report.loose_phones.is_empty());
}

#[tokio::test]
async fn test_empty_page_yields_empty_report() {
    let doc = Document::parse("");
    let report = extract_report(&doc, &ScanConfig::default()).await;
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_blacklist_applies_after_extraction() {
    let doc = Document::parse(
        "<html><body>\
           <div><p>noreply@tracker.io 555-123-4567</p></div>\
           <div><p>jane@acme.com</p></div>\
         </body></html>",
    );
    let report = extract_report(&doc, &ScanConfig::default()).await;
    let blacklist: Blacklist = ["tracker.io"].into_iter().collect();
    let filtered = report.clone().without_blacklisted(&blacklist);

    assert_eq!(report.groups.len(), 2);
    assert_eq!(filtered.groups, vec![group("jane@acme.com", &[])]);
    assert!(filtered.loose_phones.is_empty());
}

#[tokio::test]
async fn test_report_invariants_on_mixed_page() {
    let doc = Document::parse(
        "<html><body>\
           <ul>\
             <li>ann@acme.com 555-100-0001</li>\
             <li>Ann@Acme.com 555-100-0002</li>\
             <li>bob@acme.com</li>\
           </ul>\
           <table><tr><td>carl@acme.com</td><td>555-100-0003</td></tr></table>\
           <p>Fax 555-100-0004</p>\
         </body></html>",
    );
    let report = extract_report(&doc, &ScanConfig::default()).await;

    let canonical: HashSet<String> = report.emails().map(str::to_lowercase).collect();
    assert_eq!(canonical.len(), report.groups.len());

    let grouped: HashSet<&String> = report.groups.iter().flat_map(|g| g.phones.iter()).collect();
    assert!(report.loose_phones.iter().all(|p| !grouped.contains(p)));

    assert_eq!(report.groups[0], group("ann@acme.com", &["555-100-0001"]));
    assert_eq!(report.groups[2], group("carl@acme.com", &["555-100-0003"]));
}
