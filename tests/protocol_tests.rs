//! Page protocol tests
//!
//! Drives a `PageAgent` over an in-memory line stream the way a popup or the
//! crawler would.

use contact_scout::dom::Document;
use contact_scout::protocol::types::{PARSE_ERROR, UNAVAILABLE};
use contact_scout::protocol::{PageAgent, PageRequest, PageResponse};
use contact_scout::ScanConfig;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::io::Cursor;
use url::Url;

const PAGE: &str = "<html><body>\
    <nav>\
      <a href=\"/\">Home</a>\
      <a href=\"/about-us\">About</a>\
      <a href=\"https://www.acme.com/contact#form\">Write to us</a>\
      <a href=\"/blog/post-1\">Blog</a>\
      <a href=\"https://jobs.example.org/career\">Jobs elsewhere</a>\
      <a href=\"mailto:jane@acme.com\">Mail</a>\
    </nav>\
    <main><section>\
      <div class=\"card\"><p>jane@acme.com</p><p>+1 415-555-0199</p></div>\
      <div class=\"card\"><p>noreply@tracker.io</p></div>\
    </section></main>\
    <footer>Switchboard 555-123-4567</footer>\
  </body></html>";

fn agent(url: Option<&str>) -> PageAgent {
    let url = url.and_then(|u| Url::parse(u).ok());
    PageAgent::new(Document::parse(PAGE), url, ScanConfig::default())
}

async fn exchange(agent: &PageAgent, lines: &[&str]) -> Vec<Value> {
    let input = Cursor::new(lines.join("\n"));
    let mut output = Vec::new();
    agent
        .serve(input, &mut output)
        .await
        .expect("serve over in-memory streams");

    String::from_utf8(output)
        .expect("utf-8 output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("one JSON object per line"))
        .collect()
}

// ============================================================================
// Requests
// ============================================================================

#[tokio::test]
async fn test_get_report_with_saved_scroll() {
    let agent = agent(Some("https://acme.com/"));
    let responses = exchange(
        &agent,
        &[
            r#"{"id": 1, "action": "saveScrollPosition", "scrollY": 240.5}"#,
            r#"{"id": 2, "action": "getReport"}"#,
        ],
    )
    .await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0], json!({"id": 1, "kind": "scrollSaved", "scrollY": 240.5}));
    assert_eq!(
        responses[1],
        json!({
            "id": 2,
            "kind": "report",
            "data": {
                "groups": [
                    {"email": "jane@acme.com", "phones": ["+1 415-555-0199"]},
                    {"email": "noreply@tracker.io", "phones": []},
                ],
                "loosePhones": ["555-123-4567"],
            },
            "popupScrollY": 240.5,
        })
    );
}

#[tokio::test]
async fn test_blacklist_filters_report_and_badge() {
    let agent = agent(None);
    let responses = exchange(
        &agent,
        &[
            r#"{"id": "a", "action": "getBadge"}"#,
            r#"{"id": "b", "action": "getBadge"}"#,
            r#"{"id": "c", "action": "setBlacklist", "domains": ["Tracker.IO "]}"#,
            r#"{"id": "d", "action": "getReport"}"#,
        ],
    )
    .await;

    assert_eq!(
        responses[0],
        json!({"id": "a", "kind": "badge", "count": 2,
               "update": {"count": 2, "text": "2", "color": "#4CAF50"}})
    );
    assert_eq!(responses[1], json!({"id": "b", "kind": "badge", "count": 2}));
    assert_eq!(
        responses[2],
        json!({"id": "c", "kind": "blacklistUpdated", "domains": 1,
               "badge": {"count": 1, "text": "1", "color": "#4CAF50"}})
    );

    let groups = responses[3]["data"]["groups"].as_array().expect("groups");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["email"], "jane@acme.com");
    assert_eq!(agent.blacklist(), vec!["tracker.io".to_string()]);
}

#[tokio::test]
async fn test_deep_links_are_same_site_and_deduplicated() {
    let agent = agent(Some("https://acme.com/"));
    let response = agent.handle_request(PageRequest::GetDeepLinks).await;

    assert_eq!(
        response,
        PageResponse::DeepLinks {
            links: vec![
                "https://acme.com/about-us".to_string(),
                "https://www.acme.com/contact".to_string(),
            ],
        }
    );
}

#[tokio::test]
async fn test_deep_links_need_page_url() {
    let response = agent(None).handle_request(PageRequest::GetDeepLinks).await;
    assert!(matches!(response, PageResponse::Error { code, .. } if code == UNAVAILABLE));
}

#[tokio::test]
async fn test_selection_emails_keep_first_occurrence() {
    let response = agent(None)
        .handle_request(PageRequest::ExtractSelection {
            text: "Ann <ann@acme.com>, bob@acme.com, ann@acme.com".to_string(),
        })
        .await;

    assert_eq!(
        response,
        PageResponse::Emails {
            emails: vec!["ann@acme.com".to_string(), "bob@acme.com".to_string()],
        }
    );
}

// ============================================================================
// Malformed input
// ============================================================================

#[tokio::test]
async fn test_malformed_lines_get_error_responses() {
    let agent = agent(None);
    let responses = exchange(
        &agent,
        &[
            "not json",
            "",
            r#"{"id": 7, "action": "launchRocket"}"#,
            r#"{"id": 8, "action": "getBadge"}"#,
        ],
    )
    .await;

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["kind"], "error");
    assert_eq!(responses[0]["code"], PARSE_ERROR);
    assert!(responses[0].get("id").is_none());

    assert_eq!(responses[1]["id"], 7);
    assert_eq!(responses[1]["kind"], "error");
    assert_eq!(responses[1]["code"], -32600);

    assert_eq!(responses[2]["id"], 8);
    assert_eq!(responses[2]["kind"], "badge");
}

#[tokio::test]
async fn test_concurrent_reports_agree() {
    let agent = agent(None);
    let (first, second) = tokio::join!(
        agent.handle_request(PageRequest::GetReport),
        agent.handle_request(PageRequest::GetReport),
    );
    assert_eq!(first, second);
}
