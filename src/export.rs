//! Export formats
//!
//! Text shapes the host hands to the user: CSV files and clipboard text.
//! Clipboard lines use `email : : phone1, phone2`, with the leading `+`
//! dropped from phones so the numbers paste cleanly into dialers and sheets.

use crate::crawler::PageContacts;
use crate::error::Result;
use crate::extraction::aggregate::{ContactGroup, ExtractionReport};
use crate::extraction::patterns::phone_digits;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;

/// Header of the crawl export
pub const CRAWL_CSV_HEADER: [&str; 3] = ["URL", "Email", "Phone"];

/// Header of the verification-aware export
pub const VERIFIED_CSV_HEADER: [&str; 6] =
    ["Email", "Phones", "Verification", "Quality", "Role", "Free"];

/// Domain key for emails without one
const NO_DOMAIN: &str = "other";

/// Result of an external email check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailVerification {
    /// Deliverability verdict, e.g. `valid` or `invalid`
    pub status: String,
    /// Quality score as reported
    pub quality: Option<String>,
    /// Role address (info@, sales@, ...)
    pub is_role: bool,
    /// Free mail provider
    pub is_free: bool,
}

fn strip_plus(phone: &str) -> &str {
    phone.strip_prefix('+').unwrap_or(phone)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Clipboard line of one group
pub fn copy_line(group: &ContactGroup) -> String {
    if group.phones.is_empty() {
        return group.email.clone();
    }
    let phones: Vec<&str> = group.phones.iter().map(|p| strip_plus(p)).collect();
    format!("{} : : {}", group.email, phones.join(", "))
}

/// Clipboard text of a whole report: one line per group, then the loose
/// phones after a blank line
pub fn copy_all(report: &ExtractionReport) -> String {
    let mut text = report
        .groups
        .iter()
        .map(copy_line)
        .collect::<Vec<_>>()
        .join("\n");

    if !report.loose_phones.is_empty() {
        if !text.is_empty() {
            text.push_str("\n\n");
        }
        let loose: Vec<&str> = report.loose_phones.iter().map(|p| strip_plus(p)).collect();
        text.push_str(&loose.join("\n"));
    }
    text
}

/// Every distinct phone of a report, one per line
pub fn copy_phones(report: &ExtractionReport) -> String {
    let mut seen = HashSet::new();
    report
        .all_phones()
        .filter(|phone| seen.insert(*phone))
        .map(strip_plus)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Clipboard text of crawl results
///
/// Every email of a page carries all of the page's phones; a page without
/// emails contributes a single phones-only line.
pub fn copy_crawl_results(results: &[PageContacts]) -> String {
    let mut text = String::new();
    for page in results {
        let phones: Vec<&str> = page.phones.iter().map(|p| strip_plus(p)).collect();
        let phones = phones.join(", ");
        for email in &page.emails {
            text.push_str(email);
            if !phones.is_empty() {
                text.push_str(" : : ");
                text.push_str(&phones);
            }
            text.push('\n');
        }
        if page.emails.is_empty() && !phones.is_empty() {
            text.push_str(" : : ");
            text.push_str(&phones);
            text.push('\n');
        }
    }
    text
}

/// Groups keyed by lower-cased email domain, domains sorted
pub fn group_by_domain(groups: &[ContactGroup]) -> BTreeMap<String, Vec<&ContactGroup>> {
    let mut by_domain: BTreeMap<String, Vec<&ContactGroup>> = BTreeMap::new();
    for group in groups {
        let domain = group.domain().unwrap_or_else(|| NO_DOMAIN.to_string());
        by_domain.entry(domain).or_default().push(group);
    }
    by_domain
}

/// Chat link for a phone number
pub fn whatsapp_link(phone: &str) -> String {
    format!(
        "https://api.whatsapp.com/send/?phone={}&text&type=phone_number&app_absent=0",
        phone_digits(phone)
    )
}

/// Write crawl results as `URL,Email,Phone`, one row per email and one per
/// phone
pub fn write_crawl_csv<W: Write>(results: &[PageContacts], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CRAWL_CSV_HEADER)?;
    for page in results {
        for email in &page.emails {
            csv.write_record([page.url.as_str(), email.as_str(), ""])?;
        }
        for phone in &page.phones {
            csv.write_record([page.url.as_str(), "", phone.as_str()])?;
        }
    }
    csv.flush()?;
    Ok(())
}

/// Write a report with verification columns, one row per group and one per
/// loose phone; groups without a verification leave those columns empty
pub fn write_verified_csv<W: Write>(
    report: &ExtractionReport,
    verifications: &HashMap<String, EmailVerification>,
    writer: W,
) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(VERIFIED_CSV_HEADER)?;

    for group in &report.groups {
        let phones = group.phones.join(", ");
        match verifications.get(&group.email.to_lowercase()) {
            Some(v) => csv.write_record([
                group.email.as_str(),
                phones.as_str(),
                v.status.as_str(),
                v.quality.as_deref().unwrap_or(""),
                yes_no(v.is_role),
                yes_no(v.is_free),
            ])?,
            None => csv.write_record([group.email.as_str(), phones.as_str(), "", "", "", ""])?,
        }
    }
    for phone in &report.loose_phones {
        csv.write_record(["", phone.as_str(), "", "", "", ""])?;
    }
    csv.flush()?;
    Ok(())
}

/// [`write_crawl_csv`] into a string
pub fn crawl_csv_string(results: &[PageContacts]) -> Result<String> {
    let mut buf = Vec::new();
    write_crawl_csv(results, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// [`write_verified_csv`] into a string
pub fn verified_csv_string(
    report: &ExtractionReport,
    verifications: &HashMap<String, EmailVerification>,
) -> Result<String> {
    let mut buf = Vec::new();
    write_verified_csv(report, verifications, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
