//! Date resolution from link titles and from extracted document text.
//!
//! Titles on the reading room end in "<Month> <Year>", e.g.
//! "Contact Center Traveler Complaints Report September 2019". When that
//! shape is missing the caller falls back to the document body, where the
//! report month is printed as `MM/YYYY`.

use crate::config::TitleOverrides;
use crate::types::DateKey;
use chrono::Month;
use regex::Regex;
use std::sync::OnceLock;

/// Outcome of parsing a link title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleDate {
    Resolved(DateKey),
    /// The title does not end in "<Month> <Year>".
    Unparsable,
}

/// Pick the title to parse for a document: the override for its absolute
/// URL if one exists, the anchor text otherwise.
pub fn effective_title<'a>(
    document_url: &str,
    link_text: &'a str,
    overrides: &'a TitleOverrides,
) -> &'a str {
    overrides
        .get(document_url)
        .map(String::as_str)
        .unwrap_or(link_text)
}

/// Parse the trailing "<Month> <Year>" pair of a title.
///
/// The month must be a full English month name with exact casing and the
/// year exactly four ASCII digits.
pub fn resolve_title_date(title: &str) -> TitleDate {
    let tokens: Vec<&str> = title.split_whitespace().collect();
    let [.., month_token, year_token] = tokens.as_slice() else {
        return TitleDate::Unparsable;
    };

    let Some(year) = parse_year(year_token) else {
        return TitleDate::Unparsable;
    };
    let Some(month) = month_from_name(month_token) else {
        return TitleDate::Unparsable;
    };

    match DateKey::new(year, month) {
        Some(key) => TitleDate::Resolved(key),
        None => TitleDate::Unparsable,
    }
}

/// Find the first `MM/YYYY` occurrence with `MM` in 01..=12.
pub fn find_month_year(text: &str) -> Option<DateKey> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"(0[1-9]|1[0-2])/([0-9]{4})").expect("month/year regex is valid")
    });

    let caps = re.captures(text)?;
    let month: u8 = caps.get(1)?.as_str().parse().ok()?;
    let year: u16 = caps.get(2)?.as_str().parse().ok()?;
    DateKey::new(year, month)
}

fn parse_year(token: &str) -> Option<u16> {
    if token.len() != 4 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn month_from_name(token: &str) -> Option<u8> {
    (1u8..=12)
        .filter_map(|n| Month::try_from(n).ok())
        .find(|m| m.name() == token)
        .map(|m| m.number_from_month() as u8)
}
