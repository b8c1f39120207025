//! Extract candidate links from a reading-room listing page.
//!
//! Uses the `scraper` crate, which parses malformed markup best-effort and
//! never fails.

use crate::types::CandidateLink;
use scraper::{Html, Selector};
use std::sync::OnceLock;

fn anchor_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("a[href]").expect("anchor selector is valid"))
}

/// Every `<a href>` on the page, in document order.
///
/// The `href` is returned exactly as written; resolution against a base URL
/// is the caller's job since the `.pdf` suffix filter applies to the raw value.
pub fn parse_listing(html: &str) -> Vec<CandidateLink> {
    let document = Html::parse_document(html);

    document
        .select(anchor_selector())
        .map(|element| CandidateLink {
            visible_text: element.text().collect::<String>(),
            target_url: element.value().attr("href").unwrap_or("").to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_anchors_in_order() {
        let html = r#"
        <html><body>
          <a href="/a.pdf">Contact Center Report May 2020</a>
          <a href="https://example.gov/b.pdf">Other</a>
        </body></html>
        "#;

        let links = parse_listing(html);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].target_url, "/a.pdf");
        assert_eq!(links[0].visible_text, "Contact Center Report May 2020");
        assert_eq!(links[1].target_url, "https://example.gov/b.pdf");
    }

    #[test]
    fn test_skips_anchors_without_href() {
        let html = r#"<a name="top">Top</a><a href="/x">X</a>"#;
        let links = parse_listing(html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target_url, "/x");
    }

    #[test]
    fn test_text_spans_nested_elements() {
        let html = r#"<a href="/r.pdf"><span>Contact Center</span> Report June 2021</a>"#;
        let links = parse_listing(html);
        assert_eq!(links[0].visible_text, "Contact Center Report June 2021");
    }

    #[test]
    fn test_malformed_html_does_not_fail() {
        let html = r#"<div><a href="/broken.pdf">Contact Center <b>Report</div><p><a href=/y>Y"#;
        let links = parse_listing(html);
        assert!(!links.is_empty());
        assert_eq!(links[0].target_url, "/broken.pdf");
    }

    #[test]
    fn test_empty_page() {
        assert!(parse_listing("").is_empty());
    }
}
