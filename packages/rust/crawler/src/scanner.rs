//! Show-notes scanner.
//!
//! Show notes are a flat run of `<p>` elements. Section titles sit in their
//! own paragraph inside a `<strong>`; the links of a section follow in plain
//! paragraphs until the next title. The scanner collects the links of the
//! section whose title contains the marker (by default `Discoveries`).

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use discodigest_shared::DiscoveryLinks;

/// Default text identifying the links section header.
pub const DEFAULT_SECTION_MARKER: &str = "Discoveries";

static PARAGRAPH_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("valid selector"));
static STRONG_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("strong").expect("valid selector"));
static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid selector"));

/// Scanner settings.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Case-sensitive substring a header's `<strong>` text must contain.
    pub section_marker: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            section_marker: DEFAULT_SECTION_MARKER.to_string(),
        }
    }
}

/// Parse show-notes HTML leniently and scan it.
pub fn scan_html(html: &str, opts: &ScanOptions) -> DiscoveryLinks {
    let doc = Html::parse_document(html);
    scan(&doc, opts)
}

/// Collect the links of the marked section, keyed by anchor text.
///
/// Titles keep the position of their first occurrence; a repeated title takes
/// the later URL. Anchors inside header paragraphs are never collected.
/// Anchors without an `href` are skipped.
pub fn scan(doc: &Html, opts: &ScanOptions) -> DiscoveryLinks {
    let mut links = DiscoveryLinks::new();
    let mut in_section = false;

    for para in doc.select(&PARAGRAPH_SEL) {
        if let Some(header) = section_header(&para) {
            in_section = header.contains(opts.section_marker.as_str());
            debug!(%header, in_section, "section header");
            continue;
        }

        if !in_section {
            continue;
        }

        for anchor in para.select(&ANCHOR_SEL) {
            let title: String = anchor.text().collect();
            match anchor.value().attr("href") {
                Some(href) => {
                    if let Some(previous) = links.insert(title.as_str(), href) {
                        debug!(%title, %previous, url = href, "duplicate discovery title, keeping later url");
                    }
                }
                None => warn!(%title, "discovery link has no href, skipping"),
            }
        }
    }

    links
}

/// Text of the paragraph's first `<strong>`, if the paragraph is a section header.
fn section_header(para: &ElementRef<'_>) -> Option<String> {
    para.select(&STRONG_SEL)
        .next()
        .map(|strong| strong.text().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_default(html: &str) -> Vec<(String, String)> {
        scan_html(html, &ScanOptions::default()).into_iter().collect()
    }

    fn pair(title: &str, url: &str) -> (String, String) {
        (title.to_string(), url.to_string())
    }

    #[test]
    fn collects_links_after_header() {
        let html = r#"<p><strong>Discoveries</strong></p>
            <p><a href="http://a">Foo</a> and <a href="http://b">Bar</a></p>"#;
        assert_eq!(scan_default(html), vec![pair("Foo", "http://a"), pair("Bar", "http://b")]);
    }

    #[test]
    fn no_header_yields_nothing() {
        let html = r#"<p><strong>News</strong></p>
            <p><a href="http://a">Foo</a></p>
            <p><a href="http://b">Bar</a></p>"#;
        assert!(scan_html(html, &ScanOptions::default()).is_empty());
        assert!(scan_html("", &ScanOptions::default()).is_empty());
    }

    #[test]
    fn section_spans_paragraphs_until_next_header() {
        let html = r#"
            <p><strong>News</strong></p>
            <p><a href="http://news">Headline</a></p>
            <p><strong>Discoveries</strong></p>
            <p><a href="http://a">Foo</a></p>
            <p>Some text <a href="http://b">Bar</a></p>
            <p><strong>Feedback</strong></p>
            <p><a href="http://c">Mail</a></p>"#;
        assert_eq!(scan_default(html), vec![pair("Foo", "http://a"), pair("Bar", "http://b")]);
    }

    #[test]
    fn section_can_reopen() {
        let html = r#"
            <p><strong>Discoveries</strong></p>
            <p><a href="http://a">Foo</a></p>
            <p><strong>KDE Korner</strong></p>
            <p><a href="http://k">Plasma</a></p>
            <p><strong>More Discoveries</strong></p>
            <p><a href="http://b">Bar</a></p>"#;
        assert_eq!(scan_default(html), vec![pair("Foo", "http://a"), pair("Bar", "http://b")]);
    }

    #[test]
    fn header_paragraph_anchors_are_ignored() {
        let html = r#"
            <p><strong>Discoveries</strong> <a href="http://header">In header</a></p>
            <p><a href="http://a">Foo</a></p>"#;
        assert_eq!(scan_default(html), vec![pair("Foo", "http://a")]);
    }

    #[test]
    fn marker_is_case_sensitive_substring() {
        let html = r#"<p><strong>Discoveries:</strong></p><p><a href="http://a">Foo</a></p>"#;
        assert_eq!(scan_default(html), vec![pair("Foo", "http://a")]);

        let html = r#"<p><strong>discoveries</strong></p><p><a href="http://a">Foo</a></p>"#;
        assert!(scan_default(html).is_empty());
    }

    #[test]
    fn duplicate_title_keeps_first_position_and_last_url() {
        let html = r#"<p><strong>Discoveries</strong></p>
            <p><a href="http://a">Foo</a></p>
            <p><a href="http://b">Bar</a> <a href="http://c">Foo</a></p>"#;
        assert_eq!(scan_default(html), vec![pair("Foo", "http://c"), pair("Bar", "http://b")]);
    }

    #[test]
    fn nested_anchors_and_text_are_collected() {
        let html = r#"<p><strong>Discoveries</strong></p>
            <p><em><a href="http://a">Foo <code>cli</code></a></em></p>"#;
        assert_eq!(scan_default(html), vec![pair("Foo cli", "http://a")]);
    }

    #[test]
    fn anchor_without_href_is_skipped() {
        let html = r#"<p><strong>Discoveries</strong></p>
            <p><a name="anchor">Nowhere</a><a href="http://a">Foo</a></p>"#;
        assert_eq!(scan_default(html), vec![pair("Foo", "http://a")]);
    }

    #[test]
    fn custom_marker() {
        let html = r#"<p><strong>Picks of the week</strong></p><p><a href="http://a">Foo</a></p>"#;
        let opts = ScanOptions {
            section_marker: "Picks".into(),
        };
        let links = scan_html(html, &opts);
        assert_eq!(links.get("Foo"), Some("http://a"));
    }
}
