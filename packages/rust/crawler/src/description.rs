//! Description lookup for discovered links.
//!
//! A page's description is the `content` of its first
//! `<meta name="description">` tag with a non-empty `content` attribute.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};

use discodigest_shared::Description;

use crate::fetch::PageFetcher;

static META_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[name]").expect("valid selector"));

/// Fetch `url` and extract its description.
///
/// Never fails: an unreachable page yields [`Description::FetchFailed`], a
/// page without a usable meta tag yields [`Description::Missing`].
#[instrument(skip(fetcher))]
pub async fn resolve<F: PageFetcher>(fetcher: &F, url: &str) -> Description {
    match fetcher.fetch_text(url).await {
        Ok(html) => {
            let description = describe_html(&html);
            debug!(found = !description.is_sentinel(), "description parsed");
            description
        }
        Err(e) => {
            warn!(error = %e, "could not fetch discovery page");
            Description::FetchFailed
        }
    }
}

/// Extract the description from a page's HTML.
pub fn describe_html(html: &str) -> Description {
    let doc = Html::parse_document(html);

    doc.select(&META_SEL)
        .find_map(|el| {
            let meta = el.value();
            if meta.attr("name") != Some("description") {
                return None;
            }
            meta.attr("content").filter(|content| !content.is_empty())
        })
        .map(|content| Description::Text(content.to_string()))
        .unwrap_or(Description::Missing)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fetch::{FetchError, FetchOutcome, HttpFetcher};

    struct FailingFetcher;

    impl PageFetcher for FailingFetcher {
        async fn fetch_text(&self, _url: &str) -> FetchOutcome {
            Err(FetchError::Connect("connection refused".into()))
        }
    }

    #[test]
    fn extracts_meta_description() {
        let html = r#"<html><head><meta name="description" content="Hello"></head></html>"#;
        assert_eq!(describe_html(html), Description::Text("Hello".into()));
    }

    #[test]
    fn content_is_returned_verbatim() {
        let html = r#"<meta name="description" content="  A <b>fast</b> tool &amp; more ">"#;
        assert_eq!(
            describe_html(html),
            Description::Text("  A <b>fast</b> tool & more ".into())
        );
    }

    #[test]
    fn skips_empty_and_other_meta_tags() {
        let html = r#"<html><head>
            <meta name="keywords" content="linux">
            <meta name="description" content="">
            <meta name="Description" content="wrong case">
            <meta property="og:description" content="open graph">
            <meta name="description" content="The real one">
        </head></html>"#;
        assert_eq!(describe_html(html), Description::Text("The real one".into()));
    }

    #[test]
    fn missing_description_is_sentinel() {
        let html = "<html><head><title>No meta</title></head><body></body></html>";
        assert_eq!(describe_html(html), Description::Missing);
        assert_eq!(describe_html(""), Description::Missing);
    }

    #[tokio::test]
    async fn fetch_failure_is_sentinel() {
        let description = resolve(&FailingFetcher, "http://unreachable.invalid/").await;
        assert_eq!(description, Description::FetchFailed);
    }

    #[tokio::test]
    async fn test_resolve_with_mock_server() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/described"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(
                r#"<html><head><meta name="description" content="Hello"></head></html>"#,
            ))
            .mount(&server)
            .await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/bare"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string("<html><body>hi</body></html>"),
            )
            .mount(&server)
            .await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/slow"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(r#"<meta name="description" content="too late">"#)
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_millis(100)).unwrap();

        let described = resolve(&fetcher, &format!("{}/described", server.uri())).await;
        assert_eq!(described, Description::Text("Hello".into()));

        let bare = resolve(&fetcher, &format!("{}/bare", server.uri())).await;
        let slow = resolve(&fetcher, &format!("{}/slow", server.uri())).await;
        assert_eq!(bare, Description::Missing);
        assert_eq!(slow, Description::FetchFailed);
        assert_ne!(bare, slow);
    }
}
