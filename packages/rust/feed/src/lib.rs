//! Podcast feed retrieval and parsing.
//!
//! Downloads the RSS/Atom document once per run and flattens each item into a
//! [`FeedEntry`]: title, link, publication date, summary, and the show-notes
//! HTML carried in `<content:encoded>`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use discodigest_shared::{DigestError, FeedEntry, Result};
use feed_rs::model::Entry;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

/// Maximum number of redirects to follow when fetching the feed.
const MAX_REDIRECTS: usize = 5;

/// Default timeout in seconds for fetching the feed.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent string for feed requests.
const USER_AGENT: &str = concat!("discodigest/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Feed options
// ---------------------------------------------------------------------------

/// Configuration for the feed download.
#[derive(Debug, Clone)]
pub struct FeedOptions {
    /// Timeout for the HTTP request.
    pub timeout: Duration,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

// ---------------------------------------------------------------------------
// Main entry points
// ---------------------------------------------------------------------------

/// Download and parse the feed at `url`.
///
/// Fails with [`DigestError::Network`] when the feed cannot be retrieved and
/// [`DigestError::Feed`] when the body is not a feed document. Callers treat
/// either as "no entries this run".
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_feed(url: &str, opts: &FeedOptions) -> Result<Vec<FeedEntry>> {
    info!("downloading feed");

    let client = build_client(opts)?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DigestError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DigestError::Network(format!("{url}: HTTP {status}")));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| DigestError::Network(format!("{url}: failed to read body: {e}")))?;

    let entries = parse_feed(&body)?;
    info!(entries = entries.len(), "feed downloaded and parsed");

    Ok(entries)
}

/// Parse a raw RSS/Atom document into entries, in feed order.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = feed_rs::parser::parse(bytes).map_err(|e| DigestError::Feed(e.to_string()))?;

    debug!(items = feed.entries.len(), "feed parsed");

    Ok(feed.entries.into_iter().map(to_feed_entry).collect())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &FeedOptions) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(opts.timeout)
        .build()
        .map_err(|e| DigestError::Network(format!("failed to build HTTP client: {e}")))
}

/// Calendar date of a publication timestamp, as `YYYY-MM-DD` in UTC.
fn entry_date(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Flatten a parsed feed item.
fn to_feed_entry(entry: Entry) -> FeedEntry {
    let title = entry.title.map(|t| t.content).unwrap_or_default();

    let url = entry
        .links
        .iter()
        .map(|l| l.href.trim())
        .find(|href| !href.is_empty())
        .unwrap_or_default()
        .to_string();

    let date = match entry.published.or(entry.updated) {
        Some(ts) => entry_date(ts),
        None => {
            warn!(%title, "entry has no publication date");
            String::new()
        }
    };

    let summary = entry.summary.map(|s| s.content).unwrap_or_default();
    let content_html = entry.content.and_then(|c| c.body).unwrap_or_default();

    FeedEntry {
        title,
        date,
        url,
        summary,
        content_html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Late Night Linux</title>
    <link>https://latenightlinux.com</link>
    <description>A podcast</description>
    <item>
      <title>Late Night Linux – Episode 250</title>
      <link>https://latenightlinux.com/late-night-linux-episode-250/</link>
      <pubDate>Mon, 02 Oct 2023 06:00:00 +0000</pubDate>
      <description>News, discoveries, and feedback.</description>
      <content:encoded><![CDATA[<p><strong>Discoveries</strong></p><p><a href="https://example.com/tool">Tool</a></p>]]></content:encoded>
    </item>
    <item>
      <title>Late Night Linux Extra</title>
      <link>https://latenightlinux.com/extra/</link>
      <pubDate>Mon, 25 Sep 2023 06:00:00 +0000</pubDate>
      <description>Bonus episode.</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_rss_items_in_order() {
        let entries = parse_feed(FEED.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.title, "Late Night Linux – Episode 250");
        assert_eq!(first.url, "https://latenightlinux.com/late-night-linux-episode-250/");
        assert_eq!(first.date, "2023-10-02");
        assert_eq!(first.summary, "News, discoveries, and feedback.");
        assert!(first.content_html.contains("<strong>Discoveries</strong>"));

        assert_eq!(entries[1].title, "Late Night Linux Extra");
        assert_eq!(entries[1].date, "2023-09-25");
        assert!(entries[1].content_html.is_empty());
    }

    #[test]
    fn dates_are_utc_calendar_days() {
        let late = DateTime::parse_from_rfc2822("Mon, 02 Oct 2023 23:30:00 -0200")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(entry_date(late), "2023-10-03");
    }

    #[test]
    fn rejects_non_feed_documents() {
        let err = parse_feed(b"<html><body>not a feed</body></html>").unwrap_err();
        assert!(matches!(err, DigestError::Feed(_)));
    }

    #[tokio::test]
    async fn test_fetch_feed_with_mock_server() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/feed/mp3"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .insert_header("content-type", "application/rss+xml")
                    .set_body_string(FEED),
            )
            .mount(&server)
            .await;

        let url = format!("{}/feed/mp3", server.uri());
        let entries = fetch_feed(&url, &FeedOptions::default()).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, "2023-10-02");
    }

    #[tokio::test]
    async fn test_fetch_feed_http_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let url = format!("{}/feed/mp3", server.uri());
        let err = fetch_feed(&url, &FeedOptions::default()).await.unwrap_err();
        assert!(matches!(err, DigestError::Network(_)));
        assert!(err.is_feed_failure());
    }
}
