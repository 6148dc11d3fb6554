//! Page fetching for discovery links.
//!
//! [`PageFetcher`] is the seam between the description lookup and the network.
//! A fetch never errors out of band: every failure comes back as a
//! [`FetchError`] value so the caller can keep going.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use discodigest_shared::{DigestError, Result};

/// User-Agent string for page requests.
const USER_AGENT: &str = concat!("discodigest/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow for a discovery link.
const MAX_REDIRECTS: usize = 5;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// FetchError / FetchOutcome
// ---------------------------------------------------------------------------

/// Why a page could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request did not complete within the timeout.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Status(u16),

    /// Could not connect (DNS, refused, TLS).
    #[error("connection failed: {0}")]
    Connect(String),

    /// The response body could not be read or decoded.
    #[error("failed to read body: {0}")]
    Body(String),

    /// Any other request failure (malformed URL, redirect loop, ...).
    #[error("request failed: {0}")]
    Request(String),
}

/// Body text on success, the failure kind otherwise.
pub type FetchOutcome = std::result::Result<String, FetchError>;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Retrieves the text of a page.
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its body text.
    fn fetch_text(&self, url: &str) -> impl Future<Output = FetchOutcome> + Send;
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// [`PageFetcher`] backed by a reqwest client with a short timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()
            .map_err(|e| DigestError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> FetchOutcome {
        debug!(%url, "fetching page");

        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(e.to_string())
            }
        })
    }
}

/// Map a reqwest send error onto a [`FetchError`].
fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_connect() {
        FetchError::Connect(err.to_string())
    } else if let Some(status) = err.status() {
        FetchError::Status(status.as_u16())
    } else {
        FetchError::Request(err.to_string())
    }
}
