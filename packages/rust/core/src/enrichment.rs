//! Discovery enrichment.
//!
//! Looks up the description of every discovered link, one request at a time,
//! pausing after each lookup so the remote sites are not hammered.

use std::time::Duration;

use tracing::{info, instrument};

use discodigest_crawler::{PageFetcher, resolve};
use discodigest_shared::{Discovery, DiscoveryLinks, EnrichedEntry, FeedEntry};

/// Default pause after each description lookup.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(5);

/// Enrichment settings.
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    /// Pause after every lookup, the last one included.
    pub request_delay: Duration,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }
}

/// Progress callback for enrichment.
pub trait EnrichmentProgress: Send + Sync {
    /// Called before looking up discovery `current` of `total` (1-based).
    fn resolving(&self, title: &str, url: &str, current: usize, total: usize);
    /// Called once the description is known.
    fn resolved(&self, discovery: &Discovery, current: usize, total: usize);
}

/// No-op enrichment progress.
pub struct SilentEnrichment;

impl EnrichmentProgress for SilentEnrichment {
    fn resolving(&self, _title: &str, _url: &str, _current: usize, _total: usize) {}
    fn resolved(&self, _discovery: &Discovery, _current: usize, _total: usize) {}
}

/// Resolve a description for every link, in scan order.
///
/// Lookups run strictly one after another. Failed lookups become sentinel
/// descriptions; nothing here aborts the loop.
#[instrument(skip_all, fields(links = links.len()))]
pub async fn enrich<F: PageFetcher>(
    links: &DiscoveryLinks,
    fetcher: &F,
    config: &EnrichmentConfig,
    progress: &dyn EnrichmentProgress,
) -> Vec<Discovery> {
    let total = links.len();
    let mut discoveries = Vec::with_capacity(total);

    for (i, (title, url)) in links.iter().enumerate() {
        progress.resolving(title, url, i + 1, total);

        let description = resolve(fetcher, url).await;
        let discovery = Discovery {
            title: title.to_string(),
            url: url.to_string(),
            description,
        };
        progress.resolved(&discovery, i + 1, total);
        discoveries.push(discovery);

        tokio::time::sleep(config.request_delay).await;
    }

    let found = discoveries
        .iter()
        .filter_map(|d| d.description.text())
        .count();
    info!(total, found, "discoveries enriched");

    discoveries
}

/// Enrich `links` and attach the result to `entry`.
pub async fn enrich_entry<F: PageFetcher>(
    entry: &FeedEntry,
    links: &DiscoveryLinks,
    fetcher: &F,
    config: &EnrichmentConfig,
    progress: &dyn EnrichmentProgress,
) -> EnrichedEntry {
    let discoveries = enrich(links, fetcher, config, progress).await;
    EnrichedEntry {
        entry: entry.clone(),
        discoveries,
    }
}
