//! End-to-end digest run: feed → scan → enrich → render → write.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use discodigest_crawler::{PageFetcher, ScanOptions, scan_html};
use discodigest_feed::FeedOptions;
use discodigest_shared::{
    DigestConfig, DigestError, Discovery, DiscoveryLinks, FeedEntry, Result,
};

use crate::digest::{self, Decision, WriteOutcome};
use crate::enrichment::{self, EnrichmentConfig, EnrichmentProgress};

/// Why an entry produced no new digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Its digest file is already on disk.
    AlreadyWritten,
    /// Its show notes list no discoveries.
    NoDiscoveries,
}

/// What happened to one feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// A new digest file was written.
    Written { path: PathBuf, discoveries: usize },
    /// The entry was skipped.
    Skipped(SkipReason),
}

/// Counts for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries in the feed.
    pub entries_seen: usize,
    /// New digest files written.
    pub written: usize,
    /// Entries whose digest already existed.
    pub skipped_existing: usize,
    /// Entries without discoveries.
    pub skipped_empty: usize,
    /// Entries whose digest could not be written.
    pub failed: usize,
    /// Description lookups performed.
    pub discoveries_resolved: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called before the feed download.
    fn feed_downloading(&self, url: &str);
    /// Called once the feed is parsed.
    fn feed_loaded(&self, entries: usize);
    /// Called when an entry is picked up.
    fn entry_started(&self, entry: &FeedEntry);
    /// Called before a discovery's description is looked up.
    fn discovery_resolving(&self, title: &str, url: &str, current: usize, total: usize);
    /// Called after a discovery's description is known.
    fn discovery_resolved(&self, discovery: &Discovery, current: usize, total: usize);
    /// Called when an entry is finished (written or skipped).
    fn entry_finished(&self, entry: &FeedEntry, outcome: &EntryOutcome);
    /// Called when an entry's digest could not be written.
    fn entry_failed(&self, entry: &FeedEntry, error: &DigestError);
    /// Called when the run completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn feed_downloading(&self, _url: &str) {}
    fn feed_loaded(&self, _entries: usize) {}
    fn entry_started(&self, _entry: &FeedEntry) {}
    fn discovery_resolving(&self, _title: &str, _url: &str, _current: usize, _total: usize) {}
    fn discovery_resolved(&self, _discovery: &Discovery, _current: usize, _total: usize) {}
    fn entry_finished(&self, _entry: &FeedEntry, _outcome: &EntryOutcome) {}
    fn entry_failed(&self, _entry: &FeedEntry, _error: &DigestError) {}
    fn done(&self, _summary: &RunSummary) {}
}

/// Forwards enrichment progress to the pipeline reporter.
struct PipelineEnrichmentProgress<'a> {
    inner: &'a dyn ProgressReporter,
}

impl EnrichmentProgress for PipelineEnrichmentProgress<'_> {
    fn resolving(&self, title: &str, url: &str, current: usize, total: usize) {
        self.inner.discovery_resolving(title, url, current, total);
    }

    fn resolved(&self, discovery: &Discovery, current: usize, total: usize) {
        self.inner.discovery_resolved(discovery, current, total);
    }
}

/// Run the full digest pipeline once.
///
/// 1. Ensure the digest directory exists
/// 2. Download and parse the feed
/// 3. Process each entry in feed order
///
/// A feed that cannot be downloaded or parsed fails the run before any entry
/// is touched. Per-entry write failures are reported and counted, and the run
/// moves on to the next entry.
#[instrument(skip_all, fields(feed = %config.feed_url, out = %config.output_dir.display()))]
pub async fn run_digest<F: PageFetcher>(
    config: &DigestConfig,
    fetcher: &F,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let start = Instant::now();

    digest::ensure_output_dir(&config.output_dir)?;

    progress.feed_downloading(&config.feed_url);
    let feed_opts = FeedOptions {
        timeout: config.feed_timeout,
    };
    let entries = discodigest_feed::fetch_feed(&config.feed_url, &feed_opts).await?;
    progress.feed_loaded(entries.len());

    let mut summary = process_entries(entries, config, fetcher, progress).await;
    summary.elapsed = start.elapsed();

    info!(
        entries = summary.entries_seen,
        written = summary.written,
        skipped_existing = summary.skipped_existing,
        skipped_empty = summary.skipped_empty,
        failed = summary.failed,
        duration_ms = summary.elapsed.as_millis(),
        "digest run completed"
    );
    progress.done(&summary);

    Ok(summary)
}

/// Process already-fetched entries one by one, in order.
pub async fn process_entries<F: PageFetcher>(
    entries: Vec<FeedEntry>,
    config: &DigestConfig,
    fetcher: &F,
    progress: &dyn ProgressReporter,
) -> RunSummary {
    let mut summary = RunSummary {
        entries_seen: entries.len(),
        ..RunSummary::default()
    };

    for entry in entries {
        progress.entry_started(&entry);

        match process_entry(&entry, config, fetcher, progress).await {
            Ok(outcome) => {
                match &outcome {
                    EntryOutcome::Written { discoveries, .. } => {
                        summary.written += 1;
                        summary.discoveries_resolved += discoveries;
                    }
                    EntryOutcome::Skipped(SkipReason::AlreadyWritten) => {
                        summary.skipped_existing += 1
                    }
                    EntryOutcome::Skipped(SkipReason::NoDiscoveries) => summary.skipped_empty += 1,
                }
                progress.entry_finished(&entry, &outcome);
            }
            Err(e) => {
                warn!(title = %entry.title, error = %e, "failed to write digest");
                summary.failed += 1;
                progress.entry_failed(&entry, &e);
            }
        }
    }

    summary
}

/// Scan, enrich, and write a single entry.
///
/// The filename is derived once and used for both the existence check and the
/// write, so a random fallback prefix is at least consistent within one call.
#[instrument(skip_all, fields(title = %entry.title))]
pub async fn process_entry<F: PageFetcher>(
    entry: &FeedEntry,
    config: &DigestConfig,
    fetcher: &F,
    progress: &dyn ProgressReporter,
) -> Result<EntryOutcome> {
    let scan_opts = ScanOptions {
        section_marker: config.section_marker.clone(),
    };
    let links: DiscoveryLinks = scan_html(&entry.content_html, &scan_opts);

    let filename = digest::digest_filename(&entry.title, config.fallback_prefix);
    let path = config.output_dir.join(&filename);

    match digest::should_process(&path, &links) {
        Decision::SkipExists => {
            info!(path = %path.display(), "digest exists, skipping");
            return Ok(EntryOutcome::Skipped(SkipReason::AlreadyWritten));
        }
        Decision::SkipEmpty => {
            info!("no discoveries, skipping");
            return Ok(EntryOutcome::Skipped(SkipReason::NoDiscoveries));
        }
        Decision::Process => {}
    }

    info!(discoveries = links.len(), "enriching discoveries");

    let enrich_config = EnrichmentConfig {
        request_delay: config.request_delay,
    };
    let enrich_progress = PipelineEnrichmentProgress { inner: progress };
    let enriched =
        enrichment::enrich_entry(entry, &links, fetcher, &enrich_config, &enrich_progress).await;

    match digest::write_digest(&config.output_dir, &filename, &enriched)? {
        WriteOutcome::Written(path) => Ok(EntryOutcome::Written {
            path,
            discoveries: enriched.discovery_count(),
        }),
        WriteOutcome::SkippedExists(_) => Ok(EntryOutcome::Skipped(SkipReason::AlreadyWritten)),
        WriteOutcome::SkippedEmpty => Ok(EntryOutcome::Skipped(SkipReason::NoDiscoveries)),
    }
}
