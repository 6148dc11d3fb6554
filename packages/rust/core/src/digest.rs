//! Digest files on disk.
//!
//! Each qualifying entry gets one file named `"{prefix} -- {title}.md"`, where
//! the prefix is the episode number from the end of the title, zero-padded to
//! four digits so the directory lists in episode order. The file's existence
//! marks the entry as done; existing files are never rewritten.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use discodigest_shared::{DigestError, DiscoveryLinks, EnrichedEntry, FallbackPrefix, Result};

/// Range of prefixes handed to titles without an episode number.
const FALLBACK_RANGE: std::ops::RangeInclusive<u64> = 9000..=9999;

static TRAILING_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Filenames
// ---------------------------------------------------------------------------

/// Episode number at the end of `title`, zero-padded to at least four digits.
///
/// Leading zeros are normalized the way an integer would print them, so
/// `"Episode 007"` and `"Episode 7"` both give `0007`. Only ASCII digits count.
pub fn episode_prefix(title: &str) -> Option<String> {
    let digits = TRAILING_DIGITS_RE.find(title)?.as_str();
    let trimmed = digits.trim_start_matches('0');
    let number = if trimmed.is_empty() { "0" } else { trimmed };
    Some(format!("{number:0>4}"))
}

/// Prefix for a title without an episode number.
fn fallback_prefix(title: &str, strategy: FallbackPrefix) -> String {
    let span = FALLBACK_RANGE.end() - FALLBACK_RANGE.start() + 1;
    let n = match strategy {
        FallbackPrefix::Random => rand::thread_rng().gen_range(FALLBACK_RANGE),
        FallbackPrefix::Hash => {
            let hash = Sha256::digest(title.as_bytes());
            let mut head = [0u8; 8];
            head.copy_from_slice(&hash[..8]);
            FALLBACK_RANGE.start() + u64::from_be_bytes(head) % span
        }
    };
    format!("{n:04}")
}

/// Lexically sortable digest filename for an entry title.
pub fn digest_filename(title: &str, fallback: FallbackPrefix) -> String {
    let prefix = match episode_prefix(title) {
        Some(prefix) => prefix,
        None => {
            let prefix = fallback_prefix(title, fallback);
            debug!(%title, %prefix, strategy = %fallback, "title has no episode number");
            prefix
        }
    };
    format!("{prefix} -- {title}.md")
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// What to do with an entry before any network work is spent on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Enrich and write.
    Process,
    /// The digest file already exists.
    SkipExists,
    /// The show notes have no discoveries.
    SkipEmpty,
}

/// Decide whether the entry behind `path` still needs a digest.
pub fn should_process(path: &Path, links: &DiscoveryLinks) -> Decision {
    if path.exists() {
        Decision::SkipExists
    } else if links.is_empty() {
        Decision::SkipEmpty
    } else {
        Decision::Process
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Result of [`write_digest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A new file was created.
    Written(PathBuf),
    /// A file already existed at the path; left untouched.
    SkippedExists(PathBuf),
    /// The entry has no discoveries; nothing written.
    SkippedEmpty,
}

/// Create the digest directory if it does not exist yet.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| DigestError::io(dir, e))
}

/// Render `entry` into `dir/filename`.
///
/// Only creates new files, and only for entries with at least one discovery.
/// Both refusals are quiet outcomes, not errors.
#[instrument(skip_all, fields(file = %filename))]
pub fn write_digest(dir: &Path, filename: &str, entry: &EnrichedEntry) -> Result<WriteOutcome> {
    let path = dir.join(filename);

    if entry.discoveries.is_empty() {
        return Ok(WriteOutcome::SkippedEmpty);
    }

    let markdown = discodigest_markdown::render(entry);

    let mut file = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), "digest already exists");
            return Ok(WriteOutcome::SkippedExists(path));
        }
        Err(e) => return Err(DigestError::io(&path, e)),
    };

    write_or_discard(&mut file, &path, markdown.as_bytes())?;

    info!(
        path = %path.display(),
        discoveries = entry.discoveries.len(),
        "digest written"
    );

    Ok(WriteOutcome::Written(path))
}

/// Write `bytes` to a freshly created `path`, removing it again on failure.
///
/// A truncated digest would otherwise mark the entry as processed for good.
fn write_or_discard(file: &mut impl Write, path: &Path, bytes: &[u8]) -> Result<()> {
    if let Err(e) = file.write_all(bytes).and_then(|()| file.flush()) {
        if let Err(rm) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %rm, "could not remove partial digest");
        }
        return Err(DigestError::io(path, e));
    }
    Ok(())
}
