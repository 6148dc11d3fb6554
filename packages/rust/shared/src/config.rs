//! Application configuration for discodigest.
//!
//! User config lives at `~/.discodigest/discodigest.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DigestError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "discodigest.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".discodigest";

// ---------------------------------------------------------------------------
// Config structs (matching discodigest.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Feed source settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Digest output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Description fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Show-notes scanner settings.
    #[serde(default)]
    pub scanner: ScannerConfig,
}

/// `[feed]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// RSS/Atom feed to poll.
    #[serde(default = "default_feed_url")]
    pub url: String,

    /// Timeout for the feed download, in seconds.
    #[serde(default = "default_feed_timeout")]
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            timeout_secs: default_feed_timeout(),
        }
    }
}

fn default_feed_url() -> String {
    "https://latenightlinux.com/feed/mp3".into()
}
fn default_feed_timeout() -> u64 {
    30
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the digest files are written to (created if absent).
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// How to number entries whose title carries no trailing episode number.
    #[serde(default)]
    pub fallback_prefix: FallbackPrefix,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            fallback_prefix: FallbackPrefix::default(),
        }
    }
}

fn default_output_dir() -> String {
    "markdown_files".into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout for discovery pages, in ms.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_ms: u64,

    /// Pause after every description lookup, in ms.
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_fetch_timeout(),
            request_delay_ms: default_request_delay(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    5_000
}
fn default_request_delay() -> u64 {
    5_000
}

/// `[scanner]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Text that marks the section-header paragraph opening the links section.
    #[serde(default = "default_section_marker")]
    pub section_marker: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            section_marker: default_section_marker(),
        }
    }
}

fn default_section_marker() -> String {
    "Discoveries".into()
}

// ---------------------------------------------------------------------------
// FallbackPrefix
// ---------------------------------------------------------------------------

/// Numeric prefix used when an entry title has no trailing digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPrefix {
    /// A fresh random number in `9000..=9999` on every call.
    ///
    /// Such entries get a new filename each run, so the "already written"
    /// check never matches them.
    #[default]
    Random,
    /// `9000 + sha256(title) mod 1000`, stable across runs.
    Hash,
}

impl FallbackPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Hash => "hash",
        }
    }
}

impl std::fmt::Display for FallbackPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FallbackPrefix {
    type Err = DigestError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "hash" => Ok(Self::Hash),
            other => Err(DigestError::validation(format!(
                "unknown fallback prefix '{other}': expected 'random' or 'hash'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Digest config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime pipeline configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    /// Feed URL.
    pub feed_url: String,
    /// Timeout for the feed download.
    pub feed_timeout: Duration,
    /// Digest output directory.
    pub output_dir: PathBuf,
    /// Prefix strategy for titles without an episode number.
    pub fallback_prefix: FallbackPrefix,
    /// Per-request timeout for discovery pages.
    pub fetch_timeout: Duration,
    /// Pause after each description lookup.
    pub request_delay: Duration,
    /// Marker text of the links section header.
    pub section_marker: String,
}

impl From<&AppConfig> for DigestConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            feed_url: config.feed.url.clone(),
            feed_timeout: Duration::from_secs(config.feed.timeout_secs),
            output_dir: PathBuf::from(&config.output.dir),
            fallback_prefix: config.output.fallback_prefix,
            fetch_timeout: Duration::from_millis(config.fetch.timeout_ms),
            request_delay: Duration::from_millis(config.fetch.request_delay_ms),
            section_marker: config.scanner.section_marker.clone(),
        }
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.discodigest/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DigestError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.discodigest/discodigest.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DigestError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DigestError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DigestError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DigestError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DigestError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
