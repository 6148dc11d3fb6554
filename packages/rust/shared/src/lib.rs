//! Shared types, error model, and configuration for discodigest.
//!
//! This crate is the foundation depended on by all other discodigest crates.
//! It provides:
//! - [`DigestError`] — the unified error type
//! - Domain types ([`FeedEntry`], [`Discovery`], [`Description`], [`DiscoveryLinks`], [`EnrichedEntry`])
//! - Configuration ([`AppConfig`], [`DigestConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DigestConfig, FallbackPrefix, FeedConfig, FetchConfig, OutputConfig,
    ScannerConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{DigestError, Result};
pub use types::{Description, Discovery, DiscoveryLinks, EnrichedEntry, FeedEntry};
