//! Page fetching and HTML extraction.
//!
//! This crate provides:
//! - [`scanner`] — finds the discoveries section in episode show notes
//! - [`description`] — resolves a discovered link to its meta description
//! - [`fetch`] — the [`PageFetcher`] seam and its reqwest-backed [`HttpFetcher`]

pub mod description;
pub mod fetch;
pub mod scanner;

pub use description::{describe_html, resolve};
pub use fetch::{FetchError, FetchOutcome, HttpFetcher, PageFetcher};
pub use scanner::{DEFAULT_SECTION_MARKER, ScanOptions, scan, scan_html};
