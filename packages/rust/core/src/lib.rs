//! Core pipeline orchestration and domain logic for discodigest.
//!
//! This crate ties together the feed source, the show-notes scanner, the
//! description lookup, and the Markdown renderer into one digest run
//! (see [`pipeline::run_digest`]).

pub mod digest;
pub mod enrichment;
pub mod pipeline;
