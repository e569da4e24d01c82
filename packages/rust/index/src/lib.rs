//! Chunking and record preparation for the siteqa index.
//!
//! This crate turns a cleaned corpus into embedding-ready records:
//! - [`TextSplitter`] — bounded-size, overlapping paragraph chunks
//! - [`build_records`] / [`batches`] — provenance metadata and batching

pub mod records;
pub mod splitter;

pub use records::{batches, build_records};
pub use splitter::TextSplitter;
