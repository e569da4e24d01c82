//! siteqa pipelines: cleaning, indexing, and question answering.
//!
//! The CLI (or any embedder of this crate) constructs the collaborator
//! clients once and hands them in by reference; this crate owns the run
//! semantics: whole-corpus passes, sequential batches, abort on first
//! failure.

pub mod pipeline;
pub mod query;

#[cfg(test)]
mod testing;

pub use pipeline::{
    CleanSummary, IndexSummary, ProgressReporter, SilentProgress, clean_corpus_file, index_corpus,
    index_corpus_file,
};
pub use query::{Answer, answer_question};
