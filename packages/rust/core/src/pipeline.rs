//! Batch pipelines: raw corpus → cleaned corpus file, and cleaned corpus →
//! embedded chunks in the vector index.
//!
//! Both pipelines are single runs over their whole input. Cleaning is pure
//! and local; indexing talks to the embedding and vector-store collaborators
//! batch by batch, sequentially, and aborts on the first failure.

use std::path::Path;

use tracing::{info, instrument};

use siteqa_clients::{Embedder, VectorIndex};
use siteqa_index::{TextSplitter, batches, build_records};
use siteqa_shared::{ChunkingConfig, CleanCorpus, RawCorpus, Result, load_json, save_json_pretty};

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each batch is embedded and upserted.
    fn batch_indexed(&self, current: usize, total: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn batch_indexed(&self, _current: usize, _total: usize) {}
}

// ---------------------------------------------------------------------------
// Cleaning pipeline
// ---------------------------------------------------------------------------

/// Result of one cleaning run.
#[derive(Debug, Clone)]
pub struct CleanSummary {
    /// Pages in the raw input.
    pub pages_in: usize,
    /// Pages that survived the page filter.
    pub pages_kept: usize,
    /// Total cleaned paragraphs across kept pages.
    pub paragraphs_out: usize,
}

/// Clean a raw corpus file and write the cleaned corpus.
///
/// A missing or malformed input file is fatal. The output is written
/// pretty-printed with non-ASCII text preserved as-is.
#[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn clean_corpus_file(input: &Path, output: &Path) -> Result<CleanSummary> {
    let raw: RawCorpus = load_json(input)?;
    let cleaned = siteqa_cleaner::clean_corpus(&raw);

    let summary = CleanSummary {
        pages_in: raw.len(),
        pages_kept: cleaned.len(),
        paragraphs_out: cleaned.values().map(|p| p.paragraphs.len()).sum(),
    };

    save_json_pretty(output, &cleaned)?;

    info!(
        pages_in = summary.pages_in,
        pages_kept = summary.pages_kept,
        paragraphs = summary.paragraphs_out,
        "cleaned corpus written"
    );

    Ok(summary)
}

// ---------------------------------------------------------------------------
// Indexing pipeline
// ---------------------------------------------------------------------------

/// Result of one indexing run.
#[derive(Debug, Clone)]
pub struct IndexSummary {
    /// Chunk records produced from the corpus.
    pub records: usize,
    /// Batches submitted to the vector store.
    pub batches: usize,
}

/// Chunk a cleaned corpus, embed it, and upsert it into the vector index.
///
/// The index is created and awaited first (bounded wait); records then go
/// out in fixed-size batches, each embedded and upserted before the next
/// one starts. Any collaborator failure aborts the run where it happened.
#[instrument(skip_all, fields(pages = corpus.len()))]
pub async fn index_corpus(
    corpus: &CleanCorpus,
    embedder: &dyn Embedder,
    index: &dyn VectorIndex,
    chunking: &ChunkingConfig,
    batch_size: usize,
    progress: &dyn ProgressReporter,
) -> Result<IndexSummary> {
    progress.phase("Chunking corpus");
    let splitter = TextSplitter::new(chunking)?;
    let records = build_records(corpus, &splitter);

    progress.phase("Waiting for vector index");
    index.ensure_ready().await?;

    let total_batches = records.len().div_ceil(batch_size.max(1));
    info!(
        records = records.len(),
        batch_size,
        batches = total_batches,
        "starting index run"
    );

    progress.phase("Indexing");
    for (i, batch) in batches(&records, batch_size).enumerate() {
        let texts: Vec<String> = batch.iter().map(|r| r.text.clone()).collect();
        let vectors = embedder.embed(&texts).await?;
        index.upsert(batch, &vectors).await?;
        progress.batch_indexed(i + 1, total_batches);
    }

    info!(records = records.len(), "index run completed");

    Ok(IndexSummary {
        records: records.len(),
        batches: total_batches,
    })
}

/// Convenience wrapper: load the cleaned corpus from disk, then index it.
pub async fn index_corpus_file(
    input: &Path,
    embedder: &dyn Embedder,
    index: &dyn VectorIndex,
    chunking: &ChunkingConfig,
    batch_size: usize,
    progress: &dyn ProgressReporter,
) -> Result<IndexSummary> {
    let corpus: CleanCorpus = load_json(input)?;
    index_corpus(&corpus, embedder, index, chunking, batch_size, progress).await
}
