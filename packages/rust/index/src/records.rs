//! Chunk record construction: walk the cleaned corpus, split paragraphs,
//! and attach provenance metadata to every chunk.

use tracing::debug;

use siteqa_shared::{ChunkRecord, CleanCorpus};

use crate::splitter::TextSplitter;

/// Build the full, ordered record list for a cleaned corpus.
///
/// Pages are visited in key order, paragraphs and chunks in their own order,
/// and ids are assigned as `vec_<running index>` across the whole run.
pub fn build_records(corpus: &CleanCorpus, splitter: &TextSplitter) -> Vec<ChunkRecord> {
    let mut records: Vec<ChunkRecord> = Vec::new();

    for (page_id, page) in corpus {
        let before = records.len();
        for paragraph in &page.paragraphs {
            for chunk in splitter.split(paragraph) {
                records.push(ChunkRecord {
                    id: format!("vec_{}", records.len()),
                    page_id: page_id.clone(),
                    source_url: page.page_url.clone(),
                    text: chunk,
                });
            }
        }
        debug!(page_id, chunks = records.len() - before, "chunked page");
    }

    records
}

/// Fixed-size batches for sequential submission to the vector store.
pub fn batches(records: &[ChunkRecord], batch_size: usize) -> impl Iterator<Item = &[ChunkRecord]> {
    records.chunks(batch_size.max(1))
}
