//! In-memory collaborator stubs shared by the pipeline and query tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use siteqa_clients::{ChatModel, Embedder, VectorIndex};
use siteqa_shared::{ChunkRecord, Result, RetrievedChunk, SiteQaError};

/// Returns a fixed-dimension zero vector per text and records the last batch.
pub struct StubEmbedder {
    dimension: usize,
    last: Mutex<Vec<String>>,
}

impl StubEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            last: Mutex::new(Vec::new()),
        }
    }

    pub fn last_batch(&self) -> Vec<String> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        *self.last.lock().unwrap() = texts.to_vec();
        Ok(vec![vec![0.0; self.dimension]; texts.len()])
    }
}

/// Fails every embed call.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(SiteQaError::Embedding("stub embedder failure".into()))
    }
}

/// Records upserted batches and serves canned query results.
#[derive(Default)]
pub struct CountingIndex {
    ready: AtomicUsize,
    queries: AtomicUsize,
    upserted_ids: Mutex<Vec<Vec<String>>>,
    results: Vec<RetrievedChunk>,
    fail_queries: bool,
}

impl CountingIndex {
    pub fn with_results(results: Vec<RetrievedChunk>) -> Self {
        Self {
            results,
            ..Self::default()
        }
    }

    pub fn failing_queries() -> Self {
        Self {
            fail_queries: true,
            ..Self::default()
        }
    }

    pub fn ready_calls(&self) -> usize {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn upsert_sizes(&self) -> Vec<usize> {
        self.upserted_ids.lock().unwrap().iter().map(Vec::len).collect()
    }

    pub fn first_ids(&self, n: usize) -> Vec<String> {
        self.upserted_ids
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .take(n)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl VectorIndex for CountingIndex {
    async fn ensure_ready(&self) -> Result<()> {
        self.ready.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn upsert(&self, records: &[ChunkRecord], vectors: &[Vec<f32>]) -> Result<()> {
        assert_eq!(records.len(), vectors.len(), "mismatched upsert batch");
        self.upserted_ids
            .lock()
            .unwrap()
            .push(records.iter().map(|r| r.id.clone()).collect());
        Ok(())
    }

    async fn query(&self, _vector: &[f32], top_k: usize) -> Result<Vec<RetrievedChunk>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_queries {
            return Err(SiteQaError::VectorStore("stub query failure".into()));
        }
        Ok(self.results.iter().take(top_k).cloned().collect())
    }
}

/// Returns a fixed answer and records the last prompt.
pub struct StubChat {
    answer: String,
    last: Mutex<String>,
}

impl StubChat {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.into(),
            last: Mutex::new(String::new()),
        }
    }

    pub fn last_prompt(&self) -> String {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for StubChat {
    async fn complete(&self, prompt: &str) -> Result<String> {
        *self.last.lock().unwrap() = prompt.to_string();
        Ok(self.answer.clone())
    }
}
