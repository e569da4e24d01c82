//! Hosted-collaborator clients for siteqa.
//!
//! The pipeline delegates all embedding, vector search, and answer
//! generation to external services. This crate defines the narrow traits
//! the core depends on and provides `reqwest` implementations:
//! - [`Embedder`] / [`HttpEmbedder`] — OpenAI-style embeddings endpoint
//! - [`VectorIndex`] / [`RestVectorIndex`] — Pinecone-style vector store
//! - [`ChatModel`] / [`OpenAiChat`] — chat-completions endpoint
//!
//! Clients are constructed once at process start and injected by reference;
//! none of them retries — a failed call aborts the current run.

pub mod chat;
pub mod embedding;
pub mod vector;

use async_trait::async_trait;

use siteqa_shared::{ChunkRecord, Result, RetrievedChunk};

pub use chat::OpenAiChat;
pub use embedding::HttpEmbedder;
pub use vector::RestVectorIndex;

/// Embedding collaborator: texts in, one vector per text out.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts. The result has one vector per input, in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Vector-store collaborator: readiness, batched upsert, similarity query.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create the index if needed and wait (bounded) until it is ready.
    async fn ensure_ready(&self) -> Result<()>;

    /// Upsert one batch. `records[i]` pairs with `vectors[i]`.
    async fn upsert(&self, records: &[ChunkRecord], vectors: &[Vec<f32>]) -> Result<()>;

    /// Return the `top_k` most similar stored chunks.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievedChunk>>;
}

/// Language-model collaborator: prompt in, answer text out.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion for the given prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
