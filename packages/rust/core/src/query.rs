//! Question answering: retrieve relevant chunks, prompt the chat model.

use tracing::{debug, instrument};

use siteqa_clients::{ChatModel, Embedder, VectorIndex};
use siteqa_shared::{Result, RetrievedChunk, SiteQaError};

/// Fixed QA prompt. The retrieved chunk texts are joined with blank lines
/// and substituted as the context.
const PROMPT_TEMPLATE: &str = "\
You are a chatbot, use the following context to answer the question accurately:

Context: {context}

Question: {question}

Answer:";

/// A completed question/answer cycle.
#[derive(Debug, Clone)]
pub struct Answer {
    /// The question as asked.
    pub question: String,
    /// The model's answer text.
    pub answer: String,
    /// The chunks retrieved as context, most similar first.
    pub chunks: Vec<RetrievedChunk>,
}

/// Render the QA prompt for a context block and question.
fn render_prompt(context: &str, question: &str) -> String {
    PROMPT_TEMPLATE
        .replace("{context}", context)
        .replace("{question}", question)
}

/// Answer one question against the indexed site content.
///
/// An empty or whitespace-only question is rejected before any collaborator
/// is called. Otherwise: embed the question, retrieve the `top_k` most
/// similar chunks, and complete the prompt built from them.
#[instrument(skip_all, fields(top_k = top_k))]
pub async fn answer_question(
    question: &str,
    embedder: &dyn Embedder,
    index: &dyn VectorIndex,
    chat: &dyn ChatModel,
    top_k: usize,
) -> Result<Answer> {
    let question = question.trim();
    if question.is_empty() {
        return Err(SiteQaError::EmptyQuery);
    }

    let vectors = embedder.embed(&[question.to_string()]).await?;
    let vector = vectors
        .into_iter()
        .next()
        .ok_or_else(|| SiteQaError::Embedding("no embedding returned for question".into()))?;

    let chunks = index.query(&vector, top_k).await?;
    debug!(retrieved = chunks.len(), "retrieved context chunks");

    let context = chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let answer = chat.complete(&render_prompt(&context, question)).await?;

    Ok(Answer {
        question: question.to_string(),
        answer,
        chunks,
    })
}
