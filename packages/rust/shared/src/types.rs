//! Core domain types for the siteqa corpus and index records.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteQaError};

// ---------------------------------------------------------------------------
// Raw corpus (scraper output)
// ---------------------------------------------------------------------------

/// One scraped page, as written by the scraper.
///
/// Every field defaults to empty on deserialization: a page missing
/// `page_url` or `paragraphs` is filtered out by the cleaning stage rather
/// than rejected at load time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPage {
    /// The URL the page was fetched from.
    #[serde(default)]
    pub page_url: String,
    /// `<h1>` texts, in document order.
    #[serde(default)]
    pub headings: Vec<String>,
    /// `<h2>` texts, in document order.
    #[serde(default)]
    pub sub_headings: Vec<String>,
    /// `<p>` texts, in document order.
    #[serde(default)]
    pub paragraphs: Vec<String>,
    /// Link text → href map. Only recorded for the site's main page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sublinks: Option<BTreeMap<String, String>>,
}

/// The raw corpus file: page key → scraped page.
///
/// `BTreeMap` keeps key order deterministic across runs; cleaning is
/// order-insensitive across pages anyway.
pub type RawCorpus = BTreeMap<String, RawPage>;

// ---------------------------------------------------------------------------
// Cleaned corpus
// ---------------------------------------------------------------------------

/// One cleaned page. Invariant: `page_url` and `paragraphs` are both
/// non-empty, or the page was dropped by the page filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanPage {
    /// Normalized source URL.
    pub page_url: String,
    /// Cleaned, deduplicated paragraphs in original order.
    pub paragraphs: Vec<String>,
}

/// The cleaned corpus file: page key → cleaned page.
pub type CleanCorpus = BTreeMap<String, CleanPage>;

// ---------------------------------------------------------------------------
// Chunk records
// ---------------------------------------------------------------------------

/// One chunk of paragraph text plus its provenance, the unit handed to the
/// embedding and vector-store collaborators.
///
/// The chunk text is duplicated into the record so retrieval can return it
/// without a second lookup. Accepted redundancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Vector id, `vec_<global index>` within one indexing run.
    pub id: String,
    /// Key of the page the chunk came from.
    pub page_id: String,
    /// URL of the page the chunk came from.
    pub source_url: String,
    /// The chunk text itself.
    pub text: String,
}

/// A chunk returned by a vector-store similarity query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Vector id of the match.
    pub id: String,
    /// Similarity score reported by the store.
    pub score: f32,
    /// Chunk text from the stored metadata.
    pub text: String,
    /// Source page key.
    pub page_id: String,
    /// Source page URL.
    pub source_url: String,
}

// ---------------------------------------------------------------------------
// Corpus file I/O
// ---------------------------------------------------------------------------

/// Load a JSON corpus file. A missing or malformed file is fatal.
pub fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| SiteQaError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| SiteQaError::parse(format!("{}: {e}", path.display())))
}

/// Write a JSON corpus file, pretty-printed, UTF-8, non-ASCII preserved.
pub fn save_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| SiteQaError::io(parent, e))?;
        }
    }
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| SiteQaError::validation(format!("serialize {}: {e}", path.display())))?;
    std::fs::write(path, json).map_err(|e| SiteQaError::io(path, e))
}
