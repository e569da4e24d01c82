//! Application configuration for siteqa.
//!
//! User config lives at `~/.siteqa/siteqa.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys are never stored in the file — only the names of the
//! environment variables that hold them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteQaError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "siteqa.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".siteqa";

// ---------------------------------------------------------------------------
// Config structs (matching siteqa.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Site scraping settings.
    #[serde(default)]
    pub scrape: ScrapeConfig,

    /// Paragraph chunking settings.
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Vector index settings.
    #[serde(default)]
    pub index: IndexConfig,

    /// Embedding service settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Chat model settings.
    #[serde(default)]
    pub chat: ChatConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Raw corpus file written by `scrape` and read by `clean`.
    #[serde(default = "default_raw_corpus")]
    pub raw_corpus: String,

    /// Cleaned corpus file written by `clean` and read by `index`.
    #[serde(default = "default_clean_corpus")]
    pub clean_corpus: String,

    /// Number of chunks retrieved per question.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            raw_corpus: default_raw_corpus(),
            clean_corpus: default_clean_corpus(),
            top_k: default_top_k(),
        }
    }
}

fn default_raw_corpus() -> String {
    "data/site_raw.json".into()
}
fn default_clean_corpus() -> String {
    "data/site_cleaned.json".into()
}
fn default_top_k() -> usize {
    7
}

/// `[scrape]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Maximum number of linked pages to fetch (the root page is free).
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Milliseconds to wait between page fetches.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            rate_limit_ms: default_rate_limit(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_max_pages() -> usize {
    50
}
fn default_rate_limit() -> u64 {
    500
}
fn default_timeout() -> u64 {
    30
}

/// `[chunking]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters.
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Characters of overlap between consecutive chunks of one paragraph.
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

fn default_max_chunk_size() -> usize {
    1000
}
fn default_overlap() -> usize {
    200
}

/// `[index]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Vector index name.
    #[serde(default = "default_index_name")]
    pub name: String,

    /// Base URL of the vector store's REST API.
    #[serde(default)]
    pub base_url: String,

    /// Name of the env var holding the vector store API key.
    #[serde(default = "default_vector_key_env")]
    pub api_key_env: String,

    /// Embedding dimension the index is created with.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Similarity metric.
    #[serde(default = "default_metric")]
    pub metric: String,

    /// Records per upsert batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Seconds between index-readiness polls.
    #[serde(default = "default_ready_poll")]
    pub ready_poll_secs: u64,

    /// Give up waiting for index readiness after this many seconds.
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: default_index_name(),
            base_url: String::new(),
            api_key_env: default_vector_key_env(),
            dimension: default_dimension(),
            metric: default_metric(),
            batch_size: default_batch_size(),
            ready_poll_secs: default_ready_poll(),
            ready_timeout_secs: default_ready_timeout(),
        }
    }
}

fn default_index_name() -> String {
    "siteqa".into()
}
fn default_vector_key_env() -> String {
    "VECTOR_STORE_API_KEY".into()
}
fn default_dimension() -> usize {
    1536
}
fn default_metric() -> String {
    "cosine".into()
}
fn default_batch_size() -> usize {
    100
}
fn default_ready_poll() -> u64 {
    5
}
fn default_ready_timeout() -> u64 {
    300
}

/// `[embedding]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the embedding service (OpenAI-compatible).
    #[serde(default = "default_openai_base")]
    pub base_url: String,

    /// Embedding model name.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Name of the env var holding the API key.
    #[serde(default = "default_openai_key_env")]
    pub api_key_env: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base(),
            model: default_embedding_model(),
            api_key_env: default_openai_key_env(),
        }
    }
}

/// `[chat]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Base URL of the chat completion service (OpenAI-compatible).
    #[serde(default = "default_openai_base")]
    pub base_url: String,

    /// Chat model name.
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Name of the env var holding the API key.
    #[serde(default = "default_openai_key_env")]
    pub api_key_env: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base(),
            model: default_chat_model(),
            temperature: default_temperature(),
            api_key_env: default_openai_key_env(),
        }
    }
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_chat_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_temperature() -> f32 {
    0.4
}
fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.siteqa/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SiteQaError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.siteqa/siteqa.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SiteQaError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SiteQaError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SiteQaError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SiteQaError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SiteQaError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read an API key from the env var named in config.
/// Returns a config error naming the variable if it is unset or empty.
pub fn api_key_from_env(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(SiteQaError::config(format!(
            "API key not found. Set the {var_name} environment variable."
        ))),
    }
}
