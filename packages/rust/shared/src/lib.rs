//! Shared types, error model, and configuration for siteqa.
//!
//! This crate is the foundation depended on by all other siteqa crates.
//! It provides:
//! - [`SiteQaError`] — the unified error type
//! - Domain types ([`RawPage`], [`CleanPage`], [`ChunkRecord`], [`RetrievedChunk`])
//! - Configuration ([`AppConfig`], config loading, API-key lookup)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ChatConfig, ChunkingConfig, DefaultsConfig, EmbeddingConfig, IndexConfig,
    ScrapeConfig, api_key_from_env, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{Result, SiteQaError};
pub use types::{
    ChunkRecord, CleanCorpus, CleanPage, RawCorpus, RawPage, RetrievedChunk, load_json,
    save_json_pretty,
};
