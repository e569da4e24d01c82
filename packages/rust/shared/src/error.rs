//! Error types for siteqa.
//!
//! Library crates use [`SiteQaError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all siteqa operations.
#[derive(Debug, thiserror::Error)]
pub enum SiteQaError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during scraping or a collaborator call.
    #[error("network error: {0}")]
    Network(String),

    /// HTML or JSON parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Embedding service error.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Vector store error (create, upsert, or query).
    #[error("vector store error: {0}")]
    VectorStore(String),

    /// Chat completion error.
    #[error("completion error: {0}")]
    Completion(String),

    /// The vector index never reported ready within the allowed window.
    #[error("vector index not ready after {waited_secs}s")]
    IndexNotReady { waited_secs: u64 },

    /// An empty question was submitted at the query boundary.
    #[error("query must not be empty")]
    EmptyQuery,

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (corpus shape, batch shape, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SiteQaError>;

impl SiteQaError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SiteQaError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = SiteQaError::IndexNotReady { waited_secs: 300 };
        assert!(err.to_string().contains("300s"));

        let err = SiteQaError::EmptyQuery;
        assert_eq!(err.to_string(), "query must not be empty");
    }
}
