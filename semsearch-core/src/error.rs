//! Error types for semsearch-core

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, embedding, or searching a corpus
#[derive(Debug, Error)]
pub enum SearchError {
    /// Document source does not exist
    #[error("Document source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Document source exists but has no non-blank lines
    #[error("No documents found in {}", .0.display())]
    EmptyCorpus(PathBuf),

    /// Persisted embedding cache could not be decoded or failed its header checks
    #[error("Cache format error: {0}")]
    CacheFormat(String),

    /// Model loading error
    #[error("Model error: {0}")]
    Model(String),

    /// Embedding generation error
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Invalid configuration value
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error (bincode)
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Config file parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SearchError {
    /// Create a cache format error
    pub fn cache_format(msg: impl Into<String>) -> Self {
        Self::CacheFormat(msg.into())
    }

    /// Create a model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create an embedding error
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this is a corpus problem the user can fix and retry
    /// (missing or empty document source), as opposed to a hard failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::SourceNotFound(_) | Self::EmptyCorpus(_))
    }
}

/// Result type for search operations
pub type Result<T> = std::result::Result<T, SearchError>;
