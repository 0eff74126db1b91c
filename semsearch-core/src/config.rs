//! Search configuration
//!
//! Read once at startup and held fixed for the life of a session. Values come
//! from built-in defaults, an optional TOML file, then explicit overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::embedding::DEFAULT_MODEL;
use crate::error::{Result, SearchError};
use crate::search::DEFAULT_TOP_K;

/// Default document source
pub const DEFAULT_DOCUMENTS: &str = "documents.txt";
/// Default embedding cache file
pub const DEFAULT_CACHE: &str = "document_embeddings.bin";

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Newline-delimited document source
    pub documents: PathBuf,
    /// Embedding cache file
    pub cache: PathBuf,
    /// Embedding model identifier
    pub model: String,
    /// Number of results per query (default: 5)
    pub top_k: usize,
    /// Where downloaded model files live
    pub model_cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            documents: PathBuf::from(DEFAULT_DOCUMENTS),
            cache: PathBuf::from(DEFAULT_CACHE),
            model: DEFAULT_MODEL.to_string(),
            top_k: DEFAULT_TOP_K,
            model_cache_dir: None,
        }
    }
}

/// Values that replace whatever the file or defaults set
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub documents: Option<PathBuf>,
    pub cache: Option<PathBuf>,
    pub model: Option<String>,
    pub top_k: Option<usize>,
    pub model_cache_dir: Option<PathBuf>,
}

impl Config {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SearchError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply overrides on top of this config
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(documents) = overrides.documents {
            self.documents = documents;
        }
        if let Some(cache) = overrides.cache {
            self.cache = cache;
        }
        if let Some(model) = overrides.model {
            self.model = model;
        }
        if let Some(top_k) = overrides.top_k {
            self.top_k = top_k;
        }
        if overrides.model_cache_dir.is_some() {
            self.model_cache_dir = overrides.model_cache_dir;
        }
        self
    }

    /// Reject values no session can run with
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(SearchError::config("top_k must be at least 1"));
        }
        if self.documents.as_os_str().is_empty() {
            return Err(SearchError::config("documents path is empty"));
        }
        if self.cache.as_os_str().is_empty() {
            return Err(SearchError::config("cache path is empty"));
        }
        if self.model.trim().is_empty() {
            return Err(SearchError::config("model identifier is empty"));
        }
        Ok(())
    }
}
