//! fastembed sentence embeddings
//!
//! Local ONNX inference, no network after the first model download.

use std::path::PathBuf;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;

use super::Embedder;
use crate::error::{Result, SearchError};

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// fastembed configuration
#[derive(Debug, Clone)]
pub struct FastEmbedConfig {
    /// Batch size for encoding (default: 256)
    pub batch_size: usize,
    /// Directory fastembed downloads model files into
    pub cache_dir: Option<PathBuf>,
    /// Show the hf-hub download progress bar (default: false)
    pub show_download_progress: bool,
}

impl Default for FastEmbedConfig {
    fn default() -> Self {
        Self {
            batch_size: 256,
            cache_dir: None,
            show_download_progress: false,
        }
    }
}

/// fastembed model wrapper
///
/// The inner model sits behind a mutex so the embedder is `Send + Sync`
/// regardless of whether the runtime session needs exclusive access.
pub struct FastEmbedder {
    model: Mutex<TextEmbedding>,
    model_id: String,
    config: FastEmbedConfig,
    dimension: usize,
}

impl FastEmbedder {
    /// Load a model by identifier with default configuration
    pub fn new(model_id: &str) -> Result<Self> {
        Self::with_config(model_id, FastEmbedConfig::default())
    }

    /// Load a model by identifier with custom configuration
    pub fn with_config(model_id: &str, config: FastEmbedConfig) -> Result<Self> {
        let model_kind = resolve_model(model_id)?;

        let mut options =
            InitOptions::new(model_kind).with_show_download_progress(config.show_download_progress);
        if let Some(dir) = &config.cache_dir {
            std::fs::create_dir_all(dir)?;
            options = options.with_cache_dir(dir.clone());
        }

        log::info!("Loading embedding model: {}", model_id);

        let model = TextEmbedding::try_new(options)
            .map_err(|e| model_error(&format!("Failed to load {model_id}"), e))?;

        // Get dimension by encoding test string
        let sample = model
            .embed(vec!["test"], None)
            .map_err(|e| model_error("Failed to encode test string", e))?;
        let dimension = sample
            .first()
            .map(Vec::len)
            .ok_or_else(|| SearchError::model("Model returned no vector for test string"))?;

        log::info!(
            "Loaded {} ({}d, batch size {})",
            model_id,
            dimension,
            config.batch_size
        );

        Ok(Self {
            model: Mutex::new(model),
            model_id: model_id.to_string(),
            config,
            dimension,
        })
    }

    /// Get configuration
    pub fn config(&self) -> &FastEmbedConfig {
        &self.config
    }
}

impl Embedder for FastEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self
            .model
            .lock()
            .embed(vec![text], None)
            .map_err(|e| embedding_error("Failed to encode text", e))?;

        embeddings
            .pop()
            .ok_or_else(|| SearchError::embedding("Model returned no vector"))
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let embeddings = self
            .model
            .lock()
            .embed(texts.to_vec(), Some(self.config.batch_size))
            .map_err(|e| embedding_error("Failed to encode texts", e))?;

        if embeddings.len() != texts.len() {
            return Err(SearchError::embedding(format!(
                "Model returned {} vectors for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }

        Ok(embeddings)
    }
}

/// Map a model identifier to a fastembed model.
///
/// Accepts the bare sentence-transformers name, with or without its hub
/// owner prefix, or any model code fastembed itself reports.
fn resolve_model(model_id: &str) -> Result<EmbeddingModel> {
    let name = model_id
        .rsplit_once('/')
        .map_or(model_id, |(_, name)| name)
        .to_ascii_lowercase();

    let known = match name.trim_end_matches("-onnx") {
        "all-minilm-l6-v2" => Some(EmbeddingModel::AllMiniLML6V2),
        "all-minilm-l12-v2" => Some(EmbeddingModel::AllMiniLML12V2),
        "bge-small-en-v1.5" => Some(EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Some(EmbeddingModel::BGEBaseENV15),
        "nomic-embed-text-v1.5" => Some(EmbeddingModel::NomicEmbedTextV15),
        _ => None,
    };
    if let Some(model) = known {
        return Ok(model);
    }

    TextEmbedding::list_supported_models()
        .into_iter()
        .find(|info| info.model_code.eq_ignore_ascii_case(model_id))
        .map(|info| info.model)
        .ok_or_else(|| SearchError::model(format!("Unsupported embedding model: {model_id}")))
}

fn model_error(context: &str, err: anyhow::Error) -> SearchError {
    SearchError::model(format!("{context}: {err:#}"))
}

fn embedding_error(context: &str, err: anyhow::Error) -> SearchError {
    SearchError::embedding(format!("{context}: {err:#}"))
}
