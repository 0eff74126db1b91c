//! Vector embedding engine
//!
//! High-level API for generating and memoizing embeddings.

use dashmap::DashMap;

use super::Embedder;
use crate::error::Result;
use crate::search::cosine_similarity;

/// Embedding engine with an in-process memo
///
/// Wraps any [`Embedder`] with a DashMap keyed by the exact input text, so a
/// repeated query is embedded once per session. Nothing here touches disk.
pub struct EmbeddingEngine<E> {
    embedder: E,
    cache: DashMap<String, Vec<f32>>,
}

impl<E: Embedder> EmbeddingEngine<E> {
    pub fn new(embedder: E) -> Self {
        log::info!(
            "EmbeddingEngine ready ({}, {}d)",
            embedder.model_id(),
            embedder.dimension()
        );

        Self {
            embedder,
            cache: DashMap::new(),
        }
    }

    /// Generate embedding with caching
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        // Check cache first
        if let Some(cached) = self.cache.get(text) {
            return Ok(cached.clone());
        }

        // Generate and cache
        let embedding = self.embedder.encode(text)?;
        self.cache.insert(text.to_string(), embedding.clone());
        Ok(embedding)
    }

    /// Cosine similarity between two embeddings
    pub fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        cosine_similarity(a, b)
    }

    /// Get the wrapped embedder
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Get cache size
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl<E: Embedder> Embedder for EmbeddingEngine<E> {
    fn model_id(&self) -> &str {
        self.embedder.model_id()
    }

    fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(text)
    }

    // Corpus batches go straight through; memoizing them would only
    // duplicate the matrix in memory.
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.embedder.encode_batch(texts)
    }
}
