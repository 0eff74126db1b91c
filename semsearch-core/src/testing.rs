//! Deterministic embedder for unit tests

use std::cell::Cell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::embedding::Embedder;
use crate::error::{Result, SearchError};

/// Hash-based embedder: same text, same vector; no model download.
pub(crate) struct StubEmbedder {
    model_id: String,
    dimension: usize,
    fail: bool,
    encode_calls: Cell<usize>,
    batch_calls: Cell<usize>,
}

impl StubEmbedder {
    pub(crate) fn new(dimension: usize) -> Self {
        Self::with_model("stub", dimension)
    }

    pub(crate) fn with_model(model_id: &str, dimension: usize) -> Self {
        Self {
            model_id: model_id.to_string(),
            dimension,
            fail: false,
            encode_calls: Cell::new(0),
            batch_calls: Cell::new(0),
        }
    }

    /// Embedder whose every call fails, standing in for an unavailable model
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(4)
        }
    }

    pub(crate) fn encode_calls(&self) -> usize {
        self.encode_calls.get()
    }

    pub(crate) fn batch_calls(&self) -> usize {
        self.batch_calls.get()
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        (0..self.dimension)
            .map(|j| {
                let mut hasher = DefaultHasher::new();
                text.hash(&mut hasher);
                j.hash(&mut hasher);
                (hasher.finish() % 2001) as f32 / 1000.0 - 1.0
            })
            .collect()
    }
}

impl Embedder for StubEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.encode_calls.set(self.encode_calls.get() + 1);
        if self.fail {
            return Err(SearchError::embedding("model unavailable"));
        }
        Ok(self.vector_for(text))
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.batch_calls.set(self.batch_calls.get() + 1);
        if self.fail {
            return Err(SearchError::embedding("model unavailable"));
        }
        Ok(texts.iter().map(|text| self.vector_for(text)).collect())
    }
}
