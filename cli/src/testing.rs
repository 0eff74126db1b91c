//! Model-free embedders for CLI tests

use std::cell::Cell;

use semsearch_core::{Embedder, Result, SearchError};

/// Embeds text by simple character statistics; deterministic and never zero
#[derive(Default)]
pub(crate) struct LengthEmbedder;

impl Embedder for LengthEmbedder {
    fn model_id(&self) -> &str {
        "length"
    }

    fn dimension(&self) -> usize {
        3
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let vowels = text
            .chars()
            .filter(|c| "aeiouAEIOU".contains(*c))
            .count();
        Ok(vec![text.len() as f32, 1.0, vowels as f32])
    }
}

/// [`LengthEmbedder`] whose corpus batches can be switched to fail
#[derive(Default)]
pub(crate) struct FlakyEmbedder {
    inner: LengthEmbedder,
    fail_batches: Cell<bool>,
}

impl FlakyEmbedder {
    pub(crate) fn fail_batches(&self, fail: bool) {
        self.fail_batches.set(fail);
    }
}

impl Embedder for FlakyEmbedder {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.inner.encode(text)
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if self.fail_batches.get() {
            return Err(SearchError::embedding("model unavailable"));
        }
        self.inner.encode_batch(texts)
    }
}
