//! Embedding module for semantic search
//!
//! The [`Embedder`] trait is the seam between the search core and whatever
//! model turns text into vectors. Production uses fastembed (ONNX runtime).

mod discovery;
mod engine;
mod text_embedding;

pub use discovery::find_model_cache_dir;
pub use engine::EmbeddingEngine;
pub use text_embedding::{FastEmbedConfig, FastEmbedder, DEFAULT_MODEL};

use crate::error::Result;

/// Text-to-vector capability, deterministic for a fixed model
pub trait Embedder {
    /// Identifier of the model producing the vectors
    fn model_id(&self) -> &str;

    /// Length of every vector this embedder returns
    fn dimension(&self) -> usize;

    /// Embed a single text
    fn encode(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts, one vector per input, order preserved
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.encode(text)).collect()
    }
}

impl<E: Embedder + ?Sized> Embedder for &E {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        (**self).encode(text)
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        (**self).encode_batch(texts)
    }
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        (**self).encode(text)
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        (**self).encode_batch(texts)
    }
}
