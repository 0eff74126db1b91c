//! Cosine-similarity search
//!
//! Ranks every document in a corpus against a query vector. Linear scan,
//! which is all a corpus read from a single text file needs.

use serde::Serialize;

use crate::cache::EmbeddingMatrix;
use crate::corpus::Corpus;
use crate::embedding::Embedder;
use crate::error::Result;

/// Default number of results returned
pub const DEFAULT_TOP_K: usize = 5;

/// One ranked hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// 1-based position in the ranking
    pub rank: usize,
    /// Cosine similarity in [-1, 1]
    pub score: f32,
    /// Index of the document in the corpus
    pub index: usize,
    /// Document text
    pub document: String,
}

/// Rank `corpus` against `query`, best first.
///
/// An empty or whitespace-only query returns no results without calling
/// the embedder. Equal scores keep corpus order. At most
/// `min(top_k, corpus.len())` results are returned.
///
/// `corpus` and `matrix` must be row-aligned; [`crate::cache::get_or_build`]
/// guarantees this.
pub fn search<E: Embedder + ?Sized>(
    query: &str,
    corpus: &Corpus,
    matrix: &EmbeddingMatrix,
    embedder: &E,
    top_k: usize,
) -> Result<Vec<SearchResult>> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    debug_assert_eq!(
        corpus.len(),
        matrix.rows(),
        "corpus and embedding matrix must be row-aligned"
    );

    let query_vector = embedder.encode(query)?;

    let mut scored: Vec<(usize, f32)> = matrix
        .iter()
        .enumerate()
        .map(|(index, row)| (index, cosine_similarity(&query_vector, row)))
        .collect();

    // sort_by is stable: ties stay in corpus order
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_k.min(corpus.len()));

    let results = scored
        .into_iter()
        .filter_map(|(index, score)| {
            corpus.get(index).map(|document| (index, score, document))
        })
        .enumerate()
        .map(|(position, (index, score, document))| SearchResult {
            rank: position + 1,
            score,
            index,
            document: document.to_string(),
        })
        .collect();

    Ok(results)
}

/// Calculate cosine similarity between two vectors
///
/// Returns 0.0 when either vector has zero norm, the lengths differ, or a
/// component is NaN or infinite, so the result is never NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a * norm_b);
    if similarity.is_finite() {
        similarity.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
