//! Search session
//!
//! Owns everything a query needs: the corpus, its embedding matrix, and the
//! embedding engine. Built once from a [`Config`], then queried repeatedly.

use std::path::PathBuf;

use serde::Serialize;

use crate::cache::{self, CacheStatus, EmbeddingMatrix};
use crate::config::Config;
use crate::corpus::{self, Corpus};
use crate::embedding::{Embedder, EmbeddingEngine};
use crate::error::Result;
use crate::search::{self, SearchResult};

/// Loaded corpus, embeddings, and engine for one configuration
pub struct Session<E> {
    config: Config,
    engine: EmbeddingEngine<E>,
    corpus: Corpus,
    matrix: EmbeddingMatrix,
    cache_status: CacheStatus,
}

/// Snapshot of a session for display
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub model: String,
    pub dimension: usize,
    pub documents: usize,
    pub documents_path: PathBuf,
    pub cache_path: PathBuf,
    pub cache: CacheStatus,
    pub top_k: usize,
    pub memoized_queries: usize,
}

impl<E: Embedder> Session<E> {
    /// Load the corpus and its embeddings.
    ///
    /// # Errors
    /// Config validation failures, [`crate::SearchError::SourceNotFound`] /
    /// [`crate::SearchError::EmptyCorpus`] from the document source, and any
    /// embedder failure while (re)building the cache.
    pub fn open(config: Config, embedder: E) -> Result<Self> {
        config.validate()?;

        let engine = EmbeddingEngine::new(embedder);
        let (corpus, outcome) = load_corpus_and_matrix(&config, &engine)?;

        Ok(Self {
            config,
            engine,
            corpus,
            matrix: outcome.matrix,
            cache_status: outcome.status,
        })
    }

    /// Re-read the document source and refresh embeddings.
    ///
    /// On failure the previously loaded corpus stays in place.
    pub fn reload(&mut self) -> Result<&CacheStatus> {
        let (corpus, outcome) = load_corpus_and_matrix(&self.config, &self.engine)?;

        self.corpus = corpus;
        self.matrix = outcome.matrix;
        self.cache_status = outcome.status;
        Ok(&self.cache_status)
    }

    /// Search with the configured `top_k`
    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.search_with(query, self.config.top_k)
    }

    /// Search with an explicit `top_k` (values below 1 are treated as 1)
    pub fn search_with(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        search::search(
            query,
            &self.corpus,
            &self.matrix,
            &self.engine,
            top_k.max(1),
        )
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.engine.model_id().to_string(),
            dimension: self.engine.dimension(),
            documents: self.corpus.len(),
            documents_path: self.config.documents.clone(),
            cache_path: self.config.cache.clone(),
            cache: self.cache_status.clone(),
            top_k: self.config.top_k,
            memoized_queries: self.engine.cache_size(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn matrix(&self) -> &EmbeddingMatrix {
        &self.matrix
    }

    /// How the current matrix was obtained
    pub fn cache_status(&self) -> &CacheStatus {
        &self.cache_status
    }
}

fn load_corpus_and_matrix<E: Embedder>(
    config: &Config,
    engine: &EmbeddingEngine<E>,
) -> Result<(Corpus, cache::CacheOutcome)> {
    let corpus = corpus::load(&config.documents)?;
    let outcome = cache::get_or_build(&corpus, engine, &config.cache)?;

    log::info!(
        "Session ready: {} documents, {} ({}d)",
        corpus.len(),
        engine.model_id(),
        outcome.matrix.dimension()
    );

    Ok((corpus, outcome))
}
