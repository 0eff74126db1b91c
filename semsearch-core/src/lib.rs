//! Semsearch core
//!
//! Semantic search over a small line-oriented corpus: every non-blank line of
//! a text file is a document, documents are embedded once and cached on disk,
//! and queries are ranked against them by cosine similarity.
//!
//! ## Features
//!
//! - **Self-healing embedding cache** - Stale, corrupt, or foreign cache files are rebuilt, never fatal
//! - **Deterministic ranking** - Stable sort, so equal scores keep corpus order
//! - **Pluggable embedder** - fastembed in production, anything implementing [`Embedder`] in tests
//!
//! ## Example
//!
//! ```ignore
//! use semsearch_core::{Config, FastEmbedder, Session};
//!
//! let config = Config::default();
//! let embedder = FastEmbedder::new(&config.model)?;
//! let session = Session::open(config, embedder)?;
//!
//! for hit in session.search("how do I reset my password")? {
//!     println!("{}. {} ({:.4})", hit.rank, hit.document, hit.score);
//! }
//! ```

pub mod cache;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod search;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use cache::{CacheOutcome, CacheStatus, EmbeddingMatrix, RebuildReason};
pub use config::{Config, ConfigOverrides};
pub use corpus::Corpus;
pub use embedding::{
    find_model_cache_dir, Embedder, EmbeddingEngine, FastEmbedConfig, FastEmbedder,
    DEFAULT_MODEL,
};
pub use error::{Result, SearchError};
pub use search::{cosine_similarity, SearchResult, DEFAULT_TOP_K};
pub use session::{Session, SessionStats};
