//! Document store
//!
//! Loads a newline-delimited document list. Each non-blank line, trimmed,
//! is one document; its position in the file is its identity.

use std::path::{Path, PathBuf};

use crate::error::{Result, SearchError};

/// Ordered, non-empty-entry list of documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    documents: Vec<String>,
    source: Option<PathBuf>,
}

impl Corpus {
    /// Build a corpus from in-memory lines using the same trim/filter rules as [`load`]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let documents = lines
            .into_iter()
            .map(|line| line.as_ref().trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        Self {
            documents,
            source: None,
        }
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Document at `index`, if any
    pub fn get(&self, index: usize) -> Option<&str> {
        self.documents.get(index).map(String::as_str)
    }

    /// Iterate documents in corpus order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(String::as_str)
    }

    /// Borrowed view suitable for batch embedding
    pub fn as_strs(&self) -> Vec<&str> {
        self.iter().collect()
    }

    /// Path the corpus was read from, if it came from disk
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Load a corpus from a UTF-8 text file, one document per line.
///
/// # Errors
/// - [`SearchError::SourceNotFound`] if `path` does not exist
/// - [`SearchError::EmptyCorpus`] if no non-blank lines remain after trimming
/// - [`SearchError::Io`] for any other read failure
pub fn load(path: impl AsRef<Path>) -> Result<Corpus> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SearchError::SourceNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let mut corpus = Corpus::from_lines(content.lines());

    if corpus.is_empty() {
        return Err(SearchError::EmptyCorpus(path.to_path_buf()));
    }

    log::debug!(
        "Loaded {} documents from {}",
        corpus.len(),
        path.display()
    );

    corpus.source = Some(path.to_path_buf());
    Ok(corpus)
}
