//! Persistent embedding cache
//!
//! Stores the corpus embedding matrix as a bincode file with a small
//! versioned header. A cache that is missing, unreadable, or out of step with
//! the corpus or model is never an error: it is rebuilt and republished.

use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::corpus::Corpus;
use crate::embedding::Embedder;
use crate::error::{Result, SearchError};

/// File signature for cache files
const CACHE_MAGIC: [u8; 4] = *b"SSEM";
const CACHE_VERSION: u32 = 1;

/// Embedding vectors aligned 1:1 with a corpus
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    model_id: String,
    dimension: usize,
    rows: Vec<Vec<f32>>,
}

impl EmbeddingMatrix {
    /// Build a matrix, rejecting ragged rows and non-finite values
    pub fn new(model_id: impl Into<String>, rows: Vec<Vec<f32>>) -> Result<Self> {
        let dimension = rows.first().map_or(0, Vec::len);

        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != dimension) {
            return Err(SearchError::embedding(format!(
                "Row {} has dimension {}, expected {}",
                i,
                row.len(),
                dimension
            )));
        }

        if let Some(i) = rows.iter().position(|r| r.iter().any(|v| !v.is_finite())) {
            return Err(SearchError::embedding(format!(
                "Row {i} contains a non-finite value"
            )));
        }

        Ok(Self {
            model_id: model_id.into(),
            dimension,
            rows,
        })
    }

    /// Number of rows (one per document)
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Length of each row, 0 for an empty matrix
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Model that produced the vectors
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Iterate rows in corpus order
    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// Why a cached matrix was not used
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RebuildReason {
    /// No cache file yet
    Missing,
    /// Cache file exists but has zero bytes
    Empty,
    /// Cache file could not be read or decoded
    Corrupt { detail: String },
    /// Row count differs from the corpus
    RowMismatch { expected: usize, found: usize },
    /// Cache was written by another model
    ModelMismatch { expected: String, found: String },
    /// Vector length differs from the embedder's
    DimensionMismatch { expected: usize, found: usize },
}

impl RebuildReason {
    /// Whether this should surface as a user-visible warning.
    /// A missing or empty cache is the normal first run.
    pub fn is_warning(&self) -> bool {
        !matches!(self, Self::Missing | Self::Empty)
    }
}

impl fmt::Display for RebuildReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "No embedding cache found"),
            Self::Empty => write!(f, "Embedding cache is empty"),
            Self::Corrupt { detail } => write!(f, "Error loading embeddings: {detail}"),
            Self::RowMismatch { expected, found } => write!(
                f,
                "Document count mismatch with existing embeddings ({found} cached, {expected} documents)"
            ),
            Self::ModelMismatch { expected, found } => write!(
                f,
                "Embeddings were generated by {found}, current model is {expected}"
            ),
            Self::DimensionMismatch { expected, found } => write!(
                f,
                "Embedding dimension mismatch ({found} cached, model produces {expected})"
            ),
        }
    }
}

/// Where the returned matrix came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CacheStatus {
    /// Read from the cache file
    Loaded,
    /// Freshly embedded
    Built { cause: RebuildReason },
}

impl CacheStatus {
    /// Warning to surface to the user, if any
    pub fn warning(&self) -> Option<&RebuildReason> {
        match self {
            Self::Built { cause } if cause.is_warning() => Some(cause),
            _ => None,
        }
    }
}

/// Result of [`get_or_build`]
#[derive(Debug, Clone)]
pub struct CacheOutcome {
    pub matrix: EmbeddingMatrix,
    pub status: CacheStatus,
}

#[derive(Deserialize)]
struct CacheFile {
    magic: [u8; 4],
    version: u32,
    model_id: String,
    dimension: u32,
    rows: Vec<Vec<f32>>,
}

/// Borrowed twin of [`CacheFile`]; bincode encodes both identically
#[derive(Serialize)]
struct CacheFileRef<'a> {
    magic: [u8; 4],
    version: u32,
    model_id: &'a str,
    dimension: u32,
    rows: &'a [Vec<f32>],
}

/// Return embeddings for `corpus`, from `cache_path` when valid, otherwise
/// by embedding the corpus and republishing the cache.
///
/// On success the matrix always has exactly `corpus.len()` rows. Cache
/// problems are logged and recovered here; only embedder failures escape.
pub fn get_or_build<E: Embedder + ?Sized>(
    corpus: &Corpus,
    embedder: &E,
    cache_path: impl AsRef<Path>,
) -> Result<CacheOutcome> {
    let path = cache_path.as_ref();

    let cause = match check_cached(corpus, embedder, path) {
        Ok(matrix) => {
            log::info!(
                "Loaded {} cached embeddings from {}",
                matrix.rows(),
                path.display()
            );
            return Ok(CacheOutcome {
                matrix,
                status: CacheStatus::Loaded,
            });
        }
        Err(cause) => cause,
    };

    if cause.is_warning() {
        log::warn!("{}. Re-generating embeddings.", cause);
    } else {
        log::info!("{} at {}, generating embeddings", cause, path.display());
    }

    let rows = embedder.encode_batch(&corpus.as_strs())?;
    if rows.len() != corpus.len() {
        return Err(SearchError::embedding(format!(
            "Embedder returned {} vectors for {} documents",
            rows.len(),
            corpus.len()
        )));
    }
    let matrix = EmbeddingMatrix::new(embedder.model_id(), rows)?;

    // Losing the write only costs a rebuild next run
    match save(path, &matrix) {
        Ok(()) => log::info!(
            "Embeddings generated and saved ({} x {}d) to {}",
            matrix.rows(),
            matrix.dimension(),
            path.display()
        ),
        Err(e) => log::warn!(
            "Failed to save embeddings to {}: {}",
            path.display(),
            e
        ),
    }

    Ok(CacheOutcome {
        matrix,
        status: CacheStatus::Built { cause },
    })
}

/// [`get_or_build`] without the status
pub fn get_or_build_matrix<E: Embedder + ?Sized>(
    corpus: &Corpus,
    embedder: &E,
    cache_path: impl AsRef<Path>,
) -> Result<EmbeddingMatrix> {
    get_or_build(corpus, embedder, cache_path).map(|outcome| outcome.matrix)
}

fn check_cached<E: Embedder + ?Sized>(
    corpus: &Corpus,
    embedder: &E,
    path: &Path,
) -> std::result::Result<EmbeddingMatrix, RebuildReason> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(RebuildReason::Missing),
        Err(e) => {
            return Err(RebuildReason::Corrupt {
                detail: e.to_string(),
            })
        }
    };

    if metadata.len() == 0 {
        return Err(RebuildReason::Empty);
    }

    let matrix = load(path).map_err(|e| RebuildReason::Corrupt {
        detail: e.to_string(),
    })?;

    if matrix.rows() != corpus.len() {
        return Err(RebuildReason::RowMismatch {
            expected: corpus.len(),
            found: matrix.rows(),
        });
    }

    if matrix.model_id() != embedder.model_id() {
        return Err(RebuildReason::ModelMismatch {
            expected: embedder.model_id().to_string(),
            found: matrix.model_id().to_string(),
        });
    }

    if !matrix.is_empty() && matrix.dimension() != embedder.dimension() {
        return Err(RebuildReason::DimensionMismatch {
            expected: embedder.dimension(),
            found: matrix.dimension(),
        });
    }

    Ok(matrix)
}

/// Read a cache file
///
/// # Errors
/// [`SearchError::CacheFormat`] when the header is wrong or rows are ragged,
/// [`SearchError::Bincode`] / [`SearchError::Io`] when the file can't be decoded.
pub fn load(path: impl AsRef<Path>) -> Result<EmbeddingMatrix> {
    let bytes = fs::read(path.as_ref())?;
    let file: CacheFile = bincode::deserialize(&bytes)?;

    if file.magic != CACHE_MAGIC {
        return Err(SearchError::cache_format("not an embedding cache file"));
    }

    if file.version != CACHE_VERSION {
        return Err(SearchError::cache_format(format!(
            "unsupported cache version {} (current: {})",
            file.version, CACHE_VERSION
        )));
    }

    let matrix = EmbeddingMatrix::new(file.model_id, file.rows)
        .map_err(|e| SearchError::cache_format(e.to_string()))?;

    if !matrix.is_empty() && matrix.dimension() != file.dimension as usize {
        return Err(SearchError::cache_format(format!(
            "header says {}d, rows are {}d",
            file.dimension,
            matrix.dimension()
        )));
    }

    Ok(matrix)
}

/// Write a cache file, replacing any previous one atomically.
///
/// The matrix is written to a temp file beside `path` and renamed over it,
/// so concurrent readers see either the old file or the new one in full.
pub fn save(path: impl AsRef<Path>, matrix: &EmbeddingMatrix) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let dimension = u32::try_from(matrix.dimension())
        .map_err(|_| SearchError::cache_format("dimension does not fit in u32"))?;

    let file = CacheFileRef {
        magic: CACHE_MAGIC,
        version: CACHE_VERSION,
        model_id: matrix.model_id(),
        dimension,
        rows: &matrix.rows,
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        bincode::serialize_into(&mut writer, &file)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| SearchError::Io(e.error))?;

    log::debug!("Persisted embedding cache to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubEmbedder;
    use tempfile::TempDir;

    fn corpus(n: usize) -> Corpus {
        Corpus::from_lines((0..n).map(|i| format!("document number {i}")))
    }

    #[test]
    fn test_build_when_missing_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("embeddings.bin");
        let corpus = corpus(3);
        let embedder = StubEmbedder::new(4);

        let first = get_or_build(&corpus, &embedder, &path).unwrap();
        assert_eq!(
            first.status,
            CacheStatus::Built {
                cause: RebuildReason::Missing
            }
        );
        assert!(first.status.warning().is_none());
        assert_eq!(first.matrix.rows(), 3);
        assert!(path.exists());
        assert_eq!(embedder.batch_calls(), 1);

        let second = get_or_build(&corpus, &embedder, &path).unwrap();
        assert_eq!(second.status, CacheStatus::Loaded);
        assert_eq!(second.matrix, first.matrix);
        assert_eq!(embedder.batch_calls(), 1);
    }

    #[test]
    fn test_row_count_invariant_for_every_cache_state() {
        let dir = TempDir::new().unwrap();
        let embedder = StubEmbedder::new(4);
        let docs = corpus(5);

        // missing
        let missing = dir.path().join("missing.bin");
        // empty
        let empty = dir.path().join("empty.bin");
        fs::write(&empty, b"").unwrap();
        // corrupt
        let corrupt = dir.path().join("corrupt.bin");
        fs::write(&corrupt, b"definitely not bincode").unwrap();
        // mismatched
        let mismatched = dir.path().join("mismatched.bin");
        get_or_build(&corpus(2), &embedder, &mismatched).unwrap();
        // valid
        let valid = dir.path().join("valid.bin");
        get_or_build(&docs, &embedder, &valid).unwrap();

        for path in [missing, empty, corrupt, mismatched, valid] {
            let matrix = get_or_build_matrix(&docs, &embedder, &path).unwrap();
            assert_eq!(matrix.rows(), docs.len(), "{}", path.display());
            assert_eq!(load(&path).unwrap().rows(), docs.len());
        }
    }

    #[test]
    fn test_self_heals_on_row_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("embeddings.bin");
        let embedder = StubEmbedder::new(4);

        get_or_build(&corpus(2), &embedder, &path).unwrap();
        assert_eq!(load(&path).unwrap().rows(), 2);

        let outcome = get_or_build(&corpus(4), &embedder, &path).unwrap();
        assert_eq!(
            outcome.status,
            CacheStatus::Built {
                cause: RebuildReason::RowMismatch {
                    expected: 4,
                    found: 2
                }
            }
        );
        assert!(outcome.status.warning().is_some());
        assert_eq!(outcome.matrix.rows(), 4);
        assert_eq!(load(&path).unwrap().rows(), 4);
    }

    #[test]
    fn test_corrupt_cache_is_rebuilt_with_warning() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("embeddings.bin");
        fs::write(&path, [0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]).unwrap();

        let outcome = get_or_build(&corpus(2), &StubEmbedder::new(4), &path).unwrap();
        match &outcome.status {
            CacheStatus::Built {
                cause: RebuildReason::Corrupt { .. },
            } => {}
            other => panic!("Expected Corrupt rebuild, got {:?}", other),
        }
        assert!(outcome.status.warning().is_some());
        assert_eq!(load(&path).unwrap().rows(), 2);
    }

    #[test]
    fn test_empty_cache_file_is_rebuilt_quietly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("embeddings.bin");
        fs::write(&path, b"").unwrap();

        let outcome = get_or_build(&corpus(1), &StubEmbedder::new(4), &path).unwrap();
        assert_eq!(
            outcome.status,
            CacheStatus::Built {
                cause: RebuildReason::Empty
            }
        );
        assert!(outcome.status.warning().is_none());
    }

    #[test]
    fn test_model_change_invalidates_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("embeddings.bin");
        let corpus = corpus(2);

        get_or_build(&corpus, &StubEmbedder::with_model("model-a", 4), &path).unwrap();
        let outcome =
            get_or_build(&corpus, &StubEmbedder::with_model("model-b", 4), &path).unwrap();

        assert_eq!(
            outcome.status,
            CacheStatus::Built {
                cause: RebuildReason::ModelMismatch {
                    expected: "model-b".to_string(),
                    found: "model-a".to_string()
                }
            }
        );
        assert_eq!(load(&path).unwrap().model_id(), "model-b");
    }

    #[test]
    fn test_dimension_change_invalidates_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("embeddings.bin");
        let corpus = corpus(2);

        get_or_build(&corpus, &StubEmbedder::new(4), &path).unwrap();
        let outcome = get_or_build(&corpus, &StubEmbedder::new(8), &path).unwrap();

        assert_eq!(
            outcome.status,
            CacheStatus::Built {
                cause: RebuildReason::DimensionMismatch {
                    expected: 8,
                    found: 4
                }
            }
        );
        assert_eq!(outcome.matrix.dimension(), 8);
    }

    #[test]
    fn test_embedder_failure_propagates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("embeddings.bin");

        let err = get_or_build(&corpus(2), &StubEmbedder::failing(), &path).unwrap_err();
        assert!(matches!(err, SearchError::Embedding(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_cache_still_returns_matrix() {
        let dir = TempDir::new().unwrap();
        // A directory where the cache file should be makes the rename fail
        let path = dir.path().join("embeddings.bin");
        fs::create_dir(&path).unwrap();

        let outcome = get_or_build(&corpus(3), &StubEmbedder::new(4), &path).unwrap();
        assert_eq!(outcome.matrix.rows(), 3);
    }

    #[test]
    fn test_save_and_load_preserve_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("embeddings.bin");
        let matrix =
            EmbeddingMatrix::new("stub", vec![vec![0.5, -0.25], vec![1.0, 0.0]]).unwrap();

        save(&path, &matrix).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, matrix);
        assert_eq!(loaded.dimension(), 2);
        assert_eq!(loaded.iter().next(), Some(&[0.5_f32, -0.25][..]));
        // No temp files left behind
        let entries = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_non_finite_cache_is_rebuilt_as_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("embeddings.bin");
        let rows = vec![
            vec![0.1, 0.9],
            vec![f32::NAN, 0.0],
            vec![0.9, f32::INFINITY],
            vec![0.5, 0.5],
        ];
        let bytes = bincode::serialize(&CacheFileRef {
            magic: CACHE_MAGIC,
            version: CACHE_VERSION,
            model_id: "stub",
            dimension: 2,
            rows: &rows,
        })
        .unwrap();
        fs::write(&path, bytes).unwrap();

        assert!(matches!(load(&path), Err(SearchError::CacheFormat(_))));

        let outcome = get_or_build(&corpus(4), &StubEmbedder::new(2), &path).unwrap();
        match &outcome.status {
            CacheStatus::Built {
                cause: RebuildReason::Corrupt { detail },
            } => assert!(detail.contains("non-finite"), "{detail}"),
            other => panic!("Expected Corrupt rebuild, got {:?}", other),
        }
        assert!(outcome
            .matrix
            .iter()
            .all(|row| row.iter().all(|v| v.is_finite())));
        assert!(load(&path).is_ok());
    }

    #[test]
    fn test_matrix_rejects_non_finite_rows() {
        let err = EmbeddingMatrix::new("stub", vec![vec![1.0, 0.0], vec![f32::NAN, 1.0]])
            .unwrap_err();
        assert!(err.to_string().contains("Row 1"));
    }

    #[test]
    fn test_load_rejects_foreign_magic() {
        #[derive(Serialize)]
        struct Foreign {
            magic: [u8; 4],
            version: u32,
            model_id: String,
            dimension: u32,
            rows: Vec<Vec<f32>>,
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("foreign.bin");
        let bytes = bincode::serialize(&Foreign {
            magic: *b"NOPE",
            version: CACHE_VERSION,
            model_id: "stub".to_string(),
            dimension: 1,
            rows: vec![vec![1.0]],
        })
        .unwrap();
        fs::write(&path, bytes).unwrap();

        assert!(matches!(load(&path), Err(SearchError::CacheFormat(_))));
    }

    #[test]
    fn test_matrix_rejects_ragged_rows() {
        let err = EmbeddingMatrix::new("stub", vec![vec![1.0, 2.0], vec![1.0]]).unwrap_err();
        assert!(err.to_string().contains("Row 1"));
    }

    #[test]
    fn test_rebuild_reason_display() {
        let reason = RebuildReason::RowMismatch {
            expected: 5,
            found: 3,
        };
        assert_eq!(
            reason.to_string(),
            "Document count mismatch with existing embeddings (3 cached, 5 documents)"
        );
        assert!(!RebuildReason::Missing.is_warning());
        assert!(reason.is_warning());
    }
}
