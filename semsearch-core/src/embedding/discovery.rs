//! Model cache directory discovery
//!
//! Decides where fastembed keeps downloaded model files.

use std::path::{Path, PathBuf};

/// Find the model cache directory with priority:
/// 1. Configured directory (config file or CLI flag)
/// 2. SEMSEARCH_MODEL_CACHE environment variable
/// 3. FASTEMBED_CACHE_DIR environment variable
/// 4. User home directory (~/.semsearch/models)
///
/// Returns `None` when nothing applies, leaving fastembed on its own default.
pub fn find_model_cache_dir(configured: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: config file / CLI flag
    if let Some(dir) = configured {
        log::debug!("Using configured model cache: {}", dir.display());
        return Some(dir.to_path_buf());
    }

    // Priority 2: override for this tool
    if let Some(dir) = non_empty_env("SEMSEARCH_MODEL_CACHE") {
        log::debug!("Using SEMSEARCH_MODEL_CACHE: {}", dir.display());
        return Some(dir);
    }

    // Priority 3: fastembed's own variable
    if let Some(dir) = non_empty_env("FASTEMBED_CACHE_DIR") {
        log::debug!("Using FASTEMBED_CACHE_DIR: {}", dir.display());
        return Some(dir);
    }

    // Priority 4: user home directory
    let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"))?;
    let user_path = PathBuf::from(home).join(".semsearch").join("models");
    log::debug!("Using user model cache: {}", user_path.display());
    Some(user_path)
}

fn non_empty_env(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
