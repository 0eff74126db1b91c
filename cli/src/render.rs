//! Text and JSON presentation of results

use std::io::{self, Write};

use semsearch_core::{CacheStatus, SearchResult, SessionStats};
use serde::Serialize;

pub const EMPTY_QUERY_PROMPT: &str = "Please enter a search query.";
pub const NO_RESULTS: &str = "No results found for your query.";

#[derive(Serialize)]
struct JsonResults<'a> {
    query: &'a str,
    results: &'a [SearchResult],
}

/// Numbered result list, or the no-results line
pub fn write_results<W: Write>(out: &mut W, results: &[SearchResult]) -> io::Result<()> {
    if results.is_empty() {
        return writeln!(out, "{NO_RESULTS}");
    }

    writeln!(out, "Search Results:")?;
    for result in results {
        writeln!(out, "{}. Document: {}", result.rank, result.document)?;
        writeln!(out, "   Similarity Score: {:.4}", result.score)?;
        writeln!(out, "---")?;
    }
    Ok(())
}

pub fn write_results_json<W: Write>(
    out: &mut W,
    query: &str,
    results: &[SearchResult],
) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &JsonResults { query, results })?;
    writeln!(out)
}

/// About panel
pub fn write_stats<W: Write>(out: &mut W, stats: &SessionStats) -> io::Result<()> {
    writeln!(out, "Model used: {} ({}d)", stats.model, stats.dimension)?;
    writeln!(
        out,
        "Documents loaded: {} from {}",
        stats.documents,
        stats.documents_path.display()
    )?;
    writeln!(out, "Embedding cache: {}", stats.cache_path.display())?;
    writeln!(out, "Cache status: {}", describe_cache(&stats.cache))?;
    writeln!(out, "Results per query: {}", stats.top_k)?;
    Ok(())
}

pub fn write_stats_json<W: Write>(out: &mut W, stats: &SessionStats) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, stats)?;
    writeln!(out)
}

pub fn describe_cache(status: &CacheStatus) -> String {
    match status {
        CacheStatus::Loaded => "loaded from disk".to_string(),
        CacheStatus::Built { cause } => format!("regenerated ({cause})"),
    }
}
