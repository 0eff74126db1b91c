//! Command dispatch

use std::io::{self, BufRead, Write};

use semsearch_core::{
    find_model_cache_dir, Config, Embedder, FastEmbedConfig, FastEmbedder, Result, SearchError,
    Session,
};

use crate::args::{Args, Command};
use crate::interactive::Repl;
use crate::render;

/// Defaults, then the config file, then flags and environment
pub fn resolve_config(args: &Args) -> Result<Config> {
    let base = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let config = base.with_overrides(args.overrides());
    config.validate()?;
    Ok(config)
}

/// Load the configured fastembed model
pub fn load_embedder(config: &Config) -> Result<FastEmbedder> {
    let embed_config = FastEmbedConfig {
        cache_dir: find_model_cache_dir(config.model_cache_dir.as_deref()),
        ..FastEmbedConfig::default()
    };
    FastEmbedder::with_config(&config.model, embed_config)
}

/// Entry point for the binary
pub fn run(args: &Args) -> Result<()> {
    let config = resolve_config(args)?;
    tracing::debug!("Resolved config: {:?}", config);

    let stdin = io::stdin();
    let stdout = io::stdout();
    execute(
        &args.command(),
        config,
        load_embedder,
        stdin.lock(),
        &mut stdout.lock(),
    )
}

/// Run one command with an injected embedder constructor
pub fn execute<E, F, R, W>(
    command: &Command,
    config: Config,
    make_embedder: F,
    input: R,
    out: &mut W,
) -> Result<()>
where
    E: Embedder,
    F: FnOnce(&Config) -> Result<E>,
    R: BufRead,
    W: Write,
{
    match command {
        Command::Search { query, json } => {
            // Nothing to rank; skip loading the model entirely
            if query.trim().is_empty() {
                writeln!(out, "{}", render::EMPTY_QUERY_PROMPT)?;
                return Ok(());
            }

            let embedder = make_embedder(&config)?;
            let session = Session::open(config, embedder)?;
            let results = session.search(query)?;
            if *json {
                render::write_results_json(out, query, &results)?;
            } else {
                render::write_results(out, &results)?;
            }
        }
        Command::Interactive => {
            let embedder = make_embedder(&config)?;
            Repl::new(config, &embedder).run(input, out)?;
        }
        Command::Info { json } => {
            let embedder = make_embedder(&config)?;
            let session = Session::open(config, embedder)?;
            if *json {
                render::write_stats_json(out, &session.stats())?;
            } else {
                render::write_stats(out, &session.stats())?;
            }
        }
        Command::Rebuild => {
            remove_cache(&config)?;
            let embedder = make_embedder(&config)?;
            let session = Session::open(config, embedder)?;
            writeln!(
                out,
                "Embeddings generated and saved: {} documents, {}d, {}",
                session.corpus().len(),
                session.matrix().dimension(),
                session.config().cache.display()
            )?;
        }
    }

    Ok(())
}

fn remove_cache(config: &Config) -> Result<()> {
    match std::fs::remove_file(&config.cache) {
        Ok(()) => {
            tracing::info!("Removed embedding cache {}", config.cache.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SearchError::Io(e)),
    }
}

/// Process exit code for a failed run
pub fn exit_code(err: &SearchError) -> i32 {
    match err {
        e if e.is_user_facing() => 2,
        SearchError::Config(_) | SearchError::Toml(_) => 2,
        _ => 1,
    }
}
