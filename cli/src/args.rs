//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use semsearch_core::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(name = "semsearch")]
#[command(about = "Semantic search over a text file with one document per line")]
#[command(version)]
pub struct Args {
    /// TOML config file
    #[arg(long, short, env = "SEMSEARCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Document source, one document per line
    #[arg(long, short, env = "SEMSEARCH_DOCUMENTS", global = true)]
    pub documents: Option<PathBuf>,

    /// Embedding cache file
    #[arg(long, env = "SEMSEARCH_CACHE", global = true)]
    pub cache: Option<PathBuf>,

    /// Embedding model identifier
    #[arg(long, short, env = "SEMSEARCH_MODEL", global = true)]
    pub model: Option<String>,

    /// Number of results to show
    #[arg(long, short = 'k', env = "SEMSEARCH_TOP_K", global = true)]
    pub top_k: Option<usize>,

    /// Directory for downloaded model files
    #[arg(long, global = true)]
    pub model_cache_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a single query and print the ranked documents
    Search {
        /// The search query
        query: String,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read queries from stdin until EOF or :quit (default)
    Interactive,

    /// Show the model, corpus size, and cache state
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Discard the embedding cache and regenerate it
    Rebuild,
}

impl Args {
    /// Flags and environment values that override the config file
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            documents: self.documents.clone(),
            cache: self.cache.clone(),
            model: self.model.clone(),
            top_k: self.top_k,
            model_cache_dir: self.model_cache_dir.clone(),
        }
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Interactive)
    }
}
