//! Semsearch entry point
//!
//! Logs go to stderr so results on stdout stay pipeable.

use clap::Parser;
use semsearch::Args;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let args = Args::parse();

    let log_filter = if args.verbose {
        "semsearch=debug,semsearch_core=debug"
    } else {
        "semsearch=info,semsearch_core=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = semsearch::run(&args) {
        tracing::error!("{}", e);
        std::process::exit(semsearch::exit_code(&e));
    }
}
