//! Binary crate for the `ls` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive credential configuration
//! - Printing responses as JSON or GeoJSON

use clap::Parser;
use tracing_subscriber::{EnvFilter, filter::Directive, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_logging(cmd.verbose);
    cmd.run().await
}

/// Logs go to stderr so JSON on stdout stays pipeable.
fn init_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(log_filter(verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

/// `RUST_LOG` when set, otherwise `warn`; `--verbose` always adds
/// `location_core=debug` on top.
fn log_filter(verbose: bool, env: Option<String>) -> EnvFilter {
    let base = env.as_deref().and_then(|spec| EnvFilter::try_new(spec).ok());
    let filter = base.unwrap_or_else(|| EnvFilter::new(if verbose { "info" } else { "warn" }));

    if verbose {
        match "location_core=debug".parse::<Directive>() {
            Ok(directive) => filter.add_directive(directive),
            Err(_) => filter,
        }
    } else {
        filter
    }
}
