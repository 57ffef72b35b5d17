//! fastencg - FASTEN revision call graphs for Maven artifacts
//!
//! Makes the call-graph generator runnable from the command line.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Parse CLI args and run
    let cli = fastencg::cli::Cli::parse();
    fastencg::cli::run(cli)
}
