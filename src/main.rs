//! nipype-config - inspect nipype configuration
//!
//! Shows the settings the pipeline framework would load from the defaults,
//! `~/.nipype/nipype.cfg` and a local `nipype.cfg`, and manages the cached
//! data file.

use anyhow::Context;
use clap::Parser;
use nipype_config::cli::Cli;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.debug);

    // Execute the command
    if let Err(e) = run(cli) {
        error!("Error: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    debug!("Starting nipype-config");
    cli.execute().context("nipype-config command failed")
}

fn init_logging(debug: bool) {
    let default_filter = if debug {
        "nipype_config=debug"
    } else {
        "nipype_config=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
