//! review-triage CLI binary.

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use review_triage::cli::args::*;
use review_triage::cli::commands::*;

fn main() {
    // Parse command line arguments using clap
    let args = TriageArgs::parse();

    // RUST_LOG wins over the verbosity flags
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Execute the command
    if let Err(e) = run_command(args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
