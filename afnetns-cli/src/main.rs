//! Afnetns CLI
//!
//! Manage named, persistent handles for afnet namespaces: publish a
//! namespace under a name, run commands inside it, and resolve namespace
//! inodes back to names.

use clap::Parser;
use std::process;
use tracing::Level;

mod cli;
mod commands;

use cli::Cli;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Setup logging based on verbosity; diagnostics go to stderr so that
    // `list` output stays pipeable
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute the command; exec propagates the child's exit status
    match commands::dispatch(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}
