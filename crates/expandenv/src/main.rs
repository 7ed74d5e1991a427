//! expandenv CLI - placeholder expansion for YAML and JSON documents.
//!
//! Provides commands for:
//! - `expand`: Expand `${VAR}` placeholders in a document
//! - `list`: List the variables a document references

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ExpandArgs, ListArgs};
use output::Output;

/// expandenv - expand `${VAR}` placeholders in YAML and JSON documents.
#[derive(Parser)]
#[command(name = "expandenv", version, about)]
struct Cli {
    /// Enable verbose output (show info logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand placeholders and write the resulting document.
    Expand(ExpandArgs),
    /// List variable names referenced by a document.
    List(ListArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr; stdout carries the document
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Expand(args) => args.execute(),
        Commands::List(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
