//! AutoDelegate CLI - Command-line driver for the AutoDelegate code generator
//!
//! Runs a full compilation over a snapshot of a Java program and writes the
//! generated `AutoDelegate_*` base classes.

use clap::{Parser, Subcommand};
use commands::generate::GenerateCommand;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;

/// AutoDelegate CLI - Generate delegating base classes
#[derive(Debug, Parser)]
#[command(name = "autodelegate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate delegate base classes from a compilation snapshot
    #[command(name = "generate")]
    Generate(GenerateCommand),
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Generate(cmd) => cmd.execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
