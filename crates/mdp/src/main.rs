//! mdp CLI - Markdown to sanitized HTML.
//!
//! Provides commands for:
//! - `render`: Render a markdown file (or stdin) through the filter chain
//! - `filters`: Print the configured filter chain

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{FiltersArgs, RenderArgs};
use output::Output;

/// mdp - Markdown to sanitized HTML.
#[derive(Parser)]
#[command(name = "mdp", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render markdown to HTML on stdout.
    Render(RenderArgs),
    /// Print the configured filter chain.
    Filters(FiltersArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Render(args) => args.context.verbose,
        Commands::Filters(args) => args.context.verbose,
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Filters(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
