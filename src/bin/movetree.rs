//! movetree CLI - Branching chess move trees from the command line
//!
//! This CLI provides a unified interface for:
//! - Validating encoded trees against every structural invariant
//! - Inspecting a tree's shape, mainline and variations
//! - Playing moves into new or stored trees
//! - Exporting trees for further analysis

use anyhow::Result;
use clap::{Parser, Subcommand};
use movetree::cli::{
    commands::{export, inspect, play, validate},
    config::CliConfig,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "movetree")]
#[command(version, about = "Branching chess move trees", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(flatten)]
    config: CliConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check an encoded tree and list every violation
    Validate(validate::ValidateArgs),

    /// Summarize a tree and show its lines of play
    Inspect(inspect::InspectArgs),

    /// Play moves into a new or existing tree
    Play(play::PlayArgs),

    /// Export a tree in various formats
    Export(export::ExportArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "movetree=debug" } else { "movetree=warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?)
        .init();

    match cli.command {
        Commands::Validate(args) => validate::execute(args, &cli.config),
        Commands::Inspect(args) => inspect::execute(args, &cli.config),
        Commands::Play(args) => play::execute(args, &cli.config),
        Commands::Export(args) => export::execute(args, &cli.config),
    }
}
