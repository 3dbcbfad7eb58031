//! scout — rank scheduler clusters for a client from the command line.
//!
//! # Usage
//!
//! ```text
//! scout search --clusters clusters.json --ip 10.0.0.9 -C idc=x -C location="cn|hz"
//! scout score --clusters clusters.json --ip 10.0.0.9 --config scout.toml
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use scout_core::ScoutConfig;
use tracing::warn;

mod commands;

#[derive(Parser)]
#[command(
    name = "scout",
    about = "Scout — match clients to scheduler clusters",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to scout.toml (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the eligible clusters, best match first
    Search(commands::search::SearchArgs),
    /// Print the affinity score breakdown of each eligible cluster
    Score(commands::search::SearchArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ScoutConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ScoutConfig::default(),
    };

    commands::init_tracing(&config.log)?;

    let searcher = commands::load_searcher(&config.searcher).await;
    if scout_searcher::install_global(searcher).is_err() {
        warn!("searcher already installed, keeping the existing one");
    }
    let searcher = scout_searcher::global();

    match cli.command {
        Commands::Search(args) => commands::search::search(searcher.as_ref(), &args),
        Commands::Score(args) => commands::search::score(searcher.as_ref(), &args),
    }
}
