//! Corescope CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "corescope")]
#[command(about = "k-core decomposition over a branching graph edit history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to ./corescope.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print compact JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decompose an edge list into k-core levels
    Decompose {
        /// Edge list file (JSON pairs or `u v` lines)
        edges: PathBuf,

        /// Drop self-loops instead of rejecting them
        #[arg(long)]
        ignore_self_loops: bool,
    },
    /// Print the core number of every node
    CoreNumbers {
        edges: PathBuf,
    },
    /// Replay an edit script and print the resulting timeline
    Replay {
        script: PathBuf,

        /// Edges recorded as adds before the script runs
        #[arg(long)]
        edges: Option<PathBuf>,
    },
    /// Replay an edit script, then print the plan to another revision
    Plan {
        script: PathBuf,

        /// Target revision id
        #[arg(long)]
        to: u64,

        #[arg(long)]
        edges: Option<PathBuf>,
    },
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.compact {
        config.output.pretty = false;
    }

    // Initialize logging; stdout is reserved for JSON output
    let log_level = if cli.verbose { "debug" } else { config.log.level.as_str() };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "corescope={0},corescope_core={0},corescope_timeline={0}",
            log_level
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Corescope v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Decompose {
            edges,
            ignore_self_loops,
        } => {
            if ignore_self_loops {
                config.decomposition.self_loops = corescope_core::SelfLoopPolicy::Ignore;
            }
            commands::decompose(&edges, &config)
        }
        Commands::CoreNumbers { edges } => commands::core_numbers(&edges, &config),
        Commands::Replay { script, edges } => commands::replay(&script, edges.as_deref(), &config),
        Commands::Plan { script, to, edges } => {
            commands::plan(&script, edges.as_deref(), to, &config)
        }
        Commands::Version => {
            println!("Corescope v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
