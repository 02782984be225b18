mod commands;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, info};

use vigil_engine::EngineConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "vigil chess search engine", long_about = None)]
struct Args {
    /// Engine configuration as JSON; missing fields keep their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log per-iteration detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search a fixed set of positions and report nodes per second
    Bench {
        #[arg(short, long, default_value_t = 10)]
        depth: u8,
    },
    /// Count leaf nodes of the legal move tree
    Perft {
        #[arg(short, long, default_value_t = 5)]
        depth: u32,
        #[arg(short, long, default_value = vigil_core::STARTING_FEN)]
        fen: String,
        /// Print the count below every root move
        #[arg(long)]
        divide: bool,
    },
    /// Search one position and print the best move
    Search(commands::SearchArgs),
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: EngineConfig = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    config.validate().context("invalid engine configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    info!("vigil starting");

    let config = load_config(args.config.as_deref())?;
    match args.command {
        Command::Bench { depth } => commands::bench(config, depth),
        Command::Perft { depth, fen, divide } => commands::perft(&fen, depth, divide),
        Command::Search(search) => commands::search(config, &search),
    }
}
