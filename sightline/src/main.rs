//! Sightline CLI entry point.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

use sightline::commands;
use sightline::config;

#[derive(Parser)]
#[command(name = "sightline")]
#[command(about = "Address explorer API over a bitcore node", long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.sightline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init,
    /// Run the explorer API server
    Serve,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(config::default_config_path);

    match cli.command {
        Commands::Init => commands::init::run(&config_path),
        Commands::Serve => commands::serve::run(&config_path),
    }
}
