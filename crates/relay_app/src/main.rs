mod config;
mod replay;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use relay_logging::relay_info;

use crate::config::{load_config, CONFIG_FILENAME};

/// Replays support-page snapshots and prints the reply suggestions a live
/// page would have shown.
#[derive(Parser)]
#[command(name = "relay_app")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = CONFIG_FILENAME)]
    config: PathBuf,

    /// Page location, used to pick the platform
    #[arg(short, long)]
    location: String,

    /// Click the suggestion at this index once suggestions are shown
    #[arg(short, long)]
    pick: Option<usize>,

    /// Overrides the configured pause between snapshots, in milliseconds
    #[arg(long)]
    step_ms: Option<u64>,

    /// HTML snapshots, replayed in order
    #[arg(required = true)]
    snapshots: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(step_ms) = cli.step_ms {
        config.step_interval_ms = step_ms;
    }
    relay_logging::initialize(config.log.destination(), config.log.level_filter()?);
    relay_info!("Replaying {} snapshot(s) for {}", cli.snapshots.len(), cli.location);

    let snapshots = replay::load_snapshots(&cli.snapshots)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    let outcome = runtime.block_on(replay::replay(&config, &cli.location, snapshots, cli.pick))?;

    if !outcome.platform.is_known() {
        println!("unsupported page: {}", cli.location);
        return Ok(());
    }
    for (index, suggestion) in outcome.suggestions.iter().enumerate() {
        println!("[{index}] {suggestion}");
    }
    if let Some(error) = &outcome.error {
        println!("error: {error}");
    }
    if let Some(text) = &outcome.composed {
        println!("composed: {text}");
    }
    Ok(())
}
