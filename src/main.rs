//! CLI entry point for the releasegate tool.

use anyhow::{Context, Result};
use clap::Parser;
use releasegate_core::CoreConfig;
use tracing::{debug, info};

mod cli;
mod commands;

use cli::{Args, Command};

fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let config = match &args.config {
        Some(path) => CoreConfig::load(path)
            .with_context(|| format!("invalid configuration in {}", path.display()))?,
        None => CoreConfig::default(),
    };
    info!(
        protocols = config.decision.enabled_protocols.len(),
        tracking_ttl_hours = config.tracking.ttl_hours,
        "Configuration loaded"
    );

    match &args.command {
        Command::Evaluate { fixture, json } => {
            commands::run_evaluate_command(&config, fixture, *json)
        }
        Command::CheckConfig => {
            commands::run_check_config_command(&config, args.config.as_deref())
        }
    }
}
