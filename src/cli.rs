//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Release decisions and download tracking for a media library manager.
///
/// Evaluates indexer search results against a quality profile and checks
/// the configuration the tracking core runs with.
#[derive(Parser, Debug)]
#[command(name = "releasegate")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML config file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate and rank the candidates in a JSON fixture
    Evaluate {
        /// Fixture with a profile, an optional search and candidates
        fixture: PathBuf,

        /// Print decisions as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Load and validate configuration, then print the resolved values
    CheckConfig,
}
