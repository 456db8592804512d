use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "orchardops",
    version,
    about = "Orchard disease risk and spray window advisor"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Spray recommendation from recent history, live reading and forecast (default)
    Advise,
    /// Disease risk table over the trailing risk window
    Risk {
        /// Override the configured window length in days
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Forecast timeline with ideal spray steps marked
    Forecast {
        /// Only show the next N hours
        #[arg(long)]
        hours: Option<u32>,
    },
    /// Validate config and test connections
    Check,
    /// Re-run interactive setup
    Init,
}
