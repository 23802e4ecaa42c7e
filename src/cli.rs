use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::error::{Error, Result};

#[derive(Parser, Debug)]
#[command(
    name = "drone-sim",
    about = "Discrete-event simulator for battery-powered queueing stations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a simulation from a config file
    Run {
        #[arg(long)]
        config: PathBuf,
        /// Shorthand for --format summary
        #[arg(long)]
        summary: bool,
        #[arg(long, value_enum, default_value = "human")]
        format: FormatArg,
        #[arg(long, help = "Override the config seed")]
        seed: Option<u64>,
        #[arg(long, help = "Override the simulated horizon, seconds")]
        horizon: Option<f64>,
    },
    /// Parse and validate a config file, then print it
    ShowConfig {
        #[arg(long)]
        config: PathBuf,
    },
    /// List the available dispatch policies
    ListPolicies,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FormatArg {
    Human,
    Summary,
    Json,
}

pub fn parse_args() -> Result<Cli> {
    Cli::try_parse().map_err(|e| Error::Cli(e.to_string()))
}
