//! # ftsim-cli::args
//!
//! Defines the command-line argument structure using `clap`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, default_value = "human")]
    pub log: LogFormat,

    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a simulation from a scenario file.
    Run(RunOpts),
    /// List all compiled and available protocols.
    ListProtocols,
    /// Validate a scenario file for correctness.
    Validate {
        #[arg(value_name = "SCENARIO_PATH")]
        scenario: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct RunOpts {
    /// Path to the scenario file (YAML or TOML). Not required when `--chaos`
    /// selects a built-in preset scenario instead.
    #[arg(short, long, required_unless_present = "chaos_scenario")]
    pub scenario: Option<PathBuf>,

    /// Override the RNG seed from the scenario file.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the stop time from the scenario file (in milliseconds).
    #[arg(long)]
    pub stop_at: Option<u64>,

    /// Run in headless mode without the TUI.
    #[arg(long)]
    pub headless: bool,

    /// Run one of the built-in chaos presets instead of loading a scenario
    /// file from disk.
    #[arg(long, value_enum)]
    pub chaos_scenario: Option<ChaosScenario>,

    /// Override the uniform per-link drop probability (applies to every
    /// link in the topology).
    #[arg(long)]
    pub message_drop_rate: Option<f64>,

    /// Override the uniform per-link minimum delay, in milliseconds.
    #[arg(long)]
    pub message_delay_min: Option<u64>,

    /// Override the uniform per-link maximum delay, in milliseconds.
    #[arg(long)]
    pub message_delay_max: Option<u64>,

    /// Override the uniform per-link duplicate probability.
    #[arg(long)]
    pub duplicate_rate: Option<f64>,
}

/// The named chaos recipes from SPEC_FULL.md §6.1, built programmatically by
/// `ftsim_engine::scenario::presets` rather than loaded from a file.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaosScenario {
    LeaderFailure,
    RollingFailures,
    SplitBrain,
    NetworkPartition,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}
