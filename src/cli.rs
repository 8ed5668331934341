//! Command-line interface.
//!
//! A single Run driven headlessly to completion or for a fixed number of
//! ticks, for local testing of the tick scheduler without a transport
//! layer attached.

use clap::Parser;
use std::path::PathBuf;

/// Dungeon crawler simulation core
#[derive(Parser, Debug)]
#[command(name = "dungeoncrawler")]
#[command(about = "Real-time tick-based dungeon crawler simulation core")]
#[command(version)]
pub struct Args {
    /// Run config JSON file (seed, starting floor, party size)
    #[arg(long, value_name = "CONFIG_FILE")]
    pub run_config: Option<PathBuf>,

    /// Server config JSON file (tick rate, rate limit, log filter)
    #[arg(long, value_name = "CONFIG_FILE")]
    pub server_config: Option<PathBuf>,

    /// Stop after this many ticks instead of running until the Run ends
    #[arg(long, default_value = "1200")]
    pub max_ticks: u64,

    /// Spawn this many simulated players into the Run before ticking
    #[arg(long, default_value = "1")]
    pub players: u32,
}

pub fn parse_args() -> Args {
    Args::parse()
}
