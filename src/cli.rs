//! Command-line interface for the spellfx scenario runner.

use clap::Parser;
use std::path::PathBuf;

/// Spell and combat visual-effects scenario runner
#[derive(Parser, Debug)]
#[command(name = "spellfx")]
#[command(about = "Spell and combat visual-effects scenario runner")]
#[command(version)]
pub struct Args {
    /// Run the specified JSON scenario file (omit for the built-in demo)
    #[arg(long, value_name = "SCENARIO_FILE")]
    pub scenario: Option<PathBuf>,

    /// Effect catalog to load instead of the default
    #[arg(long, value_name = "CATALOG_FILE")]
    pub catalog: Option<PathBuf>,

    /// Output path for the scenario log
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum simulation length in seconds (overrides the scenario)
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Fixed simulation framerate (overrides the scenario)
    #[arg(long)]
    pub frame_rate: Option<u32>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
