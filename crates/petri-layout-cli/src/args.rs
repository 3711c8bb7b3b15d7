//! Command-line argument definitions for the Petri net layout CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, layout direction and mode, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Petri net layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input net document (JSON)
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output routed net document (JSON)
    #[arg(short, long, default_value = "out.json")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Layout direction (horizontal/LR, vertical/TB); overrides the configuration
    #[arg(short, long)]
    pub direction: Option<String>,

    /// Keep the attach point capacities recorded in the input
    #[arg(long)]
    pub relayout: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
