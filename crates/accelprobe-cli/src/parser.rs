//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;
use crate::presentation::OutputFormat;

/// Command-line interface for the accelerator capability probe.
///
/// Global options apply to every subcommand; with no subcommand the full
/// report is printed.
#[derive(Parser, Debug)]
#[command(name = "accelprobe")]
#[command(about = "Report what the ML numeric runtime and its accelerators can do")]
#[command(version)]
pub struct Cli {
    /// Seconds to wait for each external tool (nvidia-smi, nvcc)
    #[arg(
        long = "tool-timeout",
        env = "ACCELPROBE_TOOL_TIMEOUT",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub tool_timeout: u64,

    /// Output format
    #[arg(
        long,
        value_enum,
        env = "ACCELPROBE_FORMAT",
        default_value_t = OutputFormat::Text,
        global = true
    )]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Also write the rendered output to this file
    #[arg(short = 'o', long = "output", global = true)]
    pub output: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The subcommand to run; `report` when none was given.
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Report)
    }
}
