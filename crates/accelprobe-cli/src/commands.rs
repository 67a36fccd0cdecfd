//! Subcommands for the CLI tool.

use clap::Subcommand;

/// Available commands.
///
/// Each one prints a slice of the same probe; `report` prints all of it.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the full report: runtime, devices, checks, tools and environment
    Report,

    /// List visible accelerator devices and their memory
    Devices,

    /// Run the functional checks
    Checks,

    /// Show build features, host facts, NVIDIA tools and environment hints
    Env,

    /// Time square matrix multiplications on the CPU and the accelerator
    Bench {
        /// Comma-separated matrix sizes (default 1000,2000,4000,8000)
        #[arg(long, value_delimiter = ',', value_parser = parse_size)]
        sizes: Vec<usize>,
    },
}

fn parse_size(text: &str) -> Result<usize, String> {
    match text.trim().parse::<usize>() {
        Ok(0) => Err("size must be at least 1".to_string()),
        Ok(size) => Ok(size),
        Err(e) => Err(format!("invalid size '{text}': {e}")),
    }
}
