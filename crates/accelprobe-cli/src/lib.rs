//! Command-line front end for accelprobe.
//!
//! `main.rs` parses arguments, sets up tracing, bootstraps a [`CliContext`]
//! and dispatches to one handler; everything else lives here so it can be
//! tested.
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings for test infrastructure
#[cfg(test)]
use tokio_test as _;

// Used only by the binary
use anyhow as _;
use dotenvy as _;
use tokio as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use error::{CliError, CliResult};
pub use parser::Cli;
pub use presentation::{OutputFormat, RenderOptions};

/// Run one command against a bootstrapped context and return its output.
pub fn dispatch(ctx: &CliContext, command: &Commands, opts: RenderOptions) -> CliResult<String> {
    match command {
        Commands::Report => handlers::report::execute(ctx, opts),
        Commands::Devices => handlers::devices::execute(ctx, opts),
        Commands::Checks => handlers::checks::execute(ctx, opts),
        Commands::Env => handlers::env::execute(ctx, opts),
        Commands::Bench { sizes } => handlers::bench::execute(ctx, sizes, opts),
    }
}
