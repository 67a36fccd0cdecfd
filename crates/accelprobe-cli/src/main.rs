//! CLI entry point - the composition root.
//!
//! Probing never changes the exit status: problems are part of the report,
//! and output failures are logged to stderr. Only argument errors exit
//! non-zero (clap handles those before anything runs).

use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use accelprobe_cli::{Cli, CliConfig, RenderOptions, bootstrap, dispatch, handlers};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env first so clap's env fallbacks can see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli).await {
        error!("{e:#}");
    }
    Ok(())
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let ctx = bootstrap(CliConfig::from_cli(cli)).await;
    let command = cli.command_or_default();
    let opts = RenderOptions::new(cli.format, cli.no_color, cli.output.is_some());

    let rendered =
        dispatch(&ctx, &command, opts).with_context(|| format!("rendering {command:?}"))?;
    handlers::emit(&rendered, cli.output.as_deref()).context("writing output")?;
    Ok(())
}

/// Logs go to stderr so stdout carries only the report.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
