//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together for
//! the CLI. The external tools are queried, host facts are read, and the
//! candle runtime is connected exactly once here; handlers only borrow the
//! resulting [`CliContext`].

use std::time::Duration;

use accelprobe_runtime::{DEFAULT_TOOL_TIMEOUT, ProbeSession, ToolRunner};
use tracing::debug;

use crate::parser::Cli;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Time budget for each external tool invocation.
    pub tool_timeout: Duration,
    /// Version stamped into every report.
    pub probe_version: String,
}

impl CliConfig {
    /// Create config with default values.
    pub fn with_defaults() -> Self {
        Self {
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            probe_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Apply parsed command-line options on top of the defaults.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            tool_timeout: Duration::from_secs(cli.tool_timeout),
            ..Self::with_defaults()
        }
    }
}

/// Fully composed context for CLI commands.
///
/// Owns the connected runtime; dropping the context releases the device.
pub struct CliContext {
    pub config: CliConfig,
    pub session: ProbeSession,
}

/// Bootstrap the CLI with all infrastructure wired up.
pub async fn bootstrap(config: CliConfig) -> CliContext {
    let runner = ToolRunner::new(config.tool_timeout);
    let session = ProbeSession::open(&runner).await;
    debug!(tool_timeout = ?config.tool_timeout, "CLI context ready");
    CliContext { config, session }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_config_from_cli() {
        let cli = Cli::parse_from(["accelprobe", "--tool-timeout", "2"]);
        let config = CliConfig::from_cli(&cli);
        assert_eq!(config.tool_timeout, Duration::from_secs(2));
        assert_eq!(config.probe_version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(CliConfig::with_defaults().tool_timeout, Duration::from_secs(10));
    }
}
