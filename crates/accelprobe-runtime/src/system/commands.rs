//! Bounded external command execution and version extraction.
//!
//! Every invocation runs under a timeout and the child is killed if the
//! deadline passes. A missing binary, a timeout and a non-zero exit are all
//! ordinary outcomes, reported through [`ProbeError`].

use std::io;
use std::process::Stdio;
use std::time::Duration;

use accelprobe_core::{ProbeError, ProbeResult, ToolStatus, ToolVersion};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Default time budget for one external tool invocation.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs external tools with a fixed time budget.
#[derive(Debug, Clone, Copy)]
pub struct ToolRunner {
    timeout: Duration,
}

impl ToolRunner {
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `program args...` and return its text output.
    ///
    /// Stdout is preferred; stderr is used when stdout is blank (some tools
    /// print their version there).
    pub async fn capture(&self, program: &str, args: &[&str]) -> ProbeResult<String> {
        debug!(program, ?args, timeout_ms = self.timeout_ms(), "Running external tool");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match timeout(self.timeout, child).await {
            Err(_) => {
                return Err(ProbeError::ToolTimedOut {
                    tool: program.to_string(),
                    timeout_ms: self.timeout_ms(),
                });
            }
            Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ProbeError::unavailable(program));
            }
            Ok(Err(e)) => {
                return Err(ProbeError::ToolFailed {
                    tool: program.to_string(),
                    reason: e.to_string(),
                });
            }
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .map_or_else(|| output.status.to_string(), str::to_string);
            return Err(ProbeError::ToolFailed {
                tool: program.to_string(),
                reason,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = if stdout.trim().is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            stdout.into_owned()
        };
        Ok(text)
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for ToolRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL_TIMEOUT)
    }
}

/// Turn a capture result into a [`ToolVersion`], extracting the version
/// with `parse`.
pub fn tool_version<F>(tool: &str, output: &ProbeResult<String>, parse: F) -> ToolVersion
where
    F: FnOnce(&str) -> Option<String>,
{
    let status = match output {
        Ok(text) => parse(text).map_or_else(
            || ToolStatus::Failed {
                reason: "unrecognized version output".to_string(),
            },
            |version| ToolStatus::Found { version },
        ),
        Err(ProbeError::Unavailable { .. }) => ToolStatus::Missing,
        Err(ProbeError::ToolTimedOut { .. }) => ToolStatus::TimedOut,
        Err(e) => ToolStatus::Failed {
            reason: e.to_string(),
        },
    };
    ToolVersion::new(tool, status)
}
