//! CLI-specific error types.
//!
//! Probing itself never fails; these cover turning a finished report into
//! output.

use std::path::PathBuf;

use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Report could not be serialized.
    #[error("Render error: {0}")]
    Render(#[from] serde_json::Error),

    /// Rendered output could not be written.
    #[error("IO error writing {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Standard output is gone (closed pipe and similar).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
