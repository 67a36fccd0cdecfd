//! Command handlers.
//!
//! Each handler probes what its command needs through the [`CliContext`]
//! and returns the rendered output; [`emit`] decides where it goes.
//!
//! [`CliContext`]: crate::bootstrap::CliContext

pub mod bench;
pub mod checks;
pub mod devices;
pub mod env;
pub mod report;

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::error::{CliError, CliResult};

/// Print `rendered` to stdout and, when given, also write it to `output`.
pub fn emit(rendered: &str, output: Option<&Path>) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    stdout.flush()?;

    if let Some(path) = output {
        write_output(rendered, path)?;
    }
    Ok(())
}

fn write_output(rendered: &str, path: &Path) -> CliResult<()> {
    fs::write(path, format!("{rendered}\n")).map_err(|source| CliError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Wrote output file");
    Ok(())
}
