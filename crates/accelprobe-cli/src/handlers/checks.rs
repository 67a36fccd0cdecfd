//! Functional checks handler.

use accelprobe_core::{RuntimeClient, run_standard_checks};

use crate::bootstrap::CliContext;
use crate::error::CliResult;
use crate::presentation::{OutputFormat, RenderOptions, render_checks, to_json};

/// Run every functional check and render the outcomes.
pub fn execute(ctx: &CliContext, opts: RenderOptions) -> CliResult<String> {
    let runtime = &ctx.session.runtime;
    let checks = run_standard_checks(runtime, runtime.accelerator_available());

    match opts.format {
        OutputFormat::Text => Ok(render_checks(&checks, opts.style)),
        OutputFormat::Json => to_json(&checks),
    }
}
