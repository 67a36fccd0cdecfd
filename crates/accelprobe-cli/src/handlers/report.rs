//! Full report handler (the default command).

use crate::bootstrap::CliContext;
use crate::error::CliResult;
use crate::presentation::{OutputFormat, RenderOptions, render_full_report, to_json};

/// Probe everything and render it.
pub fn execute(ctx: &CliContext, opts: RenderOptions) -> CliResult<String> {
    let report = ctx.session.collect_environment(&ctx.config.probe_version);
    match opts.format {
        OutputFormat::Text => Ok(render_full_report(&report, opts.style)),
        OutputFormat::Json => to_json(&report),
    }
}
