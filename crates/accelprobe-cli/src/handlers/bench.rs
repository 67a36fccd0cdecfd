//! Matmul benchmark handler.

use accelprobe_core::{Backend, BenchSample, RuntimeClient};
use accelprobe_runtime::{DEFAULT_SIZES, run_matmul_benchmark};
use serde::Serialize;
use tracing::info;

use crate::bootstrap::CliContext;
use crate::error::CliResult;
use crate::presentation::{OutputFormat, RenderOptions, render_bench, to_json};

#[derive(Serialize)]
struct BenchView<'a> {
    backend: Backend,
    accelerator_available: bool,
    samples: &'a [BenchSample],
}

/// Time each size; an empty `sizes` means the default sweep.
pub fn execute(ctx: &CliContext, sizes: &[usize], opts: RenderOptions) -> CliResult<String> {
    let sizes = if sizes.is_empty() { &DEFAULT_SIZES[..] } else { sizes };
    let runtime = &ctx.session.runtime;
    info!(?sizes, "Starting matmul benchmark");
    let samples = run_matmul_benchmark(runtime, sizes);

    match opts.format {
        OutputFormat::Text => Ok(render_bench(runtime.backend(), &samples, opts.style)),
        OutputFormat::Json => to_json(&BenchView {
            backend: runtime.backend(),
            accelerator_available: runtime.accelerator_available(),
            samples: &samples,
        }),
    }
}
