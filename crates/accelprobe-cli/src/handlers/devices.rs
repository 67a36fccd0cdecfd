//! Device listing handler.

use accelprobe_core::{Backend, DeviceInfo, RuntimeClient, probe_devices};
use serde::Serialize;

use crate::bootstrap::CliContext;
use crate::error::CliResult;
use crate::presentation::{OutputFormat, RenderOptions, render_devices, to_json};

#[derive(Serialize)]
struct DevicesView<'a> {
    backend: Backend,
    accelerator_available: bool,
    devices: &'a [DeviceInfo],
}

/// List devices without running any functional check.
pub fn execute(ctx: &CliContext, opts: RenderOptions) -> CliResult<String> {
    let runtime = &ctx.session.runtime;
    let devices = probe_devices(runtime);
    let backend = runtime.backend();
    let available = runtime.accelerator_available();

    match opts.format {
        OutputFormat::Text => Ok(render_devices(backend, available, &devices, opts.style)),
        OutputFormat::Json => to_json(&DevicesView {
            backend,
            accelerator_available: available,
            devices: &devices,
        }),
    }
}
