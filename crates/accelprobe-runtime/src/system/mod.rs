//! System facts that live outside the numeric runtime.
//!
//! This module runs the NVIDIA command-line tools, reads the environment and
//! the host's memory, and assembles all of it with a [`DeviceReport`] into
//! one [`EnvironmentReport`].

mod commands;
mod env;
mod gpu;
mod host;

use accelprobe_core::{
    Backend, BuildFeatures, DeviceReport, EnvHints, EnvironmentReport, HostInfo,
    assess_driver_compatibility,
};
use tracing::info;

pub use commands::{DEFAULT_TOOL_TIMEOUT, ToolRunner, tool_version};
pub use env::{HINT_VARIABLES, LIBRARY_PATH_VAR, collect_env_hints, collect_env_hints_from};
pub use gpu::{
    GpuRow, GpuToolNames, GpuToolReport, NVCC, NVIDIA_SMI, SmiBanner, parse_gpu_query,
    parse_nvcc_release, parse_smi_banner, query_gpu_tools, query_gpu_tools_named,
};
pub use host::host_info;

/// Combine every independently gathered piece into one report.
///
/// The driver compatibility verdict only applies to CUDA builds; every other
/// backend gets `Unknown`.
pub fn build_environment_report(
    probe_version: &str,
    device: DeviceReport,
    build: BuildFeatures,
    gpu: &GpuToolReport,
    host: HostInfo,
    env: EnvHints,
) -> EnvironmentReport {
    let runtime_cuda = match device.backend {
        Backend::Cuda => device.accelerator_runtime_version.as_deref(),
        Backend::Cpu | Backend::Metal => None,
    };
    let driver_compatibility =
        assess_driver_compatibility(runtime_cuda, gpu.banner.cuda_version.as_deref());

    info!(
        backend = %device.backend,
        accelerator = device.accelerator_available,
        devices = device.devices.len(),
        failed_checks = device.failed_checks(),
        ?driver_compatibility,
        "Environment report assembled"
    );

    EnvironmentReport {
        probe_version: probe_version.to_string(),
        tools: gpu.tools(),
        driver_cuda_version: gpu.banner.cuda_version.clone(),
        driver_version: gpu.banner.driver_version.clone(),
        driver_compatibility,
        device,
        build,
        host,
        env,
    }
}
