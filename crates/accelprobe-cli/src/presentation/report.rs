//! Text renderers for reports, devices, checks, environment and benchmarks.

use accelprobe_core::{
    Backend, BenchSample, CheckOutcome, CheckResult, DeviceInfo, DriverCompatibility,
    EnvironmentReport, ToolStatus, ToolVersion, UNKNOWN,
};

use accelprobe_runtime::system::{NVCC, NVIDIA_SMI};

use super::{Style, format_bytes};

const LABEL_WIDTH: usize = 22;
const CHECK_WIDTH: usize = 26;

fn field(label: &str, value: &str) -> String {
    format!("  {:<LABEL_WIDTH$} {value}", format!("{label}:"))
}

/// Everything: runtime, devices, checks, then the environment sections.
pub fn render_full_report(report: &EnvironmentReport, style: Style) -> String {
    let device = &report.device;
    let mut lines = vec![style.bold(&format!("accelprobe {}", report.probe_version))];

    lines.push(style.section("Runtime"));
    lines.push(field("Version", &device.runtime_version));
    lines.push(field("Backend", device.backend.as_str()));
    lines.push(field(
        "Accelerator",
        &availability(device.backend, device.accelerator_available, style),
    ));
    lines.push(field(
        "Accelerator runtime",
        device.accelerator_runtime_version.as_deref().unwrap_or(UNKNOWN),
    ));

    if !device.accelerator_available {
        lines.push(String::new());
        lines.push(format!("  {}", style.warn("Possible reasons:")));
        for (n, reason) in unavailable_reasons(report).iter().enumerate() {
            lines.push(format!("    {}. {reason}", n + 1));
        }
    }

    lines.push(render_devices(
        device.backend,
        device.accelerator_available,
        &device.devices,
        style,
    ));
    lines.push(render_checks(&device.functional_checks, style));
    lines.push(render_environment(report, style));
    lines.push(String::new());
    lines.push(readiness(report, style));
    lines.join("\n")
}

/// Device list with memory figures.
pub fn render_devices(
    backend: Backend,
    available: bool,
    devices: &[DeviceInfo],
    style: Style,
) -> String {
    let mut lines = vec![style.section(&format!("Devices ({})", devices.len()))];

    if devices.is_empty() {
        let reason = if available {
            "accelerator reports no devices".to_string()
        } else {
            format!("no usable accelerator ({} build)", backend.as_str())
        };
        lines.push(format!("  {}", style.warn(&format!("○ {reason}"))));
        return lines.join("\n");
    }

    for device in devices {
        let capability = device
            .compute_capability
            .map(|cc| format!("  (compute {cc})"))
            .unwrap_or_default();
        lines.push(format!("  [{}] {}{capability}", device.index, device.name));

        if device.memory_unknown() {
            lines.push(format!("      memory: {UNKNOWN}"));
        } else {
            lines.push(format!(
                "      total {}, allocated {}, reserved {}, free {}",
                format_bytes(device.total_memory_bytes),
                format_bytes(device.allocated_bytes),
                format_bytes(device.reserved_bytes),
                format_bytes(device.free_bytes()),
            ));
        }
    }
    lines.join("\n")
}

/// One line per check plus a pass/fail/skip summary.
pub fn render_checks(checks: &[CheckResult], style: Style) -> String {
    let mut lines = vec![style.section("Functional checks")];

    for check in checks {
        let (mark, text) = match &check.outcome {
            CheckOutcome::Passed { detail } => (
                style.good("✓"),
                format!(
                    "{} ({} ms)",
                    detail.as_deref().unwrap_or("ok"),
                    check.elapsed_ms
                ),
            ),
            CheckOutcome::Failed { reason } => (style.bad("✗"), style.bad(reason)),
            CheckOutcome::Skipped { reason } => {
                (style.warn("○"), style.warn(&format!("skipped: {reason}")))
            }
        };
        lines.push(format!("  {mark} {:<CHECK_WIDTH$} {text}", check.name));
    }

    let passed = checks.iter().filter(|c| c.outcome.is_passed()).count();
    let failed = checks.iter().filter(|c| c.outcome.is_failed()).count();
    let skipped = checks.iter().filter(|c| c.outcome.is_skipped()).count();
    let summary = format!(
        "  {} checks: {passed} passed, {failed} failed, {skipped} skipped",
        checks.len()
    );
    lines.push(String::new());
    lines.push(if failed > 0 {
        style.bad(&summary)
    } else {
        style.good(&summary)
    });
    lines.join("\n")
}

/// Driver, toolkit, build, host and environment-variable sections.
pub fn render_environment(report: &EnvironmentReport, style: Style) -> String {
    let mut lines = vec![style.section("Driver & toolkit")];
    for tool in &report.tools {
        lines.push(field(&tool.tool, &tool_status(tool, style)));
    }
    lines.push(field(
        "Driver version",
        report.driver_version.as_deref().unwrap_or(UNKNOWN),
    ));
    lines.push(field(
        "Driver CUDA version",
        report.driver_cuda_version.as_deref().unwrap_or(UNKNOWN),
    ));
    lines.push(field(
        "Compatibility",
        &compatibility(&report.driver_compatibility, style),
    ));

    lines.push(style.section("Build"));
    let enabled = report.build.enabled();
    lines.push(field(
        "Features",
        &if enabled.is_empty() {
            "none".to_string()
        } else {
            enabled.join(", ")
        },
    ));
    lines.push(field("Threads", &report.build.num_threads.to_string()));

    let host = &report.host;
    lines.push(style.section("Host"));
    let os = host
        .os_version
        .as_ref()
        .map_or_else(|| host.os.clone(), |v| format!("{} ({v})", host.os));
    lines.push(field("OS", &os));
    lines.push(field("Architecture", &host.arch));
    lines.push(field("CPUs", &host.cpu_count.to_string()));
    lines.push(field(
        "Memory",
        &format!(
            "{} total, {} available",
            format_bytes(host.total_memory_bytes),
            format_bytes(host.available_memory_bytes)
        ),
    ));
    lines.push(field(
        "Executable",
        host.executable.as_deref().unwrap_or(UNKNOWN),
    ));

    lines.push(style.section("Environment"));
    for (name, value) in &report.env.variables {
        lines.push(field(name, value.as_deref().unwrap_or("<unset>")));
    }
    lines.push(field("CUDA in PATH", &entries(&report.env.cuda_path_entries)));
    lines.push(field(
        "CUDA in library path",
        &entries(&report.env.cuda_library_entries),
    ));
    lines.join("\n")
}

/// Benchmark table with per-size speedup.
pub fn render_bench(backend: Backend, samples: &[BenchSample], style: Style) -> String {
    let mut lines = vec![style.section(&format!("Matmul benchmark (f32, {backend})"))];
    lines.push(style.bold(&format!(
        "  {:>6}  {:>12}  {:>12}  {:>8}",
        "SIZE", "CPU (s)", "DEVICE (s)", "SPEEDUP"
    )));

    for sample in samples {
        let cpu = sample
            .cpu_secs
            .map_or_else(|| "-".to_string(), |s| format!("{s:.4}"));
        let accel = sample
            .accelerator_secs
            .map_or_else(|| "-".to_string(), |s| format!("{s:.4}"));
        let speedup = sample
            .speedup()
            .map_or_else(|| "-".to_string(), |x| format!("{x:.1}x"));
        lines.push(format!(
            "  {:>6}  {cpu:>12}  {accel:>12}  {speedup:>8}",
            sample.size
        ));
        if let Some(error) = &sample.error {
            lines.push(format!("          {}", style.bad(error)));
        }
    }
    lines.join("\n")
}

fn availability(backend: Backend, available: bool, style: Style) -> String {
    match (backend, available) {
        (_, true) => style.good("✓ available"),
        (Backend::Cpu, false) => style.warn("○ none compiled in"),
        (_, false) => style.bad("✗ compiled in but unusable"),
    }
}

/// Likely causes of an unusable accelerator, most specific first.
fn unavailable_reasons(report: &EnvironmentReport) -> Vec<String> {
    let mut reasons = Vec::new();
    match report.device.backend {
        Backend::Cpu => {
            reasons.push("built without the cuda or metal feature".to_string());
        }
        Backend::Metal => reasons.push("no Metal-capable GPU found".to_string()),
        Backend::Cuda => {
            match report.tool(NVIDIA_SMI).map(|t| &t.status) {
                Some(ToolStatus::Missing) => {
                    reasons.push("nvidia-smi not found: NVIDIA driver not installed".to_string());
                }
                Some(ToolStatus::TimedOut | ToolStatus::Failed { .. }) => {
                    reasons.push("nvidia-smi did not answer: driver problem".to_string());
                }
                Some(ToolStatus::Found { .. }) | None => {}
            }
            if let DriverCompatibility::DriverTooOld { driver, runtime } =
                &report.driver_compatibility
            {
                reasons.push(format!(
                    "driver too old: supports CUDA {driver}, build needs {runtime}"
                ));
            }
            if matches!(
                report.tool(NVCC).map(|t| &t.status),
                Some(ToolStatus::Missing)
            ) {
                reasons.push("CUDA toolkit (nvcc) not installed".to_string());
            }
            reasons.push("no compatible GPU visible (check CUDA_VISIBLE_DEVICES)".to_string());
        }
    }
    reasons
}

/// Closing one-line verdict.
fn readiness(report: &EnvironmentReport, style: Style) -> String {
    let device = &report.device;
    let failed = device.failed_checks();
    if !device.accelerator_available {
        style.warn("Ready for CPU-only work. Accelerated work needs a usable GPU backend.")
    } else if failed > 0 {
        style.bad(&format!(
            "{} accelerator present, but {failed} functional check(s) failed.",
            device.backend
        ))
    } else {
        style.good(&format!("Ready for {}-accelerated work.", device.backend))
    }
}

fn tool_status(tool: &ToolVersion, style: Style) -> String {
    match &tool.status {
        ToolStatus::Found { version } => style.good(&format!("✓ {version}")),
        ToolStatus::Missing => style.warn("○ not found"),
        ToolStatus::TimedOut => style.bad("✗ timed out"),
        ToolStatus::Failed { reason } => style.bad(&format!("✗ {reason}")),
    }
}

fn compatibility(verdict: &DriverCompatibility, style: Style) -> String {
    match verdict {
        DriverCompatibility::Compatible => style.good("✓ driver supports the runtime's CUDA"),
        DriverCompatibility::DriverTooOld { driver, runtime } => style.bad(&format!(
            "✗ driver supports CUDA {driver}, runtime needs {runtime}"
        )),
        DriverCompatibility::Unknown => style.warn(&format!("○ {UNKNOWN}")),
    }
}

fn entries(list: &[String]) -> String {
    if list.is_empty() {
        "none".to_string()
    } else {
        list.join(", ")
    }
}
