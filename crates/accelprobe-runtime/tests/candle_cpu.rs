//! Probe a CPU-only candle runtime end to end.
//!
//! These run on any machine; nothing here needs a GPU or the NVIDIA tools.

use std::time::Duration;

use accelprobe_core::{
    CheckKind, DriverCompatibility, NO_ACCELERATOR, ToolStatus, UNKNOWN, probe_runtime,
};
use accelprobe_runtime::system::{GpuToolNames, query_gpu_tools_named};
use accelprobe_runtime::{
    CandleRuntime, ToolRunner, build_environment_report, build_features, collect_env_hints,
    host_info, run_matmul_benchmark,
};

#[test]
fn cpu_runtime_passes_host_checks_and_skips_the_rest() {
    let runtime = CandleRuntime::cpu_only();
    let report = probe_runtime(&runtime);

    assert!(!report.accelerator_available);
    assert!(report.devices.is_empty());
    assert!(!report.runtime_version.is_empty());
    assert_eq!(report.functional_checks.len(), CheckKind::ALL.len());

    for check in &report.functional_checks {
        let kind = CheckKind::from_name(&check.name).expect("known check name");
        if kind.requires_accelerator() {
            assert_eq!(check.outcome.message(), Some(NO_ACCELERATOR));
        } else {
            assert!(check.outcome.is_passed(), "{}: {:?}", check.name, check.outcome);
        }
    }
    assert_eq!(report.validate(), Ok(()));
}

#[test]
fn environment_report_completes_when_nvidia_tools_are_missing() {
    let runner = ToolRunner::new(Duration::from_secs(5));
    let names = GpuToolNames {
        nvidia_smi: "accelprobe-missing-nvidia-smi",
        nvcc: "accelprobe-missing-nvcc",
    };
    let gpu = tokio_test::block_on(query_gpu_tools_named(&runner, names));
    assert!(gpu.devices.is_none());

    let runtime = CandleRuntime::cpu_only();
    let report = build_environment_report(
        "test",
        probe_runtime(&runtime),
        build_features(),
        &gpu,
        host_info(),
        collect_env_hints(),
    );

    for name in [names.nvidia_smi, names.nvcc] {
        let tool = report.tool(name).expect("every queried tool is reported");
        assert_eq!(tool.status, ToolStatus::Missing);
        assert_eq!(tool.version_or_unknown(), UNKNOWN);
    }
    assert_eq!(report.driver_version, None);
    assert_eq!(report.driver_cuda_version, None);
    assert_eq!(report.driver_compatibility, DriverCompatibility::Unknown);

    assert_eq!(report.probe_version, "test");
    assert!(!report.device.runtime_version.is_empty());
    assert_eq!(report.device.functional_checks.len(), CheckKind::ALL.len());
    assert!(report.build.num_threads >= 1);
    assert!(report.host.cpu_count >= 1);
    assert!(!report.host.os.is_empty());
    assert!(!report.env.variables.is_empty());
}

#[test]
fn small_benchmark_times_the_cpu() {
    let runtime = CandleRuntime::cpu_only();
    let samples = run_matmul_benchmark(&runtime, &[32, 64]);

    assert_eq!(samples.iter().map(|s| s.size).collect::<Vec<_>>(), vec![32, 64]);
    for sample in samples {
        assert!(sample.error.is_none(), "{sample:?}");
        assert!(sample.cpu_secs.is_some_and(|secs| secs >= 0.0));
    }
}
