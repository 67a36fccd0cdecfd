//! One probe session: external facts gathered once, runtime connected once.

use accelprobe_core::{
    DeviceReport, EnvHints, EnvironmentReport, HostInfo, probe_runtime,
    probe_runtime_without_checks,
};
use tracing::debug;

use crate::candle::{CandleRuntime, DeviceHints, build_features};
use crate::system::{
    GpuToolReport, ToolRunner, build_environment_report, collect_env_hints, host_info,
    query_gpu_tools,
};

/// Everything a command needs, constructed once per process.
///
/// Tool queries run before the runtime connects so their device table can
/// fill in properties candle does not expose.
pub struct ProbeSession {
    pub runtime: CandleRuntime,
    pub gpu: GpuToolReport,
    pub host: HostInfo,
    pub env: EnvHints,
}

impl ProbeSession {
    pub async fn open(runner: &ToolRunner) -> Self {
        let gpu = query_gpu_tools(runner).await;
        let host = host_info();
        let env = collect_env_hints();

        let hints = DeviceHints {
            gpu_table: gpu.devices.clone(),
            host_memory_bytes: host.total_memory_bytes,
        };
        let runtime = CandleRuntime::connect(hints);
        debug!("Probe session opened");

        Self {
            runtime,
            gpu,
            host,
            env,
        }
    }

    /// Probe the runtime alone.
    pub fn device_report(&self) -> DeviceReport {
        probe_runtime(&self.runtime)
    }

    /// Probe the runtime and combine it with every other gathered fact.
    pub fn collect_environment(&self, probe_version: &str) -> EnvironmentReport {
        self.assemble(probe_version, self.device_report())
    }

    /// Like [`collect_environment`](Self::collect_environment) but with no
    /// functional checks run.
    pub fn collect_environment_without_checks(&self, probe_version: &str) -> EnvironmentReport {
        self.assemble(probe_version, probe_runtime_without_checks(&self.runtime))
    }

    fn assemble(&self, probe_version: &str, device: DeviceReport) -> EnvironmentReport {
        build_environment_report(
            probe_version,
            device,
            build_features(),
            &self.gpu,
            self.host.clone(),
            self.env.clone(),
        )
    }
}
