//! [`RuntimeClient`] implementation backed by candle.
//!
//! The accelerator backend is fixed at compile time through cargo features:
//! `cuda` wins over `metal`, and a build with neither is CPU-only. Device
//! properties candle does not expose (names, memory, compute capability) come
//! from [`DeviceHints`] gathered before connecting.
//!
//! The CUDA device count always comes from opening ordinals, since
//! `nvidia-smi` ignores `CUDA_VISIBLE_DEVICES`. Its table is attached only
//! when it lists exactly as many devices as CUDA can open.

mod checks;

use accelprobe_core::{
    Backend, BuildFeatures, CheckKind, DeviceInfo, ProbeError, ProbeResult, RuntimeClient,
};
use candle_core::{Device, DeviceLocation, utils};
use tracing::{debug, warn};

use crate::system::GpuRow;

/// CUDA release the crate was compiled against, or `"unknown"`.
pub const BUILD_CUDA_VERSION: &str = env!("ACCELPROBE_BUILD_CUDA_VERSION");

/// Locked candle-core version, or `"unknown"`.
pub const CANDLE_VERSION: &str = env!("ACCELPROBE_CANDLE_VERSION");

/// Upper bound when counting CUDA ordinals without a device table.
const MAX_CUDA_ORDINALS: usize = 64;

/// Device facts gathered outside candle.
#[derive(Debug, Clone, Default)]
pub struct DeviceHints {
    /// Rows from `nvidia-smi`, when it answered.
    pub gpu_table: Option<Vec<GpuRow>>,
    /// Host RAM, used to size unified-memory devices.
    pub host_memory_bytes: u64,
}

/// A connected candle runtime.
///
/// Holds the first accelerator device open for the lifetime of the value;
/// dropping it releases the device.
pub struct CandleRuntime {
    backend: Backend,
    accelerator: Option<Device>,
    device_count: usize,
    hints: DeviceHints,
}

impl CandleRuntime {
    /// Open the compiled-in accelerator, if any.
    ///
    /// Never fails: an accelerator that cannot be opened leaves the runtime
    /// CPU-only with `accelerator_available() == false`.
    pub fn connect(hints: DeviceHints) -> Self {
        let backend = compiled_backend();
        let accelerator = match backend {
            Backend::Cuda => open_device(backend, Device::new_cuda(0)),
            Backend::Metal => open_device(backend, Device::new_metal(0)),
            Backend::Cpu => None,
        };

        let device_count = match (&accelerator, backend) {
            (None, _) | (Some(_), Backend::Cpu) => 0,
            (Some(_), Backend::Cuda) => count_cuda_ordinals(),
            (Some(_), Backend::Metal) => 1,
        };

        debug!(%backend, available = accelerator.is_some(), device_count, "Connected to candle");
        Self::from_parts(backend, accelerator, device_count, hints)
    }

    fn from_parts(
        backend: Backend,
        accelerator: Option<Device>,
        device_count: usize,
        mut hints: DeviceHints,
    ) -> Self {
        let table_rows = hints.gpu_table.as_ref().map(Vec::len);
        if backend == Backend::Cuda && table_rows.is_some_and(|rows| rows != device_count) {
            warn!(
                table_rows,
                device_count,
                "nvidia-smi lists a different number of GPUs than CUDA can open; \
                 device properties will be unknown"
            );
            hints.gpu_table = None;
        }
        Self {
            backend,
            accelerator,
            device_count,
            hints,
        }
    }

    /// CPU-only runtime regardless of compiled features.
    pub fn cpu_only() -> Self {
        Self::from_parts(Backend::Cpu, None, 0, DeviceHints::default())
    }

    /// The open accelerator device, if one was opened.
    pub const fn accelerator(&self) -> Option<&Device> {
        self.accelerator.as_ref()
    }

    fn cuda_device_info(&self, index: usize) -> DeviceInfo {
        let row = self
            .hints
            .gpu_table
            .as_ref()
            .and_then(|rows| rows.iter().find(|row| row.index == index));

        row.map_or_else(
            || DeviceInfo::new(index, format!("cuda:{index}"), 0),
            |row| row.to_device_info(index),
        )
    }

    fn metal_device_info(&self, index: usize) -> DeviceInfo {
        // Unified memory: roughly three quarters of RAM is usable by the GPU.
        let usable = self.hints.host_memory_bytes / 4 * 3;
        DeviceInfo::new(index, format!("metal:{index}"), usable)
    }
}

impl RuntimeClient for CandleRuntime {
    fn runtime_version(&self) -> ProbeResult<String> {
        if CANDLE_VERSION == accelprobe_core::UNKNOWN {
            return Err(ProbeError::unavailable("candle-core version metadata"));
        }
        Ok(format!("candle-core {CANDLE_VERSION}"))
    }

    fn backend(&self) -> Backend {
        self.backend
    }

    fn accelerator_available(&self) -> bool {
        self.accelerator.is_some()
    }

    fn accelerator_runtime_version(&self) -> Option<String> {
        match self.backend {
            Backend::Cuda => Some(BUILD_CUDA_VERSION.to_string()),
            Backend::Metal => Some(Backend::Metal.as_str().to_string()),
            Backend::Cpu => None,
        }
    }

    fn device_count(&self) -> ProbeResult<usize> {
        Ok(self.device_count)
    }

    fn device_info(&self, index: usize) -> ProbeResult<DeviceInfo> {
        let count = self.device_count;
        if index >= count {
            return Err(ProbeError::DeviceOutOfRange { index, count });
        }
        Ok(match self.backend {
            Backend::Cuda => self.cuda_device_info(index),
            Backend::Metal => self.metal_device_info(index),
            Backend::Cpu => DeviceInfo::unknown(index),
        })
    }

    fn run_check(&self, check: CheckKind) -> ProbeResult<String> {
        checks::run(check, self.accelerator.as_ref()).map_err(|e| e.into_probe_error(check.name()))
    }
}

/// Accelerator backend selected by cargo features.
pub const fn compiled_backend() -> Backend {
    if cfg!(feature = "cuda") {
        Backend::Cuda
    } else if cfg!(feature = "metal") {
        Backend::Metal
    } else {
        Backend::Cpu
    }
}

/// Capabilities candle was compiled with.
pub fn build_features() -> BuildFeatures {
    BuildFeatures {
        avx: utils::with_avx(),
        neon: utils::with_neon(),
        simd128: utils::with_simd128(),
        f16c: utils::with_f16c(),
        mkl: utils::has_mkl(),
        accelerate: utils::has_accelerate(),
        cuda: utils::cuda_is_available(),
        cudnn: cfg!(feature = "cudnn"),
        metal: utils::metal_is_available(),
        num_threads: utils::get_num_threads(),
    }
}

/// Short label such as `cpu` or `cuda:0`.
pub fn device_label(device: &Device) -> String {
    match device.location() {
        DeviceLocation::Cpu => "cpu".to_string(),
        DeviceLocation::Cuda { gpu_id } => format!("cuda:{gpu_id}"),
        DeviceLocation::Metal { gpu_id } => format!("metal:{gpu_id}"),
    }
}

fn count_cuda_ordinals() -> usize {
    (0..MAX_CUDA_ORDINALS)
        .take_while(|&ordinal| Device::new_cuda(ordinal).is_ok())
        .count()
}

fn open_device(backend: Backend, result: candle_core::Result<Device>) -> Option<Device> {
    match result {
        Ok(device) => Some(device),
        Err(e) => {
            warn!(%backend, error = %e, "Accelerator backend is compiled in but unusable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accelprobe_core::probe_devices;

    #[test]
    fn test_cpu_only_runtime_has_no_devices() {
        let runtime = CandleRuntime::cpu_only();
        assert!(!runtime.accelerator_available());
        assert_eq!(runtime.device_count(), Ok(0));
        assert_eq!(runtime.accelerator_runtime_version(), None);
        assert!(matches!(
            runtime.device_info(0),
            Err(ProbeError::DeviceOutOfRange { index: 0, count: 0 })
        ));
    }

    #[test]
    fn test_runtime_version_names_candle() {
        let runtime = CandleRuntime::cpu_only();
        match runtime.runtime_version() {
            Ok(version) => assert!(version.starts_with("candle-core ")),
            Err(e) => assert!(e.is_unavailable()),
        }
    }

    #[test]
    fn test_accelerator_checks_report_unavailable_without_device() {
        let runtime = CandleRuntime::cpu_only();
        let err = runtime.run_check(CheckKind::DeviceMatmul).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    #[cfg(not(any(feature = "cuda", feature = "metal")))]
    fn test_connect_without_backend_is_cpu() {
        let runtime = CandleRuntime::connect(DeviceHints::default());
        assert_eq!(runtime.backend(), Backend::Cpu);
        assert!(!runtime.accelerator_available());
    }

    fn gpu_row(index: usize, name: &str) -> GpuRow {
        GpuRow {
            index,
            name: name.to_string(),
            total_mib: Some(8192),
            used_mib: Some(0),
            free_mib: Some(8192),
            compute_capability: None,
        }
    }

    fn hints_with_table(rows: Vec<GpuRow>) -> DeviceHints {
        DeviceHints {
            gpu_table: Some(rows),
            host_memory_bytes: 0,
        }
    }

    #[test]
    fn test_cuda_properties_come_from_the_table() {
        let runtime = CandleRuntime::from_parts(
            Backend::Cuda,
            Some(Device::Cpu),
            1,
            hints_with_table(vec![gpu_row(0, "X")]),
        );
        assert_eq!(runtime.device_count(), Ok(1));
        let info = runtime.device_info(0).unwrap();
        assert_eq!(info.name, "X");
        assert_eq!(info.total_memory_bytes, 8 * 1024 * 1024 * 1024);
    }

    #[test]
    fn test_device_count_ignores_extra_table_rows() {
        // Two GPUs installed, one visible to CUDA.
        let runtime = CandleRuntime::from_parts(
            Backend::Cuda,
            Some(Device::Cpu),
            1,
            hints_with_table(vec![gpu_row(0, "GPU-A"), gpu_row(1, "GPU-B")]),
        );
        let devices = probe_devices(&runtime);

        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "cuda:0");
        assert!(devices[0].memory_unknown());
        assert!(matches!(
            runtime.device_info(1),
            Err(ProbeError::DeviceOutOfRange { index: 1, count: 1 })
        ));
    }

    #[test]
    fn test_cuda_devices_without_table_are_placeholders() {
        let runtime =
            CandleRuntime::from_parts(Backend::Cuda, Some(Device::Cpu), 2, DeviceHints::default());
        let names: Vec<_> = probe_devices(&runtime).into_iter().map(|d| d.name).collect();
        assert_eq!(names, ["cuda:0", "cuda:1"]);
    }

    #[test]
    fn test_metal_device_gets_three_quarters_of_ram() {
        let runtime = CandleRuntime::from_parts(
            Backend::Metal,
            Some(Device::Cpu),
            1,
            DeviceHints {
                gpu_table: None,
                host_memory_bytes: 16 * 1024 * 1024 * 1024,
            },
        );
        let info = runtime.device_info(0).unwrap();
        assert_eq!(info.total_memory_bytes, 12 * 1024 * 1024 * 1024);
        assert_eq!(info.name, "metal:0");
    }

    #[test]
    fn test_device_label() {
        assert_eq!(device_label(&Device::Cpu), "cpu");
    }

    #[test]
    fn test_build_features_thread_count() {
        assert!(build_features().num_threads >= 1);
    }
}
