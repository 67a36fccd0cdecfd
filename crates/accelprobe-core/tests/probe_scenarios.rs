//! End-to-end probe scenarios against hand-written runtime clients.
//!
//! Each fake stands in for one machine configuration so the report shape
//! can be checked without real hardware.

use accelprobe_core::{
    Backend, CheckKind, CheckOutcome, ComputeCapability, DeviceInfo, NO_ACCELERATOR, ProbeError,
    ProbeResult, RuntimeClient, UNKNOWN, probe_runtime,
};

const GIB: u64 = 1024 * 1024 * 1024;

/// Configurable fake runtime.
struct FakeRuntime {
    version: ProbeResult<String>,
    backend: Backend,
    available: bool,
    accel_version: Option<String>,
    devices: Vec<DeviceInfo>,
    failing_check: Option<CheckKind>,
}

impl FakeRuntime {
    fn cpu_only() -> Self {
        Self {
            version: Ok("candle-core 0.9.1".to_string()),
            backend: Backend::Cpu,
            available: false,
            accel_version: None,
            devices: Vec::new(),
            failing_check: None,
        }
    }

    fn single_gpu(name: &str, total: u64) -> Self {
        Self {
            version: Ok("candle-core 0.9.1".to_string()),
            backend: Backend::Cuda,
            available: true,
            accel_version: Some("12.4".to_string()),
            devices: vec![
                DeviceInfo::new(0, name, total)
                    .with_compute_capability(Some(ComputeCapability::new(8, 9)))
                    .with_memory_usage(512 * 1024 * 1024, GIB),
            ],
            failing_check: None,
        }
    }
}

impl RuntimeClient for FakeRuntime {
    fn runtime_version(&self) -> ProbeResult<String> {
        self.version.clone()
    }

    fn backend(&self) -> Backend {
        self.backend
    }

    fn accelerator_available(&self) -> bool {
        self.available
    }

    fn accelerator_runtime_version(&self) -> Option<String> {
        self.accel_version.clone()
    }

    fn device_count(&self) -> ProbeResult<usize> {
        Ok(self.devices.len())
    }

    fn device_info(&self, index: usize) -> ProbeResult<DeviceInfo> {
        self.devices
            .get(index)
            .cloned()
            .ok_or(ProbeError::DeviceOutOfRange {
                index,
                count: self.devices.len(),
            })
    }

    fn run_check(&self, check: CheckKind) -> ProbeResult<String> {
        if self.failing_check == Some(check) {
            return Err(ProbeError::query_failed(check.name(), "simulated failure"));
        }
        Ok(format!("{check} fine"))
    }
}

#[test]
fn no_accelerator_reports_empty_devices_and_skipped_transfers() {
    let report = probe_runtime(&FakeRuntime::cpu_only());

    assert!(!report.accelerator_available);
    assert!(report.devices.is_empty());
    assert!(report.accelerator_runtime_version.is_none());

    for kind in CheckKind::ALL {
        let check = report.check(kind.name()).expect("every check is reported");
        if kind.requires_accelerator() {
            assert_eq!(
                check.outcome,
                CheckOutcome::Skipped {
                    reason: NO_ACCELERATOR.to_string()
                }
            );
        } else {
            assert!(check.outcome.is_passed(), "{kind} should pass");
        }
    }
    assert_eq!(report.validate(), Ok(()));
}

#[test]
fn single_device_named_x_with_8_gib() {
    let report = probe_runtime(&FakeRuntime::single_gpu("X", 8 * GIB));

    assert!(report.accelerator_available);
    assert_eq!(report.accelerator_runtime_version.as_deref(), Some("12.4"));
    assert_eq!(report.devices.len(), 1);
    assert_eq!(report.devices[0].name, "X");
    assert_eq!(report.devices[0].total_memory_bytes, 8 * 1024_u64.pow(3));
    assert!(report.functional_checks.iter().all(|c| c.outcome.is_passed()));
    assert_eq!(report.validate(), Ok(()));
}

#[test]
fn memory_ordering_holds_for_every_device() {
    let mut runtime = FakeRuntime::single_gpu("A", 4 * GIB);
    runtime.devices.push(
        // Backend claims more reserved memory than exists
        DeviceInfo::new(1, "B", 2 * GIB).with_memory_usage(3 * GIB, 5 * GIB),
    );
    let report = probe_runtime(&runtime);

    for device in &report.devices {
        assert!(device.allocated_bytes <= device.reserved_bytes);
        assert!(device.reserved_bytes <= device.total_memory_bytes);
    }
}

#[test]
fn compiled_in_but_unusable_accelerator_hides_runtime_version() {
    let mut runtime = FakeRuntime::single_gpu("X", GIB);
    runtime.available = false;
    let report = probe_runtime(&runtime);

    assert!(report.devices.is_empty());
    assert!(report.accelerator_runtime_version.is_none());
    assert_eq!(report.backend, Backend::Cuda);
}

#[test]
fn failing_check_is_reported_and_others_still_run() {
    let mut runtime = FakeRuntime::single_gpu("X", GIB);
    runtime.failing_check = Some(CheckKind::HostToDeviceTransfer);
    let report = probe_runtime(&runtime);

    assert_eq!(report.failed_checks(), 1);
    let failed = report.check("host_to_device_transfer").unwrap();
    assert_eq!(
        failed.outcome.message(),
        Some("host_to_device_transfer query failed: simulated failure")
    );
    assert!(report.check("device_matmul").unwrap().outcome.is_passed());
}

#[test]
fn version_failure_degrades_to_unknown() {
    let mut runtime = FakeRuntime::cpu_only();
    runtime.version = Err(ProbeError::unavailable("version metadata"));
    let report = probe_runtime(&runtime);

    assert_eq!(report.runtime_version, UNKNOWN);
    assert!(!report.runtime_version.is_empty());
}
