//! Runtime client port.
//!
//! This port abstracts the numeric runtime being probed (tensor library plus
//! accelerator backend) from the probe operations. Implementations live in
//! adapters (e.g., `CandleRuntime` in accelprobe-runtime).
//!
//! # Design Notes
//!
//! - Core owns the trait and types (pure)
//! - Runtime owns the implementation (talks to the tensor library)
//! - CLI constructs one client in main.rs and passes it by reference

use crate::domain::{Backend, CheckKind, DeviceInfo};
use crate::error::ProbeResult;

/// Port for querying an installed numeric runtime and its accelerator.
///
/// One value is constructed per process and released when dropped. All
/// methods are blocking and free of observable side effects, apart from the
/// short-lived device allocations a functional check makes.
///
/// # Example
///
/// ```ignore
/// use accelprobe_core::{probe_runtime, ports::RuntimeClient};
///
/// fn print_version(client: &dyn RuntimeClient) {
///     let report = probe_runtime(client);
///     println!("{}", report.runtime_version);
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait RuntimeClient: Send + Sync {
    /// Identifier of the runtime build, e.g. `"candle-core 0.9.1"`.
    fn runtime_version(&self) -> ProbeResult<String>;

    /// Accelerator backend compiled into this build.
    fn backend(&self) -> Backend;

    /// Whether an accelerator backend is compiled in *and* usable right now.
    fn accelerator_available(&self) -> bool;

    /// Version of the accelerator runtime the build targets, if compiled in.
    fn accelerator_runtime_version(&self) -> Option<String>;

    /// Number of visible accelerator devices.
    fn device_count(&self) -> ProbeResult<usize>;

    /// Properties of the device at `index`.
    fn device_info(&self, index: usize) -> ProbeResult<DeviceInfo>;

    /// Run one functional check and return a short detail string on success.
    fn run_check(&self, check: CheckKind) -> ProbeResult<String>;
}
