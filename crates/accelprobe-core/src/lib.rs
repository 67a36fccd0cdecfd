//! Core domain types, ports and probe operations for accelprobe.
//!
//! This crate is pure: it defines what a capability report looks like, the
//! [`RuntimeClient`](ports::RuntimeClient) port a numeric runtime adapter
//! implements, and the operations that turn a client into a
//! [`DeviceReport`]. Hardware access, process spawning and environment
//! reads live in `accelprobe-runtime`.
#![deny(unused_crate_dependencies)]

pub mod compat;
pub mod domain;
pub mod error;
pub mod ports;
pub mod probe;

// Re-export commonly used types for convenience
pub use compat::{assess_driver_compatibility, parse_version_tuple};
pub use domain::{
    Backend, BenchSample, BuildFeatures, CheckKind, CheckOutcome, CheckResult, ComputeCapability,
    DeviceInfo, DeviceReport, DriverCompatibility, EnvHints, EnvironmentReport, HostInfo,
    ToolStatus, ToolVersion, UNKNOWN,
};
pub use error::{ConsistencyError, ProbeError, ProbeResult};
pub use ports::RuntimeClient;
pub use probe::{
    NO_ACCELERATOR, probe_devices, probe_runtime, probe_runtime_without_checks,
    run_functional_check, run_standard_checks,
};
