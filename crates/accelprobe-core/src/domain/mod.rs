//! Pure domain types for the capability probe.
//!
//! Nothing in here talks to hardware or spawns processes. Active probing lives
//! behind the [`RuntimeClient`](crate::ports::RuntimeClient) port and in
//! `accelprobe-runtime`.

mod checks;
mod device;
mod environment;

pub use checks::{CheckKind, CheckOutcome, CheckResult};
pub use device::{Backend, ComputeCapability, DeviceInfo, DeviceReport};
pub use environment::{
    BenchSample, BuildFeatures, DriverCompatibility, EnvHints, EnvironmentReport, HostInfo,
    ToolStatus, ToolVersion, UNKNOWN,
};
