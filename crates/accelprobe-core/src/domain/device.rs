//! Device and report types.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use super::checks::CheckResult;
use crate::error::ConsistencyError;

/// Accelerator backend compiled into the runtime build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// No accelerator backend; host only.
    Cpu,
    /// NVIDIA CUDA.
    Cuda,
    /// Apple Metal.
    Metal,
}

impl Backend {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Cuda => "cuda",
            Self::Metal => "metal",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend-reported hardware feature level, e.g. `8.6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ComputeCapability {
    pub major: u32,
    pub minor: u32,
}

impl ComputeCapability {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse `"8.6"`. Anything else (including `"[N/A]"`) is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let (major, minor) = text.trim().split_once('.')?;
        Some(Self::new(major.parse().ok()?, minor.parse().ok()?))
    }
}

impl fmt::Display for ComputeCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Properties of one visible accelerator device.
///
/// Memory figures always satisfy `allocated <= reserved <= total`; the
/// builder methods clamp inconsistent backend numbers instead of storing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
    pub total_memory_bytes: u64,
    pub compute_capability: Option<ComputeCapability>,
    pub allocated_bytes: u64,
    pub reserved_bytes: u64,
}

impl DeviceInfo {
    /// Create a device with no memory in use.
    pub fn new(index: usize, name: impl Into<String>, total_memory_bytes: u64) -> Self {
        Self {
            index,
            name: name.into(),
            total_memory_bytes,
            compute_capability: None,
            allocated_bytes: 0,
            reserved_bytes: 0,
        }
    }

    /// Placeholder for a device whose properties could not be read.
    pub fn unknown(index: usize) -> Self {
        Self::new(index, "unknown", 0)
    }

    /// Set the compute capability.
    #[must_use]
    pub const fn with_compute_capability(mut self, capability: Option<ComputeCapability>) -> Self {
        self.compute_capability = capability;
        self
    }

    /// Set memory usage, clamped so the ordering invariant holds.
    #[must_use]
    pub fn with_memory_usage(mut self, allocated_bytes: u64, reserved_bytes: u64) -> Self {
        let reserved = reserved_bytes.min(self.total_memory_bytes);
        let allocated = allocated_bytes.min(reserved);
        if reserved != reserved_bytes || allocated != allocated_bytes {
            warn!(
                device = self.index,
                allocated_bytes,
                reserved_bytes,
                total = self.total_memory_bytes,
                "Clamping inconsistent device memory figures"
            );
        }
        self.allocated_bytes = allocated;
        self.reserved_bytes = reserved;
        self
    }

    /// Memory nobody has reserved yet, i.e. `total - reserved`.
    pub const fn free_bytes(&self) -> u64 {
        self.total_memory_bytes.saturating_sub(self.reserved_bytes)
    }

    /// True when the backend could not report a memory size.
    pub const fn memory_unknown(&self) -> bool {
        self.total_memory_bytes == 0
    }

    fn memory_consistent(&self) -> bool {
        self.allocated_bytes <= self.reserved_bytes
            && self.reserved_bytes <= self.total_memory_bytes
    }
}

/// Snapshot of the runtime and its accelerator, built once per invocation.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    pub runtime_version: String,
    pub backend: Backend,
    pub accelerator_available: bool,
    pub accelerator_runtime_version: Option<String>,
    pub devices: Vec<DeviceInfo>,
    pub functional_checks: Vec<CheckResult>,
}

impl DeviceReport {
    /// Look up a functional check by name.
    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.functional_checks.iter().find(|c| c.name == name)
    }

    /// Number of checks that failed.
    pub fn failed_checks(&self) -> usize {
        self.functional_checks
            .iter()
            .filter(|c| c.outcome.is_failed())
            .count()
    }

    /// Total memory across all devices.
    pub fn total_device_memory(&self) -> u64 {
        self.devices.iter().map(|d| d.total_memory_bytes).sum()
    }

    /// Verify the report's internal consistency.
    pub fn validate(&self) -> Result<(), ConsistencyError> {
        if self.runtime_version.trim().is_empty() {
            return Err(ConsistencyError::EmptyRuntimeVersion);
        }

        if !self.accelerator_available {
            if !self.devices.is_empty() {
                return Err(ConsistencyError::UnavailableAcceleratorHasData(
                    "devices were reported",
                ));
            }
            if self.accelerator_runtime_version.is_some() {
                return Err(ConsistencyError::UnavailableAcceleratorHasData(
                    "an accelerator runtime version was reported",
                ));
            }
        }

        for (position, device) in self.devices.iter().enumerate() {
            if device.index != position {
                return Err(ConsistencyError::NonContiguousIndex {
                    position,
                    index: device.index,
                });
            }
            if !device.memory_consistent() {
                return Err(ConsistencyError::MemoryOrdering {
                    index: device.index,
                    allocated: device.allocated_bytes,
                    reserved: device.reserved_bytes,
                    total: device.total_memory_bytes,
                });
            }
        }

        for (i, check) in self.functional_checks.iter().enumerate() {
            if self.functional_checks[..i]
                .iter()
                .any(|earlier| earlier.name == check.name)
            {
                return Err(ConsistencyError::DuplicateCheck(check.name.clone()));
            }
        }

        Ok(())
    }
}
