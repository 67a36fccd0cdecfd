//! Functional check types.

use std::fmt;

use serde::Serialize;

/// The standard functional checks, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Allocate a small random tensor on the host.
    TensorCreation,
    /// Copy a host tensor out to a plain buffer and back.
    HostRoundtrip,
    /// One linear layer forward pass on the host.
    LinearForward,
    /// Gradient of a tiny loss with respect to a trainable weight.
    AutogradBackward,
    /// Allocate a small tensor directly on the accelerator.
    AcceleratorAllocation,
    /// Move a host tensor to the accelerator.
    HostToDeviceTransfer,
    /// Move an accelerator tensor back to the host.
    DeviceToHostTransfer,
    /// Multiply on the accelerator and compare against the host result.
    DeviceMatmul,
}

impl CheckKind {
    pub const ALL: [Self; 8] = [
        Self::TensorCreation,
        Self::HostRoundtrip,
        Self::LinearForward,
        Self::AutogradBackward,
        Self::AcceleratorAllocation,
        Self::HostToDeviceTransfer,
        Self::DeviceToHostTransfer,
        Self::DeviceMatmul,
    ];

    /// Stable snake_case name used as the report key.
    pub const fn name(self) -> &'static str {
        match self {
            Self::TensorCreation => "tensor_creation",
            Self::HostRoundtrip => "host_roundtrip",
            Self::LinearForward => "linear_forward",
            Self::AutogradBackward => "autograd_backward",
            Self::AcceleratorAllocation => "accelerator_allocation",
            Self::HostToDeviceTransfer => "host_to_device_transfer",
            Self::DeviceToHostTransfer => "device_to_host_transfer",
            Self::DeviceMatmul => "device_matmul",
        }
    }

    pub const fn requires_accelerator(self) -> bool {
        matches!(
            self,
            Self::AcceleratorAllocation
                | Self::HostToDeviceTransfer
                | Self::DeviceToHostTransfer
                | Self::DeviceMatmul
        )
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one functional check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckOutcome {
    Passed { detail: Option<String> },
    Failed { reason: String },
    Skipped { reason: String },
}

impl CheckOutcome {
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Short label for tables: `passed`, `failed` or `skipped`.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed { .. } => "passed",
            Self::Failed { .. } => "failed",
            Self::Skipped { .. } => "skipped",
        }
    }

    /// The detail or reason text, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Passed { detail } => detail.as_deref(),
            Self::Failed { reason } | Self::Skipped { reason } => Some(reason),
        }
    }
}

/// A named check outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: String,
    #[serde(flatten)]
    pub outcome: CheckOutcome,
    /// Wall time spent inside the check; zero for skipped checks.
    pub elapsed_ms: u64,
}

impl CheckResult {
    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: CheckOutcome::Skipped {
                reason: reason.into(),
            },
            elapsed_ms: 0,
        }
    }
}
