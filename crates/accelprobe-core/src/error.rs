//! Error taxonomy for capability probing.
//!
//! Nothing in this taxonomy is fatal. Every variant describes a degraded
//! result that the probe reports inline and then moves past.

use thiserror::Error;

/// Errors that can occur while probing the runtime or its accelerator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    /// A capability (accelerator, library feature, external tool) is not present.
    #[error("{what} is unavailable")]
    Unavailable { what: String },

    /// A call into the runtime failed; the surrounding probe continues.
    #[error("{what} query failed: {reason}")]
    QueryFailed { what: String, reason: String },

    /// An external tool did not finish within its time budget.
    #[error("{tool} timed out after {timeout_ms} ms")]
    ToolTimedOut { tool: String, timeout_ms: u64 },

    /// An external tool ran but reported failure.
    #[error("{tool} failed: {reason}")]
    ToolFailed { tool: String, reason: String },

    /// A device index outside the visible range was requested.
    #[error("device {index} is out of range ({count} visible)")]
    DeviceOutOfRange { index: usize, count: usize },

    /// A functional check panicked instead of returning an error.
    #[error("check {name} panicked: {message}")]
    CheckPanicked { name: String, message: String },
}

impl ProbeError {
    /// Shorthand for [`ProbeError::Unavailable`].
    pub fn unavailable(what: impl Into<String>) -> Self {
        Self::Unavailable { what: what.into() }
    }

    /// Shorthand for [`ProbeError::QueryFailed`].
    pub fn query_failed(what: impl Into<String>, reason: impl ToString) -> Self {
        Self::QueryFailed {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    /// True for the "simply not present" class of errors.
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// A violated report invariant, found by `DeviceReport::validate`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("device at position {position} has index {index}")]
    NonContiguousIndex { position: usize, index: usize },

    #[error(
        "device {index}: allocated {allocated} <= reserved {reserved} <= total {total} does not hold"
    )]
    MemoryOrdering {
        index: usize,
        allocated: u64,
        reserved: u64,
        total: u64,
    },

    #[error("accelerator is unavailable but {0}")]
    UnavailableAcceleratorHasData(&'static str),

    #[error("runtime version is empty")]
    EmptyRuntimeVersion,

    #[error("functional check {0} appears more than once")]
    DuplicateCheck(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ProbeError::unavailable("CUDA");
        assert_eq!(err.to_string(), "CUDA is unavailable");
        assert!(err.is_unavailable());

        let err = ProbeError::query_failed("device count", "driver not loaded");
        assert_eq!(
            err.to_string(),
            "device count query failed: driver not loaded"
        );
        assert!(!err.is_unavailable());

        let err = ProbeError::ToolTimedOut {
            tool: "nvidia-smi".to_string(),
            timeout_ms: 250,
        };
        assert_eq!(err.to_string(), "nvidia-smi timed out after 250 ms");
    }
}
