//! Error types for the candle runtime adapter.
//!
//! These stay inside the adapter; everything crossing the port boundary is
//! converted into [`ProbeError`].

use accelprobe_core::ProbeError;
use thiserror::Error;

/// Errors raised while talking to candle.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The tensor library itself returned an error.
    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    /// An operation ran but produced the wrong shape or values.
    #[error("result mismatch: {0}")]
    Mismatch(String),

    /// No accelerator device was opened.
    #[error("no accelerator device is open")]
    NoAccelerator,
}

impl RuntimeError {
    /// Convert into a port-level error, naming the operation that failed.
    pub fn into_probe_error(self, what: &str) -> ProbeError {
        match self {
            Self::NoAccelerator => ProbeError::unavailable("accelerator device"),
            other => ProbeError::query_failed(what, other),
        }
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_accelerator_maps_to_unavailable() {
        let err = RuntimeError::NoAccelerator.into_probe_error("device_matmul");
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_mismatch_maps_to_query_failed() {
        let err = RuntimeError::Mismatch("expected [1, 5], got [1, 4]".to_string())
            .into_probe_error("linear_forward");
        assert_eq!(
            err.to_string(),
            "linear_forward query failed: result mismatch: expected [1, 5], got [1, 4]"
        );
    }
}
