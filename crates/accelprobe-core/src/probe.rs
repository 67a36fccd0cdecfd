//! Probe operations over a [`RuntimeClient`].
//!
//! Every operation here degrades instead of failing: a query that errors is
//! logged and replaced with `"unknown"`, an empty list, or a failed check.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use tracing::{debug, warn};

use crate::domain::{CheckKind, CheckOutcome, CheckResult, DeviceInfo, DeviceReport, UNKNOWN};
use crate::error::{ProbeError, ProbeResult};
use crate::ports::RuntimeClient;

/// Reason attached to accelerator checks when there is nothing to run them on.
pub const NO_ACCELERATOR: &str = "no accelerator available";

/// Build a full [`DeviceReport`] from the client.
///
/// Queries version identifiers and accelerator availability, then the
/// device list and every standard functional check.
pub fn probe_runtime(client: &dyn RuntimeClient) -> DeviceReport {
    let mut report = probe_runtime_without_checks(client);
    report.functional_checks = run_standard_checks(client, report.accelerator_available);
    report
}

/// [`probe_runtime`] minus the functional checks, which are left empty.
pub fn probe_runtime_without_checks(client: &dyn RuntimeClient) -> DeviceReport {
    let runtime_version = match client.runtime_version() {
        Ok(version) if !version.trim().is_empty() => version,
        Ok(_) => {
            warn!("Runtime reported an empty version string");
            UNKNOWN.to_string()
        }
        Err(e) => {
            warn!(error = %e, "Runtime version query failed");
            UNKNOWN.to_string()
        }
    };

    let backend = client.backend();
    let accelerator_available = client.accelerator_available();
    debug!(%runtime_version, %backend, accelerator_available, "Probed runtime");

    // An unusable accelerator has no meaningful runtime version to report.
    let accelerator_runtime_version = if accelerator_available {
        client.accelerator_runtime_version()
    } else {
        None
    };

    DeviceReport {
        runtime_version,
        backend,
        accelerator_available,
        accelerator_runtime_version,
        devices: probe_devices(client),
        functional_checks: Vec::new(),
    }
}

/// Read properties of every visible accelerator device.
///
/// Returns an empty list when the accelerator is unavailable, reports zero
/// devices, or the count itself cannot be read. A device whose properties
/// fail to load is kept as an `unknown` placeholder so indices stay
/// contiguous.
pub fn probe_devices(client: &dyn RuntimeClient) -> Vec<DeviceInfo> {
    if !client.accelerator_available() {
        return Vec::new();
    }

    let count = match client.device_count() {
        Ok(count) => count,
        Err(e) => {
            warn!(error = %e, "Device count query failed");
            return Vec::new();
        }
    };

    (0..count)
        .map(|index| match client.device_info(index) {
            Ok(mut info) => {
                if info.index != index {
                    warn!(
                        expected = index,
                        reported = info.index,
                        "Runtime reported a mismatched device index"
                    );
                    info.index = index;
                }
                info
            }
            Err(e) => {
                warn!(device = index, error = %e, "Device property query failed");
                DeviceInfo::unknown(index)
            }
        })
        .collect()
}

/// Run one functional check, capturing every failure as an outcome.
///
/// The thunk returns a short detail string on success. Errors become
/// `Failed` and so do panics, so one broken check never stops the next.
pub fn run_functional_check<F>(name: &str, thunk: F) -> CheckResult
where
    F: FnOnce() -> ProbeResult<String>,
{
    let started = Instant::now();
    let result = catch_unwind(AssertUnwindSafe(thunk)).unwrap_or_else(|payload| {
        Err(ProbeError::CheckPanicked {
            name: name.to_string(),
            message: panic_message(payload.as_ref()),
        })
    });
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let outcome = match result {
        Ok(detail) => CheckOutcome::Passed {
            detail: (!detail.is_empty()).then_some(detail),
        },
        Err(e) => {
            warn!(check = name, error = %e, "Functional check failed");
            CheckOutcome::Failed {
                reason: e.to_string(),
            }
        }
    };
    debug!(check = name, outcome = outcome.label(), elapsed_ms, "Ran functional check");

    CheckResult {
        name: name.to_string(),
        outcome,
        elapsed_ms,
    }
}

/// Run every [`CheckKind`] in order.
///
/// Checks that need an accelerator are reported as skipped when none is
/// available rather than being attempted.
pub fn run_standard_checks(
    client: &dyn RuntimeClient,
    accelerator_available: bool,
) -> Vec<CheckResult> {
    CheckKind::ALL
        .into_iter()
        .map(|kind| {
            if kind.requires_accelerator() && !accelerator_available {
                CheckResult::skipped(kind.name(), NO_ACCELERATOR)
            } else {
                run_functional_check(kind.name(), || client.run_check(kind))
            }
        })
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
