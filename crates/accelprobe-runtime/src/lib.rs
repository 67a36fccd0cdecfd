//! Runtime adapters for accelprobe.
//!
//! - [`CandleRuntime`]: the [`RuntimeClient`](accelprobe_core::RuntimeClient)
//!   implementation over candle
//! - [`system`]: NVIDIA tool queries, environment hints and host facts
//! - [`bench`]: matmul timing
//! - [`ProbeSession`]: wires the above together once per process
#![deny(unused_crate_dependencies)]

pub mod bench;
pub mod candle;
pub mod error;
mod session;
pub mod system;

#[cfg(test)]
use tokio_test as _;

pub use bench::{DEFAULT_SIZES, run_matmul_benchmark};
pub use candle::{CandleRuntime, DeviceHints, build_features, compiled_backend, device_label};
pub use error::{RuntimeError, RuntimeResult};
pub use session::ProbeSession;
pub use system::{
    DEFAULT_TOOL_TIMEOUT, GpuToolReport, ToolRunner, build_environment_report, collect_env_hints,
    host_info, query_gpu_tools,
};
