//! Square matmul timing, CPU against the open accelerator.

use std::time::Instant;

use accelprobe_core::BenchSample;
use candle_core::{Device, Tensor};
use tracing::{info, warn};

use crate::candle::CandleRuntime;
use crate::error::RuntimeResult;

/// Matrix sizes timed when the caller does not pick any.
pub const DEFAULT_SIZES: [usize; 4] = [1000, 2000, 4000, 8000];

/// Time one `n x n` f32 matmul per size on the CPU and, when open, on the
/// accelerator.
///
/// A size that fails is recorded with its error and the remaining sizes
/// still run.
pub fn run_matmul_benchmark(runtime: &CandleRuntime, sizes: &[usize]) -> Vec<BenchSample> {
    sizes
        .iter()
        .map(|&size| bench_size(size, runtime.accelerator()))
        .collect()
}

fn bench_size(size: usize, accelerator: Option<&Device>) -> BenchSample {
    let mut sample = BenchSample {
        size,
        cpu_secs: None,
        accelerator_secs: None,
        error: None,
    };
    if size == 0 {
        sample.error = Some("size must be positive".to_string());
        return sample;
    }

    let operands = Tensor::randn(0f32, 1f32, (size, size), &Device::Cpu)
        .and_then(|a| Ok((a, Tensor::randn(0f32, 1f32, (size, size), &Device::Cpu)?)));
    let (a, b) = match operands {
        Ok(pair) => pair,
        Err(e) => {
            sample.error = Some(e.to_string());
            return sample;
        }
    };

    match time_cpu(&a, &b) {
        Ok(secs) => sample.cpu_secs = Some(secs),
        Err(e) => sample.error = Some(format!("cpu: {e}")),
    }

    if let Some(device) = accelerator {
        match time_device(&a, &b, device) {
            Ok(secs) => sample.accelerator_secs = Some(secs),
            Err(e) => sample.error = Some(format!("accelerator: {e}")),
        }
    }

    if let Some(error) = &sample.error {
        warn!(size, %error, "Benchmark size failed");
    } else {
        info!(
            size,
            cpu_secs = sample.cpu_secs,
            accelerator_secs = sample.accelerator_secs,
            "Benchmarked matmul"
        );
    }
    sample
}

fn time_cpu(a: &Tensor, b: &Tensor) -> RuntimeResult<f64> {
    let started = Instant::now();
    let _ = a.matmul(b)?;
    Ok(started.elapsed().as_secs_f64())
}

fn time_device(a: &Tensor, b: &Tensor, device: &Device) -> RuntimeResult<f64> {
    let a = a.to_device(device)?;
    let b = b.to_device(device)?;

    // Warm-up absorbs kernel loading and allocator growth.
    let _ = a.matmul(&b)?;
    device.synchronize()?;

    let started = Instant::now();
    let _ = a.matmul(&b)?;
    device.synchronize()?;
    Ok(started.elapsed().as_secs_f64())
}
