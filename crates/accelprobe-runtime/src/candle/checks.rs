//! The standard functional checks, written against candle tensors.
//!
//! Each check does a tiny amount of real work and verifies the result, so a
//! pass means the operation actually produced correct numbers.

use accelprobe_core::CheckKind;
use candle_core::{DType, Device, Tensor, Var};

use super::device_label;
use crate::error::{RuntimeError, RuntimeResult};

/// Maximum relative error tolerated when comparing device results with CPU.
const RELATIVE_TOLERANCE: f32 = 1e-3;

const LINEAR_IN: usize = 10;
const LINEAR_OUT: usize = 5;
const MATMUL_SIZE: usize = 64;

pub(super) fn run(kind: CheckKind, accelerator: Option<&Device>) -> RuntimeResult<String> {
    match kind {
        CheckKind::TensorCreation => tensor_creation(),
        CheckKind::HostRoundtrip => host_roundtrip(),
        CheckKind::LinearForward => linear_forward(),
        CheckKind::AutogradBackward => autograd_backward(),
        CheckKind::AcceleratorAllocation => accelerator_allocation(require(accelerator)?),
        CheckKind::HostToDeviceTransfer => host_to_device(require(accelerator)?),
        CheckKind::DeviceToHostTransfer => device_to_host(require(accelerator)?),
        CheckKind::DeviceMatmul => device_matmul(require(accelerator)?),
    }
}

fn require(accelerator: Option<&Device>) -> RuntimeResult<&Device> {
    accelerator.ok_or(RuntimeError::NoAccelerator)
}

fn tensor_creation() -> RuntimeResult<String> {
    let t = Tensor::randn(0f32, 1f32, (3, 3), &Device::Cpu)?;
    if t.dims2()? != (3, 3) {
        return Err(RuntimeError::Mismatch(format!(
            "expected 3x3 tensor, got {:?}",
            t.dims()
        )));
    }
    ensure_finite(&t, "random tensor")?;
    Ok("3x3 f32 randn on cpu".to_string())
}

fn host_roundtrip() -> RuntimeResult<String> {
    let data: Vec<f32> = (0..12u8).map(|v| f32::from(v) * 0.5).collect();
    let t = Tensor::from_vec(data.clone(), (3, 4), &Device::Cpu)?;
    let back = t.flatten_all()?.to_vec1::<f32>()?;
    if back != data {
        return Err(RuntimeError::Mismatch(
            "host buffer changed after roundtrip".to_string(),
        ));
    }
    Ok(format!("{} values preserved", data.len()))
}

fn linear_forward() -> RuntimeResult<String> {
    let device = Device::Cpu;
    let weight = Tensor::randn(0f32, 1f32, (LINEAR_OUT, LINEAR_IN), &device)?;
    let bias = Tensor::zeros(LINEAR_OUT, DType::F32, &device)?;
    let input = Tensor::randn(0f32, 1f32, (1, LINEAR_IN), &device)?;

    let output = input.matmul(&weight.t()?)?.broadcast_add(&bias)?;
    let dims = output.dims2()?;
    if dims != (1, LINEAR_OUT) {
        return Err(RuntimeError::Mismatch(format!(
            "expected [1, {LINEAR_OUT}], got [{}, {}]",
            dims.0, dims.1
        )));
    }
    ensure_finite(&output, "linear output")?;
    Ok(format!("{LINEAR_IN} -> {LINEAR_OUT} output shape [1, {LINEAR_OUT}]"))
}

fn autograd_backward() -> RuntimeResult<String> {
    let device = Device::Cpu;
    let weight = Var::randn(0f32, 1f32, (LINEAR_OUT, LINEAR_IN), &device)?;
    let input = Tensor::randn(0f32, 1f32, (4, LINEAR_IN), &device)?;

    let loss = input.matmul(&weight.as_tensor().t()?)?.sqr()?.sum_all()?;
    let grads = loss.backward()?;
    let grad = grads
        .get(weight.as_tensor())
        .ok_or_else(|| RuntimeError::Mismatch("no gradient for weight".to_string()))?;

    if grad.dims() != weight.as_tensor().dims() {
        return Err(RuntimeError::Mismatch(format!(
            "gradient shape {:?} differs from weight shape {:?}",
            grad.dims(),
            weight.as_tensor().dims()
        )));
    }
    ensure_finite(grad, "gradient")?;
    Ok(format!("loss {:.4}", loss.to_scalar::<f32>()?))
}

fn accelerator_allocation(device: &Device) -> RuntimeResult<String> {
    let t = Tensor::ones((1024, 1024), DType::F32, device)?;
    let sum = t.sum_all()?.to_scalar::<f32>()?;
    device.synchronize()?;
    if (sum - 1_048_576.0).abs() > 0.5 {
        return Err(RuntimeError::Mismatch(format!(
            "expected 1048576 ones, summed to {sum}"
        )));
    }
    Ok(format!("4 MiB on {}", device_label(device)))
}

fn host_to_device(device: &Device) -> RuntimeResult<String> {
    let host = Tensor::arange(0f32, 1024f32, &Device::Cpu)?;
    let moved = host.to_device(device)?;
    if !moved.device().same_device(device) {
        return Err(RuntimeError::Mismatch(format!(
            "tensor landed on {} instead of {}",
            device_label(moved.device()),
            device_label(device)
        )));
    }
    let expected = host.sum_all()?.to_scalar::<f32>()?;
    let actual = moved.sum_all()?.to_scalar::<f32>()?;
    if (expected - actual).abs() > expected.abs() * RELATIVE_TOLERANCE {
        return Err(RuntimeError::Mismatch(format!(
            "device sum {actual} differs from host sum {expected}"
        )));
    }
    Ok(format!("cpu -> {}", device_label(device)))
}

fn device_to_host(device: &Device) -> RuntimeResult<String> {
    let on_device = Tensor::arange(0u32, 1024u32, device)?;
    let back = on_device.to_device(&Device::Cpu)?.to_vec1::<u32>()?;
    let expected: Vec<u32> = (0..1024).collect();
    if back != expected {
        return Err(RuntimeError::Mismatch(
            "values changed on the way back to host".to_string(),
        ));
    }
    Ok(format!("{} -> cpu", device_label(device)))
}

fn device_matmul(device: &Device) -> RuntimeResult<String> {
    let a = Tensor::randn(0f32, 1f32, (MATMUL_SIZE, MATMUL_SIZE), &Device::Cpu)?;
    let expected = a.matmul(&a.t()?.contiguous()?)?;

    let on_device = a.to_device(device)?;
    let actual = on_device
        .matmul(&on_device.t()?.contiguous()?)?
        .to_device(&Device::Cpu)?;
    let max_error = max_relative_error(&expected, &actual)?;
    if max_error > RELATIVE_TOLERANCE {
        return Err(RuntimeError::Mismatch(format!(
            "max relative error {max_error:.2e} exceeds {RELATIVE_TOLERANCE:.0e}"
        )));
    }
    Ok(format!(
        "{MATMUL_SIZE}x{MATMUL_SIZE} a.aT on {}, max relative error {max_error:.2e}",
        device_label(device)
    ))
}

/// Largest `|a - e| / max(|e|, 1)` over both tensors.
fn max_relative_error(expected: &Tensor, actual: &Tensor) -> RuntimeResult<f32> {
    let expected = expected.flatten_all()?.to_vec1::<f32>()?;
    let actual = actual.flatten_all()?.to_vec1::<f32>()?;
    if expected.len() != actual.len() {
        return Err(RuntimeError::Mismatch(format!(
            "expected {} values, got {}",
            expected.len(),
            actual.len()
        )));
    }
    Ok(expected
        .iter()
        .zip(&actual)
        .map(|(e, a)| (a - e).abs() / e.abs().max(1.0))
        .fold(0.0, f32::max))
}

fn ensure_finite(t: &Tensor, what: &str) -> RuntimeResult<()> {
    let values = t.flatten_all()?.to_vec1::<f32>()?;
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(RuntimeError::Mismatch(format!("{what} contains NaN or infinity")))
    }
}
