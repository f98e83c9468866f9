use std::fmt;

use anyhow::Result;
use candle_core::utils::{cuda_is_available, metal_is_available};
use candle_core::{DType, Device};
use tracing::warn;

/// Accelerator backends, best first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Accelerator {
    Cuda,
    Metal,
    Cpu,
}

impl Accelerator {
    /// The precision safe to run at on this backend. CUDA handles bfloat16,
    /// Metal only reliably supports float16, and the CPU backend needs full
    /// float32.
    pub fn dtype(self) -> DType {
        match self {
            Accelerator::Cuda => DType::BF16,
            Accelerator::Metal => DType::F16,
            Accelerator::Cpu => DType::F32,
        }
    }

    pub fn is_cpu(self) -> bool {
        matches!(self, Accelerator::Cpu)
    }
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Accelerator::Cuda => "cuda",
            Accelerator::Metal => "metal",
            Accelerator::Cpu => "cpu",
        };
        f.write_str(name)
    }
}

/// Probes the runtime once and constructs the best available device.
///
/// A CUDA initialization failure is fatal. A Metal initialization failure is
/// downgraded to a warning and the CPU is used instead; the Metal probe can
/// fail on some toolchain/OS combinations even when it reports available.
pub fn select_device() -> Result<(Accelerator, Device)> {
    if cuda_is_available() {
        return Ok((Accelerator::Cuda, Device::new_cuda(0)?));
    }
    if metal_is_available() {
        match Device::new_metal(0) {
            Ok(device) => return Ok((Accelerator::Metal, device)),
            Err(err) => warn!("metal device probe failed, falling back to CPU: {err}"),
        }
    }
    Ok((Accelerator::Cpu, Device::Cpu))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dtype_mapping_is_fixed() {
        assert_eq!(Accelerator::Cuda.dtype(), DType::BF16);
        assert_eq!(Accelerator::Metal.dtype(), DType::F16);
        assert_eq!(Accelerator::Cpu.dtype(), DType::F32);
    }

    #[test]
    fn display_names() {
        assert_eq!(Accelerator::Cuda.to_string(), "cuda");
        assert_eq!(Accelerator::Metal.to_string(), "metal");
        assert_eq!(Accelerator::Cpu.to_string(), "cpu");
    }

    #[test]
    fn only_cpu_is_cpu() {
        assert!(Accelerator::Cpu.is_cpu());
        assert!(!Accelerator::Cuda.is_cpu());
        assert!(!Accelerator::Metal.is_cpu());
    }

    #[test]
    fn select_device_never_fails_without_accelerators() {
        // On a host with no accelerator the probe must fall through to CPU.
        if !cuda_is_available() && !metal_is_available() {
            let (accel, device) = select_device().unwrap();
            assert_eq!(accel, Accelerator::Cpu);
            assert!(device.is_cpu());
        }
    }
}
