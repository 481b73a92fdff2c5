//! Mock kernels for driver and recovery testing.
//!
//! - [`FailingKernel`]: fails with a given error code after N successes.
//! - [`DeletingKernel`]: asks for deletion once a particle passes a longitude.
//! - [`CountingKernel`]: counts calls and otherwise does nothing.

use std::sync::atomic::{AtomicUsize, Ordering};

use drift_core::{ErrorCode, KernelError, Particle, SamplingError};
use drift_kernel::{Kernel, KernelContext, KernelStatus};

/// Succeeds `succeed_count` times, then returns an error with `code`.
pub struct FailingKernel {
    name: String,
    code: ErrorCode,
    call_count: AtomicUsize,
    succeed_count: usize,
}

impl FailingKernel {
    /// `code` must be one of the error codes; other codes produce a
    /// generic error.
    pub fn new(name: impl Into<String>, succeed_count: usize, code: ErrorCode) -> Self {
        Self {
            name: name.into(),
            code,
            call_count: AtomicUsize::new(0),
            succeed_count,
        }
    }

    /// Calls so far.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Kernel for FailingKernel {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(
        &self,
        particle: &mut Particle,
        _ctx: &KernelContext<'_>,
    ) -> Result<KernelStatus, KernelError> {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n < self.succeed_count {
            return Ok(KernelStatus::Success);
        }
        let state = particle.state();
        Err(match self.code {
            ErrorCode::ErrorOutOfBounds => KernelError::from_sampling(
                state,
                SamplingError::FieldSampling {
                    field: "U".into(),
                    lon: particle.lon,
                    lat: particle.lat,
                    depth: particle.depth,
                },
            ),
            ErrorCode::ErrorTimeExtrapolation => KernelError::from_sampling(
                state,
                SamplingError::TimeExtrapolation {
                    field: "U".into(),
                    time: particle.time,
                },
            ),
            _ => KernelError::message(state, format!("{} failed after {n} calls", self.name)),
        })
    }
}

/// Returns [`KernelStatus::Delete`] once `lon` exceeds `threshold`.
#[derive(Clone, Copy, Debug)]
pub struct DeletingKernel {
    pub threshold: f64,
}

impl Kernel for DeletingKernel {
    fn name(&self) -> &str {
        "DeletingKernel"
    }

    fn execute(
        &self,
        particle: &mut Particle,
        _ctx: &KernelContext<'_>,
    ) -> Result<KernelStatus, KernelError> {
        if particle.lon > self.threshold {
            Ok(KernelStatus::Delete)
        } else {
            Ok(KernelStatus::Success)
        }
    }
}

/// Counts calls.
#[derive(Debug, Default)]
pub struct CountingKernel {
    calls: AtomicUsize,
}

impl CountingKernel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Kernel for CountingKernel {
    fn name(&self) -> &str {
        "CountingKernel"
    }

    fn execute(
        &self,
        _particle: &mut Particle,
        _ctx: &KernelContext<'_>,
    ) -> Result<KernelStatus, KernelError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(KernelStatus::Success)
    }
}
