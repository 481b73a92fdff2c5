//! Read-only state shared by every kernel call in an execution.

use drift_core::{SamplingError, VelocitySampler};
use drift_field::{Field, FieldSet};

/// Execution context passed to [`Kernel::execute`](crate::Kernel::execute).
///
/// Gives kernels the field set and the index of the outer step. Kernels
/// never see other particles.
#[derive(Clone, Copy, Debug)]
pub struct KernelContext<'a> {
    fieldset: &'a FieldSet,
    step: u64,
}

impl<'a> KernelContext<'a> {
    /// Context for outer step `step` over `fieldset`.
    pub fn new(fieldset: &'a FieldSet, step: u64) -> Self {
        Self { fieldset, step }
    }

    /// The field set being sampled.
    pub fn fieldset(&self) -> &'a FieldSet {
        self.fieldset
    }

    /// Field by name.
    pub fn field(&self, name: &str) -> Option<&'a Field> {
        self.fieldset.field(name)
    }

    /// Constant by name.
    pub fn constant(&self, name: &str) -> Option<f64> {
        self.fieldset.constant(name)
    }

    /// Zero-based index of the outer step.
    pub fn step(&self) -> u64 {
        self.step
    }
}

impl VelocitySampler for KernelContext<'_> {
    fn velocity(
        &self,
        time: f64,
        depth: f64,
        lat: f64,
        lon: f64,
    ) -> Result<(f64, f64), SamplingError> {
        self.fieldset.velocity(time, depth, lat, lon)
    }
}
