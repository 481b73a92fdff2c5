//! Dynamic kernel pipelines and startup validation.
//!
//! [`validate_kernel`] runs once before execution to catch structural
//! errors (empty pipeline, bad `dt`, missing fields) instead of failing
//! on the first particle.

use drift_core::{KernelError, Particle};
use drift_field::FieldSet;
use thiserror::Error;
use tracing::debug;

use crate::context::KernelContext;
use crate::kernel::{Kernel, KernelInfo, KernelStatus};

// ── Errors ─────────────────────────────────────────────────────────

/// Errors from pipeline validation (startup-time, not per-step).
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PipelineError {
    /// No kernels registered.
    #[error("pipeline has no kernels")]
    EmptyPipeline,

    /// The configured dt is NaN, infinite or zero.
    #[error("dt must be finite and non-zero, got {value}")]
    InvalidDt {
        /// The invalid dt value.
        value: f64,
    },

    /// A kernel's `max_dt()` returned a non-finite or non-positive value.
    #[error("kernel '{kernel}' returned invalid max_dt: {value} (must be finite and positive)")]
    InvalidMaxDt {
        /// Which kernel.
        kernel: String,
        /// The invalid max_dt value.
        value: f64,
    },

    /// The configured `|dt|` exceeds a kernel's `max_dt`.
    #[error("dt {configured_dt} exceeds max_dt {max_supported} (constrained by '{constraining_kernel}')")]
    DtTooLarge {
        /// The dt that was requested.
        configured_dt: f64,
        /// The tightest `max_dt` constraint.
        max_supported: f64,
        /// Which kernel constrains it.
        constraining_kernel: String,
    },

    /// A kernel samples a field the field set does not define.
    #[error("kernel '{kernel}' reads undefined field '{field}'")]
    UndefinedField {
        /// Which kernel.
        kernel: String,
        /// The missing field.
        field: String,
    },
}

// ── Validation ─────────────────────────────────────────────────────

/// Validate `kernel` against `fieldset` for a run with step `dt`.
///
/// Checks performed:
///
/// 1. `dt` is finite and non-zero (negative `dt` integrates backward).
/// 2. At least one leaf kernel.
/// 3. Every leaf's `max_dt` is finite and positive, and `|dt| <= min(max_dt)`.
/// 4. Every field a leaf reads exists in `fieldset`.
///
/// Returns the leaf descriptions on success.
pub fn validate_kernel<K: Kernel + ?Sized>(
    kernel: &K,
    fieldset: &FieldSet,
    dt: f64,
) -> Result<Vec<KernelInfo>, PipelineError> {
    // 1. dt must be finite and non-zero
    if !dt.is_finite() || dt == 0.0 {
        return Err(PipelineError::InvalidDt { value: dt });
    }

    let mut leaves = Vec::new();
    kernel.describe(&mut leaves);

    // 2. Non-empty
    if leaves.is_empty() {
        return Err(PipelineError::EmptyPipeline);
    }

    // 3. dt constraints
    {
        let mut min_max_dt = f64::INFINITY;
        let mut constraining = String::new();
        for leaf in &leaves {
            if let Some(max) = leaf.max_dt {
                if !max.is_finite() || max <= 0.0 {
                    return Err(PipelineError::InvalidMaxDt {
                        kernel: leaf.name.clone(),
                        value: max,
                    });
                }
                if max < min_max_dt {
                    min_max_dt = max;
                    constraining = leaf.name.clone();
                }
            }
        }
        if dt.abs() > min_max_dt {
            return Err(PipelineError::DtTooLarge {
                configured_dt: dt,
                max_supported: min_max_dt,
                constraining_kernel: constraining,
            });
        }
    }

    // 4. Field references
    for leaf in &leaves {
        for field in &leaf.reads {
            if fieldset.field(field).is_none() {
                return Err(PipelineError::UndefinedField {
                    kernel: leaf.name.clone(),
                    field: field.clone(),
                });
            }
        }
    }

    debug!(
        kernel = %kernel.name(),
        leaves = leaves.len(),
        dt,
        "kernel validated"
    );
    Ok(leaves)
}

// ── Pipeline ───────────────────────────────────────────────────────

/// Ordered list of boxed kernels, run back to back on each particle.
///
/// A kernel returning anything other than [`KernelStatus::Success`] stops
/// the pipeline for that step.
#[derive(Default)]
pub struct KernelPipeline {
    kernels: Vec<Box<dyn Kernel>>,
    name: String,
}

impl std::fmt::Debug for KernelPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelPipeline")
            .field("name", &self.name)
            .field("len", &self.kernels.len())
            .finish()
    }
}

impl KernelPipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a kernel.
    pub fn push(&mut self, kernel: Box<dyn Kernel>) {
        if !self.name.is_empty() {
            self.name.push('+');
        }
        self.name.push_str(kernel.name());
        self.kernels.push(kernel);
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, kernel: impl Kernel + 'static) -> Self {
        self.push(Box::new(kernel));
        self
    }

    /// Number of kernels.
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    /// Whether the pipeline holds no kernels.
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Kernels in execution order.
    pub fn kernels(&self) -> &[Box<dyn Kernel>] {
        &self.kernels
    }
}

impl Kernel for KernelPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn reads(&self) -> Vec<String> {
        let mut reads: Vec<String> = Vec::new();
        for k in &self.kernels {
            for r in k.reads() {
                if !reads.contains(&r) {
                    reads.push(r);
                }
            }
        }
        reads
    }

    fn max_dt(&self) -> Option<f64> {
        self.kernels
            .iter()
            .filter_map(|k| k.max_dt())
            .reduce(f64::min)
    }

    fn describe(&self, out: &mut Vec<KernelInfo>) {
        for k in &self.kernels {
            k.describe(out);
        }
    }

    fn execute(
        &self,
        particle: &mut Particle,
        ctx: &KernelContext<'_>,
    ) -> Result<KernelStatus, KernelError> {
        for k in &self.kernels {
            match k.execute(particle, ctx)? {
                KernelStatus::Success => {}
                other => return Ok(other),
            }
        }
        Ok(KernelStatus::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::FnKernel;
    use drift_core::ParticleId;

    fn noop(name: &'static str) -> impl Kernel + 'static {
        FnKernel::new(name, |_: &mut Particle, _: &KernelContext<'_>| {
            Ok(KernelStatus::Success)
        })
    }

    struct Capped(f64);
    impl Kernel for Capped {
        fn name(&self) -> &str {
            "capped"
        }
        fn max_dt(&self) -> Option<f64> {
            Some(self.0)
        }
        fn execute(
            &self,
            _: &mut Particle,
            _: &KernelContext<'_>,
        ) -> Result<KernelStatus, KernelError> {
            Ok(KernelStatus::Success)
        }
    }

    #[test]
    fn empty_pipeline_rejected() {
        let fs = FieldSet::new();
        assert_eq!(
            validate_kernel(&KernelPipeline::new(), &fs, 1.0),
            Err(PipelineError::EmptyPipeline)
        );
    }

    #[test]
    fn invalid_dt_rejected() {
        let fs = FieldSet::new();
        let p = KernelPipeline::new().with(noop("a"));
        for dt in [0.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                validate_kernel(&p, &fs, dt),
                Err(PipelineError::InvalidDt { .. })
            ));
        }
        assert!(validate_kernel(&p, &fs, -60.0).is_ok());
    }

    #[test]
    fn dt_bounded_by_tightest_kernel() {
        let fs = FieldSet::new();
        let p = KernelPipeline::new().with(Capped(100.0)).with(noop("free"));
        assert!(validate_kernel(&p, &fs, 100.0).is_ok());
        assert_eq!(
            validate_kernel(&p, &fs, -150.0),
            Err(PipelineError::DtTooLarge {
                configured_dt: -150.0,
                max_supported: 100.0,
                constraining_kernel: "capped".into()
            })
        );
        assert!(matches!(
            validate_kernel(&Capped(-1.0), &fs, 1.0),
            Err(PipelineError::InvalidMaxDt { .. })
        ));
    }

    #[test]
    fn undefined_field_rejected() {
        let fs = FieldSet::new();
        let k = FnKernel::new("reader", |_: &mut Particle, _: &KernelContext<'_>| {
            Ok(KernelStatus::Success)
        })
        .reading(&["U", "V"]);
        assert_eq!(
            validate_kernel(&k, &fs, 1.0),
            Err(PipelineError::UndefinedField {
                kernel: "reader".into(),
                field: "U".into()
            })
        );
    }

    #[test]
    fn pipeline_stops_at_first_non_success() {
        let fs = FieldSet::new();
        let ctx = KernelContext::new(&fs, 0);
        let p = KernelPipeline::new()
            .with(FnKernel::new("repeat", |p: &mut Particle, _: &KernelContext<'_>| {
                p.dt /= 2.0;
                Ok(KernelStatus::Repeat)
            }))
            .with(FnKernel::new("never", |p: &mut Particle, _: &KernelContext<'_>| {
                p.lon = f64::NAN;
                Ok(KernelStatus::Success)
            }));
        assert_eq!(p.name(), "repeat+never");
        let mut particle = Particle::new(ParticleId(0), 1.0, 2.0, 0.0, 0.0, 8.0);
        assert_eq!(p.execute(&mut particle, &ctx), Ok(KernelStatus::Repeat));
        assert_eq!((particle.lon, particle.dt), (1.0, 4.0));
    }
}
