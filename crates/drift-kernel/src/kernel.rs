//! The [`Kernel`] trait and static composition.

use drift_core::{ErrorCode, KernelError, Particle};

use crate::context::KernelContext;

/// Outcome of a successful kernel call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KernelStatus {
    /// Step done; continue with the next kernel.
    Success,
    /// Re-run the step with the updated particle (e.g. a rejected adaptive
    /// step whose `dt` was shrunk).
    Repeat,
    /// Remove the particle.
    Delete,
}

impl KernelStatus {
    /// Matching particle status code.
    pub fn code(self) -> ErrorCode {
        match self {
            Self::Success => ErrorCode::Success,
            Self::Repeat => ErrorCode::Repeat,
            Self::Delete => ErrorCode::Delete,
        }
    }
}

/// Static description of one leaf kernel, used for validation.
#[derive(Clone, Debug, PartialEq)]
pub struct KernelInfo {
    /// Kernel name.
    pub name: String,
    /// Largest stable `|dt|`, if any.
    pub max_dt: Option<f64>,
    /// Fields the kernel samples.
    pub reads: Vec<String>,
}

/// A per-particle step operator.
///
/// # Contract
///
/// - `execute()` updates the particle's position (and custom variables)
///   for a step of `particle.dt` starting at `particle.time`. It never
///   advances `particle.time`; the driver does that after the whole step
///   succeeds.
/// - `&self`: kernels are stateless; per-particle state lives in the
///   particle's custom variables.
/// - Sampling failures are returned as [`KernelError`]s carrying the
///   particle state.
///
/// # Object safety
///
/// This trait is object-safe; [`KernelPipeline`](crate::KernelPipeline)
/// stores kernels as `Vec<Box<dyn Kernel>>`.
///
/// # Examples
///
/// ```
/// use drift_core::{KernelError, Particle};
/// use drift_kernel::{Kernel, KernelContext, KernelStatus};
///
/// struct Sink {
///     speed: f64,
/// }
///
/// impl Kernel for Sink {
///     fn name(&self) -> &str {
///         "sink"
///     }
///
///     fn execute(
///         &self,
///         particle: &mut Particle,
///         _ctx: &KernelContext<'_>,
///     ) -> Result<KernelStatus, KernelError> {
///         particle.depth += self.speed * particle.dt;
///         Ok(KernelStatus::Success)
///     }
/// }
///
/// assert_eq!(Sink { speed: 0.1 }.name(), "sink");
/// ```
pub trait Kernel: Send + Sync {
    /// Human-readable name for errors and logs.
    fn name(&self) -> &str;

    /// Fields this kernel samples. Checked against the field set before
    /// execution starts.
    fn reads(&self) -> Vec<String> {
        Vec::new()
    }

    /// Largest stable `|dt|`. `None` imposes no constraint.
    fn max_dt(&self) -> Option<f64> {
        None
    }

    /// Append a [`KernelInfo`] for each leaf kernel.
    ///
    /// Composite kernels override this to describe their children.
    fn describe(&self, out: &mut Vec<KernelInfo>) {
        out.push(KernelInfo {
            name: self.name().to_owned(),
            max_dt: self.max_dt(),
            reads: self.reads(),
        });
    }

    /// Advance `particle` by one step.
    fn execute(
        &self,
        particle: &mut Particle,
        ctx: &KernelContext<'_>,
    ) -> Result<KernelStatus, KernelError>;
}

impl<K: Kernel + ?Sized> Kernel for &K {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn reads(&self) -> Vec<String> {
        (**self).reads()
    }
    fn max_dt(&self) -> Option<f64> {
        (**self).max_dt()
    }
    fn describe(&self, out: &mut Vec<KernelInfo>) {
        (**self).describe(out)
    }
    fn execute(
        &self,
        particle: &mut Particle,
        ctx: &KernelContext<'_>,
    ) -> Result<KernelStatus, KernelError> {
        (**self).execute(particle, ctx)
    }
}

impl<K: Kernel + ?Sized> Kernel for Box<K> {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn reads(&self) -> Vec<String> {
        (**self).reads()
    }
    fn max_dt(&self) -> Option<f64> {
        (**self).max_dt()
    }
    fn describe(&self, out: &mut Vec<KernelInfo>) {
        (**self).describe(out)
    }
    fn execute(
        &self,
        particle: &mut Particle,
        ctx: &KernelContext<'_>,
    ) -> Result<KernelStatus, KernelError> {
        (**self).execute(particle, ctx)
    }
}

// ── Static composition ─────────────────────────────────────────────

/// Two kernels run back to back; the second only runs if the first
/// returns [`KernelStatus::Success`].
#[derive(Clone, Debug)]
pub struct Chain<A, B> {
    first: A,
    second: B,
    name: String,
}

impl<A: Kernel, B: Kernel> Chain<A, B> {
    /// Run `first`, then `second`.
    pub fn new(first: A, second: B) -> Self {
        let name = format!("{}+{}", first.name(), second.name());
        Self {
            first,
            second,
            name,
        }
    }
}

impl<A: Kernel, B: Kernel> Kernel for Chain<A, B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn reads(&self) -> Vec<String> {
        let mut reads = self.first.reads();
        for r in self.second.reads() {
            if !reads.contains(&r) {
                reads.push(r);
            }
        }
        reads
    }

    fn max_dt(&self) -> Option<f64> {
        match (self.first.max_dt(), self.second.max_dt()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn describe(&self, out: &mut Vec<KernelInfo>) {
        self.first.describe(out);
        self.second.describe(out);
    }

    #[inline]
    fn execute(
        &self,
        particle: &mut Particle,
        ctx: &KernelContext<'_>,
    ) -> Result<KernelStatus, KernelError> {
        match self.first.execute(particle, ctx)? {
            KernelStatus::Success => self.second.execute(particle, ctx),
            other => Ok(other),
        }
    }
}

/// Combinators on sized kernels.
pub trait KernelExt: Kernel + Sized {
    /// Statically chain `next` after `self`.
    fn then<B: Kernel>(self, next: B) -> Chain<Self, B> {
        Chain::new(self, next)
    }

    /// Box for use in a [`KernelPipeline`](crate::KernelPipeline).
    fn boxed(self) -> Box<dyn Kernel>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<K: Kernel + Sized> KernelExt for K {}

// ── Closure kernels ────────────────────────────────────────────────

/// Kernel from a closure, for user-defined per-particle behaviour.
pub struct FnKernel<F> {
    name: String,
    reads: Vec<String>,
    f: F,
}

impl<F> FnKernel<F>
where
    F: Fn(&mut Particle, &KernelContext<'_>) -> Result<KernelStatus, KernelError> + Send + Sync,
{
    /// Wrap `f` under `name`.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            reads: Vec::new(),
            f,
        }
    }

    /// Declare fields the closure samples.
    pub fn reading(mut self, fields: &[&str]) -> Self {
        self.reads = fields.iter().map(|s| (*s).to_owned()).collect();
        self
    }
}

impl<F> std::fmt::Debug for FnKernel<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnKernel")
            .field("name", &self.name)
            .field("reads", &self.reads)
            .finish_non_exhaustive()
    }
}

impl<F> Kernel for FnKernel<F>
where
    F: Fn(&mut Particle, &KernelContext<'_>) -> Result<KernelStatus, KernelError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn reads(&self) -> Vec<String> {
        self.reads.clone()
    }

    fn execute(
        &self,
        particle: &mut Particle,
        ctx: &KernelContext<'_>,
    ) -> Result<KernelStatus, KernelError> {
        (self.f)(particle, ctx)
    }
}
