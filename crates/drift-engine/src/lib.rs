//! Particle sets and execution drivers for Drift.
//!
//! A [`ParticleSet`] owns the particles and their custom-variable schema.
//! Its drivers advance every particle through a [`Kernel`](drift_kernel::Kernel)
//! until the configured end time, dispatching kernel failures through a
//! recovery policy.
//!
//! Two entry points share one stepping routine:
//!
//! - [`ParticleSet::execute`] takes `&dyn Kernel` (interpreted: the kernel
//!   is assembled at runtime, e.g. a [`KernelPipeline`](drift_kernel::KernelPipeline)).
//! - [`ParticleSet::execute_compiled`] is generic over the kernel type, so
//!   a statically chained kernel is monomorphised and inlined.
//!
//! Both perform the same floating-point operations in the same order and
//! therefore produce bitwise-identical trajectories.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod execute;
pub mod metrics;
pub mod particle_set;

pub use config::{ExecutionConfig, ExecutionEnd, ExecutionMode};
pub use error::ExecutionError;
pub use metrics::ExecutionMetrics;
pub use particle_set::{ParticleSet, ParticleSetError};
