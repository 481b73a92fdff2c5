//! Kernel trait and execution context for Drift particle kernels.
//!
//! A [`Kernel`] advances one particle by one step. Kernels compose either
//! dynamically into a [`KernelPipeline`] (boxed, dispatched through a
//! vtable) or statically with [`KernelExt::then`] into a [`Chain`]
//! (monomorphised). Both forms run the same per-particle code, so they
//! produce bit-identical results.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod kernel;
pub mod pipeline;
pub mod recovery;

pub use context::KernelContext;
pub use kernel::{Chain, FnKernel, Kernel, KernelExt, KernelInfo, KernelStatus};
pub use pipeline::{validate_kernel, KernelPipeline, PipelineError};
pub use recovery::{RecoveryAction, RecoveryMap, RecoveryPolicy};
