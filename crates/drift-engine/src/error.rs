//! Errors returned by the execution drivers.

use drift_core::{ConfigError, KernelError, ParticleState};
use drift_kernel::PipelineError;
use thiserror::Error;

/// Why an execution stopped early.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ExecutionError {
    /// The execution config is invalid.
    #[error("invalid execution config: {0}")]
    Config(#[from] ConfigError),

    /// The kernel failed startup validation against the field set.
    #[error("kernel validation failed: {0}")]
    Pipeline(#[from] PipelineError),

    /// A kernel error whose recovery action is abort.
    #[error(transparent)]
    Kernel(#[from] KernelError),

    /// A single step kept asking to be repeated.
    #[error("{particle} repeated its step {repeats} times without completing")]
    TooManyRepeats {
        /// Particle state at the last attempt.
        particle: ParticleState,
        /// Repeats attempted.
        repeats: u32,
    },
}
