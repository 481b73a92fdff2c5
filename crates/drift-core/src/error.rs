//! Error types for the Drift particle-tracking framework.
//!
//! Organized by layer: [`SamplingError`] is raised by field queries,
//! [`KernelError`] wraps it with the state of the particle being advanced,
//! and [`ErrorCode`] is the closed set of status codes a recovery policy
//! dispatches on. [`ConfigError`] is shared by every config struct's
//! `validate()`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::particle::ParticleState;

/// Status codes attached to a particle after a kernel call.
///
/// Recovery policies are keyed by the error variants of this enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ErrorCode {
    /// The step completed.
    Success = 0,
    /// The step must be re-run (e.g. an adaptive step was rejected).
    Repeat = 1,
    /// The particle should be removed from its set.
    Delete = 2,
    /// Generic kernel failure.
    Error = 3,
    /// A field was sampled outside its horizontal or vertical domain.
    ErrorOutOfBounds = 4,
    /// A field was sampled outside its time domain.
    ErrorTimeExtrapolation = 5,
}

impl ErrorCode {
    /// Whether this code signals a failure rather than a control status.
    pub fn is_error(self) -> bool {
        matches!(
            self,
            Self::Error | Self::ErrorOutOfBounds | Self::ErrorTimeExtrapolation
        )
    }
}

/// Errors from sampling a field at a space-time point.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SamplingError {
    /// The query point lies outside the field's spatial domain, or the
    /// interpolator returned an undefined value there.
    #[error("field '{field}' sampled out of bounds at (lon {lon}, lat {lat}, depth {depth})")]
    FieldSampling {
        /// Name of the sampled field.
        field: String,
        /// Query longitude (grid units).
        lon: f64,
        /// Query latitude (grid units).
        lat: f64,
        /// Query depth.
        depth: f64,
    },
    /// The query time lies outside `[time[0], time[-1]]` and the field does
    /// not allow time extrapolation.
    #[error(
        "field '{field}' sampled outside its time domain at time {time}; \
         try enabling allow_time_extrapolation"
    )]
    TimeExtrapolation {
        /// Name of the sampled field.
        field: String,
        /// Offending query time, in seconds since the field's time origin.
        time: f64,
    },
}

impl SamplingError {
    /// Name of the field that failed.
    pub fn field(&self) -> &str {
        match self {
            Self::FieldSampling { field, .. } | Self::TimeExtrapolation { field, .. } => field,
        }
    }

    /// The status code a kernel reports for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::FieldSampling { .. } => ErrorCode::ErrorOutOfBounds,
            Self::TimeExtrapolation { .. } => ErrorCode::ErrorTimeExtrapolation,
        }
    }
}

/// Errors from executing a kernel on a single particle.
///
/// Every variant carries the particle's state at the moment of failure so
/// that the driver (or a human) can see where and when the step broke.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum KernelError {
    /// Generic kernel failure with a free-form message.
    #[error("kernel error for {particle}: {message}")]
    Error {
        /// Particle state when the kernel failed.
        particle: ParticleState,
        /// Human-readable description of the failure.
        message: String,
    },
    /// Out-of-bounds field sampling during the step.
    #[error("out-of-bounds sampling by {particle}: {source}")]
    OutOfBounds {
        /// Particle state when the kernel failed.
        particle: ParticleState,
        /// The underlying sampling failure.
        #[source]
        source: SamplingError,
    },
    /// Field sampling outside the time domain during the step.
    #[error("time extrapolation by {particle}: {source}")]
    OutOfTime {
        /// Particle state when the kernel failed.
        particle: ParticleState,
        /// The underlying sampling failure.
        #[source]
        source: SamplingError,
    },
}

impl KernelError {
    /// Wrap a sampling failure with the particle state it occurred at.
    pub fn from_sampling(particle: ParticleState, source: SamplingError) -> Self {
        match source {
            SamplingError::FieldSampling { .. } => Self::OutOfBounds { particle, source },
            SamplingError::TimeExtrapolation { .. } => Self::OutOfTime { particle, source },
        }
    }

    /// Generic failure with a message.
    pub fn message(particle: ParticleState, message: impl Into<String>) -> Self {
        Self::Error {
            particle,
            message: message.into(),
        }
    }

    /// The status code a recovery policy dispatches on.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Error { .. } => ErrorCode::Error,
            Self::OutOfBounds { .. } => ErrorCode::ErrorOutOfBounds,
            Self::OutOfTime { .. } => ErrorCode::ErrorTimeExtrapolation,
        }
    }

    /// Particle state attached to the failure.
    pub fn particle(&self) -> &ParticleState {
        match self {
            Self::Error { particle, .. }
            | Self::OutOfBounds { particle, .. }
            | Self::OutOfTime { particle, .. } => particle,
        }
    }

    /// The sampling failure behind this error, if any.
    pub fn sampling(&self) -> Option<&SamplingError> {
        match self {
            Self::Error { .. } => None,
            Self::OutOfBounds { source, .. } | Self::OutOfTime { source, .. } => Some(source),
        }
    }
}

/// Invalid configuration value, reported by `validate()` on config structs.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A parameter is outside its allowed range.
    #[error("invalid {name}: {reason}")]
    Invalid {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::Invalid`].
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            reason: reason.into(),
        }
    }
}
