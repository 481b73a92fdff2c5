//! Core types and traits for the Drift particle-tracking framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions shared by the field, kernel and engine
//! crates: particle identity and state, custom particle variables, unit
//! converters, sampling traits, and the error/status types that flow
//! from a failed field query up to the recovery layer.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod particle;
pub mod schema;
pub mod traits;
pub mod units;

pub use error::{ConfigError, ErrorCode, KernelError, SamplingError};
pub use id::ParticleId;
pub use particle::{Particle, ParticleState};
pub use schema::{Initial, InitView, ParticleSchema, ScalarType, SchemaError, Value, Variable};
pub use traits::{ScalarSampler, VelocitySampler};
pub use units::UnitConverter;
