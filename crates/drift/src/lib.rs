//! Drift: Lagrangian particle tracking through gridded ocean velocity
//! fields.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Drift sub-crates. For most users, adding `drift` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use drift::prelude::*;
//! use ndarray::{ArrayD, IxDyn};
//!
//! // A steady eastward current of 0.5 m/s on a flat 10 km box.
//! let axis: Vec<f32> = (0..11).map(|i| i as f32 * 1000.0).collect();
//! let u = ArrayD::from_elem(IxDyn(&[11, 11]), 0.5f32);
//! let v = ArrayD::from_elem(IxDyn(&[11, 11]), 0.0f32);
//! let fieldset = FieldSet::from_data(
//!     [
//!         FieldData::new("U", u, axis.clone(), axis.clone()),
//!         FieldData::new("V", v, axis.clone(), axis),
//!     ],
//!     Mesh::Flat,
//!     &FieldOptions::default(),
//! )
//! .unwrap();
//!
//! let mut particles =
//!     ParticleSet::from_list(&[1000.0, 2000.0], &[5000.0, 5000.0], ParticleSchema::new()).unwrap();
//! let config = ExecutionConfig::new(60.0, ExecutionEnd::Runtime(3600.0));
//! particles.execute(&AdvectionRK4, &fieldset, &config).unwrap();
//!
//! assert!((particles.lon()[0] - 2800.0).abs() < 1e-6);
//! assert_eq!(particles.particles()[0].time, 3600.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `drift-core` | Particles, schemas, unit converters, errors, sampling traits |
//! | [`field`] | `drift-field` | Grids, fields, interpolation, caches, field sets |
//! | [`kernel`] | `drift-kernel` | Kernel trait, pipelines, recovery |
//! | [`kernels`] | `drift-kernels` | Advection integrators and periodic boundaries |
//! | [`engine`] | `drift-engine` | Particle sets and the execution drivers |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and errors (`drift-core`).
pub use drift_core as types;

/// Gridded fields and field sets (`drift-field`).
///
/// [`field::Field`] samples one scalar component; [`field::FieldSet`]
/// groups them and samples the `(U, V)` velocity pair.
pub use drift_field as field;

/// Kernel trait, composition, and recovery (`drift-kernel`).
///
/// The [`kernel::Kernel`] trait is the main extension point for
/// user-defined particle behaviour.
pub use drift_kernel as kernel;

/// Built-in kernels (`drift-kernels`).
///
/// [`kernels::AdvectionEE`], [`kernels::AdvectionRK4`],
/// [`kernels::AdvectionRK45`] and [`kernels::PeriodicBoundary`].
pub use drift_kernels as kernels;

/// Particle sets and execution (`drift-engine`).
pub use drift_engine as engine;

/// Common imports for typical Drift usage.
///
/// ```rust
/// use drift::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use drift_core::{
        ErrorCode, Initial, Particle, ParticleId, ParticleSchema, ScalarType, UnitConverter,
        Value, VelocitySampler,
    };

    // Errors
    pub use drift_core::{ConfigError, KernelError, SamplingError};

    // Fields
    pub use drift_field::{
        Field, FieldData, FieldError, FieldOptions, FieldSet, GradientOptions, InterpMethod, Mesh,
    };

    // Kernels
    pub use drift_kernel::{
        FnKernel, Kernel, KernelContext, KernelExt, KernelPipeline, KernelStatus,
        RecoveryAction, RecoveryMap, RecoveryPolicy,
    };
    pub use drift_kernels::{AdvectionEE, AdvectionRK4, AdvectionRK45, PeriodicBoundary, Rk45Config};

    // Engine
    pub use drift_engine::{
        ExecutionConfig, ExecutionEnd, ExecutionError, ExecutionMetrics, ExecutionMode, ParticleSet,
    };
}
