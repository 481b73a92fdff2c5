//! Reference kernels for the Drift particle-tracking framework.
//!
//! # Integrators
//!
//! The step functions in [`integrate`] are pure: they sample a
//! [`VelocitySampler`](drift_core::VelocitySampler) at offset positions and
//! times and return a displacement. The kernels in [`advection`] wrap them,
//! attach particle state to sampling failures and, for RK45, adapt `dt`.
//!
//! | kernel | order | samples per step |
//! |---|---|---|
//! | [`AdvectionEE`] | 1 | 1 |
//! | [`AdvectionRK4`] | 4 | 4 |
//! | [`AdvectionRK45`] | 4(5), adaptive | 6 |
//!
//! [`PeriodicBoundary`] wraps positions back into a cyclic domain after
//! advection.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod advection;
pub mod boundary;
pub mod integrate;

pub use advection::{AdvectionEE, AdvectionRK4, AdvectionRK45, Rk45Config};
pub use boundary::PeriodicBoundary;
pub use integrate::{euler_step, rk45_step, rk4_step, Rk45Step};
