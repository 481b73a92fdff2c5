//! Gridded fields for the Drift particle-tracking framework.
//!
//! A [`Field`] is one named scalar component of gridded data over
//! `(time, depth, lat, lon)`. Sampling resolves the bracketing time slices,
//! builds (or reuses) a spatial interpolator for each, blends them linearly
//! in time and converts the result to the particle coordinate unit.
//!
//! A [`FieldSet`] groups the fields an integrator needs, shares coordinate
//! grids between them and exposes the `(U, V)` pair as a
//! [`VelocitySampler`](drift_core::VelocitySampler).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod codegen;
pub mod data;
pub mod error;
pub mod field;
pub mod fieldset;
pub mod gradient;
pub mod grid;
pub mod halo;
pub mod interp;

pub use cache::LruCache;
pub use codegen::FieldDescriptor;
pub use data::{FieldData, FieldOptions, RawData};
pub use error::{Axis, FieldError};
pub use field::Field;
pub use fieldset::{FieldSet, Mesh};
pub use gradient::{GradientOptions, EARTH_RADIUS};
pub use grid::Grid;
pub use halo::DEFAULT_HALO_SIZE;
pub use interp::{InterpMethod, SliceInterpolator};
