//! Errors from field construction and field-set assembly.
//!
//! Sampling failures are not here; they are
//! [`SamplingError`](drift_core::SamplingError)s so that kernels can
//! forward them to the recovery layer unchanged.

use thiserror::Error;

/// Which coordinate axis an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Longitude (x).
    Lon,
    /// Latitude (y).
    Lat,
    /// Depth (z).
    Depth,
    /// Time.
    Time,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Lon => "lon",
            Self::Lat => "lat",
            Self::Depth => "depth",
            Self::Time => "time",
        };
        f.write_str(s)
    }
}

/// Errors arising from building or reshaping fields.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum FieldError {
    /// A coordinate axis has no points.
    #[error("{axis} axis is empty")]
    EmptyAxis {
        /// The empty axis.
        axis: Axis,
    },
    /// A horizontal axis has fewer than two points, so nothing can be
    /// interpolated along it.
    #[error("{axis} axis needs at least 2 points, got {len}")]
    AxisTooShort {
        /// The offending axis.
        axis: Axis,
        /// Its length.
        len: usize,
    },
    /// A coordinate axis is not strictly increasing (or holds NaN).
    #[error("{axis} axis is not strictly increasing at index {index}")]
    NotMonotonic {
        /// The offending axis.
        axis: Axis,
        /// First index `i` with `coord[i] >= coord[i + 1]`.
        index: usize,
    },
    /// The data array does not hold `time * depth * lat * lon` values.
    #[error("field '{field}' data has {actual} values, expected {expected} for shape {shape:?}")]
    ShapeMismatch {
        /// Field name.
        field: String,
        /// Expected `(time, depth, lat, lon)` shape.
        shape: [usize; 4],
        /// Expected element count.
        expected: usize,
        /// Actual element count.
        actual: usize,
    },
    /// The halo is wider than the axis it copies from.
    #[error("halo size {halo_size} exceeds {axis} axis length {len}")]
    HaloTooLarge {
        /// The axis being extended.
        axis: Axis,
        /// Requested halo width.
        halo_size: usize,
        /// Axis length.
        len: usize,
    },
    /// Halo extension was requested after the field had been sampled.
    #[error("field '{field}' has already been sampled; add halos before first use")]
    HaloAfterSampling {
        /// Field name.
        field: String,
    },
    /// A gradient subrange selects no points on some axis.
    #[error("gradient range on {axis} axis selects no points")]
    EmptyRange {
        /// The axis with the empty selection.
        axis: Axis,
    },
    /// `vmin` is greater than `vmax`.
    #[error("vmin {vmin} is greater than vmax {vmax}")]
    InvalidValueRange {
        /// Lower bound.
        vmin: f32,
        /// Upper bound.
        vmax: f32,
    },
    /// A field with this name is already registered.
    #[error("field '{0}' already exists in the field set")]
    DuplicateField(String),
    /// No field with this name is registered.
    #[error("field '{0}' not found in the field set")]
    UnknownField(String),
}
