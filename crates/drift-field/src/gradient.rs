//! Horizontal gradients of a field on a spherical grid.
//!
//! Derivatives are taken per `(time, depth)` slice with finite differences
//! over the node coordinates: centered in the interior, one-sided at the
//! edges. Longitude differences are converted to metres with
//! `R * cos(lat) * deg2rad`, latitude differences with `R * deg2rad`.

use ndarray::Array4;

use crate::error::{Axis, FieldError};
use crate::interp::node_slope;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS: f64 = 6.371e6;

/// Optional subranges and output name for [`Field::gradient`](crate::Field::gradient).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GradientOptions {
    /// Inclusive `[start, end]` time window.
    pub timerange: Option<(f64, f64)>,
    /// Inclusive `[west, east]` longitude window.
    pub lonrange: Option<(f32, f32)>,
    /// Inclusive `[south, north]` latitude window.
    pub latrange: Option<(f32, f32)>,
    /// Base name; outputs are `<name>_dx` and `<name>_dy`. Defaults to
    /// `d<field name>`.
    pub name: Option<String>,
}

/// `cos(lat)` below this marks a pole row.
const POLE_COS: f64 = 1e-9;

/// Indices `i` with `lo <= coords[i] <= hi`, or every index if `range` is
/// `None`.
pub(crate) fn select<T: Copy + PartialOrd>(
    coords: &[T],
    range: Option<(T, T)>,
    axis: Axis,
) -> Result<std::ops::Range<usize>, FieldError> {
    let Some((lo, hi)) = range else {
        return Ok(0..coords.len());
    };
    let start = coords.partition_point(|&c| c < lo);
    let end = coords.partition_point(|&c| c <= hi);
    if start >= end {
        return Err(FieldError::EmptyRange { axis });
    }
    Ok(start..end)
}

/// `(d/dx, d/dy)` of `data` laid out `(time, depth, lat, lon)`.
pub(crate) fn gradient(data: &Array4<f32>, lon: &[f32], lat: &[f32]) -> (Array4<f32>, Array4<f32>) {
    let lon: Vec<f64> = lon.iter().map(|&v| f64::from(v)).collect();
    let lat: Vec<f64> = lat.iter().map(|&v| f64::from(v)).collect();
    // Metres per degree of latitude.
    let deg = EARTH_RADIUS * std::f64::consts::PI / 180.0;
    let dim = data.dim();
    let ddx = Array4::from_shape_fn(dim, |(t, z, y, x)| {
        let cos = lat[y].to_radians().cos();
        // Zonal distance vanishes on a pole row.
        if cos.abs() < POLE_COS {
            return 0.0;
        }
        let per_degree = node_slope(&lon, x, |k| f64::from(data[[t, z, y, k]]));
        (per_degree / (deg * cos)) as f32
    });
    let ddy = Array4::from_shape_fn(dim, |(t, z, y, x)| {
        let per_degree = node_slope(&lat, y, |k| f64::from(data[[t, z, k, x]]));
        (per_degree / deg) as f32
    });
    (ddx, ddy)
}
