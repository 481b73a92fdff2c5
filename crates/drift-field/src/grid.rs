//! Rectilinear space-time coordinates shared between fields.
//!
//! A [`Grid`] owns the `lon`, `lat`, `depth` and `time` axes. Fields hold
//! it behind an `Arc` so that fields on the same geometry (typically `U`
//! and `V`) share a single copy of their coordinates.

use crate::error::{Axis, FieldError};

/// Coordinate axes of a gridded field.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    lon: Vec<f32>,
    lat: Vec<f32>,
    depth: Vec<f32>,
    time: Vec<f64>,
    time_origin: Option<String>,
}

impl Grid {
    /// Build a grid, validating every axis.
    ///
    /// `lon` and `lat` need at least two strictly increasing points.
    /// `depth` needs at least one point; a single value marks a 2D field.
    /// `time` needs at least one point; a single value marks a steady field.
    pub fn new(
        lon: Vec<f32>,
        lat: Vec<f32>,
        depth: Vec<f32>,
        time: Vec<f64>,
        time_origin: Option<String>,
    ) -> Result<Self, FieldError> {
        check_horizontal(&lon, Axis::Lon)?;
        check_horizontal(&lat, Axis::Lat)?;
        check_increasing(&depth, Axis::Depth)?;
        check_increasing(&time, Axis::Time)?;
        Ok(Self {
            lon,
            lat,
            depth,
            time,
            time_origin,
        })
    }

    /// Longitudes (x), strictly increasing.
    pub fn lon(&self) -> &[f32] {
        &self.lon
    }

    /// Latitudes (y), strictly increasing.
    pub fn lat(&self) -> &[f32] {
        &self.lat
    }

    /// Depth levels. One entry for 2D fields.
    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    /// Times in seconds since [`time_origin`](Self::time_origin).
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Calendar reference for `time`, e.g. `"seconds since 2000-01-01"`.
    pub fn time_origin(&self) -> Option<&str> {
        self.time_origin.as_deref()
    }

    /// Whether the grid has more than one depth level.
    pub fn is_3d(&self) -> bool {
        self.depth.len() > 1
    }

    /// `(time, depth, lat, lon)` lengths.
    pub fn shape(&self) -> [usize; 4] {
        [
            self.time.len(),
            self.depth.len(),
            self.lat.len(),
            self.lon.len(),
        ]
    }

    pub(crate) fn replace_lon(&mut self, lon: Vec<f32>) {
        self.lon = lon;
    }

    pub(crate) fn replace_lat(&mut self, lat: Vec<f32>) {
        self.lat = lat;
    }
}

fn check_horizontal(coords: &[f32], axis: Axis) -> Result<(), FieldError> {
    if coords.len() < 2 {
        return Err(FieldError::AxisTooShort {
            axis,
            len: coords.len(),
        });
    }
    check_increasing(coords, axis)
}

#[allow(clippy::neg_cmp_op_on_partial_ord)]
fn check_increasing<T: PartialOrd + Copy>(coords: &[T], axis: Axis) -> Result<(), FieldError> {
    if coords.is_empty() {
        return Err(FieldError::EmptyAxis { axis });
    }
    for (i, w) in coords.windows(2).enumerate() {
        // `!(a < b)` also rejects NaN.
        if !(w[0] < w[1]) {
            return Err(FieldError::NotMonotonic { axis, index: i });
        }
    }
    Ok(())
}
