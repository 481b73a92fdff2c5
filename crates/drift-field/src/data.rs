//! Load interface: raw arrays in, validated field storage out.

use drift_core::UnitConverter;
use ndarray::{Array4, ArrayD};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::DEFAULT_CAPACITY;
use crate::error::FieldError;
use crate::interp::InterpMethod;

/// Raw sample values as handed over by a reader.
///
/// `f64` input is narrowed to `f32` on load.
#[derive(Clone, Debug, PartialEq)]
pub enum RawData {
    /// Single precision, stored as is.
    F32(ArrayD<f32>),
    /// Double precision, narrowed with a warning.
    F64(ArrayD<f64>),
}

impl From<ArrayD<f32>> for RawData {
    fn from(a: ArrayD<f32>) -> Self {
        Self::F32(a)
    }
}

impl From<ArrayD<f64>> for RawData {
    fn from(a: ArrayD<f64>) -> Self {
        Self::F64(a)
    }
}

impl RawData {
    fn len(&self) -> usize {
        match self {
            Self::F32(a) => a.len(),
            Self::F64(a) => a.len(),
        }
    }
}

/// One named scalar component with its coordinates.
///
/// `data` may be 2D `(lat, lon)`, 3D `(time, lat, lon)` or 4D
/// `(time, depth, lat, lon)`; only the element count has to match the
/// coordinate lengths, missing axes are taken as length one.
#[derive(Clone, Debug)]
pub struct FieldData {
    /// Field name, e.g. `"U"`.
    pub name: String,
    /// Sample values.
    pub data: RawData,
    /// Longitudes.
    pub lon: Vec<f32>,
    /// Latitudes.
    pub lat: Vec<f32>,
    /// Depth levels; `[0.0]` for a 2D field.
    pub depth: Vec<f32>,
    /// Times in seconds; `[0.0]` for a steady field.
    pub time: Vec<f64>,
    /// Calendar reference for `time`.
    pub time_origin: Option<String>,
}

impl FieldData {
    /// A steady 2D field.
    pub fn new(
        name: impl Into<String>,
        data: impl Into<RawData>,
        lon: Vec<f32>,
        lat: Vec<f32>,
    ) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            lon,
            lat,
            depth: vec![0.0],
            time: vec![0.0],
            time_origin: None,
        }
    }

    /// Set the depth levels.
    pub fn with_depth(mut self, depth: Vec<f32>) -> Self {
        self.depth = depth;
        self
    }

    /// Set the time axis.
    pub fn with_time(mut self, time: Vec<f64>) -> Self {
        self.time = time;
        self
    }

    /// Set the calendar reference.
    pub fn with_time_origin(mut self, origin: impl Into<String>) -> Self {
        self.time_origin = Some(origin.into());
        self
    }
}

/// Per-field behaviour chosen at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    /// Spatial interpolation scheme.
    pub interp_method: InterpMethod,
    /// Clamp queries outside the time axis instead of failing.
    ///
    /// `None` allows extrapolation only for steady (single-time) fields.
    pub allow_time_extrapolation: Option<bool>,
    /// Values below this are zeroed at load.
    pub vmin: Option<f32>,
    /// Values above this are zeroed at load.
    pub vmax: Option<f32>,
    /// Converter applied to every sampled value.
    pub units: UnitConverter,
    /// Input has its axes reversed: `(lon, lat[, depth][, time])`.
    pub transpose: bool,
    /// Capacity of the interpolator and time-index caches.
    pub cache_capacity: usize,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            interp_method: InterpMethod::Linear,
            allow_time_extrapolation: None,
            vmin: None,
            vmax: None,
            units: UnitConverter::Identity,
            transpose: false,
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl FieldOptions {
    /// Check option consistency.
    pub fn validate(&self) -> Result<(), FieldError> {
        if let (Some(vmin), Some(vmax)) = (self.vmin, self.vmax) {
            if vmin > vmax {
                return Err(FieldError::InvalidValueRange { vmin, vmax });
            }
        }
        Ok(())
    }

    /// Builder: set the interpolation scheme.
    pub fn with_interp_method(mut self, method: InterpMethod) -> Self {
        self.interp_method = method;
        self
    }

    /// Builder: set the time-extrapolation policy.
    pub fn with_time_extrapolation(mut self, allow: bool) -> Self {
        self.allow_time_extrapolation = Some(allow);
        self
    }

    /// Builder: set the unit converter.
    pub fn with_units(mut self, units: UnitConverter) -> Self {
        self.units = units;
        self
    }
}

/// Reshape raw values to `(time, depth, lat, lon)` and sanitize them.
///
/// `shape` is the grid shape. Non-finite values and values outside
/// `[vmin, vmax]` are replaced by zero. Transposed input has every axis
/// reversed, i.e. it is laid out `(lon, lat, depth, time)`.
pub(crate) fn prepare(
    name: &str,
    raw: RawData,
    shape: [usize; 4],
    options: &FieldOptions,
) -> Result<Array4<f32>, FieldError> {
    let [nt, nz, ny, nx] = shape;
    let expected = nt * nz * ny * nx;
    let actual = raw.len();
    if actual != expected {
        return Err(FieldError::ShapeMismatch {
            field: name.to_owned(),
            shape,
            expected,
            actual,
        });
    }

    let values: Vec<f32> = match raw {
        RawData::F32(a) => a.iter().copied().collect(),
        RawData::F64(a) => {
            warn!(field = name, "casting f64 data to f32");
            a.iter().map(|&v| v as f32).collect()
        }
    };

    let mismatch = |_| FieldError::ShapeMismatch {
        field: name.to_owned(),
        shape,
        expected,
        actual,
    };
    let mut data = if options.transpose {
        Array4::from_shape_vec((nx, ny, nz, nt), values)
            .map_err(mismatch)?
            .reversed_axes()
            .as_standard_layout()
            .into_owned()
    } else {
        Array4::from_shape_vec((nt, nz, ny, nx), values).map_err(mismatch)?
    };

    sanitize(name, &mut data, options.vmin, options.vmax);
    Ok(data)
}

pub(crate) fn sanitize(name: &str, data: &mut Array4<f32>, vmin: Option<f32>, vmax: Option<f32>) {
    let mut nans = 0usize;
    let mut clipped = 0usize;
    data.map_inplace(|v| {
        if !v.is_finite() {
            nans += 1;
            *v = 0.0;
        } else if vmin.is_some_and(|m| *v < m) || vmax.is_some_and(|m| *v > m) {
            clipped += 1;
            *v = 0.0;
        }
    });
    if nans > 0 {
        warn!(field = name, count = nans, "zeroed non-finite values");
    }
    if clipped > 0 {
        warn!(field = name, count = clipped, ?vmin, ?vmax, "zeroed values outside [vmin, vmax]");
    }
}
