//! Uniform gridded flows and grid-free analytic samplers.

use drift_core::{SamplingError, VelocitySampler};
use drift_field::{FieldData, FieldError, FieldOptions, FieldSet, Mesh};
use ndarray::{Array, IxDyn};

use crate::linspace;

fn uniform(
    lon: Vec<f32>,
    lat: Vec<f32>,
    u: f32,
    v: f32,
    mesh: Mesh,
) -> Result<FieldSet, FieldError> {
    let shape = IxDyn(&[lat.len(), lon.len()]);
    FieldSet::from_data(
        [
            FieldData::new("U", Array::from_elem(shape.clone(), u), lon.clone(), lat.clone()),
            FieldData::new("V", Array::from_elem(shape, v), lon, lat),
        ],
        mesh,
        &FieldOptions::default(),
    )
}

/// Steady uniform flow of `(u, v)` m/s on a near-global spherical grid:
/// 200 longitudes over `[-170, 170]`, 100 latitudes over `[-80, 80]`.
pub fn sphere_flow(u: f32, v: f32) -> Result<FieldSet, FieldError> {
    uniform(
        linspace(-170.0, 170.0, 200),
        linspace(-80.0, 80.0, 100),
        u,
        v,
        Mesh::Spherical,
    )
}

/// Coordinates `0.01, 0.02, …, 1.0`: a unit-period axis without a
/// duplicated end point.
pub fn unit_period_axis() -> Vec<f32> {
    linspace(0.0, 1.0, 101).split_off(1)
}

/// Steady uniform flow of `(u, v)` m/s on the unit-period spherical grid,
/// ready for a periodic halo.
pub fn periodic_flow(u: f32, v: f32) -> Result<FieldSet, FieldError> {
    uniform(unit_period_axis(), unit_period_axis(), u, v, Mesh::Spherical)
}

/// Steady uniform flow on a flat `n × n` grid over `[0, extent]`.
pub fn flat_flow(u: f32, v: f32, n: usize, extent: f32) -> Result<FieldSet, FieldError> {
    uniform(
        linspace(0.0, extent, n),
        linspace(0.0, extent, n),
        u,
        v,
        Mesh::Flat,
    )
}

// ── Analytic samplers ──────────────────────────────────────────────

/// Constant velocity everywhere.
#[derive(Clone, Copy, Debug)]
pub struct UniformSampler {
    pub u: f64,
    pub v: f64,
}

impl VelocitySampler for UniformSampler {
    fn velocity(&self, _: f64, _: f64, _: f64, _: f64) -> Result<(f64, f64), SamplingError> {
        Ok((self.u, self.v))
    }
}

/// Solid-body rotation about `(x0, y0)` with angular velocity `omega`
/// (counter-clockwise for positive `omega`).
#[derive(Clone, Copy, Debug)]
pub struct RotationSampler {
    pub x0: f64,
    pub y0: f64,
    pub omega: f64,
}

impl RotationSampler {
    /// Exact position at `t` of a particle starting at `(x, y)` at time 0.
    pub fn truth(&self, x: f64, y: f64, t: f64) -> (f64, f64) {
        let (s, c) = (self.omega * t).sin_cos();
        let (dx, dy) = (x - self.x0, y - self.y0);
        (self.x0 + c * dx - s * dy, self.y0 + s * dx + c * dy)
    }
}

impl VelocitySampler for RotationSampler {
    fn velocity(&self, _: f64, _: f64, lat: f64, lon: f64) -> Result<(f64, f64), SamplingError> {
        Ok((
            -self.omega * (lat - self.y0),
            self.omega * (lon - self.x0),
        ))
    }
}

/// Wraps a sampler and reports out-of-bounds outside `[lo, hi]` in both
/// coordinates.
#[derive(Clone, Copy, Debug)]
pub struct BoxedSampler<S> {
    pub inner: S,
    pub lo: f64,
    pub hi: f64,
}

impl<S: VelocitySampler> VelocitySampler for BoxedSampler<S> {
    fn velocity(
        &self,
        time: f64,
        depth: f64,
        lat: f64,
        lon: f64,
    ) -> Result<(f64, f64), SamplingError> {
        let inside = |c: f64| c >= self.lo && c <= self.hi;
        if inside(lon) && inside(lat) {
            self.inner.velocity(time, depth, lat, lon)
        } else {
            Err(SamplingError::FieldSampling {
                field: "U".into(),
                lon,
                lat,
                depth,
            })
        }
    }
}
