//! Sampling traits consumed by the integrator kernels.

use crate::error::SamplingError;

/// Point sampling of one scalar quantity.
///
/// Implemented by gridded fields and by analytic test flows. Arguments are
/// in evaluation order: time in seconds since the time origin, then depth,
/// latitude and longitude in grid units.
pub trait ScalarSampler {
    /// Name used in error reports.
    fn name(&self) -> &str;

    /// Value at `(time, depth, lat, lon)`, in target units.
    fn sample(&self, time: f64, depth: f64, lat: f64, lon: f64) -> Result<f64, SamplingError>;
}

/// Point sampling of the horizontal velocity `(u, v)`.
///
/// Returned components are in target units per second, i.e. already
/// converted to the unit of the particle coordinates (degrees/s on a
/// spherical mesh, m/s on a flat one).
pub trait VelocitySampler {
    /// Velocity at `(time, depth, lat, lon)`.
    fn velocity(
        &self,
        time: f64,
        depth: f64,
        lat: f64,
        lon: f64,
    ) -> Result<(f64, f64), SamplingError>;
}

impl<T: VelocitySampler + ?Sized> VelocitySampler for &T {
    fn velocity(
        &self,
        time: f64,
        depth: f64,
        lat: f64,
        lon: f64,
    ) -> Result<(f64, f64), SamplingError> {
        (**self).velocity(time, depth, lat, lon)
    }
}
