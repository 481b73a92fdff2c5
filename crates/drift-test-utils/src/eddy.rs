//! Idealised inertial eddies on a flat 25 km box.
//!
//! Velocities are spatially uniform and vary in time only, so every
//! particle follows a closed-form trajectory. Reference: N. Fabbroni,
//! 2009, "Numerical simulations of passive tracers dispersion in the sea".

use drift_field::{FieldData, FieldError, FieldOptions, FieldSet, Mesh};
use ndarray::{Array, IxDyn};

use crate::linspace;

/// Coriolis parameter (1/s).
pub const F: f64 = 1e-4;
/// Initial eddy speed (m/s).
pub const U0: f64 = 0.3;
/// Background drift speed (m/s).
pub const UG: f64 = 0.04;
/// Decay rate of the eddy (1/s).
pub const GAMMA: f64 = 1.0 / (86400.0 * 2.89);
/// Decay rate of the background drift (1/s).
pub const GAMMA_G: f64 = 1.0 / (86400.0 * 28.9);

/// Simulated duration covered by the time axis (s).
pub const DURATION: f64 = 6.0 * 3600.0;
/// Spacing of the time axis (s).
pub const TIME_STEP: f64 = 60.0;
/// Grid points per horizontal axis.
pub const GRID_POINTS: usize = 100;
/// Width of the square domain (m).
pub const DOMAIN: f32 = 25_000.0;

/// Which eddy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Eddy {
    /// Pure inertial oscillation.
    Stationary,
    /// Inertial oscillation on a uniform zonal drift.
    Moving,
    /// Moving eddy whose oscillation and drift decay exponentially.
    Decaying,
}

impl Eddy {
    /// All three eddies.
    pub const ALL: [Eddy; 3] = [Eddy::Stationary, Eddy::Moving, Eddy::Decaying];

    /// Velocity `(u, v)` at time `t`.
    pub fn velocity(self, t: f64) -> (f64, f64) {
        match self {
            Self::Stationary => (U0 * (F * t).cos(), -U0 * (F * t).sin()),
            Self::Moving => (
                UG + (U0 - UG) * (F * t).cos(),
                -(U0 - UG) * (F * t).sin(),
            ),
            Self::Decaying => {
                let decay = (-GAMMA * t).exp();
                (
                    UG * (-GAMMA_G * t).exp() + (U0 - UG) * decay * (F * t).cos(),
                    -(U0 - UG) * decay * (F * t).sin(),
                )
            }
        }
    }

    /// Exact position at time `t` of a particle released at `(x0, y0)`
    /// at time zero.
    pub fn truth(self, x0: f64, y0: f64, t: f64) -> (f64, f64) {
        let ft = F * t;
        match self {
            Self::Stationary => (x0 + U0 / F * ft.sin(), y0 - U0 / F * (1.0 - ft.cos())),
            Self::Moving => (
                x0 + UG * t + (U0 - UG) / F * ft.sin(),
                y0 - (U0 - UG) / F * (1.0 - ft.cos()),
            ),
            Self::Decaying => {
                let amp = (U0 - UG) * F / (F * F + GAMMA * GAMMA);
                let g = GAMMA / F;
                let decay = (-GAMMA * t).exp();
                (
                    x0 + UG / GAMMA_G * (1.0 - (-GAMMA_G * t).exp())
                        + amp * (g + decay * (ft.sin() - g * ft.cos())),
                    y0 - amp * (1.0 - decay * (ft.cos() + g * ft.sin())),
                )
            }
        }
    }

    /// Sample times `0, 60, …, 21600` s.
    pub fn times() -> Vec<f64> {
        let n = (DURATION / TIME_STEP) as usize + 1;
        (0..n).map(|i| i as f64 * TIME_STEP).collect()
    }

    /// Field set with `U` and `V` sampled on the flat box.
    pub fn fieldset(self) -> Result<FieldSet, FieldError> {
        let axis = linspace(0.0, DOMAIN, GRID_POINTS);
        let times = Self::times();
        let shape = IxDyn(&[times.len(), GRID_POINTS, GRID_POINTS]);
        let u = Array::from_shape_fn(shape.clone(), |ix| self.velocity(times[ix[0]]).0 as f32);
        let v = Array::from_shape_fn(shape, |ix| self.velocity(times[ix[0]]).1 as f32);
        FieldSet::from_data(
            [
                FieldData::new("U", u, axis.clone(), axis.clone()).with_time(times.clone()),
                FieldData::new("V", v, axis.clone(), axis).with_time(times),
            ],
            Mesh::Flat,
            &FieldOptions::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truth_starts_at_release_point() {
        for eddy in Eddy::ALL {
            let (x, y) = eddy.truth(12000.0, 12500.0, 0.0);
            assert!((x - 12000.0).abs() < 1e-9, "{eddy:?}");
            assert!((y - 12500.0).abs() < 1e-9, "{eddy:?}");
        }
    }

    #[test]
    fn truth_derivative_matches_velocity() {
        let h = 1e-2;
        for eddy in Eddy::ALL {
            for t in [0.0, 3600.0, 12345.0] {
                let (x1, y1) = eddy.truth(0.0, 0.0, t - h);
                let (x2, y2) = eddy.truth(0.0, 0.0, t + h);
                let (u, v) = eddy.velocity(t);
                assert!(((x2 - x1) / (2.0 * h) - u).abs() < 1e-6, "{eddy:?} u at {t}");
                assert!(((y2 - y1) / (2.0 * h) - v).abs() < 1e-6, "{eddy:?} v at {t}");
            }
        }
    }

    #[test]
    fn time_axis_covers_duration() {
        let t = Eddy::times();
        assert_eq!(t.len(), 361);
        assert_eq!(t[360], DURATION);
    }
}
