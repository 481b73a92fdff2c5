//! Horizontal advection kernels.
//!
//! All three sample `U` and `V` through the execution context and move the
//! particle by the integrated displacement. Sampling failures are returned
//! as [`KernelError`]s carrying the particle state at the start of the step.

use drift_core::{ConfigError, KernelError, Particle};
use drift_kernel::{Kernel, KernelContext, KernelStatus};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::integrate::{euler_step, rk45_step, rk4_step};

fn velocity_fields() -> Vec<String> {
    vec!["U".to_owned(), "V".to_owned()]
}

// ── Fixed-step kernels ─────────────────────────────────────────────

/// Forward Euler advection.
#[derive(Clone, Copy, Debug, Default)]
pub struct AdvectionEE;

impl Kernel for AdvectionEE {
    fn name(&self) -> &str {
        "AdvectionEE"
    }

    fn reads(&self) -> Vec<String> {
        velocity_fields()
    }

    fn execute(
        &self,
        particle: &mut Particle,
        ctx: &KernelContext<'_>,
    ) -> Result<KernelStatus, KernelError> {
        let (dlon, dlat) = euler_step(
            ctx,
            particle.lon,
            particle.lat,
            particle.depth,
            particle.time,
            particle.dt,
        )
        .map_err(|e| KernelError::from_sampling(particle.state(), e))?;
        particle.lon += dlon;
        particle.lat += dlat;
        Ok(KernelStatus::Success)
    }
}

/// Classical fourth-order Runge–Kutta advection.
#[derive(Clone, Copy, Debug, Default)]
pub struct AdvectionRK4;

impl Kernel for AdvectionRK4 {
    fn name(&self) -> &str {
        "AdvectionRK4"
    }

    fn reads(&self) -> Vec<String> {
        velocity_fields()
    }

    fn execute(
        &self,
        particle: &mut Particle,
        ctx: &KernelContext<'_>,
    ) -> Result<KernelStatus, KernelError> {
        let (dlon, dlat) = rk4_step(
            ctx,
            particle.lon,
            particle.lat,
            particle.depth,
            particle.time,
            particle.dt,
        )
        .map_err(|e| KernelError::from_sampling(particle.state(), e))?;
        particle.lon += dlon;
        particle.lat += dlat;
        Ok(KernelStatus::Success)
    }
}

// ── Adaptive kernel ────────────────────────────────────────────────

/// Step-size control for [`AdvectionRK45`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rk45Config {
    /// Largest accepted local error, in coordinate units.
    pub tol: f64,
    /// Steps with `|dt|` below this are accepted regardless of error.
    pub min_dt: f64,
    /// Cap on `|dt|` when growing the step. `None` leaves it unbounded.
    pub max_dt: Option<f64>,
}

impl Default for Rk45Config {
    fn default() -> Self {
        Self {
            tol: 1e-5,
            min_dt: 1.0,
            max_dt: None,
        }
    }
}

impl Rk45Config {
    /// Check the parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tol.is_finite() || self.tol <= 0.0 {
            return Err(ConfigError::invalid(
                "tol",
                format!("must be finite and positive, got {}", self.tol),
            ));
        }
        if !self.min_dt.is_finite() || self.min_dt < 0.0 {
            return Err(ConfigError::invalid(
                "min_dt",
                format!("must be finite and non-negative, got {}", self.min_dt),
            ));
        }
        if let Some(max) = self.max_dt {
            if !max.is_finite() || max <= 0.0 {
                return Err(ConfigError::invalid(
                    "max_dt",
                    format!("must be finite and positive, got {max}"),
                ));
            }
            if max < self.min_dt {
                return Err(ConfigError::invalid(
                    "max_dt",
                    format!("{max} is below min_dt {}", self.min_dt),
                ));
            }
        }
        Ok(())
    }
}

/// Adaptive Runge–Kutta–Fehlberg 4(5) advection.
///
/// Each attempt compares the fourth- and fifth-order solutions. With error
/// `kappa`:
///
/// - `kappa <= tol` (or `|dt| < min_dt`): the fourth-order position is
///   accepted. If additionally `kappa <= tol / 10` and `|2 dt|` stays within
///   `max_dt`, the next step is requested at `2 dt`.
/// - otherwise `dt` is halved and the kernel returns
///   [`KernelStatus::Repeat`] without moving the particle.
#[derive(Clone, Debug, Default)]
pub struct AdvectionRK45 {
    config: Rk45Config,
}

impl AdvectionRK45 {
    /// Kernel with validated step-size control.
    pub fn new(config: Rk45Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The step-size parameters.
    pub fn config(&self) -> &Rk45Config {
        &self.config
    }

    fn may_grow(&self, dt: f64) -> bool {
        self.config.max_dt.is_none_or(|max| (2.0 * dt).abs() <= max)
    }
}

impl Kernel for AdvectionRK45 {
    fn name(&self) -> &str {
        "AdvectionRK45"
    }

    fn reads(&self) -> Vec<String> {
        velocity_fields()
    }

    fn execute(
        &self,
        particle: &mut Particle,
        ctx: &KernelContext<'_>,
    ) -> Result<KernelStatus, KernelError> {
        let dt = particle.dt;
        let step = rk45_step(
            ctx,
            particle.lon,
            particle.lat,
            particle.depth,
            particle.time,
            dt,
        )
        .map_err(|e| KernelError::from_sampling(particle.state(), e))?;

        let kappa = step.error();
        if kappa <= self.config.tol || dt.abs() < self.config.min_dt {
            particle.lon = step.lon4;
            particle.lat = step.lat4;
            if kappa <= self.config.tol / 10.0 && self.may_grow(dt) {
                particle.update_next_dt(2.0 * dt);
            }
            Ok(KernelStatus::Success)
        } else {
            trace!(particle = particle.id.0, dt, kappa, "rk45 step rejected");
            particle.dt = dt / 2.0;
            Ok(KernelStatus::Repeat)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::{ErrorCode, ParticleId};
    use drift_field::{FieldData, FieldOptions, FieldSet, Mesh};
    use ndarray::{Array, IxDyn};

    fn uniform(u: f32, v: f32) -> FieldSet {
        let lon: Vec<f32> = (0..11).map(|i| i as f32 * 100.0).collect();
        let lat = lon.clone();
        let field = |name: &str, value: f32| {
            FieldData::new(
                name,
                Array::from_elem(IxDyn(&[11, 11]), value),
                lon.clone(),
                lat.clone(),
            )
        };
        FieldSet::from_data(
            [field("U", u), field("V", v)],
            Mesh::Flat,
            &FieldOptions::default(),
        )
        .unwrap()
    }

    fn particle(lon: f64, lat: f64, dt: f64) -> Particle {
        Particle::new(ParticleId(3), lon, lat, 0.0, 0.0, dt)
    }

    #[test]
    fn fixed_step_kernels_move_with_uniform_flow() {
        let fs = uniform(1.0, -0.5);
        let ctx = KernelContext::new(&fs, 0);
        for kernel in [&AdvectionEE as &dyn Kernel, &AdvectionRK4] {
            let mut p = particle(500.0, 500.0, 10.0);
            assert_eq!(kernel.execute(&mut p, &ctx), Ok(KernelStatus::Success));
            assert!((p.lon - 510.0).abs() < 1e-9);
            assert!((p.lat - 495.0).abs() < 1e-9);
            assert_eq!(p.time, 0.0);
        }
    }

    #[test]
    fn leaving_domain_reports_out_of_bounds() {
        let fs = uniform(1.0, 0.0);
        let ctx = KernelContext::new(&fs, 0);
        let mut p = particle(995.0, 500.0, 10.0);
        let err = AdvectionRK4.execute(&mut p, &ctx).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ErrorOutOfBounds);
        assert_eq!(err.particle().lon, 995.0);
        assert_eq!(p.lon, 995.0);
    }

    #[test]
    fn rk45_grows_step_on_uniform_flow() {
        let fs = uniform(1.0, 0.0);
        let ctx = KernelContext::new(&fs, 0);
        let kernel = AdvectionRK45::default();
        let mut p = particle(500.0, 500.0, 10.0);
        assert_eq!(kernel.execute(&mut p, &ctx), Ok(KernelStatus::Success));
        assert_eq!(p.next_dt, Some(20.0));
        assert_eq!(p.dt, 10.0);
    }

    #[test]
    fn rk45_growth_respects_max_dt() {
        let fs = uniform(1.0, 0.0);
        let ctx = KernelContext::new(&fs, 0);
        let kernel = AdvectionRK45::new(Rk45Config {
            max_dt: Some(15.0),
            ..Rk45Config::default()
        })
        .unwrap();
        let mut p = particle(500.0, 500.0, -10.0);
        assert_eq!(kernel.execute(&mut p, &ctx), Ok(KernelStatus::Success));
        assert_eq!(p.next_dt, None);
        assert!((p.lon - 490.0).abs() < 1e-9);
    }

    #[test]
    fn rk45_rejects_and_halves_on_large_error() {
        // Velocity jumps between grid cells, so the two orders disagree.
        let lon: Vec<f32> = (0..11).map(|i| i as f32 * 100.0).collect();
        let lat = lon.clone();
        let u = Array::from_shape_fn(IxDyn(&[11, 11]), |ix| if ix[1] >= 5 { 5.0f32 } else { 0.1 });
        let fs = FieldSet::from_data(
            [
                FieldData::new("U", u, lon.clone(), lat.clone()),
                FieldData::new(
                    "V",
                    Array::from_elem(IxDyn(&[11, 11]), 0.0f32),
                    lon,
                    lat,
                ),
            ],
            Mesh::Flat,
            &FieldOptions::default(),
        )
        .unwrap();
        let ctx = KernelContext::new(&fs, 0);
        let kernel = AdvectionRK45::default();
        let mut p = particle(410.0, 500.0, 40.0);
        assert_eq!(kernel.execute(&mut p, &ctx), Ok(KernelStatus::Repeat));
        assert_eq!(p.dt, 20.0);
        assert_eq!(p.lon, 410.0);
        assert_eq!(p.next_dt, None);
    }

    #[test]
    fn rk45_accepts_below_min_dt() {
        let lon: Vec<f32> = (0..11).map(|i| i as f32 * 100.0).collect();
        let lat = lon.clone();
        let u = Array::from_shape_fn(IxDyn(&[11, 11]), |ix| if ix[1] >= 5 { 5.0f32 } else { 0.1 });
        let fs = FieldSet::from_data(
            [
                FieldData::new("U", u, lon.clone(), lat.clone()),
                FieldData::new(
                    "V",
                    Array::from_elem(IxDyn(&[11, 11]), 0.0f32),
                    lon,
                    lat,
                ),
            ],
            Mesh::Flat,
            &FieldOptions::default(),
        )
        .unwrap();
        let ctx = KernelContext::new(&fs, 0);
        let kernel = AdvectionRK45::new(Rk45Config {
            min_dt: 100.0,
            ..Rk45Config::default()
        })
        .unwrap();
        let mut p = particle(410.0, 500.0, 40.0);
        assert_eq!(kernel.execute(&mut p, &ctx), Ok(KernelStatus::Success));
        assert_ne!(p.lon, 410.0);
    }

    #[test]
    fn config_validation() {
        assert!(Rk45Config::default().validate().is_ok());
        let bad_tol = Rk45Config {
            tol: 0.0,
            ..Rk45Config::default()
        };
        assert!(matches!(
            AdvectionRK45::new(bad_tol),
            Err(ConfigError::Invalid { name: "tol", .. })
        ));
        let inverted = Rk45Config {
            min_dt: 10.0,
            max_dt: Some(5.0),
            ..Rk45Config::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::Invalid { name: "max_dt", .. })
        ));
    }

    #[test]
    fn config_from_partial_json() {
        let cfg: Rk45Config = serde_json::from_str(r#"{"tol": 1e-6}"#).unwrap();
        assert_eq!(cfg.tol, 1e-6);
        assert_eq!(cfg.min_dt, 1.0);
        assert_eq!(cfg.max_dt, None);
    }
}
