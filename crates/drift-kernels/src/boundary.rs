//! Periodic boundary kernel.

use drift_core::{ConfigError, KernelError, Particle};
use drift_field::{halo, Grid};
use drift_kernel::{Kernel, KernelContext, KernelStatus};

/// Wraps particle positions back into `[origin, origin + period)` on the
/// configured axes.
///
/// Run it after an advection kernel on a field set with a periodic halo;
/// the halo must be at least as wide as one step's displacement so the
/// integrator never samples beyond it before the position is wrapped.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PeriodicBoundary {
    zonal: Option<(f64, f64)>,
    meridional: Option<(f64, f64)>,
}

impl PeriodicBoundary {
    /// A boundary that wraps nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap longitude into `[origin, origin + period)`.
    pub fn with_zonal(mut self, origin: f64, period: f64) -> Result<Self, ConfigError> {
        check_period("zonal period", period)?;
        self.zonal = Some((origin, period));
        Ok(self)
    }

    /// Wrap latitude into `[origin, origin + period)`.
    pub fn with_meridional(mut self, origin: f64, period: f64) -> Result<Self, ConfigError> {
        check_period("meridional period", period)?;
        self.meridional = Some((origin, period));
        Ok(self)
    }

    /// Boundary matching the periodicity of `grid`, taken before any halo
    /// is added: the window starts at the first coordinate and spans the
    /// domain width plus one spacing.
    pub fn for_grid(grid: &Grid, zonal: bool, meridional: bool) -> Result<Self, ConfigError> {
        let mut b = Self::new();
        if zonal {
            let lon = grid.lon();
            b = b.with_zonal(f64::from(lon[0]), f64::from(halo::period(lon)))?;
        }
        if meridional {
            let lat = grid.lat();
            b = b.with_meridional(f64::from(lat[0]), f64::from(halo::period(lat)))?;
        }
        Ok(b)
    }

    /// Wrap `(lon, lat)` in place.
    pub fn apply(&self, lon: &mut f64, lat: &mut f64) {
        if let Some((origin, period)) = self.zonal {
            *lon = wrap(*lon, origin, period);
        }
        if let Some((origin, period)) = self.meridional {
            *lat = wrap(*lat, origin, period);
        }
    }
}

fn check_period(name: &'static str, period: f64) -> Result<(), ConfigError> {
    if period.is_finite() && period > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            name,
            format!("must be finite and positive, got {period}"),
        ))
    }
}

#[inline]
fn wrap(x: f64, origin: f64, period: f64) -> f64 {
    if (origin..origin + period).contains(&x) {
        x
    } else {
        origin + (x - origin).rem_euclid(period)
    }
}

impl Kernel for PeriodicBoundary {
    fn name(&self) -> &str {
        "PeriodicBoundary"
    }

    fn execute(
        &self,
        particle: &mut Particle,
        _ctx: &KernelContext<'_>,
    ) -> Result<KernelStatus, KernelError> {
        self.apply(&mut particle.lon, &mut particle.lat);
        Ok(KernelStatus::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn positions_inside_are_untouched() {
        let b = PeriodicBoundary::new().with_zonal(0.0, 1.0).unwrap();
        let (mut lon, mut lat) = (0.3, 7.0);
        b.apply(&mut lon, &mut lat);
        assert_eq!((lon, lat), (0.3, 7.0));
    }

    #[test]
    fn wraps_both_directions() {
        let b = PeriodicBoundary::new()
            .with_zonal(0.0, 1.0)
            .unwrap()
            .with_meridional(-90.0, 180.0)
            .unwrap();
        let (mut lon, mut lat) = (1.25, -95.0);
        b.apply(&mut lon, &mut lat);
        assert!((lon - 0.25).abs() < 1e-12);
        assert!((lat - 85.0).abs() < 1e-12);
        let (mut lon, mut lat) = (-0.25, 0.0);
        b.apply(&mut lon, &mut lat);
        assert!((lon - 0.75).abs() < 1e-12);
    }

    #[test]
    fn grid_period_includes_one_spacing() {
        let lon: Vec<f32> = (1..=100).map(|i| i as f32 / 100.0).collect();
        let grid = Grid::new(lon.clone(), lon, vec![0.0], vec![0.0], None).unwrap();
        let b = PeriodicBoundary::for_grid(&grid, true, false).unwrap();
        let (mut x, mut y) = (1.02, 5.0);
        b.apply(&mut x, &mut y);
        assert!((x - 0.02).abs() < 1e-6, "{x}");
        assert_eq!(y, 5.0);
    }

    #[test]
    fn rejects_bad_period() {
        assert!(PeriodicBoundary::new().with_zonal(0.0, 0.0).is_err());
        assert!(PeriodicBoundary::new().with_meridional(0.0, f64::NAN).is_err());
    }

    proptest! {
        #[test]
        fn wrapped_lies_in_window(x in -1e4f64..1e4, origin in -10.0f64..10.0, period in 0.1f64..50.0) {
            let w = wrap(x, origin, period);
            prop_assert!(w >= origin && w <= origin + period);
            let k = ((x - w) / period).round();
            prop_assert!((x - w - k * period).abs() < 1e-6 * (1.0 + x.abs()));
        }
    }
}
