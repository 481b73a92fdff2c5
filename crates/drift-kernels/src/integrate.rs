//! Explicit Runge–Kutta step functions.
//!
//! Every function takes the particle's `(lon, lat, depth, time)` and the
//! step `dt`, samples the velocity at the stage points and returns the
//! result without touching any particle. Velocities are in coordinate
//! units per second, so displacements are `velocity * dt`.

use drift_core::{SamplingError, VelocitySampler};

/// Forward Euler displacement `(dlon, dlat)`.
pub fn euler_step<S: VelocitySampler + ?Sized>(
    sampler: &S,
    lon: f64,
    lat: f64,
    depth: f64,
    time: f64,
    dt: f64,
) -> Result<(f64, f64), SamplingError> {
    let (u, v) = sampler.velocity(time, depth, lat, lon)?;
    Ok((u * dt, v * dt))
}

/// Classical fourth-order Runge–Kutta displacement `(dlon, dlat)`.
pub fn rk4_step<S: VelocitySampler + ?Sized>(
    sampler: &S,
    lon: f64,
    lat: f64,
    depth: f64,
    time: f64,
    dt: f64,
) -> Result<(f64, f64), SamplingError> {
    let half = 0.5 * dt;
    let (u1, v1) = sampler.velocity(time, depth, lat, lon)?;
    let (lon1, lat1) = (lon + u1 * half, lat + v1 * half);
    let (u2, v2) = sampler.velocity(time + half, depth, lat1, lon1)?;
    let (lon2, lat2) = (lon + u2 * half, lat + v2 * half);
    let (u3, v3) = sampler.velocity(time + half, depth, lat2, lon2)?;
    let (lon3, lat3) = (lon + u3 * dt, lat + v3 * dt);
    let (u4, v4) = sampler.velocity(time + dt, depth, lat3, lon3)?;
    Ok((
        (u1 + 2.0 * u2 + 2.0 * u3 + u4) / 6.0 * dt,
        (v1 + 2.0 * v2 + 2.0 * v3 + v4) / 6.0 * dt,
    ))
}

// Runge–Kutta–Fehlberg 4(5) tableau.
const C: [f64; 5] = [1.0 / 4.0, 3.0 / 8.0, 12.0 / 13.0, 1.0, 1.0 / 2.0];
const A: [[f64; 5]; 5] = [
    [1.0 / 4.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 32.0, 9.0 / 32.0, 0.0, 0.0, 0.0],
    [1932.0 / 2197.0, -7200.0 / 2197.0, 7296.0 / 2197.0, 0.0, 0.0],
    [439.0 / 216.0, -8.0, 3680.0 / 513.0, -845.0 / 4104.0, 0.0],
    [-8.0 / 27.0, 2.0, -3544.0 / 2565.0, 1859.0 / 4104.0, -11.0 / 40.0],
];
const B4: [f64; 5] = [25.0 / 216.0, 0.0, 1408.0 / 2565.0, 2197.0 / 4104.0, -1.0 / 5.0];
const B5: [f64; 6] = [
    16.0 / 135.0,
    0.0,
    6656.0 / 12825.0,
    28561.0 / 56430.0,
    -9.0 / 50.0,
    2.0 / 55.0,
];

/// Fourth- and fifth-order end points of one RKF45 step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rk45Step {
    /// Fourth-order longitude.
    pub lon4: f64,
    /// Fourth-order latitude.
    pub lat4: f64,
    /// Fifth-order longitude.
    pub lon5: f64,
    /// Fifth-order latitude.
    pub lat5: f64,
}

impl Rk45Step {
    /// Local error estimate: distance between the two solutions.
    pub fn error(&self) -> f64 {
        (self.lon5 - self.lon4).hypot(self.lat5 - self.lat4)
    }
}

/// One Runge–Kutta–Fehlberg 4(5) step from `(lon, lat)`.
pub fn rk45_step<S: VelocitySampler + ?Sized>(
    sampler: &S,
    lon: f64,
    lat: f64,
    depth: f64,
    time: f64,
    dt: f64,
) -> Result<Rk45Step, SamplingError> {
    let mut ku = [0.0f64; 6];
    let mut kv = [0.0f64; 6];
    (ku[0], kv[0]) = sampler.velocity(time, depth, lat, lon)?;
    for stage in 0..5 {
        let row = &A[stage];
        let mut dlon = 0.0;
        let mut dlat = 0.0;
        for j in 0..=stage {
            dlon += row[j] * ku[j];
            dlat += row[j] * kv[j];
        }
        (ku[stage + 1], kv[stage + 1]) = sampler.velocity(
            time + C[stage] * dt,
            depth,
            lat + dlat * dt,
            lon + dlon * dt,
        )?;
    }

    let weighted = |b: &[f64], k: &[f64; 6]| -> f64 { b.iter().zip(k).map(|(b, k)| b * k).sum() };
    Ok(Rk45Step {
        lon4: lon + weighted(&B4, &ku) * dt,
        lat4: lat + weighted(&B4, &kv) * dt,
        lon5: lon + weighted(&B5, &ku) * dt,
        lat5: lat + weighted(&B5, &kv) * dt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Uniform(f64, f64);
    impl VelocitySampler for Uniform {
        fn velocity(&self, _: f64, _: f64, _: f64, _: f64) -> Result<(f64, f64), SamplingError> {
            Ok((self.0, self.1))
        }
    }

    /// `u = a*t`, `v = 0`: exact displacement over `[t, t+dt]` is
    /// `a*(t*dt + dt^2/2)`.
    struct Accelerating(f64);
    impl VelocitySampler for Accelerating {
        fn velocity(&self, t: f64, _: f64, _: f64, _: f64) -> Result<(f64, f64), SamplingError> {
            Ok((self.0 * t, 0.0))
        }
    }

    struct Wall;
    impl VelocitySampler for Wall {
        fn velocity(&self, _: f64, depth: f64, lat: f64, lon: f64) -> Result<(f64, f64), SamplingError> {
            if lon > 1.0 {
                Err(SamplingError::FieldSampling {
                    field: "U".into(),
                    lon,
                    lat,
                    depth,
                })
            } else {
                Ok((1.0, 0.0))
            }
        }
    }

    #[test]
    fn tableau_rows_sum_to_nodes() {
        for (row, c) in A.iter().zip(C) {
            let s: f64 = row.iter().sum();
            assert!((s - c).abs() < 1e-12);
        }
        assert!((B4.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((B5.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rk4_exact_for_linear_time_dependence() {
        let (dx, dy) = rk4_step(&Accelerating(0.5), 0.0, 0.0, 0.0, 10.0, 4.0).unwrap();
        assert!((dx - 0.5 * (10.0 * 4.0 + 8.0)).abs() < 1e-12);
        assert_eq!(dy, 0.0);
    }

    #[test]
    fn euler_is_first_order() {
        let (dx, _) = euler_step(&Accelerating(0.5), 0.0, 0.0, 0.0, 10.0, 4.0).unwrap();
        assert_eq!(dx, 0.5 * 10.0 * 4.0);
    }

    #[test]
    fn rk45_orders_agree_on_smooth_flow() {
        let step = rk45_step(&Accelerating(0.5), 1.0, 2.0, 0.0, 10.0, 4.0).unwrap();
        assert!((step.lon4 - (1.0 + 0.5 * 48.0)).abs() < 1e-12);
        assert!(step.error() < 1e-12);
    }

    #[test]
    fn sampling_failure_propagates() {
        let err = rk4_step(&Wall, 0.9, 0.0, 0.0, 0.0, 0.2).unwrap_err();
        assert!(matches!(err, SamplingError::FieldSampling { .. }));
    }

    proptest! {
        #[test]
        fn uniform_flow_displacement_is_exact(
            u in -2.0f64..2.0,
            v in -2.0f64..2.0,
            dt in -600.0f64..600.0,
        ) {
            let flow = Uniform(u, v);
            let e = euler_step(&flow, 0.0, 0.0, 0.0, 0.0, dt).unwrap();
            let r = rk4_step(&flow, 0.0, 0.0, 0.0, 0.0, dt).unwrap();
            let f = rk45_step(&flow, 0.0, 0.0, 0.0, 0.0, dt).unwrap();
            let tol = 1e-9 * (1.0 + dt.abs());
            prop_assert!((e.0 - u * dt).abs() < tol && (e.1 - v * dt).abs() < tol);
            prop_assert!((r.0 - u * dt).abs() < tol && (r.1 - v * dt).abs() < tol);
            prop_assert!((f.lon4 - u * dt).abs() < tol && (f.lat5 - v * dt).abs() < tol);
        }
    }
}
