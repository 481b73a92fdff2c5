//! Convergence and composition tests for the advection kernels.

use drift_core::{ErrorCode, Particle, ParticleId, VelocitySampler};
use drift_kernel::{Kernel, KernelContext, KernelExt, KernelStatus};
use drift_kernels::{euler_step, rk4_step, AdvectionRK4, PeriodicBoundary};
use drift_test_utils::flows::{flat_flow, periodic_flow, BoxedSampler, RotationSampler, UniformSampler};

/// Integrate one revolution with a fixed step and return the end-point error.
fn revolution_error<F>(steps: usize, step: F) -> f64
where
    F: Fn(&RotationSampler, f64, f64, f64, f64) -> (f64, f64),
{
    let flow = RotationSampler {
        x0: 0.0,
        y0: 0.0,
        omega: 1e-3,
    };
    let period = 2.0 * std::f64::consts::PI / flow.omega;
    let dt = period / steps as f64;
    let (mut x, mut y) = (1000.0, 0.0);
    for i in 0..steps {
        let (dx, dy) = step(&flow, x, y, i as f64 * dt, dt);
        x += dx;
        y += dy;
    }
    let (tx, ty) = flow.truth(1000.0, 0.0, period);
    (x - tx).hypot(y - ty)
}

#[test]
fn rk4_converges_at_fourth_order() {
    let rk4 = |f: &RotationSampler, x, y, t, dt| rk4_step(f, x, y, 0.0, t, dt).unwrap();
    let coarse = revolution_error(50, rk4);
    let fine = revolution_error(100, rk4);
    let ratio = coarse / fine;
    assert!((12.0..20.0).contains(&ratio), "ratio {ratio}");
}

#[test]
fn euler_converges_at_first_order() {
    let ee = |f: &RotationSampler, x, y, t, dt| euler_step(f, x, y, 0.0, t, dt).unwrap();
    let coarse = revolution_error(2000, ee);
    let fine = revolution_error(4000, ee);
    let ratio = coarse / fine;
    assert!((1.8..2.2).contains(&ratio), "ratio {ratio}");
}

#[test]
fn boxed_sampler_failure_surfaces_from_step() {
    let flow = BoxedSampler {
        inner: UniformSampler { u: 1.0, v: 0.0 },
        lo: 0.0,
        hi: 10.0,
    };
    assert!(flow.velocity(0.0, 0.0, 5.0, 5.0).is_ok());
    let err = rk4_step(&flow, 9.5, 5.0, 0.0, 0.0, 1.0).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ErrorOutOfBounds);
}

#[test]
fn out_of_bounds_kernel_error_carries_start_state() {
    let fs = flat_flow(1.0, 0.0, 11, 1000.0).unwrap();
    let ctx = KernelContext::new(&fs, 0);
    let mut p = Particle::new(ParticleId(9), 999.0, 500.0, 0.0, 0.0, 60.0);
    let err = AdvectionRK4.execute(&mut p, &ctx).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ErrorOutOfBounds);
    assert_eq!(err.particle().id, ParticleId(9));
    assert_eq!(err.particle().lon, 999.0);
    assert_eq!(err.sampling().map(|s| s.field()), Some("U"));
}

#[test]
fn advection_then_wrap_stays_in_window() {
    let mut fs = periodic_flow(1.0, 0.0).unwrap();
    fs.add_periodic_halo(true, false, 3).unwrap();
    let boundary = PeriodicBoundary::new().with_zonal(0.0, 1.0).unwrap();
    let kernel = AdvectionRK4.then(boundary);
    assert_eq!(kernel.name(), "AdvectionRK4+PeriodicBoundary");

    let ctx = KernelContext::new(&fs, 0);
    // One step from just below the seam crosses it.
    let mut p = Particle::new(ParticleId(0), 0.9999, 0.5, 0.0, 0.0, 30.0);
    assert_eq!(kernel.execute(&mut p, &ctx), Ok(KernelStatus::Success));
    assert!((0.0..1.0).contains(&p.lon), "lon {}", p.lon);
    assert!(p.lon < 0.01);
}
