//! Interpreted and compiled drivers must agree bit for bit.

use drift_core::{Initial, KernelError, Particle, ParticleSchema, ScalarType, Value};
use drift_engine::{ExecutionConfig, ExecutionEnd, ExecutionMode, ParticleSet};
use drift_field::FieldSet;
use drift_kernel::{FnKernel, Kernel, KernelContext, KernelExt, KernelPipeline, KernelStatus};
use drift_kernels::{AdvectionRK4, AdvectionRK45};
use drift_test_utils::eddy::Eddy;
use proptest::prelude::*;

fn release(n: usize) -> ParticleSet {
    ParticleSet::from_line((6000.0, 12500.0), (18000.0, 12500.0), n, ParticleSchema::new())
}

fn assert_bitwise_equal(a: &ParticleSet, b: &ParticleSet) {
    assert_eq!(a.len(), b.len());
    for (p, q) in a.iter().zip(b) {
        assert_eq!(p.lon.to_bits(), q.lon.to_bits(), "lon of {}", p.id);
        assert_eq!(p.lat.to_bits(), q.lat.to_bits(), "lat of {}", p.id);
        assert_eq!(p.time.to_bits(), q.time.to_bits(), "time of {}", p.id);
        assert_eq!(p.dt.to_bits(), q.dt.to_bits(), "dt of {}", p.id);
        assert_eq!(p.vars, q.vars);
    }
}

#[test]
fn rk4_pipeline_matches_static_kernel() {
    let fs = Eddy::Moving.fieldset().unwrap();
    let cfg = ExecutionConfig::new(180.0, ExecutionEnd::Runtime(3.0 * 3600.0));

    let pipeline = KernelPipeline::new().with(AdvectionRK4);
    let mut interpreted = release(5);
    interpreted.execute(&pipeline, &fs, &cfg).unwrap();

    let mut compiled = release(5);
    compiled.execute_compiled(&AdvectionRK4, &fs, &cfg).unwrap();

    assert_bitwise_equal(&interpreted, &compiled);
}

#[test]
fn adaptive_kernel_matches_across_modes() {
    let fs = Eddy::Decaying.fieldset().unwrap();
    let kernel = AdvectionRK45::default();
    let base = ExecutionConfig::new(600.0, ExecutionEnd::Runtime(4.0 * 3600.0));

    let mut interpreted = release(3);
    let mi = interpreted
        .run(&kernel, &fs, &base.clone().with_mode(ExecutionMode::Interpreted))
        .unwrap();
    let mut compiled = release(3);
    let mc = compiled
        .run(&kernel, &fs, &base.with_mode(ExecutionMode::Compiled))
        .unwrap();

    assert_bitwise_equal(&interpreted, &compiled);
    assert_eq!(mi.steps, mc.steps);
    assert_eq!(mi.rejected, mc.rejected);
}

#[test]
fn custom_variables_follow_kernels_in_both_modes() {
    fn distance(p: &mut Particle, _: &KernelContext<'_>) -> Result<KernelStatus, KernelError> {
        let travelled = p.var(0).map(Value::as_f64).unwrap_or(0.0);
        p.set_var(0, travelled + p.dt.abs());
        let count = p.var(1).map(Value::as_f64).unwrap_or(0.0);
        p.set_var(1, count + 1.0);
        Ok(KernelStatus::Success)
    }

    let schema = ParticleSchema::new()
        .with("elapsed", ScalarType::F64, Initial::Value(0.0))
        .unwrap()
        .with("steps", ScalarType::I32, Initial::Value(0.0))
        .unwrap()
        .with("release_lon", ScalarType::F32, Initial::CopyOf("lon".into()))
        .unwrap();
    let fs = Eddy::Stationary.fieldset().unwrap();
    let cfg = ExecutionConfig::new(300.0, ExecutionEnd::Runtime(3600.0));

    let mut interpreted = ParticleSet::from_list(&[10000.0, 14000.0], &[12500.0; 2], schema.clone()).unwrap();
    let pipeline = KernelPipeline::new()
        .with(AdvectionRK4)
        .with(FnKernel::new("distance", distance));
    interpreted.execute(&pipeline, &fs, &cfg).unwrap();

    let mut compiled = ParticleSet::from_list(&[10000.0, 14000.0], &[12500.0; 2], schema).unwrap();
    let chained = AdvectionRK4.then(FnKernel::new("distance", distance));
    compiled.execute_compiled(&chained, &fs, &cfg).unwrap();

    assert_bitwise_equal(&interpreted, &compiled);
    assert_eq!(interpreted.var("elapsed"), Some(vec![Value::F64(3600.0); 2]));
    assert_eq!(interpreted.var("steps"), Some(vec![Value::I32(12); 2]));
    assert_eq!(
        interpreted.var("release_lon"),
        Some(vec![Value::F32(10000.0), Value::F32(14000.0)])
    );
    assert_eq!(chained.name(), pipeline.name());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn modes_agree_for_any_release_point(
        x in 3000.0f64..22000.0,
        y in 6000.0f64..22000.0,
        dt in prop::sample::select(vec![60.0f64, 90.0, 180.0, 240.0]),
    ) {
        let fs: FieldSet = Eddy::Stationary.fieldset().unwrap();
        let cfg = ExecutionConfig::new(dt, ExecutionEnd::Runtime(1800.0));
        let mut a = ParticleSet::from_list(&[x], &[y], ParticleSchema::new()).unwrap();
        let mut b = a.clone();
        a.execute(&AdvectionRK4, &fs, &cfg).unwrap();
        b.execute_compiled(&AdvectionRK4, &fs, &cfg).unwrap();
        prop_assert_eq!(a.particles()[0].lon.to_bits(), b.particles()[0].lon.to_bits());
        prop_assert_eq!(a.particles()[0].lat.to_bits(), b.particles()[0].lat.to_bits());
    }
}
