//! Criterion benchmarks for advecting particle blocks through the
//! reference field set.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use drift_bench::{reference_fieldset, release_grid};
use drift_engine::{ExecutionConfig, ExecutionEnd, ExecutionMode};
use drift_kernel::KernelPipeline;
use drift_kernels::{AdvectionRK4, AdvectionRK45};

fn config(mode: ExecutionMode) -> ExecutionConfig {
    ExecutionConfig::new(300.0, ExecutionEnd::Runtime(6.0 * 3600.0)).with_mode(mode)
}

fn bench_rk4_modes(c: &mut Criterion) {
    let fs = reference_fieldset().unwrap();
    let mut group = c.benchmark_group("rk4_100_particles");
    for mode in [ExecutionMode::Interpreted, ExecutionMode::Compiled] {
        let cfg = config(mode);
        group.bench_function(format!("{mode:?}"), |b| {
            b.iter(|| {
                let mut set = release_grid(10);
                black_box(set.run(&AdvectionRK4, &fs, &cfg).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_rk4_pipeline(c: &mut Criterion) {
    let fs = reference_fieldset().unwrap();
    let pipeline = KernelPipeline::new().with(AdvectionRK4);
    let cfg = config(ExecutionMode::Interpreted);

    c.bench_function("rk4_pipeline_100_particles", |b| {
        b.iter(|| {
            let mut set = release_grid(10);
            black_box(set.execute(&pipeline, &fs, &cfg).unwrap());
        });
    });
}

fn bench_rk45(c: &mut Criterion) {
    let fs = reference_fieldset().unwrap();
    let kernel = AdvectionRK45::default();
    let cfg = config(ExecutionMode::Compiled);

    c.bench_function("rk45_100_particles", |b| {
        b.iter(|| {
            let mut set = release_grid(10);
            black_box(set.execute_compiled(&kernel, &fs, &cfg).unwrap());
        });
    });
}

criterion_group!(benches, bench_rk4_modes, bench_rk4_pipeline, bench_rk45);
criterion_main!(benches);
