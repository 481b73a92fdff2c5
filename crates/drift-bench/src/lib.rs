//! Benchmark profiles for the Drift particle-tracking framework.
//!
//! - [`reference_fieldset`]: a time-varying double gyre on a 200x100
//!   spherical grid with 25 time slices
//! - [`release_grid`]: a regular block of particles inside that domain

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use drift_core::ParticleSchema;
use drift_engine::ParticleSet;
use drift_field::{FieldData, FieldError, FieldOptions, FieldSet, Mesh};
use ndarray::{Array, IxDyn};

/// Longitude extent of the reference domain, degrees.
pub const LON_RANGE: (f32, f32) = (-60.0, 20.0);
/// Latitude extent of the reference domain, degrees.
pub const LAT_RANGE: (f32, f32) = (10.0, 50.0);
/// Hours covered by the reference time axis.
pub const HOURS: usize = 24;

fn axis((start, stop): (f32, f32), n: usize) -> Vec<f32> {
    let step = (stop - start) / (n - 1) as f32;
    (0..n).map(|i| start + step * i as f32).collect()
}

/// Build the reference field set: a double gyre whose dividing line
/// oscillates with a 12 h period. Peak speed is about 1 m/s.
pub fn reference_fieldset() -> Result<FieldSet, FieldError> {
    let lon = axis(LON_RANGE, 200);
    let lat = axis(LAT_RANGE, 100);
    let time: Vec<f64> = (0..=HOURS).map(|h| h as f64 * 3600.0).collect();
    let (lx, ly) = (
        f64::from(LON_RANGE.1 - LON_RANGE.0),
        f64::from(LAT_RANGE.1 - LAT_RANGE.0),
    );
    let shape = IxDyn(&[time.len(), lat.len(), lon.len()]);
    let stream = |t: usize, j: usize, i: usize| {
        let phase = (2.0 * std::f64::consts::PI * time[t] / 43200.0).sin();
        let x = f64::from(lon[i] - LON_RANGE.0) / lx * 2.0;
        let y = f64::from(lat[j] - LAT_RANGE.0) / ly;
        let f = 0.25 * phase * x * x + (1.0 - 0.5 * phase) * x;
        (f, std::f64::consts::PI * y)
    };
    let u = Array::from_shape_fn(shape.clone(), |ix| {
        let (f, py) = stream(ix[0], ix[1], ix[2]);
        (-(std::f64::consts::PI * f).sin() * py.cos()) as f32
    });
    let v = Array::from_shape_fn(shape, |ix| {
        let (f, py) = stream(ix[0], ix[1], ix[2]);
        ((std::f64::consts::PI * f).cos() * py.sin()) as f32
    });
    FieldSet::from_data(
        [
            FieldData::new("U", u, lon.clone(), lat.clone()).with_time(time.clone()),
            FieldData::new("V", v, lon, lat).with_time(time),
        ],
        Mesh::Spherical,
        &FieldOptions::default(),
    )
}

/// `side * side` particles on a regular block in the middle of the
/// reference domain.
pub fn release_grid(side: usize) -> ParticleSet {
    let lon = axis((-45.0, 5.0), side.max(2));
    let lat = axis((20.0, 40.0), side.max(2));
    let mut set = ParticleSet::new(ParticleSchema::new());
    for &y in lat.iter().take(side) {
        for &x in lon.iter().take(side) {
            set.add(f64::from(x), f64::from(y), 0.0, 0.0);
        }
    }
    set
}
