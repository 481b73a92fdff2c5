//! Test utilities and analytic fixtures for Drift development.
//!
//! - [`eddy`]: the stationary, moving and decaying eddy field sets with
//!   their closed-form trajectories.
//! - [`flows`]: uniform flows on spherical and periodic grids, and
//!   analytic [`VelocitySampler`](drift_core::VelocitySampler)s that need
//!   no grid at all.
//! - [`kernels`]: kernels that fail, delete or count on demand.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod eddy;
pub mod flows;
pub mod kernels;

pub use eddy::Eddy;
pub use kernels::{CountingKernel, DeletingKernel, FailingKernel};

/// Whether `actual` is within `rtol` of `expected`, the way
/// `numpy.allclose` judges it with `atol = 1e-8`.
pub fn allclose(actual: f64, expected: f64, rtol: f64) -> bool {
    (actual - expected).abs() <= 1e-8 + rtol * expected.abs()
}

/// `n` evenly spaced `f32` values from `start` to `stop` inclusive.
pub fn linspace(start: f32, stop: f32, n: usize) -> Vec<f32> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (f64::from(stop) - f64::from(start)) / (n - 1) as f64;
            (0..n)
                .map(|i| (f64::from(start) + step * i as f64) as f32)
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_hits_both_ends() {
        let v = linspace(-170.0, 170.0, 200);
        assert_eq!(v.len(), 200);
        assert_eq!(v[0], -170.0);
        assert_eq!(v[199], 170.0);
    }

    #[test]
    fn allclose_is_relative() {
        assert!(allclose(12000.1, 12000.0, 1e-5));
        assert!(!allclose(12001.0, 12000.0, 1e-5));
    }
}
