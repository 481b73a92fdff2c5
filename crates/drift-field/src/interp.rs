//! Horizontal interpolation of a single 2D slice.
//!
//! A [`SliceInterpolator`] is built once per `(time index, depth index)`
//! and then evaluated many times, so anything that depends only on the
//! slice (coordinates widened to `f64`, node slopes for cubic
//! interpolation) is computed at construction.
//!
//! Queries outside the slice's `lat`/`lon` extent return `NaN`; the owning
//! field turns that into a sampling error.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Spatial interpolation scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpMethod {
    /// Bilinear interpolation between the four surrounding nodes.
    #[default]
    Linear,
    /// Value of the nearest node (ties go to the lower index).
    Nearest,
    /// Separable cubic Hermite interpolation with finite-difference slopes.
    ///
    /// Reproduces linear data exactly and has a continuous first derivative.
    Cubic,
}

/// Locate `x` in a strictly increasing axis.
///
/// Returns the cell index `i` with `coords[i] <= x <= coords[i + 1]` and the
/// normalized offset `t = (x - coords[i]) / (coords[i + 1] - coords[i])`,
/// or `None` if `x` is outside the axis or NaN. Requires `coords.len() >= 2`.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub(crate) fn locate<T: Copy + Into<f64>>(coords: &[T], x: f64) -> Option<(usize, f64)> {
    let n = coords.len();
    if n < 2 {
        return None;
    }
    let (first, last): (f64, f64) = (coords[0].into(), coords[n - 1].into());
    if !(x >= first && x <= last) {
        return None;
    }
    let i = coords
        .partition_point(|&c| Into::<f64>::into(c) <= x)
        .saturating_sub(1)
        .min(n - 2);
    let (lo, hi): (f64, f64) = (coords[i].into(), coords[i + 1].into());
    Some((i, (x - lo) / (hi - lo)))
}

/// Finite-difference slope at node `k`: centered inside, one-sided at the ends.
pub(crate) fn node_slope(coords: &[f64], k: usize, value: impl Fn(usize) -> f64) -> f64 {
    let n = coords.len();
    let (lo, hi) = if k == 0 {
        (0, 1)
    } else if k == n - 1 {
        (n - 2, n - 1)
    } else {
        (k - 1, k + 1)
    };
    (value(hi) - value(lo)) / (coords[hi] - coords[lo])
}

/// Cubic Hermite polynomial on `[0, 1]` through `y0` and `y0 + dy` with
/// end slopes `k0`, `k1` (already scaled by the interval width).
#[inline]
fn normalized_hermite(t: f64, y0: f64, dy: f64, k0: f64, k1: f64) -> f64 {
    let a = k0 - dy;
    let b = dy - k1;
    let c1 = dy + a;
    let c2 = b - 2.0 * a;
    let c3 = a - b;
    y0 + t * (c1 + t * (c2 + t * c3))
}

/// Ready-to-evaluate interpolator over one `(lat, lon)` slice.
#[derive(Debug, Clone)]
pub struct SliceInterpolator {
    lat: Vec<f64>,
    lon: Vec<f64>,
    values: Array2<f64>,
    /// `d value / d lon` at every node; only built for [`InterpMethod::Cubic`].
    lon_slopes: Option<Array2<f64>>,
    method: InterpMethod,
}

impl SliceInterpolator {
    /// Build an interpolator for `slice`, laid out `(lat, lon)`.
    ///
    /// The caller guarantees `slice.dim() == (lat.len(), lon.len())` and that
    /// both axes are strictly increasing with at least two points.
    pub fn new(lat: &[f32], lon: &[f32], slice: ArrayView2<'_, f32>, method: InterpMethod) -> Self {
        let lat: Vec<f64> = lat.iter().map(|&v| f64::from(v)).collect();
        let lon: Vec<f64> = lon.iter().map(|&v| f64::from(v)).collect();
        let values = slice.mapv(f64::from);
        let lon_slopes = match method {
            InterpMethod::Cubic => {
                let (ny, nx) = values.dim();
                Some(Array2::from_shape_fn((ny, nx), |(j, i)| {
                    node_slope(&lon, i, |k| values[[j, k]])
                }))
            }
            InterpMethod::Linear | InterpMethod::Nearest => None,
        };
        Self {
            lat,
            lon,
            values,
            lon_slopes,
            method,
        }
    }

    /// The configured scheme.
    pub fn method(&self) -> InterpMethod {
        self.method
    }

    /// Evaluate at `(y, x)` = `(lat, lon)`. Returns `NaN` outside the slice.
    pub fn ev(&self, y: f64, x: f64) -> f64 {
        let (Some((j, ty)), Some((i, tx))) = (locate(&self.lat, y), locate(&self.lon, x)) else {
            return f64::NAN;
        };
        match self.method {
            InterpMethod::Linear => self.bilinear(j, ty, i, tx),
            InterpMethod::Nearest => {
                let jj = if ty <= 0.5 { j } else { j + 1 };
                let ii = if tx <= 0.5 { i } else { i + 1 };
                self.values[[jj, ii]]
            }
            InterpMethod::Cubic => self.cubic(j, ty, i, tx),
        }
    }

    fn bilinear(&self, j: usize, ty: f64, i: usize, tx: f64) -> f64 {
        let v00 = self.values[[j, i]];
        let v01 = self.values[[j, i + 1]];
        let v10 = self.values[[j + 1, i]];
        let v11 = self.values[[j + 1, i + 1]];
        (1.0 - ty) * ((1.0 - tx) * v00 + tx * v01) + ty * ((1.0 - tx) * v10 + tx * v11)
    }

    fn cubic(&self, j: usize, ty: f64, i: usize, tx: f64) -> f64 {
        let Some(slopes) = &self.lon_slopes else {
            return self.bilinear(j, ty, i, tx);
        };
        let hx = self.lon[i + 1] - self.lon[i];
        // Hermite along lon within row `r`.
        let row = |r: usize| {
            let y0 = self.values[[r, i]];
            let dy = self.values[[r, i + 1]] - y0;
            normalized_hermite(tx, y0, dy, slopes[[r, i]] * hx, slopes[[r, i + 1]] * hx)
        };
        let g0 = row(j);
        let g1 = row(j + 1);
        let s0 = node_slope(&self.lat, j, row);
        let s1 = node_slope(&self.lat, j + 1, row);
        let hy = self.lat[j + 1] - self.lat[j];
        normalized_hermite(ty, g0, g1 - g0, s0 * hy, s1 * hy)
    }
}
