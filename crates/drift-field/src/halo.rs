//! Periodic halo extension.
//!
//! A halo of width `h` prepends the last `h` columns (rows) of the grid to
//! its start and appends the first `h` to its end, with the copied
//! coordinates shifted by one period so that the axis stays strictly
//! increasing. For an axis `c` the period is `c[n-1] - 2*c[0] + c[1]`,
//! i.e. the domain width plus one grid spacing.

use ndarray::Array4;

use crate::error::{Axis, FieldError};
use crate::grid::Grid;

/// Default halo width.
pub const DEFAULT_HALO_SIZE: usize = 5;

/// Period of a cyclic axis.
pub fn period(coords: &[f32]) -> f32 {
    let n = coords.len();
    coords[n - 1] - 2.0 * coords[0] + coords[1]
}

/// Extend a coordinate axis by `h` points on each side.
pub fn extend_coords(coords: &[f32], h: usize) -> Vec<f32> {
    let n = coords.len();
    let shift = period(coords);
    let mut out = Vec::with_capacity(n + 2 * h);
    out.extend(coords[n - h..].iter().map(|&c| c - shift));
    out.extend_from_slice(coords);
    out.extend(coords[..h].iter().map(|&c| c + shift));
    out
}

/// Source index for position `i` of an axis of length `n` extended by `h`.
#[inline]
fn wrap(i: usize, n: usize, h: usize) -> usize {
    (i + n - h) % n
}

/// Extend data along the lon axis (last axis).
pub fn extend_lon_data(data: &Array4<f32>, h: usize) -> Array4<f32> {
    let (nt, nz, ny, nx) = data.dim();
    Array4::from_shape_fn((nt, nz, ny, nx + 2 * h), |(t, z, y, x)| {
        data[[t, z, y, wrap(x, nx, h)]]
    })
}

/// Extend data along the lat axis.
pub fn extend_lat_data(data: &Array4<f32>, h: usize) -> Array4<f32> {
    let (nt, nz, ny, nx) = data.dim();
    Array4::from_shape_fn((nt, nz, ny + 2 * h, nx), |(t, z, y, x)| {
        data[[t, z, wrap(y, ny, h), x]]
    })
}

/// Grid with halos added on the requested axes.
pub(crate) fn extend_grid(
    grid: &Grid,
    zonal: bool,
    meridional: bool,
    h: usize,
) -> Result<Grid, FieldError> {
    check_size(grid, zonal, meridional, h)?;
    let mut out = grid.clone();
    if zonal {
        out.replace_lon(extend_coords(grid.lon(), h));
    }
    if meridional {
        out.replace_lat(extend_coords(grid.lat(), h));
    }
    Ok(out)
}

/// Data with halos added on the requested axes.
pub(crate) fn extend_data(data: &Array4<f32>, zonal: bool, meridional: bool, h: usize) -> Array4<f32> {
    let data = if zonal {
        extend_lon_data(data, h)
    } else {
        data.clone()
    };
    if meridional {
        extend_lat_data(&data, h)
    } else {
        data
    }
}

fn check_size(grid: &Grid, zonal: bool, meridional: bool, h: usize) -> Result<(), FieldError> {
    let axes = [(zonal, Axis::Lon, grid.lon().len()), (meridional, Axis::Lat, grid.lat().len())];
    for (enabled, axis, len) in axes {
        if enabled && h > len {
            return Err(FieldError::HaloTooLarge {
                axis,
                halo_size: h,
                len,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn periodic_lon() -> Vec<f32> {
        // linspace(0, 1, 101)[1:]
        (1..=100).map(|i| i as f32 / 100.0).collect()
    }

    #[test]
    fn halo_preserves_spacing() {
        let lon = periodic_lon();
        let ext = extend_coords(&lon, 3);
        assert_eq!(ext.len(), lon.len() + 6);
        let spacing = lon[1] - lon[0];
        for w in ext.windows(2) {
            let d = w[1] - w[0];
            assert!((d - spacing).abs() <= 1e-3 * spacing, "spacing {d}");
        }
        assert!((ext[0] - (-0.02)).abs() < 1e-6);
        assert!((ext[ext.len() - 1] - 1.03).abs() < 1e-6);
    }

    #[test]
    fn data_wraps_around() {
        let data = Array4::from_shape_fn((1, 1, 2, 4), |(_, _, y, x)| (10 * y + x) as f32);
        let ext = extend_lon_data(&data, 2);
        let row: Vec<f32> = (0..8).map(|x| ext[[0, 0, 1, x]]).collect();
        assert_eq!(row, vec![12.0, 13.0, 10.0, 11.0, 12.0, 13.0, 10.0, 11.0]);
        let ext = extend_lat_data(&data, 1);
        let col: Vec<f32> = (0..4).map(|y| ext[[0, 0, y, 0]]).collect();
        assert_eq!(col, vec![10.0, 0.0, 10.0, 0.0]);
    }

    #[test]
    fn oversized_halo_rejected() {
        let grid = Grid::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0], vec![0.0], vec![0.0], None)
            .unwrap();
        assert_eq!(
            extend_grid(&grid, false, true, 3).unwrap_err(),
            FieldError::HaloTooLarge {
                axis: Axis::Lat,
                halo_size: 3,
                len: 2
            }
        );
        assert!(extend_grid(&grid, true, false, 3).is_ok());
    }

    proptest! {
        #[test]
        fn extended_axis_strictly_increasing(
            start in -180.0f32..0.0,
            step in 0.1f32..5.0,
            n in 2usize..40,
            h in 0usize..6,
        ) {
            let h = h.min(n);
            let lon: Vec<f32> = (0..n).map(|i| start + i as f32 * step).collect();
            let ext = extend_coords(&lon, h);
            prop_assert_eq!(ext.len(), n + 2 * h);
            prop_assert!(ext.windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(&ext[h..h + n], &lon[..]);
        }
    }
}
