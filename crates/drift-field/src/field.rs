//! A named scalar component of gridded data.
//!
//! Sampling path for [`Field::eval`]:
//!
//! 1. resolve the time index (cached per raw query time),
//! 2. fetch the spatial interpolator for each bracketing slice (cached per
//!    `(time index, depth index)`),
//! 3. evaluate horizontally, blending linearly in depth for 3D fields,
//! 4. blend linearly in time unless the query hits a grid time exactly or
//!    lies at or past the last slice,
//! 5. convert to target units.
//!
//! Caches are bounded and never explicitly invalidated: every entry is a
//! pure function of its key, so dropping one only costs a rebuild.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use drift_core::{SamplingError, ScalarSampler, UnitConverter};
use ndarray::{Array4, ArrayView4, Axis as ArrayAxis, Slice};
use tracing::{debug, trace};

use crate::cache::LruCache;
use crate::codegen::{self, FieldDescriptor};
use crate::data::{self, FieldData, FieldOptions};
use crate::error::{Axis, FieldError};
use crate::gradient::{self, GradientOptions};
use crate::grid::Grid;
use crate::halo;
use crate::interp::{locate, InterpMethod, SliceInterpolator};

struct FieldCaches {
    interpolators: LruCache<(usize, usize), Arc<SliceInterpolator>>,
    time_indices: LruCache<u64, usize>,
}

impl FieldCaches {
    fn new(capacity: usize) -> Self {
        Self {
            interpolators: LruCache::new(capacity),
            time_indices: LruCache::new(capacity),
        }
    }
}

/// Gridded scalar field over `(time, depth, lat, lon)`.
pub struct Field {
    name: String,
    data: Array4<f32>,
    grid: Arc<Grid>,
    units: UnitConverter,
    interp_method: InterpMethod,
    allow_time_extrapolation: bool,
    cache_capacity: usize,
    caches: Mutex<FieldCaches>,
    sampled: AtomicBool,
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("shape", &self.grid.shape())
            .field("units", &self.units)
            .field("interp_method", &self.interp_method)
            .field("allow_time_extrapolation", &self.allow_time_extrapolation)
            .finish_non_exhaustive()
    }
}

impl Clone for Field {
    /// Clones data and shares the grid; caches start empty.
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            data: self.data.clone(),
            grid: Arc::clone(&self.grid),
            units: self.units,
            interp_method: self.interp_method,
            allow_time_extrapolation: self.allow_time_extrapolation,
            cache_capacity: self.cache_capacity,
            caches: Mutex::new(FieldCaches::new(self.cache_capacity)),
            sampled: AtomicBool::new(false),
        }
    }
}

impl Field {
    /// Build a field from raw arrays.
    pub fn new(data: FieldData, options: &FieldOptions) -> Result<Self, FieldError> {
        let grid = Grid::new(data.lon, data.lat, data.depth, data.time, data.time_origin)?;
        Self::on_grid(data.name, data.data, Arc::new(grid), options)
    }

    /// Build a field on an existing (possibly shared) grid.
    pub fn on_grid(
        name: impl Into<String>,
        raw: impl Into<data::RawData>,
        grid: Arc<Grid>,
        options: &FieldOptions,
    ) -> Result<Self, FieldError> {
        let name = name.into();
        options.validate()?;
        let data = data::prepare(&name, raw.into(), grid.shape(), options)?;
        let allow = options
            .allow_time_extrapolation
            .unwrap_or(grid.time().len() == 1);
        debug!(
            field = %name,
            shape = ?grid.shape(),
            units = ?options.units,
            method = ?options.interp_method,
            "field constructed"
        );
        Ok(Self::from_parts(
            name,
            data,
            grid,
            options.units,
            options.interp_method,
            allow,
            options.cache_capacity,
        ))
    }

    fn from_parts(
        name: String,
        data: Array4<f32>,
        grid: Arc<Grid>,
        units: UnitConverter,
        interp_method: InterpMethod,
        allow_time_extrapolation: bool,
        cache_capacity: usize,
    ) -> Self {
        Self {
            name,
            data,
            grid,
            units,
            interp_method,
            allow_time_extrapolation,
            cache_capacity,
            caches: Mutex::new(FieldCaches::new(cache_capacity)),
            sampled: AtomicBool::new(false),
        }
    }

    // ── Accessors ──────────────────────────────────────────────

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared coordinate grid.
    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    /// Samples, laid out `(time, depth, lat, lon)`.
    pub fn data(&self) -> ArrayView4<'_, f32> {
        self.data.view()
    }

    /// Unit converter applied on sampling.
    pub fn units(&self) -> UnitConverter {
        self.units
    }

    /// Replace the unit converter.
    pub fn set_units(&mut self, units: UnitConverter) {
        self.units = units;
    }

    /// Spatial interpolation scheme.
    pub fn interp_method(&self) -> InterpMethod {
        self.interp_method
    }

    /// Whether out-of-range times are clamped rather than rejected.
    pub fn allow_time_extrapolation(&self) -> bool {
        self.allow_time_extrapolation
    }

    /// Whether the field has been sampled since construction.
    pub fn is_sampled(&self) -> bool {
        self.sampled.load(Ordering::Relaxed)
    }

    fn caches(&self) -> MutexGuard<'_, FieldCaches> {
        self.caches.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of cached spatial interpolators.
    pub fn cached_interpolators(&self) -> usize {
        self.caches().interpolators.len()
    }

    /// `(hits, misses)` of the interpolator cache.
    pub fn interpolator_cache_stats(&self) -> (u64, u64) {
        self.caches().interpolators.stats()
    }

    /// Drop every cached entry.
    pub fn clear_caches(&self) {
        let mut caches = self.caches();
        caches.interpolators.clear();
        caches.time_indices.clear();
    }

    // ── Sampling ───────────────────────────────────────────────

    /// Index of the time slice at or before `time`.
    ///
    /// Returns the largest `i` with `time[i] <= time`, `0` before the first
    /// slice and the last index after the last slice. Fails with
    /// [`SamplingError::TimeExtrapolation`] outside the time axis unless
    /// extrapolation is allowed.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn time_index(&self, time: f64) -> Result<usize, SamplingError> {
        let times = self.grid.time();
        let (first, last) = (times[0], times[times.len() - 1]);
        if !self.allow_time_extrapolation && !(time >= first && time <= last) {
            return Err(SamplingError::TimeExtrapolation {
                field: self.name.clone(),
                time,
            });
        }
        let idx = self
            .caches()
            .time_indices
            .get_or_insert_with(time.to_bits(), || {
                times.partition_point(|&t| t <= time).saturating_sub(1)
            });
        Ok(idx)
    }

    /// Interpolator for slice `(t_idx, z_idx)`, built on first use.
    ///
    /// Returns `None` if either index is out of range.
    pub fn interpolator(&self, t_idx: usize, z_idx: usize) -> Option<Arc<SliceInterpolator>> {
        let [nt, nz, _, _] = self.grid.shape();
        if t_idx >= nt || z_idx >= nz {
            return None;
        }
        let it = self
            .caches()
            .interpolators
            .get_or_insert_with((t_idx, z_idx), || {
                trace!(field = %self.name, t_idx, z_idx, "building slice interpolator");
                let slice = self
                    .data
                    .index_axis(ArrayAxis(0), t_idx)
                    .index_axis_move(ArrayAxis(0), z_idx);
                Arc::new(SliceInterpolator::new(
                    self.grid.lat(),
                    self.grid.lon(),
                    slice,
                    self.interp_method,
                ))
            });
        Some(it)
    }

    /// Value at `(time, depth, lat, lon)` in target units.
    ///
    /// Only a successful sample marks the field as sampled; a query that
    /// fails leaves halo extension available.
    pub fn eval(&self, time: f64, depth: f64, lat: f64, lon: f64) -> Result<f64, SamplingError> {
        let ti = self.time_index(time)?;
        let times = self.grid.time();
        let value = if ti + 1 < times.len() && time > times[ti] {
            let (t0, t1) = (times[ti], times[ti + 1]);
            let f0 = self.eval_slice(ti, depth, lat, lon)?;
            let f1 = self.eval_slice(ti + 1, depth, lat, lon)?;
            f0 + (f1 - f0) * ((time - t0) / (t1 - t0))
        } else {
            self.eval_slice(ti, depth, lat, lon)?
        };
        self.sampled.store(true, Ordering::Relaxed);
        Ok(self.units.to_target(value, lon, lat))
    }

    /// Source-unit value of time slice `t_idx` at a point.
    fn eval_slice(&self, t_idx: usize, depth: f64, lat: f64, lon: f64) -> Result<f64, SamplingError> {
        let value = if self.grid.is_3d() {
            match locate(self.grid.depth(), depth) {
                Some((k, w)) => {
                    let upper = self.horizontal(t_idx, k, lat, lon);
                    if w == 0.0 {
                        upper
                    } else {
                        let lower = self.horizontal(t_idx, k + 1, lat, lon);
                        upper + (lower - upper) * w
                    }
                }
                None => f64::NAN,
            }
        } else {
            self.horizontal(t_idx, 0, lat, lon)
        };
        if value.is_nan() {
            return Err(SamplingError::FieldSampling {
                field: self.name.clone(),
                lon,
                lat,
                depth,
            });
        }
        Ok(value)
    }

    fn horizontal(&self, t_idx: usize, z_idx: usize, lat: f64, lon: f64) -> f64 {
        self.interpolator(t_idx, z_idx)
            .map_or(f64::NAN, |it| it.ev(lat, lon))
    }

    // ── Domain extension ───────────────────────────────────────

    /// Extend the field with periodic halos.
    ///
    /// Must be called before the field is first sampled. The grid is
    /// replaced by a new, unshared one; use
    /// [`FieldSet::add_periodic_halo`](crate::FieldSet::add_periodic_halo)
    /// to keep fields on a common grid.
    pub fn add_periodic_halo(
        &mut self,
        zonal: bool,
        meridional: bool,
        halo_size: usize,
    ) -> Result<(), FieldError> {
        self.check_unsampled()?;
        let grid = halo::extend_grid(&self.grid, zonal, meridional, halo_size)?;
        self.apply_halo(Arc::new(grid), zonal, meridional, halo_size);
        Ok(())
    }

    pub(crate) fn check_unsampled(&self) -> Result<(), FieldError> {
        if self.is_sampled() {
            return Err(FieldError::HaloAfterSampling {
                field: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Swap in an already-extended grid and extend the data to match.
    pub(crate) fn apply_halo(&mut self, grid: Arc<Grid>, zonal: bool, meridional: bool, h: usize) {
        if h == 0 || !(zonal || meridional) {
            return;
        }
        self.data = halo::extend_data(&self.data, zonal, meridional, h);
        self.grid = grid;
        self.clear_caches();
        debug!(
            field = %self.name,
            zonal,
            meridional,
            halo_size = h,
            shape = ?self.grid.shape(),
            "periodic halo added"
        );
    }

    // ── Derived fields ─────────────────────────────────────────

    /// Horizontal gradient as two new fields `<name>_dx` and `<name>_dy`.
    ///
    /// Results are in source units per metre and carry no unit converter.
    /// Zonal slopes on a pole row are zeroed, as is any non-finite result.
    pub fn gradient(&self, options: &GradientOptions) -> Result<(Field, Field), FieldError> {
        let g = &self.grid;
        let ti = gradient::select(g.time(), options.timerange, Axis::Time)?;
        let yi = gradient::select(g.lat(), options.latrange, Axis::Lat)?;
        let xi = gradient::select(g.lon(), options.lonrange, Axis::Lon)?;

        let sub = Grid::new(
            g.lon()[xi.clone()].to_vec(),
            g.lat()[yi.clone()].to_vec(),
            g.depth().to_vec(),
            g.time()[ti.clone()].to_vec(),
            g.time_origin().map(str::to_owned),
        )?;
        let mut view = self.data.view();
        view.slice_axis_inplace(ArrayAxis(0), Slice::from(ti));
        view.slice_axis_inplace(ArrayAxis(2), Slice::from(yi));
        view.slice_axis_inplace(ArrayAxis(3), Slice::from(xi));
        let (mut ddx, mut ddy) = gradient::gradient(&view.to_owned(), sub.lon(), sub.lat());

        let base = options
            .name
            .clone()
            .unwrap_or_else(|| format!("d{}", self.name));
        debug!(field = %self.name, output = %base, shape = ?sub.shape(), "gradient computed");

        data::sanitize(&format!("{base}_dx"), &mut ddx, None, None);
        data::sanitize(&format!("{base}_dy"), &mut ddy, None, None);

        let grid = Arc::new(sub);
        let make = |suffix: &str, data| {
            Field::from_parts(
                format!("{base}_{suffix}"),
                data,
                Arc::clone(&grid),
                UnitConverter::Identity,
                self.interp_method,
                self.allow_time_extrapolation,
                self.cache_capacity,
            )
        };
        Ok((make("dx", ddx), make("dy", ddy)))
    }

    // ── Code generation ────────────────────────────────────────

    /// C view of this field for generated kernels.
    pub fn descriptor(&self) -> FieldDescriptor {
        let [nt, nz, ny, nx] = self.grid.shape();
        FieldDescriptor {
            xdim: codegen::dim(nx),
            ydim: codegen::dim(ny),
            zdim: codegen::dim(nz),
            tdim: codegen::dim(nt),
            tidx: 0,
            lon: self.grid.lon().as_ptr(),
            lat: self.grid.lat().as_ptr(),
            depth: self.grid.depth().as_ptr(),
            time: self.grid.time().as_ptr(),
            data: self.data.as_ptr(),
        }
    }

    /// Names bound for this field in generated code: `name`, `name_lon`,
    /// `name_lat`.
    pub fn codegen_names(&self) -> [String; 3] {
        codegen::binding_names(&self.name)
    }

    /// Generated-code call sampling this field at `(t, x, y, z)`.
    pub fn subscript_expr(&self, t: &str, x: &str, y: &str, z: &str) -> String {
        codegen::subscript_expr(&self.name, t, x, y, z)
    }
}

impl ScalarSampler for Field {
    fn name(&self) -> &str {
        &self.name
    }

    fn sample(&self, time: f64, depth: f64, lat: f64, lon: f64) -> Result<f64, SamplingError> {
        self.eval(time, depth, lat, lon)
    }
}
