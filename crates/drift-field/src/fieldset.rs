//! Named collection of fields and constants.

use std::sync::Arc;

use drift_core::{SamplingError, UnitConverter, VelocitySampler};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{FieldData, FieldOptions};
use crate::error::FieldError;
use crate::field::Field;
use crate::grid::Grid;
use crate::halo;

/// Geometry of the particle coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mesh {
    /// `lon`/`lat` in degrees; velocities in m/s are converted to deg/s.
    #[default]
    Spherical,
    /// `lon`/`lat` are plain `x`/`y` in metres.
    Flat,
}

impl Mesh {
    /// Converter for a field named `name` on this mesh.
    pub fn units_for(self, name: &str) -> UnitConverter {
        match (self, name) {
            (Self::Spherical, "U") => UnitConverter::GeographicPolar,
            (Self::Spherical, "V") => UnitConverter::Geographic,
            _ => UnitConverter::Identity,
        }
    }
}

/// Fields by name, plus scalar constants.
///
/// The velocity pair is registered as `"U"` and `"V"`.
#[derive(Clone, Debug, Default)]
pub struct FieldSet {
    fields: IndexMap<String, Field>,
    constants: IndexMap<String, f64>,
}

impl FieldSet {
    /// An empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a field set from raw arrays.
    ///
    /// Unit converters come from `mesh` (overriding `options.units`). Fields
    /// whose coordinates are identical share one [`Grid`]. `"U"` and `"V"`
    /// must both be present.
    pub fn from_data(
        data: impl IntoIterator<Item = FieldData>,
        mesh: Mesh,
        options: &FieldOptions,
    ) -> Result<Self, FieldError> {
        let mut set = Self::new();
        let mut grids: Vec<Arc<Grid>> = Vec::new();
        for d in data {
            let grid = Grid::new(d.lon, d.lat, d.depth, d.time, d.time_origin)?;
            let grid = match grids.iter().find(|g| ***g == grid) {
                Some(shared) => Arc::clone(shared),
                None => {
                    let g = Arc::new(grid);
                    grids.push(Arc::clone(&g));
                    g
                }
            };
            let opts = options.clone().with_units(mesh.units_for(&d.name));
            set.add_field(Field::on_grid(d.name, d.data, grid, &opts)?)?;
        }
        for required in ["U", "V"] {
            if set.field(required).is_none() {
                return Err(FieldError::UnknownField(required.to_owned()));
            }
        }
        debug!(
            fields = set.fields.len(),
            grids = grids.len(),
            ?mesh,
            "field set constructed"
        );
        Ok(set)
    }

    /// Register a field under its name.
    pub fn add_field(&mut self, field: Field) -> Result<(), FieldError> {
        if self.fields.contains_key(field.name()) {
            return Err(FieldError::DuplicateField(field.name().to_owned()));
        }
        self.fields.insert(field.name().to_owned(), field);
        Ok(())
    }

    /// Field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Mutable field by name.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.get_mut(name)
    }

    /// Fields in registration order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// Zonal velocity.
    pub fn u(&self) -> Option<&Field> {
        self.field("U")
    }

    /// Meridional velocity.
    pub fn v(&self) -> Option<&Field> {
        self.field("V")
    }

    /// Set a named scalar constant, replacing any previous value.
    pub fn add_constant(&mut self, name: impl Into<String>, value: f64) {
        self.constants.insert(name.into(), value);
    }

    /// Constant by name.
    pub fn constant(&self, name: &str) -> Option<f64> {
        self.constants.get(name).copied()
    }

    /// Number of distinct grids among the fields.
    pub fn grid_count(&self) -> usize {
        let mut seen: Vec<&Arc<Grid>> = Vec::new();
        for f in self.fields.values() {
            if !seen.iter().any(|g| Arc::ptr_eq(g, f.grid())) {
                seen.push(f.grid());
            }
        }
        seen.len()
    }

    /// Add periodic halos to every field.
    ///
    /// Each distinct grid is extended once and stays shared by the fields
    /// that shared it. Fails without modifying anything if any field has
    /// already been sampled.
    pub fn add_periodic_halo(
        &mut self,
        zonal: bool,
        meridional: bool,
        halo_size: usize,
    ) -> Result<(), FieldError> {
        for f in self.fields.values() {
            f.check_unsampled()?;
        }
        let mut extended: Vec<(Arc<Grid>, Arc<Grid>)> = Vec::new();
        for f in self.fields.values() {
            if !extended.iter().any(|(old, _)| Arc::ptr_eq(old, f.grid())) {
                let new = halo::extend_grid(f.grid(), zonal, meridional, halo_size)?;
                extended.push((Arc::clone(f.grid()), Arc::new(new)));
            }
        }
        for f in self.fields.values_mut() {
            let grid = extended
                .iter()
                .find(|(old, _)| Arc::ptr_eq(old, f.grid()))
                .map(|(_, new)| Arc::clone(new));
            if let Some(grid) = grid {
                f.apply_halo(grid, zonal, meridional, halo_size);
            }
        }
        Ok(())
    }
}

impl VelocitySampler for FieldSet {
    fn velocity(
        &self,
        time: f64,
        depth: f64,
        lat: f64,
        lon: f64,
    ) -> Result<(f64, f64), SamplingError> {
        let missing = |field: &str| SamplingError::FieldSampling {
            field: field.to_owned(),
            lon,
            lat,
            depth,
        };
        let u = self.u().ok_or_else(|| missing("U"))?;
        let v = self.v().ok_or_else(|| missing("V"))?;
        Ok((u.eval(time, depth, lat, lon)?, v.eval(time, depth, lat, lon)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::units::METRES_PER_DEGREE;
    use ndarray::{ArrayD, IxDyn};

    fn uniform(name: &str, value: f32, lon: Vec<f32>, lat: Vec<f32>) -> FieldData {
        let raw = ArrayD::from_elem(IxDyn(&[lat.len(), lon.len()]), value);
        FieldData::new(name, raw, lon, lat)
    }

    fn axis(n: usize, start: f32, step: f32) -> Vec<f32> {
        (0..n).map(|i| start + i as f32 * step).collect()
    }

    fn uv(lon: Vec<f32>, lat: Vec<f32>) -> Vec<FieldData> {
        vec![
            uniform("U", 1.0, lon.clone(), lat.clone()),
            uniform("V", 0.5, lon, lat),
        ]
    }

    #[test]
    fn spherical_mesh_assigns_converters_and_shares_grid() {
        let set = FieldSet::from_data(
            uv(axis(5, -10.0, 5.0), axis(5, 0.0, 10.0)),
            Mesh::Spherical,
            &FieldOptions::default(),
        )
        .unwrap();
        assert_eq!(set.u().unwrap().units(), UnitConverter::GeographicPolar);
        assert_eq!(set.v().unwrap().units(), UnitConverter::Geographic);
        assert_eq!(set.grid_count(), 1);

        let (u, v) = set.velocity(0.0, 0.0, 0.0, 0.0).unwrap();
        assert!((u - 1.0 / METRES_PER_DEGREE).abs() < 1e-15);
        assert!((v - 0.5 / METRES_PER_DEGREE).abs() < 1e-15);
    }

    #[test]
    fn flat_mesh_keeps_identity() {
        let set = FieldSet::from_data(
            uv(axis(3, 0.0, 1.0), axis(3, 0.0, 1.0)),
            Mesh::Flat,
            &FieldOptions::default(),
        )
        .unwrap();
        assert_eq!(set.velocity(0.0, 0.0, 1.0, 1.0).unwrap(), (1.0, 0.5));
    }

    #[test]
    fn missing_velocity_component_rejected() {
        let err = FieldSet::from_data(
            vec![uniform("U", 1.0, axis(3, 0.0, 1.0), axis(3, 0.0, 1.0))],
            Mesh::Flat,
            &FieldOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, FieldError::UnknownField("V".into()));
    }

    #[test]
    fn duplicate_fields_and_constants() {
        let mut set = FieldSet::from_data(
            uv(axis(3, 0.0, 1.0), axis(3, 0.0, 1.0)),
            Mesh::Flat,
            &FieldOptions::default(),
        )
        .unwrap();
        let dup = set.u().unwrap().clone();
        assert_eq!(
            set.add_field(dup).unwrap_err(),
            FieldError::DuplicateField("U".into())
        );
        set.add_constant("halo_west", -10.0);
        assert_eq!(set.constant("halo_west"), Some(-10.0));
        assert_eq!(set.constant("missing"), None);
    }

    #[test]
    fn halo_keeps_grid_shared() {
        let mut set = FieldSet::from_data(
            uv(axis(10, 0.0, 0.1), axis(4, 0.0, 1.0)),
            Mesh::Flat,
            &FieldOptions::default(),
        )
        .unwrap();
        set.add_periodic_halo(true, false, 3).unwrap();
        assert_eq!(set.grid_count(), 1);
        assert_eq!(set.u().unwrap().grid().lon().len(), 16);
        assert_eq!(set.v().unwrap().data().dim(), (1, 1, 4, 16));
    }

    #[test]
    fn halo_after_sampling_rejected_atomically() {
        let mut set = FieldSet::from_data(
            uv(axis(10, 0.0, 0.1), axis(4, 0.0, 1.0)),
            Mesh::Flat,
            &FieldOptions::default(),
        )
        .unwrap();
        set.v().unwrap().eval(0.0, 0.0, 1.0, 0.5).unwrap();
        assert!(matches!(
            set.add_periodic_halo(true, false, 3),
            Err(FieldError::HaloAfterSampling { .. })
        ));
        assert_eq!(set.u().unwrap().grid().lon().len(), 10);
    }
}
