//! Owned collections of particles.

use drift_core::{Particle, ParticleId, ParticleSchema, Value};
use thiserror::Error;
use tracing::debug;

/// Errors from constructing a [`ParticleSet`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParticleSetError {
    /// Coordinate lists of different lengths.
    #[error("coordinate lists differ in length: {lon} longitudes, {lat} latitudes")]
    LengthMismatch {
        /// Number of longitudes.
        lon: usize,
        /// Number of latitudes.
        lat: usize,
    },
}

/// Particles sharing one custom-variable schema.
///
/// Every particle's `vars` is initialized from the schema when it is
/// added, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct ParticleSet {
    pub(crate) particles: Vec<Particle>,
    schema: ParticleSchema,
    next_id: u64,
}

impl ParticleSet {
    /// An empty set with `schema`.
    pub fn new(schema: ParticleSchema) -> Self {
        Self {
            particles: Vec::new(),
            schema,
            next_id: 0,
        }
    }

    /// One particle per `(lon[i], lat[i])`, at depth zero and time zero.
    pub fn from_list(
        lon: &[f64],
        lat: &[f64],
        schema: ParticleSchema,
    ) -> Result<Self, ParticleSetError> {
        if lon.len() != lat.len() {
            return Err(ParticleSetError::LengthMismatch {
                lon: lon.len(),
                lat: lat.len(),
            });
        }
        let mut set = Self::new(schema);
        for (&x, &y) in lon.iter().zip(lat) {
            set.add(x, y, 0.0, 0.0);
        }
        debug!(particles = set.len(), "particle set from list");
        Ok(set)
    }

    /// `n` particles evenly spaced from `start` to `finish` (both `(lon, lat)`,
    /// inclusive).
    pub fn from_line(
        start: (f64, f64),
        finish: (f64, f64),
        n: usize,
        schema: ParticleSchema,
    ) -> Self {
        let mut set = Self::new(schema);
        for i in 0..n {
            let s = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
            set.add(
                start.0 + s * (finish.0 - start.0),
                start.1 + s * (finish.1 - start.1),
                0.0,
                0.0,
            );
        }
        debug!(particles = n, "particle set from line");
        set
    }

    /// Add a particle and return its id.
    pub fn add(&mut self, lon: f64, lat: f64, depth: f64, time: f64) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        let mut particle = Particle::new(id, lon, lat, depth, time, 1.0);
        self.schema.initialize(&mut particle);
        self.particles.push(particle);
        id
    }

    /// Remove a particle by id.
    pub fn remove(&mut self, id: ParticleId) -> Option<Particle> {
        let idx = self.particles.iter().position(|p| p.id == id)?;
        Some(self.particles.remove(idx))
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the set holds no particles.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particles in insertion order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access to the particles.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Iterate over the particles.
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    /// Particle by id.
    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id == id)
    }

    /// The custom-variable schema.
    pub fn schema(&self) -> &ParticleSchema {
        &self.schema
    }

    /// Longitudes in particle order.
    pub fn lon(&self) -> Vec<f64> {
        self.particles.iter().map(|p| p.lon).collect()
    }

    /// Latitudes in particle order.
    pub fn lat(&self) -> Vec<f64> {
        self.particles.iter().map(|p| p.lat).collect()
    }

    /// Values of custom variable `name` in particle order.
    pub fn var(&self, name: &str) -> Option<Vec<Value>> {
        let idx = self.schema.index_of(name)?;
        self.particles.iter().map(|p| p.var(idx)).collect()
    }
}

impl<'a> IntoIterator for &'a ParticleSet {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
