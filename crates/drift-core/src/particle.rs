//! Particle records and the diagnostic [`ParticleState`] snapshot.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::error::ErrorCode;
use crate::id::ParticleId;
use crate::schema::Value;

/// A single Lagrangian particle.
///
/// The built-in variables (`lon`, `lat`, `depth`, `time`, `dt`) are plain
/// fields; user-declared variables live in `vars`, laid out in the order
/// of the owning set's [`ParticleSchema`](crate::ParticleSchema).
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Stable identifier.
    pub id: ParticleId,
    /// Longitude (or x, on flat meshes).
    pub lon: f64,
    /// Latitude (or y, on flat meshes).
    pub lat: f64,
    /// Depth.
    pub depth: f64,
    /// Current time in seconds since the field set's time origin.
    pub time: f64,
    /// Step size in seconds. Adaptive kernels may rewrite it.
    pub dt: f64,
    /// Step size requested for the step after the current one.
    pub next_dt: Option<f64>,
    /// Status of the most recent kernel call.
    pub status: ErrorCode,
    /// Values of user-declared variables, in schema order.
    pub vars: SmallVec<[Value; 4]>,
}

impl Particle {
    /// A particle with no custom variables.
    pub fn new(id: ParticleId, lon: f64, lat: f64, depth: f64, time: f64, dt: f64) -> Self {
        Self {
            id,
            lon,
            lat,
            depth,
            time,
            dt,
            next_dt: None,
            status: ErrorCode::Success,
            vars: SmallVec::new(),
        }
    }

    /// Snapshot of the built-in variables for diagnostics.
    pub fn state(&self) -> ParticleState {
        ParticleState {
            id: self.id,
            lon: self.lon,
            lat: self.lat,
            depth: self.depth,
            time: self.time,
            dt: self.dt,
        }
    }

    /// Request `dt` for the next step without changing the current one.
    ///
    /// The driver applies it once the current step has been accepted.
    pub fn update_next_dt(&mut self, dt: f64) {
        self.next_dt = Some(dt);
    }

    /// Custom variable by schema index.
    pub fn var(&self, index: usize) -> Option<Value> {
        self.vars.get(index).copied()
    }

    /// Overwrite a custom variable by schema index, casting to the stored type.
    ///
    /// Returns `false` if the index is out of range.
    pub fn set_var(&mut self, index: usize, value: f64) -> bool {
        match self.vars.get_mut(index) {
            Some(slot) => {
                *slot = slot.scalar_type().cast(value);
                true
            }
            None => false,
        }
    }
}

/// Copy of a particle's built-in variables, attached to kernel errors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleState {
    /// Particle identifier.
    pub id: ParticleId,
    /// Longitude at failure.
    pub lon: f64,
    /// Latitude at failure.
    pub lat: f64,
    /// Depth at failure.
    pub depth: f64,
    /// Time at failure.
    pub time: f64,
    /// Step size at failure.
    pub dt: f64,
}

impl fmt::Display for ParticleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "particle {} at (lon {}, lat {}, depth {}), time {}, dt {}",
            self.id, self.lon, self.lat, self.depth, self.time, self.dt
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ScalarType;

    #[test]
    fn state_copies_builtins() {
        let p = Particle::new(ParticleId(3), 10.0, 20.0, 5.0, 100.0, 60.0);
        let s = p.state();
        assert_eq!(s.id, ParticleId(3));
        assert_eq!((s.lon, s.lat, s.depth), (10.0, 20.0, 5.0));
        assert_eq!((s.time, s.dt), (100.0, 60.0));
    }

    #[test]
    fn set_var_casts_to_declared_type() {
        let mut p = Particle::new(ParticleId(0), 0.0, 0.0, 0.0, 0.0, 1.0);
        p.vars.push(ScalarType::I32.cast(0.0));
        assert!(p.set_var(0, 4.9));
        assert_eq!(p.var(0), Some(Value::I32(4)));
        assert!(!p.set_var(1, 1.0));
    }

    #[test]
    fn new_particle_is_successful() {
        let p = Particle::new(ParticleId(1), 0.0, 0.0, 0.0, 0.0, 1.0);
        assert_eq!(p.status, ErrorCode::Success);
        assert!(p.vars.is_empty());
        assert_eq!(p.next_dt, None);
    }
}
