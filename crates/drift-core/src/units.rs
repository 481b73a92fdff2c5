//! Location-dependent unit conversion between physical and grid units.
//!
//! Velocities in ocean-model output are in m/s, while particle positions on
//! a spherical mesh are in degrees. [`UnitConverter`] maps a sampled value
//! from the source unit to the target unit at a given position.

use serde::{Deserialize, Serialize};

/// Metres per degree of arc at the equator (one nautical mile per arcminute).
pub const METRES_PER_DEGREE: f64 = 1000.0 * 1.852 * 60.0;

/// Scalar transform from a field's source unit to its target unit.
///
/// Both directions are pure functions of the value and the sample location
/// `(x, y)` = `(lon, lat)` in degrees.
///
/// # Poles
///
/// [`GeographicPolar`](Self::GeographicPolar) divides by `cos(lat)`, which
/// vanishes at ±90°. The conversion is left undefined there: the result is
/// whatever IEEE arithmetic produces (a very large or infinite value) and
/// is not clamped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitConverter {
    /// No conversion (metres to metres).
    #[default]
    Identity,
    /// Metres to degrees of arc, valid for meridional distances.
    Geographic,
    /// Metres to degrees of longitude at the sample latitude.
    GeographicPolar,
}

impl UnitConverter {
    /// Convert `value` from source to target units at `(x, y)`.
    pub fn to_target(self, value: f64, _x: f64, y: f64) -> f64 {
        match self {
            Self::Identity => value,
            Self::Geographic => value / METRES_PER_DEGREE,
            Self::GeographicPolar => value / METRES_PER_DEGREE / y.to_radians().cos(),
        }
    }

    /// Convert `value` from target back to source units at `(x, y)`.
    pub fn to_source(self, value: f64, _x: f64, y: f64) -> f64 {
        match self {
            Self::Identity => value,
            Self::Geographic => value * METRES_PER_DEGREE,
            Self::GeographicPolar => value * METRES_PER_DEGREE * y.to_radians().cos(),
        }
    }
}
