//! Custom particle variables.
//!
//! A [`ParticleSchema`] is an ordered list of [`Variable`]s declared once
//! per particle set. At construction every particle gets a fixed-layout
//! record (`Particle::vars`) with one slot per variable, initialized in
//! declaration order so that relative initializers can read the built-in
//! variables and any variable declared before them.

use thiserror::Error;

use crate::particle::Particle;

/// Names reserved for the built-in particle variables.
pub const BUILTIN_VARIABLES: [&str; 5] = ["lon", "lat", "depth", "time", "dt"];

/// Storage type of a custom variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// 32-bit signed integer (values are truncated toward zero).
    I32,
}

impl ScalarType {
    /// Convert an `f64` into a value of this type.
    pub fn cast(self, v: f64) -> Value {
        match self {
            Self::F32 => Value::F32(v as f32),
            Self::F64 => Value::F64(v),
            Self::I32 => Value::I32(v as i32),
        }
    }
}

/// A typed custom-variable value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// 32-bit signed integer.
    I32(i32),
}

impl Value {
    /// Widen to `f64`.
    pub fn as_f64(self) -> f64 {
        match self {
            Self::F32(v) => f64::from(v),
            Self::F64(v) => v,
            Self::I32(v) => f64::from(v),
        }
    }

    /// The storage type of this value.
    pub fn scalar_type(self) -> ScalarType {
        match self {
            Self::F32(_) => ScalarType::F32,
            Self::F64(_) => ScalarType::F64,
            Self::I32(_) => ScalarType::I32,
        }
    }
}

/// How a variable is initialized when a particle is created.
#[derive(Clone, Debug)]
pub enum Initial {
    /// A constant.
    Value(f64),
    /// Copy of a built-in or previously declared variable.
    CopyOf(String),
    /// Computed from the partially initialized record.
    Relative(fn(&InitView<'_>) -> f64),
}

/// One declared custom variable.
#[derive(Clone, Debug)]
pub struct Variable {
    /// Variable name; unique within a schema.
    pub name: String,
    /// Storage type.
    pub dtype: ScalarType,
    /// Initializer.
    pub initial: Initial,
}

/// Read access to a record while it is being initialized.
///
/// Only built-ins and variables declared before the one being initialized
/// are visible.
pub struct InitView<'a> {
    particle: &'a Particle,
    schema: &'a ParticleSchema,
}

impl InitView<'_> {
    /// Value of a built-in or already-initialized variable.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "lon" => Some(self.particle.lon),
            "lat" => Some(self.particle.lat),
            "depth" => Some(self.particle.depth),
            "time" => Some(self.particle.time),
            "dt" => Some(self.particle.dt),
            _ => {
                let idx = self.schema.index_of(name)?;
                self.particle.var(idx).map(Value::as_f64)
            }
        }
    }
}

/// Errors from declaring a schema.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two variables share a name.
    #[error("variable '{0}' declared twice")]
    Duplicate(String),
    /// A variable shadows a built-in.
    #[error("variable '{0}' shadows a built-in particle variable")]
    ShadowsBuiltin(String),
    /// A copy initializer references a variable that is not yet declared.
    #[error("variable '{variable}' copies '{source_name}', which is not declared before it")]
    UnknownSource {
        /// The variable being declared.
        variable: String,
        /// The name it tried to copy from.
        source_name: String,
    },
}

/// Ordered list of custom particle variables.
#[derive(Clone, Debug, Default)]
pub struct ParticleSchema {
    variables: Vec<Variable>,
}

impl ParticleSchema {
    /// An empty schema (built-in variables only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable, validating it against those declared before.
    pub fn with(
        mut self,
        name: impl Into<String>,
        dtype: ScalarType,
        initial: Initial,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if BUILTIN_VARIABLES.contains(&name.as_str()) {
            return Err(SchemaError::ShadowsBuiltin(name));
        }
        if self.index_of(&name).is_some() {
            return Err(SchemaError::Duplicate(name));
        }
        if let Initial::CopyOf(source) = &initial {
            let known = BUILTIN_VARIABLES.contains(&source.as_str())
                || self.index_of(source).is_some();
            if !known {
                return Err(SchemaError::UnknownSource {
                    variable: name,
                    source_name: source.clone(),
                });
            }
        }
        self.variables.push(Variable {
            name,
            dtype,
            initial,
        });
        Ok(self)
    }

    /// Number of declared variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether no custom variables are declared.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Declared variables in order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Slot index of a variable.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    /// Fill `particle.vars` from the initializers, in declaration order.
    pub fn initialize(&self, particle: &mut Particle) {
        particle.vars.clear();
        for var in &self.variables {
            let raw = {
                let view = InitView {
                    particle,
                    schema: self,
                };
                match &var.initial {
                    Initial::Value(v) => *v,
                    // Declaration order was validated in `with`.
                    Initial::CopyOf(source) => view.get(source).unwrap_or(0.0),
                    Initial::Relative(f) => f(&view),
                }
            };
            particle.vars.push(var.dtype.cast(raw));
        }
    }
}
