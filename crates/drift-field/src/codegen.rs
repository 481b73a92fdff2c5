//! Bindings for generated kernel code.
//!
//! A generated kernel sees each field as a C struct of dimensions and base
//! pointers, bound under the field's name, plus two coordinate arrays bound
//! as `<name>_lon` and `<name>_lat`. Field sampling in generated code goes
//! through a single runtime routine whose call text is produced by
//! [`subscript_expr`].

/// C view of a field: dimensions, cached time index and base pointers.
///
/// Pointers borrow from the owning [`Field`](crate::Field) and are only
/// valid while it is alive and not halo-extended.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Number of longitudes.
    pub xdim: i32,
    /// Number of latitudes.
    pub ydim: i32,
    /// Number of depth levels.
    pub zdim: i32,
    /// Number of time slices.
    pub tdim: i32,
    /// Time index cached by generated code between calls.
    pub tidx: i32,
    /// Longitudes, `xdim` values.
    pub lon: *const f32,
    /// Latitudes, `ydim` values.
    pub lat: *const f32,
    /// Depth levels, `zdim` values.
    pub depth: *const f32,
    /// Times, `tdim` values.
    pub time: *const f64,
    /// Samples, `tdim * zdim * ydim * xdim` values in row-major order.
    pub data: *const f32,
}

pub(crate) fn dim(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

/// Variable names under which generated code binds a field.
pub fn binding_names(name: &str) -> [String; 3] {
    [name.to_owned(), format!("{name}_lon"), format!("{name}_lat")]
}

/// Call text sampling field `name` at the particle's `(t, x, y, z)`.
pub fn subscript_expr(name: &str, t: &str, x: &str, y: &str, z: &str) -> String {
    format!(
        "temporal_interpolation_linear({z}, {y}, {x}, particle->zi, particle->yi, particle->xi, {t}, {name})"
    )
}
