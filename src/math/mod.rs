//! Linear algebra primitives shared by the camera, the staging adapter and both backends
//!
//! Matrices are stored row-major and accessed as `(row, column)`. Backends that
//! expect column-major data (WGSL, GLSL without the transpose flag) get it
//! through [`Matrix4x4::to_cols_array`] or the transpose flag of
//! [`crate::backend::MatrixSink`].

mod matrix3x3;
mod matrix4x4;
mod vector3;

pub use matrix3x3::*;
pub use matrix4x4::*;
pub use vector3::*;

use thiserror::Error;

/// Errors raised by checked matrix operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("matrix is not a rigid transform (rotation block is not orthonormal within {tolerance})")]
    NotRigid { tolerance: f32 },
}

/// Tolerance used when checking orthonormality of rotation blocks
pub const ORTHONORMAL_EPSILON: f32 = 1e-4;

/// Convert degrees to radians
pub fn deg2rad(degrees: f32) -> f32 {
    degrees.to_radians()
}
