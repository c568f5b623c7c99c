//! 4x4 homogeneous matrix

use super::{MathError, Matrix3x3, Vector3, ORTHONORMAL_EPSILON};
use approx::{AbsDiffEq, RelativeEq};
use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec4};
use std::fmt;
use std::ops::{Index, IndexMut, Mul};

/// Row-major 4x4 matrix of `f32`, identity by default.
///
/// Storage and indexing are `(row, column)`; products, transposes and
/// transforms run on [`glam::Mat4`].
///
/// Equality through `==` compares bit patterns and only holds for matrices
/// produced by identical computations. Use the `approx` traits to compare
/// results of different computations.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Matrix4x4 {
    data: [f32; 16],
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4x4 {
    pub const IDENTITY: Self = Self {
        data: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub const ZERO: Self = Self { data: [0.0; 16] };

    /// Build from elements given in row-major order
    #[allow(clippy::too_many_arguments)]
    #[rustfmt::skip]
    pub const fn new(
        m00: f32, m01: f32, m02: f32, m03: f32,
        m10: f32, m11: f32, m12: f32, m13: f32,
        m20: f32, m21: f32, m22: f32, m23: f32,
        m30: f32, m31: f32, m32: f32, m33: f32,
    ) -> Self {
        Self {
            data: [
                m00, m01, m02, m03,
                m10, m11, m12, m13,
                m20, m21, m22, m23,
                m30, m31, m32, m33,
            ],
        }
    }

    /// Build from a row-major flat array
    pub const fn from_rows_array(data: [f32; 16]) -> Self {
        Self { data }
    }

    /// Frame with the given axes in the first three columns and `origin` in the fourth.
    ///
    /// With an orthonormal basis this is the camera-to-world pose of a camera at `origin`.
    #[rustfmt::skip]
    pub fn from_basis_translation(x: Vector3, y: Vector3, z: Vector3, origin: Vector3) -> Self {
        Self::new(
            x.x, y.x, z.x, origin.x,
            x.y, y.y, z.y, origin.y,
            x.z, y.z, z.z, origin.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn from_translation(t: Vector3) -> Self {
        Self::from_basis_translation(Vector3::X, Vector3::Y, Vector3::Z, t)
    }

    pub fn from_scale(s: Vector3) -> Self {
        let mut m = Self::IDENTITY;
        m[(0, 0)] = s.x;
        m[(1, 1)] = s.y;
        m[(2, 2)] = s.z;
        m
    }

    /// Element at `(row, column)`, or `None` when out of range
    pub fn get(&self, row: usize, column: usize) -> Option<f32> {
        (row < 4 && column < 4).then(|| self.data[column + row * 4])
    }

    /// Set the element at `(row, column)`.
    ///
    /// # Panics
    /// If `row` or `column` is not below 4.
    pub fn set(&mut self, row: usize, column: usize, value: f32) {
        self[(row, column)] = value;
    }

    pub fn transpose(&self) -> Self {
        Self::from(Mat4::from(*self).transpose())
    }

    /// Inverse of a rigid transform: transposed rotation and `-Rᵀ·t` translation.
    ///
    /// Only valid when the upper 3x3 block is orthonormal and the last row is
    /// `(0, 0, 0, 1)`; scaled or sheared input silently yields a wrong result in
    /// release builds. Use [`Matrix4x4::try_euclidean_inverse`] for unchecked input.
    pub fn euclidean_inverse(&self) -> Self {
        debug_assert!(
            self.is_rigid(ORTHONORMAL_EPSILON),
            "euclidean_inverse called on a non-rigid matrix"
        );
        let rotation_t = self.so3().transpose();
        let translation = -(rotation_t * self.translation());
        Self::from_basis_translation(
            rotation_t.column(0),
            rotation_t.column(1),
            rotation_t.column(2),
            translation,
        )
    }

    /// Euclidean inverse after checking that the matrix is rigid
    pub fn try_euclidean_inverse(&self) -> Result<Self, MathError> {
        if self.is_rigid(ORTHONORMAL_EPSILON) {
            Ok(self.euclidean_inverse())
        } else {
            Err(MathError::NotRigid {
                tolerance: ORTHONORMAL_EPSILON,
            })
        }
    }

    /// Rotation + translation only, within `tolerance`
    pub fn is_rigid(&self, tolerance: f32) -> bool {
        self.so3().is_orthonormal(tolerance)
            && self[(3, 0)] == 0.0
            && self[(3, 1)] == 0.0
            && self[(3, 2)] == 0.0
            && self[(3, 3)] == 1.0
    }

    /// Upper-left 3x3 block
    #[rustfmt::skip]
    pub fn so3(&self) -> Matrix3x3 {
        Matrix3x3::new(
            self[(0, 0)], self[(0, 1)], self[(0, 2)],
            self[(1, 0)], self[(1, 1)], self[(1, 2)],
            self[(2, 0)], self[(2, 1)], self[(2, 2)],
        )
    }

    /// Translation column
    pub fn translation(&self) -> Vector3 {
        Vector3::new(self[(0, 3)], self[(1, 3)], self[(2, 3)])
    }

    /// Transform a point (w = 1), without perspective division
    pub fn transform_point(&self, p: Vector3) -> Vector3 {
        Mat4::from(*self).transform_point3(p.into()).into()
    }

    /// Transform a direction (w = 0)
    pub fn transform_vector(&self, v: Vector3) -> Vector3 {
        Mat4::from(*self).transform_vector3(v.into()).into()
    }

    /// Inverse-transpose of the upper 3x3 block, for transforming normals.
    ///
    /// Returns `None` when the block is singular (a zero scale axis).
    pub fn normal_matrix(&self) -> Option<Self> {
        let block = Mat3::from_mat4(Mat4::from(*self));
        (block.determinant().abs() > f32::EPSILON)
            .then(|| Self::from(Mat4::from_mat3(block.inverse().transpose())))
    }

    /// Flat row-major data for upload with a transpose flag
    pub fn data(&self) -> &[f32; 16] {
        &self.data
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Flat column-major data, the layout WGSL and untransposed GLSL uniforms expect
    pub fn to_cols_array(&self) -> [f32; 16] {
        Mat4::from(*self).to_cols_array()
    }
}

impl Index<(usize, usize)> for Matrix4x4 {
    type Output = f32;

    fn index(&self, (row, column): (usize, usize)) -> &f32 {
        assert!(row < 4 && column < 4, "Matrix4x4 index ({row}, {column}) out of range");
        &self.data[column + row * 4]
    }
}

impl IndexMut<(usize, usize)> for Matrix4x4 {
    fn index_mut(&mut self, (row, column): (usize, usize)) -> &mut f32 {
        assert!(row < 4 && column < 4, "Matrix4x4 index ({row}, {column}) out of range");
        &mut self.data[column + row * 4]
    }
}

impl Mul for Matrix4x4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from(Mat4::from(self) * Mat4::from(rhs))
    }
}

impl Mul<[f32; 4]> for Matrix4x4 {
    type Output = [f32; 4];

    fn mul(self, v: [f32; 4]) -> [f32; 4] {
        (Mat4::from(self) * Vec4::from_array(v)).to_array()
    }
}

// Row-major storage read as columns is the transpose
impl From<Matrix4x4> for Mat4 {
    fn from(m: Matrix4x4) -> Self {
        Mat4::from_cols_array(&m.data).transpose()
    }
}

impl From<Mat4> for Matrix4x4 {
    fn from(m: Mat4) -> Self {
        Matrix4x4::from_rows_array(m.transpose().to_cols_array())
    }
}

impl fmt::Display for Matrix4x4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..4 {
            writeln!(
                f,
                "{:.6} {:.6} {:.6} {:.6}",
                self[(r, 0)],
                self[(r, 1)],
                self[(r, 2)],
                self[(r, 3)]
            )?;
        }
        Ok(())
    }
}

impl AbsDiffEq for Matrix4x4 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl RelativeEq for Matrix4x4 {
    fn default_max_relative() -> f32 {
        f32::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}
