//! 3x3 matrix, used as the camera-to-world rotation

use super::Vector3;
use approx::{AbsDiffEq, RelativeEq};
use bytemuck::{Pod, Zeroable};
use glam::Mat3;
use std::ops::{Index, IndexMut, Mul};

/// Row-major 3x3 matrix of `f32`; arithmetic runs on [`glam::Mat3`]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Matrix3x3 {
    data: [f32; 9],
}

impl Default for Matrix3x3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix3x3 {
    pub const IDENTITY: Self = Self {
        data: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    /// Build from elements given in row-major order
    #[allow(clippy::too_many_arguments)]
    #[rustfmt::skip]
    pub const fn new(
        m00: f32, m01: f32, m02: f32,
        m10: f32, m11: f32, m12: f32,
        m20: f32, m21: f32, m22: f32,
    ) -> Self {
        Self {
            data: [m00, m01, m02, m10, m11, m12, m20, m21, m22],
        }
    }

    /// Build from three basis vectors placed in the columns
    #[rustfmt::skip]
    pub fn from_basis(x: Vector3, y: Vector3, z: Vector3) -> Self {
        Self::new(
            x.x, y.x, z.x,
            x.y, y.y, z.y,
            x.z, y.z, z.z,
        )
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f32> {
        (row < 3 && column < 3).then(|| self.data[column + row * 3])
    }

    pub fn column(&self, column: usize) -> Vector3 {
        Vector3::new(self[(0, column)], self[(1, column)], self[(2, column)])
    }

    pub fn row(&self, row: usize) -> Vector3 {
        Vector3::new(self[(row, 0)], self[(row, 1)], self[(row, 2)])
    }

    pub fn transpose(&self) -> Self {
        Self::from(Mat3::from(*self).transpose())
    }

    /// General inverse, `None` when the matrix is (nearly) singular
    pub fn try_inverse(&self) -> Option<Self> {
        let m = Mat3::from(*self);
        (m.determinant().abs() > f32::EPSILON).then(|| Self::from(m.inverse()))
    }

    /// Flat row-major data (9 floats)
    pub fn data(&self) -> &[f32; 9] {
        &self.data
    }

    /// Whether the columns are unit length and mutually perpendicular
    pub fn is_orthonormal(&self, tolerance: f32) -> bool {
        let (x, y, z) = (self.column(0), self.column(1), self.column(2));
        (x.length() - 1.0).abs() <= tolerance
            && (y.length() - 1.0).abs() <= tolerance
            && (z.length() - 1.0).abs() <= tolerance
            && x.dot(y).abs() <= tolerance
            && y.dot(z).abs() <= tolerance
            && z.dot(x).abs() <= tolerance
    }
}

impl Index<(usize, usize)> for Matrix3x3 {
    type Output = f32;

    fn index(&self, (row, column): (usize, usize)) -> &f32 {
        assert!(row < 3 && column < 3, "Matrix3x3 index ({row}, {column}) out of range");
        &self.data[column + row * 3]
    }
}

impl IndexMut<(usize, usize)> for Matrix3x3 {
    fn index_mut(&mut self, (row, column): (usize, usize)) -> &mut f32 {
        assert!(row < 3 && column < 3, "Matrix3x3 index ({row}, {column}) out of range");
        &mut self.data[column + row * 3]
    }
}

impl Mul<Vector3> for Matrix3x3 {
    type Output = Vector3;

    fn mul(self, v: Vector3) -> Vector3 {
        (Mat3::from(self) * glam::Vec3::from(v)).into()
    }
}

impl Mul for Matrix3x3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from(Mat3::from(self) * Mat3::from(rhs))
    }
}

// Row-major storage read as columns is the transpose
impl From<Matrix3x3> for Mat3 {
    fn from(m: Matrix3x3) -> Self {
        Mat3::from_cols_array(&m.data).transpose()
    }
}

impl From<Mat3> for Matrix3x3 {
    fn from(m: Mat3) -> Self {
        Self {
            data: m.transpose().to_cols_array(),
        }
    }
}

impl AbsDiffEq for Matrix3x3 {
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

impl RelativeEq for Matrix3x3 {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_vectors_land_in_columns() {
        let m = Matrix3x3::from_basis(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(4.0, 5.0, 6.0),
            Vector3::new(7.0, 8.0, 9.0),
        );
        assert_eq!(m[(0, 0)], 1.0);
        assert_eq!(m[(2, 0)], 3.0);
        assert_eq!(m[(0, 2)], 7.0);
        assert_eq!(m.column(1), Vector3::new(4.0, 5.0, 6.0));
        assert_eq!(m.transpose().row(1), Vector3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn multiplying_by_unit_axis_selects_column() {
        let m = Matrix3x3::from_basis(Vector3::Y, Vector3::Z, Vector3::X);
        assert_eq!(m * Vector3::X, Vector3::Y);
        assert_eq!(m * Vector3::Z, Vector3::X);
        assert!(m.is_orthonormal(1e-6));
    }

    #[test]
    fn inverse_of_scale_and_singular_input() {
        let m = Matrix3x3::new(2.0, 0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 1.0, 1.0);
        let inv = m.try_inverse().unwrap();
        assert_eq!(m * (inv * Vector3::new(1.0, 2.0, 3.0)), Vector3::new(1.0, 2.0, 3.0));
        assert!(Matrix3x3::new(1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 0.0, 1.0)
            .try_inverse()
            .is_none());
    }

    #[test]
    fn out_of_range_get_is_none() {
        assert_eq!(Matrix3x3::IDENTITY.get(3, 0), None);
        assert_eq!(Matrix3x3::IDENTITY.get(1, 1), Some(1.0));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_index_panics() {
        let _ = Matrix3x3::IDENTITY[(0, 3)];
    }
}
