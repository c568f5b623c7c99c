//! Three component vector

use approx::{AbsDiffEq, RelativeEq};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// A 3D vector of `f32`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn glam(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn dot(&self, other: Self) -> f32 {
        self.glam().dot(other.glam())
    }

    pub fn cross(&self, other: Self) -> Self {
        self.glam().cross(other.glam()).into()
    }

    pub fn length_squared(&self) -> f32 {
        self.glam().length_squared()
    }

    pub fn length(&self) -> f32 {
        self.glam().length()
    }

    /// Normalize in place and return the original length.
    ///
    /// A zero-length vector produces NaN components; use [`Vector3::try_normalized`]
    /// when the input may be degenerate.
    pub fn normalize(&mut self) -> f32 {
        let length = self.length();
        *self = (self.glam() / length).into();
        length
    }

    /// Unit vector in the same direction, or `None` if the length is (nearly) zero
    pub fn try_normalized(&self) -> Option<Self> {
        let length = self.length();
        (length.is_finite() && length > f32::EPSILON).then(|| (self.glam() / length).into())
    }

    pub fn is_finite(&self) -> bool {
        self.glam().is_finite()
    }

    /// Component-wise product
    pub fn mul_elem(&self, other: Self) -> Self {
        (self.glam() * other.glam()).into()
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Extend to a homogeneous 4-vector
    pub fn extend(&self, w: f32) -> [f32; 4] {
        [self.x, self.y, self.z, w]
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vector3> for [f32; 3] {
    fn from(v: Vector3) -> Self {
        v.to_array()
    }
}

impl From<Vec3> for Vector3 {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vector3> for Vec3 {
    fn from(v: Vector3) -> Self {
        v.glam()
    }
}

impl Add for Vector3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        (self.glam() + rhs.glam()).into()
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vector3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        (self.glam() - rhs.glam()).into()
    }
}

impl SubAssign for Vector3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for Vector3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        (self.glam() * rhs).into()
    }
}

impl Mul<Vector3> for f32 {
    type Output = Vector3;
    fn mul(self, rhs: Vector3) -> Vector3 {
        rhs * self
    }
}

impl MulAssign<f32> for Vector3 {
    fn mul_assign(&mut self, rhs: f32) {
        *self = *self * rhs;
    }
}

impl Div<f32> for Vector3 {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        (self.glam() / rhs).into()
    }
}

impl Neg for Vector3 {
    type Output = Self;
    fn neg(self) -> Self {
        (-self.glam()).into()
    }
}

impl AbsDiffEq for Vector3 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && self.z.abs_diff_eq(&other.z, epsilon)
    }
}

impl RelativeEq for Vector3 {
    fn default_max_relative() -> f32 {
        f32::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
            && self.z.relative_eq(&other.z, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cross_follows_right_hand_rule() {
        assert_eq!(Vector3::X.cross(Vector3::Y), Vector3::Z);
        assert_eq!(Vector3::Y.cross(Vector3::Z), Vector3::X);
        assert_eq!(Vector3::Z.cross(Vector3::X), Vector3::Y);
    }

    #[test]
    fn normalize_returns_length_and_unit_vector() {
        let mut v = Vector3::new(3.0, 0.0, 4.0);
        let length = v.normalize();
        assert_eq!(length, 5.0);
        assert_abs_diff_eq!(v, Vector3::new(0.6, 0.0, 0.8), epsilon = 1e-6);
    }

    #[test]
    fn zero_vector_cannot_be_normalized() {
        assert!(Vector3::ZERO.try_normalized().is_none());

        let mut v = Vector3::ZERO;
        v.normalize();
        assert!(!v.is_finite());
    }

    #[test]
    fn arithmetic_operators() {
        let mut a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vector3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vector3::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, 2.0 * a);
        assert_eq!(a.dot(b), 32.0);

        a += b;
        a *= 0.5;
        assert_eq!(a, Vector3::new(2.5, 3.5, 4.5));
    }
}
