//! Model transform for the loaded scene

use crate::math::Matrix4x4;
use glam::{Mat4, Quat, Vec3};

/// Position, rotation and scale of the scene object in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Uniform scale about the origin
    pub fn from_uniform_scale(scale: f32) -> Self {
        Self {
            scale: Vec3::splat(scale),
            ..Default::default()
        }
    }

    /// Model matrix, `T * R * S`
    pub fn matrix(&self) -> Matrix4x4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position).into()
    }

    /// Whether the model matrix can go through the Euclidean inverse
    pub fn is_rigid(&self) -> bool {
        self.scale.abs_diff_eq(Vec3::ONE, 1e-6)
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Rotate around a world axis
    pub fn rotate_axis(&mut self, axis: Vec3, angle: f32) {
        let delta = Quat::from_axis_angle(axis.normalize(), angle);
        self.rotation = delta * self.rotation;
    }
}

impl From<Transform> for Matrix4x4 {
    fn from(transform: Transform) -> Self {
        transform.matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Vector3, ORTHONORMAL_EPSILON};
    use approx::assert_abs_diff_eq;

    #[test]
    fn default_transform_is_identity() {
        assert_abs_diff_eq!(Transform::default().matrix(), Matrix4x4::IDENTITY, epsilon = 1e-6);
    }

    #[test]
    fn translation_lands_in_fourth_column() {
        let m = Transform::from_position(Vec3::new(1.0, 2.0, 3.0)).matrix();
        assert_eq!(m.translation(), Vector3::new(1.0, 2.0, 3.0));
        assert!(m.is_rigid(ORTHONORMAL_EPSILON));
    }

    #[test]
    fn scaled_transform_is_not_rigid() {
        let t = Transform::from_uniform_scale(2.0);
        assert!(!t.is_rigid());
        assert!(t.matrix().try_euclidean_inverse().is_err());
    }

    #[test]
    fn rotation_about_z_maps_x_to_y() {
        let mut t = Transform::default();
        t.rotate_axis(Vec3::Z, std::f32::consts::FRAC_PI_2);
        let v = t.matrix().transform_vector(Vector3::X);
        assert_abs_diff_eq!(v, Vector3::Y, epsilon = 1e-6);
    }
}
