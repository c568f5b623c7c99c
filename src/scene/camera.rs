//! Pinhole camera
//!
//! The camera keeps its pose, field of view, clip planes and resolution private.
//! Every mutator validates the new configuration, recomputes all derived state
//! and only then commits, so a `Camera` value is always internally consistent.

use crate::math::{Matrix3x3, Matrix4x4, Vector3};
use std::f32::consts::PI;
use thiserror::Error;

/// Invalid camera configuration or degenerate geometry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("vertical field of view must be in (0, pi), got {0}")]
    InvalidFieldOfView(f32),
    #[error("clip planes must satisfy 0 < near < far, got near = {near}, far = {far}")]
    InvalidClipPlanes { near: f32, far: f32 },
    #[error("resolution must be non-zero, got {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },
    #[error("view_from and view_at coincide, the view direction is undefined")]
    DegenerateViewDirection,
    #[error("up vector is zero or parallel to the view direction")]
    DegenerateUpVector,
}

/// State computed from the camera parameters
#[derive(Debug, Clone, Copy, PartialEq)]
struct Derived {
    focal_length: f32,
    aspect_ratio: f32,
    width_half: f32,
    height_half: f32,
    basis: Matrix3x3,
    camera_to_world: Matrix4x4,
    projection: Matrix4x4,
}

/// A pinhole camera feeding both the rasterizer and the ray generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    width: u32,
    height: u32,
    fov_y: f32,
    view_from: Vector3,
    view_at: Vector3,
    up: Vector3,
    near: f32,
    far: f32,
    derived: Derived,
}

impl Camera {
    /// World up used unless overridden with [`Camera::set_up`]
    pub const DEFAULT_UP: Vector3 = Vector3::Z;

    /// Create a camera and derive its basis, focal length and matrices.
    ///
    /// `fov_y` is the vertical field of view in radians.
    pub fn new(
        width: u32,
        height: u32,
        fov_y: f32,
        view_from: Vector3,
        view_at: Vector3,
        near: f32,
        far: f32,
    ) -> Result<Self, CameraError> {
        let up = Self::DEFAULT_UP;
        let derived = derive(width, height, fov_y, view_from, view_at, up, near, far)?;
        let camera = Self {
            width,
            height,
            fov_y,
            view_from,
            view_at,
            up,
            near,
            far,
            derived,
        };
        log::debug!(
            "Camera created: {}x{}, fov_y {:.3} rad, focal length {:.3} px",
            width,
            height,
            fov_y,
            camera.derived.focal_length
        );
        Ok(camera)
    }

    /// Apply a candidate configuration, committing only if it is valid
    fn commit(&mut self, candidate: Camera) -> Result<(), CameraError> {
        let derived = derive(
            candidate.width,
            candidate.height,
            candidate.fov_y,
            candidate.view_from,
            candidate.view_at,
            candidate.up,
            candidate.near,
            candidate.far,
        )?;
        *self = Camera {
            derived,
            ..candidate
        };
        Ok(())
    }

    /// Change the output resolution and recompute every derived quantity
    pub fn update(&mut self, width: u32, height: u32) -> Result<(), CameraError> {
        self.commit(Camera {
            width,
            height,
            ..*self
        })?;
        log::debug!(
            "Camera resized to {}x{} (aspect {:.4})",
            width,
            height,
            self.derived.aspect_ratio
        );
        Ok(())
    }

    /// Move eye and target by `dt` along the view direction, keeping the look direction
    pub fn move_forward(&mut self, dt: f32) -> Result<(), CameraError> {
        let direction = (self.view_at - self.view_from)
            .try_normalized()
            .ok_or(CameraError::DegenerateViewDirection)?;
        let ds = direction * dt;
        self.commit(Camera {
            view_from: self.view_from + ds,
            view_at: self.view_at + ds,
            ..*self
        })
    }

    /// Set the vertical field of view in radians
    pub fn set_fov_y(&mut self, fov_y: f32) -> Result<(), CameraError> {
        self.commit(Camera { fov_y, ..*self })
    }

    pub fn set_view_from(&mut self, view_from: Vector3) -> Result<(), CameraError> {
        self.commit(Camera { view_from, ..*self })
    }

    pub fn set_view_at(&mut self, view_at: Vector3) -> Result<(), CameraError> {
        self.commit(Camera { view_at, ..*self })
    }

    pub fn set_up(&mut self, up: Vector3) -> Result<(), CameraError> {
        self.commit(Camera { up, ..*self })
    }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) -> Result<(), CameraError> {
        self.commit(Camera { near, far, ..*self })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn view_from(&self) -> Vector3 {
        self.view_from
    }

    pub fn view_at(&self) -> Vector3 {
        self.view_at
    }

    pub fn up(&self) -> Vector3 {
        self.up
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    /// Focal length in pixels: `height / (2 tan(fov_y / 2))`
    pub fn focal_length(&self) -> f32 {
        self.derived.focal_length
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.derived.aspect_ratio
    }

    /// Half width of the frustum cross-section at the near plane
    pub fn width_half(&self) -> f32 {
        self.derived.width_half
    }

    /// Half height of the frustum cross-section at the near plane
    pub fn height_half(&self) -> f32 {
        self.derived.height_half
    }

    /// Camera axes (x_c, y_c, z_c) expressed in world coordinates, as columns
    pub fn camera_to_world_basis(&self) -> Matrix3x3 {
        self.derived.basis
    }

    /// Camera-to-world pose
    pub fn camera_to_world(&self) -> Matrix4x4 {
        self.derived.camera_to_world
    }

    /// World-to-camera (view) matrix
    pub fn view(&self) -> Matrix4x4 {
        self.derived.camera_to_world.euclidean_inverse()
    }

    /// Perspective projection to clip space with depth in [-1, 1]
    pub fn projection(&self) -> Matrix4x4 {
        self.derived.projection
    }

    /// Perspective projection to clip space with depth in [0, 1]
    pub fn projection_zero_to_one(&self) -> Matrix4x4 {
        depth_range_to_zero_one() * self.derived.projection
    }
}

/// Remaps clip-space depth from [-1, 1] to [0, 1]: `z' = (z + w) / 2`
#[rustfmt::skip]
pub fn depth_range_to_zero_one() -> Matrix4x4 {
    Matrix4x4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

#[allow(clippy::too_many_arguments)]
fn derive(
    width: u32,
    height: u32,
    fov_y: f32,
    view_from: Vector3,
    view_at: Vector3,
    up: Vector3,
    near: f32,
    far: f32,
) -> Result<Derived, CameraError> {
    if !(fov_y > 0.0 && fov_y < PI) {
        return Err(CameraError::InvalidFieldOfView(fov_y));
    }
    if !(near > 0.0 && far > near && far.is_finite()) {
        return Err(CameraError::InvalidClipPlanes { near, far });
    }
    if width == 0 || height == 0 {
        return Err(CameraError::InvalidResolution { width, height });
    }

    let z_c = (view_from - view_at)
        .try_normalized()
        .ok_or(CameraError::DegenerateViewDirection)?;
    let x_c = up
        .cross(z_c)
        .try_normalized()
        .ok_or(CameraError::DegenerateUpVector)?;
    let y_c = z_c
        .cross(x_c)
        .try_normalized()
        .ok_or(CameraError::DegenerateUpVector)?;

    let tan_half = (fov_y * 0.5).tan();
    let focal_length = height as f32 / (2.0 * tan_half);
    let aspect_ratio = width as f32 / height as f32;
    let height_half = near * tan_half;
    let width_half = height_half * aspect_ratio;

    let mut projection = Matrix4x4::ZERO;
    projection[(0, 0)] = near / width_half;
    projection[(1, 1)] = near / height_half;
    projection[(2, 2)] = (far + near) / (near - far);
    projection[(2, 3)] = (2.0 * far * near) / (near - far);
    projection[(3, 2)] = -1.0;

    Ok(Derived {
        focal_length,
        aspect_ratio,
        width_half,
        height_half,
        basis: Matrix3x3::from_basis(x_c, y_c, z_c),
        camera_to_world: Matrix4x4::from_basis_translation(x_c, y_c, z_c, view_from),
        projection,
    })
}
