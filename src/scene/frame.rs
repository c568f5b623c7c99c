//! Per-frame transform pipeline
//!
//! A [`FrameSnapshot`] freezes the camera and the model matrix once per frame.
//! The rasterizer matrices and the ray generation parameters are both derived
//! from that one snapshot, so the two backends always see the same pose.

use super::camera::Camera;
use crate::backend::{BackendResult, MatrixSink};
use crate::math::{Matrix3x3, Matrix4x4, Vector3};

/// Layout a backend expects for uploaded matrices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixConvention {
    /// Backend reads the 16 floats row by row
    RowMajor,
    /// Backend reads the 16 floats column by column (GLSL, WGSL)
    ColumnMajor,
}

impl MatrixConvention {
    /// Transpose flag that turns row-major storage into this convention
    pub fn transpose_flag(self) -> bool {
        matches!(self, MatrixConvention::ColumnMajor)
    }
}

/// Camera and model state frozen for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSnapshot {
    camera: Camera,
    model: Matrix4x4,
    frame_index: u64,
}

impl FrameSnapshot {
    pub fn capture(camera: &Camera, model: Matrix4x4, frame_index: u64) -> Self {
        Self {
            camera: *camera,
            model,
            frame_index,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn model(&self) -> Matrix4x4 {
        self.model
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn width(&self) -> u32 {
        self.camera.width()
    }

    pub fn height(&self) -> u32 {
        self.camera.height()
    }

    /// Matrices for the rasterizer, with depth in [-1, 1]
    pub fn raster(&self) -> RasterTransforms {
        RasterTransforms::new(self.camera.projection(), self.camera.view(), self.model)
    }

    /// Matrices for the rasterizer, with depth in [0, 1]
    pub fn raster_zero_to_one(&self) -> RasterTransforms {
        RasterTransforms::new(
            self.camera.projection_zero_to_one(),
            self.camera.view(),
            self.model,
        )
    }

    pub fn ray_generation(&self) -> RayGenParams {
        RayGenParams {
            eye: self.camera.view_from(),
            basis: self.camera.camera_to_world_basis(),
            focal_length: self.camera.focal_length(),
            width: self.camera.width(),
            height: self.camera.height(),
        }
    }
}

/// Matrices consumed by the rasterizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterTransforms {
    /// `projection * view * model`
    pub mvp: Matrix4x4,
    /// `view * model`
    pub model_view: Matrix4x4,
    /// Inverse-transpose of `model_view`, keeps normals perpendicular under non-uniform scale
    pub normal_matrix: Matrix4x4,
    pub projection: Matrix4x4,
    pub view: Matrix4x4,
}

impl RasterTransforms {
    pub const MVP: &'static str = "mvp";
    pub const MODEL_VIEW: &'static str = "model_view";
    pub const NORMAL_MATRIX: &'static str = "normal_matrix";

    fn new(projection: Matrix4x4, view: Matrix4x4, model: Matrix4x4) -> Self {
        let model_view = view * model;
        Self {
            mvp: projection * model_view,
            model_view,
            // A collapsed axis has no meaningful normals; keep the plain transform
            normal_matrix: model_view.normal_matrix().unwrap_or(model_view),
            projection,
            view,
        }
    }

    /// Push `mvp`, `model_view` and `normal_matrix` to the sink in row-major storage order
    pub fn upload<S: MatrixSink + ?Sized>(
        &self,
        sink: &mut S,
        convention: MatrixConvention,
    ) -> BackendResult<()> {
        let transpose = convention.transpose_flag();
        sink.upload_matrix(Self::MVP, self.mvp.data(), transpose)?;
        sink.upload_matrix(Self::MODEL_VIEW, self.model_view.data(), transpose)?;
        sink.upload_matrix(Self::NORMAL_MATRIX, self.normal_matrix.data(), transpose)?;
        Ok(())
    }
}

/// Ray generation parameters for the ray tracer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayGenParams {
    pub eye: Vector3,
    /// Camera-to-world rotation, camera axes in the columns
    pub basis: Matrix3x3,
    /// Focal length in pixels
    pub focal_length: f32,
    pub width: u32,
    pub height: u32,
}

impl RayGenParams {
    pub fn eye_array(&self) -> [f32; 3] {
        self.eye.to_array()
    }

    /// Basis as 9 row-major floats
    pub fn basis_array(&self) -> [f32; 9] {
        *self.basis.data()
    }

    /// Primary ray through the center of pixel `(px, py)`, `py` growing downwards
    pub fn primary_ray(&self, px: u32, py: u32) -> Ray {
        let d_c = Vector3::new(
            px as f32 + 0.5 - self.width as f32 * 0.5,
            self.height as f32 * 0.5 - (py as f32 + 0.5),
            -self.focal_length,
        );
        let mut direction = self.basis * d_c;
        direction.normalize();
        Ray::new(self.eye, direction)
    }
}

/// A ray with a unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vector3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::deg2rad;
    use approx::assert_abs_diff_eq;

    #[derive(Default)]
    struct RecordingSink {
        uploads: Vec<(String, [f32; 16], bool)>,
    }

    impl MatrixSink for RecordingSink {
        fn upload_matrix(
            &mut self,
            name: &str,
            data: &[f32; 16],
            transpose: bool,
        ) -> BackendResult<()> {
            self.uploads.push((name.to_string(), *data, transpose));
            Ok(())
        }
    }

    fn snapshot() -> FrameSnapshot {
        let camera = Camera::new(
            800,
            600,
            deg2rad(45.0),
            Vector3::new(150.0, -500.0, 200.0),
            Vector3::new(0.0, 0.0, 35.0),
            1.0,
            1000.0,
        )
        .unwrap();
        FrameSnapshot::capture(&camera, Matrix4x4::from_translation(Vector3::Z), 7)
    }

    #[test]
    fn mvp_is_projection_view_model() {
        let s = snapshot();
        let raster = s.raster();
        let expected = s.camera().projection() * s.camera().view() * s.model();
        assert_abs_diff_eq!(raster.mvp, expected, epsilon = 1e-4);
        assert_abs_diff_eq!(
            raster.model_view,
            s.camera().view() * s.model(),
            epsilon = 1e-4
        );
    }

    #[test]
    fn upload_sends_every_matrix_with_transpose_flag() {
        let raster = snapshot().raster();
        let mut sink = RecordingSink::default();
        raster
            .upload(&mut sink, MatrixConvention::ColumnMajor)
            .unwrap();

        assert_eq!(sink.uploads.len(), 3);
        assert_eq!(sink.uploads[0].0, "mvp");
        assert_eq!(&sink.uploads[0].1, raster.mvp.data());
        assert!(sink.uploads[0].2);
        assert_eq!(sink.uploads[1].0, "model_view");
        assert_eq!(sink.uploads[2].0, "normal_matrix");

        sink.uploads.clear();
        raster.upload(&mut sink, MatrixConvention::RowMajor).unwrap();
        assert!(!sink.uploads[1].2);
    }

    #[test]
    fn normal_matrix_matches_model_view_for_rigid_models() {
        let raster = snapshot().raster();
        assert_abs_diff_eq!(raster.normal_matrix.so3(), raster.model_view.so3(), epsilon = 1e-5);
    }

    #[test]
    fn center_ray_points_at_target() {
        let s = snapshot();
        let params = s.ray_generation();
        // Even resolution: average the four pixels around the center
        let mut sum = Vector3::ZERO;
        for (px, py) in [(399, 299), (400, 299), (399, 300), (400, 300)] {
            sum += params.primary_ray(px, py).direction;
        }
        let center = sum.try_normalized().unwrap();
        let expected = (s.camera().view_at() - s.camera().view_from())
            .try_normalized()
            .unwrap();
        assert_abs_diff_eq!(center, expected, epsilon = 1e-5);
        assert_eq!(params.eye_array(), [150.0, -500.0, 200.0]);
    }
}
