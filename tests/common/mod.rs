//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use glam::Vec2;
use pinhole_renderer::backend::{
    BackendError, BackendResult, FrameImage, FrameOutput, RenderBackend, SceneHandle,
};
use pinhole_renderer::resources::{Material, Scene, Surface, Triangle, Vertex};
use pinhole_renderer::scene::FrameSnapshot;
use pinhole_renderer::staging::StagedScene;
use pinhole_renderer::{deg2rad, Camera, Matrix4x4, Vector3};

pub const REFERENCE_FROM: Vector3 = Vector3::new(150.0, -500.0, 200.0);
pub const REFERENCE_AT: Vector3 = Vector3::new(0.0, 0.0, 35.0);

/// 45 degree camera with near 1 and far 1000 looking at the demo cube
pub fn reference_camera(width: u32, height: u32) -> Camera {
    Camera::new(width, height, deg2rad(45.0), REFERENCE_FROM, REFERENCE_AT, 1.0, 1000.0)
        .expect("reference camera is valid")
}

pub fn vertex(x: f32, y: f32, z: f32) -> Vertex {
    Vertex::new(
        Vector3::new(x, y, z),
        Vector3::new(0.0, -1.0, 0.0),
        Vector3::ONE,
        Vec2::ZERO,
    )
}

/// `count` small triangles in the y = 0 plane, each tagged by its x offset
pub fn strip(name: &str, material_index: u32, count: usize) -> Surface {
    let triangles = (0..count)
        .map(|i| {
            let x = i as f32;
            Triangle::new(vertex(x, 0.0, 0.0), vertex(x + 1.0, 0.0, 0.0), vertex(x, 0.0, 1.0))
        })
        .collect();
    Surface::new(name, material_index).with_triangles(triangles)
}

pub fn materials(count: u32) -> Vec<Material> {
    (0..count)
        .map(|i| Material::new(&format!("material_{i}"), i))
        .collect()
}

/// One triangle around the origin, facing a camera on the -y axis and
/// small enough that the image corners miss it
pub fn facing_triangle_scene() -> Scene {
    let triangle = Triangle::new(
        vertex(-2.0, 0.0, -2.0),
        vertex(2.0, 0.0, -2.0),
        vertex(0.0, 0.0, 2.0),
    );
    let material = Material::new("white", 0).with_diffuse(Vector3::ONE);
    Scene::new(
        vec![Surface::new("target", 0).with_triangles(vec![triangle])],
        vec![material],
    )
}

pub fn facing_camera(width: u32, height: u32) -> Camera {
    Camera::new(
        width,
        height,
        deg2rad(45.0),
        Vector3::new(0.0, -10.0, 0.0),
        Vector3::ZERO,
        1.0,
        100.0,
    )
    .expect("facing camera is valid")
}

/// Records what the renderer hands to a backend
#[derive(Default)]
pub struct MockBackend {
    pub staged_vertices: Vec<u32>,
    pub resizes: Vec<(u32, u32)>,
    pub frames: Vec<(u64, u32, u32, Matrix4x4)>,
    /// Largest side the backend accepts, like a device texture limit
    pub max_dimension: Option<u32>,
    pub fail_resize: bool,
}

impl MockBackend {
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension: Some(max_dimension),
            ..Default::default()
        }
    }

    pub fn failing_resize() -> Self {
        Self {
            fail_resize: true,
            ..Default::default()
        }
    }
}

impl RenderBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn stage(&mut self, scene: &StagedScene) -> BackendResult<SceneHandle> {
        self.staged_vertices.push(scene.vertex_count());
        Ok(SceneHandle::new(self.staged_vertices.len() as u64))
    }

    fn resize(&mut self, width: u32, height: u32) -> BackendResult<(u32, u32)> {
        if self.fail_resize {
            return Err(BackendError::SurfaceLost);
        }
        let limit = self.max_dimension.unwrap_or(u32::MAX);
        let applied = (width.min(limit), height.min(limit));
        self.resizes.push(applied);
        Ok(applied)
    }

    fn render_frame(&mut self, frame: &FrameSnapshot) -> BackendResult<FrameOutput> {
        self.frames.push((
            frame.frame_index(),
            frame.width(),
            frame.height(),
            frame.raster().mvp,
        ));
        Ok(FrameOutput::Image(FrameImage::new(frame.width(), frame.height())))
    }
}
