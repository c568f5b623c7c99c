//! Renderer: owns the camera and a backend, freezes one snapshot per frame

use crate::backend::{BackendError, FrameImage, FrameOutput, RayTracer, RenderBackend, SceneHandle};
use crate::math::{Matrix4x4, Vector3};
use crate::resources::{Scene, SceneError};
use crate::scene::{Camera, CameraError, FrameSnapshot};
use crate::staging::{self, StagingError};
use crate::RendererConfig;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RendererError {
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Staging(#[from] StagingError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("Backend '{0}' did not produce an image")]
    NoImage(&'static str),
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
}

/// Drives a [`RenderBackend`] from a [`Camera`]
pub struct Renderer<B: RenderBackend> {
    camera: Camera,
    backend: B,
    model: Matrix4x4,
    scene: Option<SceneHandle>,
    frame_index: u64,
}

impl<B: RenderBackend> Renderer<B> {
    pub fn new(camera: Camera, backend: B) -> Self {
        log::info!(
            "Renderer using {} at {}x{}",
            backend.name(),
            camera.width(),
            camera.height()
        );
        Self {
            camera,
            backend,
            model: Matrix4x4::IDENTITY,
            scene: None,
            frame_index: 0,
        }
    }

    /// Stage the scene and hand it to the backend
    pub fn load(&mut self, scene: &Scene) -> Result<SceneHandle, RendererError> {
        let staged = staging::stage(scene)?;
        let handle = self.backend.stage(&staged)?;
        self.scene = Some(handle);
        Ok(handle)
    }

    /// Resize backend and camera together; zero sizes (minimized windows) are ignored.
    ///
    /// The camera takes the size the backend actually applied, and stays
    /// untouched when the backend fails.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RendererError> {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {}x{}", width, height);
            return Ok(());
        }
        let (applied_width, applied_height) = self.backend.resize(width, height)?;
        if (applied_width, applied_height) != (width, height) {
            log::warn!(
                "Backend clamped {}x{} to {}x{}",
                width,
                height,
                applied_width,
                applied_height
            );
        }
        self.camera.update(applied_width, applied_height)?;
        Ok(())
    }

    /// Read-only camera; pose changes go through the methods below and
    /// resolution changes through [`Renderer::resize`]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn move_forward(&mut self, distance: f32) -> Result<(), RendererError> {
        Ok(self.camera.move_forward(distance)?)
    }

    /// Vertical field of view in radians
    pub fn set_fov_y(&mut self, fov_y: f32) -> Result<(), RendererError> {
        Ok(self.camera.set_fov_y(fov_y)?)
    }

    pub fn set_view_from(&mut self, view_from: Vector3) -> Result<(), RendererError> {
        Ok(self.camera.set_view_from(view_from)?)
    }

    pub fn set_view_at(&mut self, view_at: Vector3) -> Result<(), RendererError> {
        Ok(self.camera.set_view_at(view_at)?)
    }

    pub fn set_up(&mut self, up: Vector3) -> Result<(), RendererError> {
        Ok(self.camera.set_up(up)?)
    }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) -> Result<(), RendererError> {
        Ok(self.camera.set_clip_planes(near, far)?)
    }

    pub fn set_model_transform(&mut self, model: impl Into<Matrix4x4>) {
        self.model = model.into();
    }

    pub fn model_transform(&self) -> Matrix4x4 {
        self.model
    }

    pub fn scene_handle(&self) -> Option<SceneHandle> {
        self.scene
    }

    /// Freeze the camera once and let the backend render from that snapshot
    pub fn render_frame(&mut self) -> Result<FrameOutput, RendererError> {
        let snapshot = FrameSnapshot::capture(&self.camera, self.model, self.frame_index);
        let output = self.backend.render_frame(&snapshot)?;
        self.frame_index += 1;
        Ok(output)
    }

    /// Number of frames rendered so far
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable backend access; resizing through it bypasses the camera, use
    /// [`Renderer::resize`] instead
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

/// Ray trace one frame of `scene` without opening a window
pub fn render_to_image(config: &RendererConfig, scene: &Scene) -> Result<FrameImage, RendererError> {
    let camera = config.camera()?;
    let tracer = RayTracer::new().with_background(config.clear_color);
    let mut renderer = Renderer::new(camera, tracer);
    renderer.load(scene)?;
    let name = renderer.backend().name();
    renderer
        .render_frame()?
        .into_image()
        .ok_or(RendererError::NoImage(name))
}
