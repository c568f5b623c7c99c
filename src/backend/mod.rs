//! Backend abstraction layer
//!
//! Provides the [`RenderBackend`] trait, the wgpu rasterizer and the CPU ray
//! tracer that implement it, and the [`Backend`] wrapper selecting between them.

pub mod rasterizer;
pub mod raytracer;
pub mod traits;
pub mod types;

pub use rasterizer::Rasterizer;
pub use raytracer::RayTracer;
pub use traits::*;
pub use types::*;

use crate::scene::FrameSnapshot;
use crate::staging::StagedScene;
use crate::BackendType;
use std::sync::Arc;
use winit::window::Window as WinitWindow;

/// Backend wrapper to abstract over the two execution models
pub enum Backend {
    Rasterizer(Rasterizer),
    RayTracer(RayTracer),
}

impl Backend {
    /// Create the selected backend; only the rasterizer uses the window
    pub fn new(
        window: Arc<WinitWindow>,
        backend_type: BackendType,
        vsync: bool,
    ) -> BackendResult<Self> {
        match backend_type {
            BackendType::Rasterizer => Ok(Backend::Rasterizer(Rasterizer::new(window, vsync)?)),
            BackendType::RayTracer => Ok(Backend::RayTracer(RayTracer::new())),
        }
    }

    pub fn backend_type(&self) -> BackendType {
        match self {
            Backend::Rasterizer(_) => BackendType::Rasterizer,
            Backend::RayTracer(_) => BackendType::RayTracer,
        }
    }
}

impl RenderBackend for Backend {
    fn name(&self) -> &'static str {
        match self {
            Backend::Rasterizer(b) => b.name(),
            Backend::RayTracer(b) => b.name(),
        }
    }

    fn stage(&mut self, scene: &StagedScene) -> BackendResult<SceneHandle> {
        match self {
            Backend::Rasterizer(b) => b.stage(scene),
            Backend::RayTracer(b) => b.stage(scene),
        }
    }

    fn resize(&mut self, width: u32, height: u32) -> BackendResult<(u32, u32)> {
        match self {
            Backend::Rasterizer(b) => b.resize(width, height),
            Backend::RayTracer(b) => b.resize(width, height),
        }
    }

    fn render_frame(&mut self, frame: &FrameSnapshot) -> BackendResult<FrameOutput> {
        match self {
            Backend::Rasterizer(b) => b.render_frame(frame),
            Backend::RayTracer(b) => b.render_frame(frame),
        }
    }
}
