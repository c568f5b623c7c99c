//! Core backend abstraction traits
//!
//! Both the rasterizer and the ray tracer implement [`RenderBackend`]. They
//! consume the same staged scene and the same per-frame snapshot.

use crate::scene::FrameSnapshot;
use crate::staging::StagedScene;
use std::path::Path;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to initialize backend: {0}")]
    InitializationFailed(String),
    #[error("Failed to create surface: {0}")]
    SurfaceCreationFailed(String),
    #[error("Failed to create device: {0}")]
    DeviceCreationFailed(String),
    #[error("Failed to acquire next image: {0}")]
    AcquireImageFailed(String),
    #[error("Unknown uniform '{0}'")]
    UnknownUniform(String),
    #[error("No scene has been staged")]
    NotStaged,
    #[error("Surface lost")]
    SurfaceLost,
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Receives named 4x4 matrices as 16 floats in row-major storage order.
///
/// `transpose` asks the receiver to transpose before use, the same contract
/// as `glUniformMatrix4fv`.
pub trait MatrixSink {
    fn upload_matrix(&mut self, name: &str, data: &[f32; 16], transpose: bool)
        -> BackendResult<()>;
}

/// Identifies the scene currently resident in a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneHandle(pub(crate) u64);

impl SceneHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// RGBA8 image produced by an offscreen backend, top row first
#[derive(Debug, Clone, PartialEq)]
pub struct FrameImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl FrameImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y * self.width + x) * 4) as usize;
        let p = &self.pixels[offset..offset + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let offset = ((y * self.width + x) * 4) as usize;
        self.pixels[offset..offset + 4].copy_from_slice(&rgba);
    }

    /// Write the image as PNG (format taken from the extension)
    pub fn save<P: AsRef<Path>>(&self, path: P) -> BackendResult<()> {
        image::save_buffer(
            path,
            &self.pixels,
            self.width,
            self.height,
            image::ColorType::Rgba8,
        )?;
        Ok(())
    }
}

/// Result of rendering one frame
#[derive(Debug)]
pub enum FrameOutput {
    /// Frame was presented to the window surface
    Presented,
    /// Frame was rendered offscreen
    Image(FrameImage),
}

impl FrameOutput {
    pub fn into_image(self) -> Option<FrameImage> {
        match self {
            FrameOutput::Image(image) => Some(image),
            FrameOutput::Presented => None,
        }
    }
}

/// A renderer backend
pub trait RenderBackend {
    /// Human readable backend name
    fn name(&self) -> &'static str;

    /// Take ownership of GPU-ready scene data, replacing any previous scene
    fn stage(&mut self, scene: &StagedScene) -> BackendResult<SceneHandle>;

    /// Resize output targets and return the size actually applied, which may be
    /// smaller than requested when the device limits it
    fn resize(&mut self, width: u32, height: u32) -> BackendResult<(u32, u32)>;

    /// Render one frame from a frozen snapshot
    fn render_frame(&mut self, frame: &FrameSnapshot) -> BackendResult<FrameOutput>;
}
