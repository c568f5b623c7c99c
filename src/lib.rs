//! Pinhole Renderer - one camera, two execution models
//!
//! A scene loaded from OBJ is staged once into flat GPU-ready buffers and then
//! rendered by either of two backends:
//! - **Rasterizer**: wgpu pipeline driven by the model-view-projection matrices
//! - **RayTracer**: CPU ray caster driven by the eye, camera basis and focal length
//!
//! Both backends read from the same per-frame [`scene::FrameSnapshot`], so the
//! camera is frozen exactly once per frame.

pub mod backend;
pub mod math;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod staging;
pub mod window;

pub use backend::{Backend, RenderBackend};
pub use math::{deg2rad, Matrix3x3, Matrix4x4, Vector3};
pub use renderer::{render_to_image, Renderer, RendererError};
pub use scene::{Camera, CameraError, FrameSnapshot};

use std::sync::Once;

/// Backend selection for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendType {
    /// wgpu rasterizer presenting to a window
    #[default]
    Rasterizer,
    /// CPU ray tracer producing images
    RayTracer,
}

/// Configuration for the renderer and its camera
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window title
    pub title: String,
    /// Initial output width in pixels
    pub width: u32,
    /// Initial output height in pixels
    pub height: u32,
    /// Which backend to use
    pub backend: BackendType,
    /// Enable vsync
    pub vsync: bool,
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    pub view_from: Vector3,
    pub view_at: Vector3,
    pub near: f32,
    pub far: f32,
    /// Linear RGBA background
    pub clear_color: [f32; 4],
    /// Distance moved per forward/backward key press
    pub move_speed: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            title: "Pinhole Renderer".to_string(),
            width: 640,
            height: 480,
            backend: BackendType::Rasterizer,
            vsync: true,
            fov_y_degrees: 45.0,
            view_from: Vector3::new(150.0, -500.0, 200.0),
            view_at: Vector3::new(0.0, 0.0, 35.0),
            near: 1.0,
            far: 1000.0,
            clear_color: [0.2, 0.3, 0.3, 1.0],
            move_speed: 10.0,
        }
    }
}

impl RendererConfig {
    /// Build the camera described by this configuration
    pub fn camera(&self) -> Result<Camera, CameraError> {
        Camera::new(
            self.width,
            self.height,
            deg2rad(self.fov_y_degrees),
            self.view_from,
            self.view_at,
            self.near,
            self.far,
        )
    }
}

static LOGGING: Once = Once::new();

/// Initialize `env_logger` once, honoring `RUST_LOG` and defaulting to `info`
pub fn init_logging() {
    LOGGING.call_once(|| {
        let env = env_logger::Env::default().default_filter_or("info");
        if env_logger::Builder::from_env(env).try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_reference_camera() {
        let camera = RendererConfig::default().camera().unwrap();
        assert_eq!((camera.width(), camera.height()), (640, 480));
        assert_eq!(camera.near(), 1.0);
        assert_eq!(camera.far(), 1000.0);
        assert!((camera.fov_y() - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
    }

    #[test]
    fn init_logging_is_idempotent() {
        init_logging();
        init_logging();
    }
}
