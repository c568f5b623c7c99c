//! Interactive viewer window using winit
//!
//! Presents through the rasterizer. W/S or the arrow keys move the camera
//! along its view direction, +/- change the field of view, Escape quits.

use crate::backend::{Backend, BackendError, FrameOutput};
use crate::math::deg2rad;
use crate::renderer::{Renderer, RendererError};
use crate::resources::Scene;
use crate::{BackendType, RendererConfig};
use std::sync::Arc;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window as WinitWindow, WindowBuilder},
};

/// Field of view change per key press, in degrees
const FOV_STEP_DEGREES: f32 = 5.0;

/// Window plus the renderer drawing into it
pub struct Viewer {
    window: Arc<WinitWindow>,
    renderer: Renderer<Backend>,
    move_speed: f32,
}

impl Viewer {
    /// Create the window, the rasterizer and stage `scene`
    pub fn new(
        event_loop: &EventLoop<()>,
        config: &RendererConfig,
        scene: &Scene,
    ) -> Result<Self, RendererError> {
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(&config.title)
                .with_inner_size(PhysicalSize::new(config.width, config.height))
                .build(event_loop)?,
        );

        if config.backend != BackendType::Rasterizer {
            log::warn!("Window presentation uses the rasterizer; ignoring {:?}", config.backend);
        }
        let mut backend = Backend::new(Arc::clone(&window), BackendType::Rasterizer, config.vsync)?;
        if let Backend::Rasterizer(rasterizer) = &mut backend {
            rasterizer.set_clear_color(config.clear_color);
        }

        // The window may come up at a different size than requested
        let size = window.inner_size();
        let mut renderer = Renderer::new(config.camera()?, backend);
        renderer.resize(size.width, size.height)?;
        renderer.load(scene)?;

        Ok(Self {
            window,
            renderer,
            move_speed: config.move_speed,
        })
    }

    pub fn window(&self) -> &WinitWindow {
        &self.window
    }

    pub fn renderer(&self) -> &Renderer<Backend> {
        &self.renderer
    }

    /// Handle one window event; returns `false` when the viewer should close
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => return false,
            WindowEvent::Resized(size) => {
                if let Err(err) = self.renderer.resize(size.width, size.height) {
                    log::error!("Resize to {}x{} failed: {}", size.width, size.height, err);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => return self.handle_key(*code),
            WindowEvent::RedrawRequested => return self.redraw(),
            _ => {}
        }
        true
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        let fov_y = self.renderer.camera().fov_y();
        let result = match code {
            KeyCode::Escape => return false,
            KeyCode::KeyW | KeyCode::ArrowUp => self.renderer.move_forward(self.move_speed),
            KeyCode::KeyS | KeyCode::ArrowDown => self.renderer.move_forward(-self.move_speed),
            KeyCode::Equal | KeyCode::NumpadAdd => {
                self.renderer.set_fov_y(fov_y + deg2rad(FOV_STEP_DEGREES))
            }
            KeyCode::Minus | KeyCode::NumpadSubtract => {
                self.renderer.set_fov_y(fov_y - deg2rad(FOV_STEP_DEGREES))
            }
            _ => return true,
        };
        if let Err(err) = result {
            log::warn!("Camera unchanged: {}", err);
        }
        true
    }

    fn redraw(&mut self) -> bool {
        match self.renderer.render_frame() {
            Ok(FrameOutput::Presented) => true,
            Ok(FrameOutput::Image(_)) => {
                log::debug!("Discarding offscreen image in windowed mode");
                true
            }
            Err(RendererError::Backend(BackendError::SurfaceLost)) => {
                log::warn!("Surface lost, reconfiguring");
                let size = self.window.inner_size();
                if let Err(err) = self.renderer.resize(size.width, size.height) {
                    log::error!("Surface reconfiguration failed: {}", err);
                }
                true
            }
            Err(RendererError::Backend(BackendError::OutOfMemory)) => {
                log::error!("Out of GPU memory, exiting");
                false
            }
            Err(err) => {
                log::error!("Frame {} failed: {}", self.renderer.frame_index(), err);
                true
            }
        }
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

/// Open a window on `scene` and run until it is closed
pub fn run(config: &RendererConfig, scene: &Scene) -> Result<(), RendererError> {
    let event_loop = EventLoop::new()?;
    let mut viewer = Viewer::new(&event_loop, config, scene)?;

    event_loop.run(move |event, elwt: &EventLoopWindowTarget<()>| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { event, window_id } if window_id == viewer.window().id() => {
                if !viewer.handle_event(&event) {
                    log::info!(
                        "Closing after {} frames",
                        viewer.renderer().frame_index()
                    );
                    elwt.exit();
                }
            }
            Event::AboutToWait => viewer.request_redraw(),
            _ => {}
        }
    })?;
    Ok(())
}
