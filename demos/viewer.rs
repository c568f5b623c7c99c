//! Viewer demo
//!
//! Opens a window on an OBJ file (or the built-in cube) with the rasterizer,
//! or ray traces a single frame into a PNG.
//!
//! ```bash
//! cargo run --example viewer -- --obj model.obj
//! cargo run --example viewer -- --backend ray-tracer --output frame.png
//! ```

use clap::Parser;
use pinhole_renderer::resources::{load_scene, Scene};
use pinhole_renderer::{init_logging, render_to_image, window, BackendType, RendererConfig, RendererError};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
enum CliBackend {
    /// Interactive wgpu rasterizer
    #[default]
    Rasterizer,
    /// Offscreen CPU ray tracer, writes one image
    RayTracer,
}

impl From<CliBackend> for BackendType {
    fn from(cli: CliBackend) -> Self {
        match cli {
            CliBackend::Rasterizer => BackendType::Rasterizer,
            CliBackend::RayTracer => BackendType::RayTracer,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "viewer", about = "Pinhole camera viewer")]
struct Args {
    /// Render backend
    #[arg(long, value_enum, default_value_t = CliBackend::Rasterizer)]
    backend: CliBackend,

    /// OBJ file to load; the demo cube is shown when omitted
    #[arg(long)]
    obj: Option<PathBuf>,

    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Output image for the ray tracer
    #[arg(long, default_value = "frame.png")]
    output: PathBuf,
}

fn main() -> Result<(), RendererError> {
    init_logging();
    let args = Args::parse();

    let config = RendererConfig {
        width: args.width,
        height: args.height,
        backend: args.backend.into(),
        ..Default::default()
    };

    let scene = match &args.obj {
        Some(path) => load_scene(path)?,
        None => Scene::demo(),
    };
    log::info!(
        "Scene: {} surfaces, {} triangles, {} materials",
        scene.surfaces.len(),
        scene.triangle_count(),
        scene.materials.len()
    );

    match config.backend {
        BackendType::RayTracer => {
            let image = render_to_image(&config, &scene)?;
            image.save(&args.output)?;
            log::info!("Wrote {}", args.output.display());
            Ok(())
        }
        BackendType::Rasterizer => window::run(&config, &scene),
    }
}
