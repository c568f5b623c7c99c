//! CPU ray tracer rendering through the shared camera.

mod common;

use common::{facing_camera, facing_triangle_scene};
use pinhole_renderer::backend::{RayTracer, RenderBackend};
use pinhole_renderer::resources::Scene;
use pinhole_renderer::scene::{FrameSnapshot, Transform};
use pinhole_renderer::{render_to_image, Matrix4x4, Renderer, RendererConfig};
use rstest::rstest;

const BACKGROUND: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

fn traced(scene: &Scene, model: Matrix4x4, width: u32, height: u32) -> pinhole_renderer::backend::FrameImage {
    let camera = facing_camera(width, height);
    let mut renderer = Renderer::new(camera, RayTracer::new().with_background(BACKGROUND));
    renderer.set_model_transform(model);
    renderer.load(scene).unwrap();
    renderer.render_frame().unwrap().into_image().unwrap()
}

#[rstest]
#[case(33, 25)]
#[case(64, 48)]
fn triangle_in_front_of_camera_is_hit(#[case] width: u32, #[case] height: u32) {
    let image = traced(&facing_triangle_scene(), Matrix4x4::IDENTITY, width, height);
    assert_eq!((image.width, image.height), (width, height));

    let center = image.pixel(width / 2, height / 2).unwrap();
    assert_ne!(center, [0, 0, 0, 255], "center pixel should see the triangle");
    assert_eq!(center[3], 255);

    // Corners look past the triangle
    assert_eq!(image.pixel(0, 0).unwrap(), [0, 0, 0, 255]);
    assert_eq!(image.pixel(width - 1, 0).unwrap(), [0, 0, 0, 255]);
}

#[test]
fn empty_scene_shows_background() {
    let image = traced(&Scene::default(), Matrix4x4::IDENTITY, 16, 12);
    assert!(image.pixels.chunks_exact(4).all(|p| p == [0, 0, 0, 255]));
}

#[test]
fn model_transform_moves_geometry_out_of_view() {
    let model = Transform::from_position(glam::Vec3::new(1000.0, 0.0, 0.0)).matrix();
    let image = traced(&facing_triangle_scene(), model, 16, 12);
    assert!(image.pixels.chunks_exact(4).all(|p| p == [0, 0, 0, 255]));
}

#[test]
fn render_to_image_uses_config_size() {
    let config = RendererConfig {
        width: 40,
        height: 30,
        ..Default::default()
    };
    let image = render_to_image(&config, &Scene::demo()).unwrap();
    assert_eq!((image.width, image.height), (40, 30));
    assert_eq!(image.pixels.len(), 40 * 30 * 4);
}

#[test]
fn tracer_follows_snapshot_resolution() {
    let camera = facing_camera(20, 10);
    let mut tracer = RayTracer::new();
    tracer.stage(&pinhole_renderer::staging::stage(&facing_triangle_scene()).unwrap()).unwrap();
    let frame = FrameSnapshot::capture(&camera, Matrix4x4::IDENTITY, 0);
    let image = tracer.render_frame(&frame).unwrap().into_image().unwrap();
    assert_eq!((image.width, image.height), (20, 10));
}
