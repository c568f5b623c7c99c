//! Renderer driving a recording backend.

mod common;

use approx::assert_relative_eq;
use common::{reference_camera, MockBackend};
use pinhole_renderer::backend::BackendError;
use pinhole_renderer::resources::Scene;
use pinhole_renderer::{deg2rad, Matrix4x4, Renderer, RendererError, Vector3};

fn renderer() -> Renderer<MockBackend> {
    Renderer::new(reference_camera(800, 600), MockBackend::default())
}

#[test]
fn each_frame_gets_one_snapshot() {
    let mut renderer = renderer();
    renderer.load(&Scene::demo()).unwrap();
    for _ in 0..3 {
        renderer.render_frame().unwrap();
    }

    let frames = &renderer.backend().frames;
    assert_eq!(frames.len(), 3);
    assert_eq!(frames.iter().map(|f| f.0).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(renderer.frame_index(), 3);
}

#[test]
fn load_stages_the_whole_scene() {
    let mut renderer = renderer();
    let handle = renderer.load(&Scene::demo()).unwrap();
    assert_eq!(renderer.scene_handle(), Some(handle));
    assert_eq!(renderer.backend().staged_vertices, vec![36]);
}

#[test]
fn resize_reaches_camera_and_backend() {
    let mut renderer = renderer();
    renderer.resize(1920, 1080).unwrap();
    renderer.render_frame().unwrap();

    assert_eq!(renderer.backend().resizes, vec![(1920, 1080)]);
    let (_, width, height, _) = renderer.backend().frames[0];
    assert_eq!((width, height), (1920, 1080));
    assert_relative_eq!(renderer.camera().aspect_ratio(), 1920.0 / 1080.0);
}

#[test]
fn zero_sized_resize_is_ignored() {
    let mut renderer = renderer();
    renderer.resize(0, 0).unwrap();
    renderer.resize(640, 0).unwrap();
    assert!(renderer.backend().resizes.is_empty());
    assert_eq!(renderer.camera().width(), 800);
}

#[test]
fn snapshot_resolution_always_matches_backend() {
    let mut renderer = renderer();
    renderer.move_forward(25.0).unwrap();
    renderer.set_fov_y(deg2rad(60.0)).unwrap();
    renderer.set_clip_planes(0.5, 2000.0).unwrap();
    renderer.set_view_at(Vector3::new(0.0, 0.0, 10.0)).unwrap();
    renderer.render_frame().unwrap();

    // Pose changes never touch the resolution
    assert!(renderer.backend().resizes.is_empty());
    let (_, width, height, _) = renderer.backend().frames[0];
    assert_eq!((width, height), (800, 600));

    renderer.resize(1920, 1080).unwrap();
    renderer.render_frame().unwrap();
    let (_, width, height, _) = renderer.backend().frames[1];
    assert_eq!(renderer.backend().resizes.last(), Some(&(width, height)));
}

#[test]
fn camera_takes_the_size_the_backend_applied() {
    let mut renderer = Renderer::new(reference_camera(800, 600), MockBackend::with_max_dimension(1024));
    renderer.resize(4096, 2048).unwrap();
    renderer.render_frame().unwrap();

    assert_eq!(renderer.backend().resizes, vec![(1024, 1024)]);
    assert_eq!((renderer.camera().width(), renderer.camera().height()), (1024, 1024));
    let (_, width, height, _) = renderer.backend().frames[0];
    assert_eq!((width, height), (1024, 1024));
}

#[test]
fn failed_backend_resize_leaves_camera_untouched() {
    let mut renderer = Renderer::new(reference_camera(800, 600), MockBackend::failing_resize());
    assert!(matches!(
        renderer.resize(1920, 1080),
        Err(RendererError::Backend(BackendError::SurfaceLost))
    ));
    assert_eq!((renderer.camera().width(), renderer.camera().height()), (800, 600));
}

#[test]
fn invalid_pose_change_is_rejected() {
    let mut renderer = renderer();
    let before = *renderer.camera();
    assert!(matches!(
        renderer.set_fov_y(0.0),
        Err(RendererError::Camera(_))
    ));
    assert_eq!(*renderer.camera(), before);
}

#[test]
fn model_transform_flows_into_mvp() {
    let mut renderer = renderer();
    let model = Matrix4x4::from_translation(Vector3::new(0.0, 0.0, 10.0));
    renderer.set_model_transform(model);
    renderer.render_frame().unwrap();

    let camera = renderer.camera();
    let expected = camera.projection() * (camera.view() * model);
    assert_eq!(renderer.backend().frames[0].3, expected);
    assert_eq!(renderer.model_transform(), model);
}

#[test]
fn staging_errors_surface_through_renderer() {
    let mut renderer = renderer();
    let mut scene = Scene::demo();
    scene.materials.clear();
    assert!(matches!(renderer.load(&scene), Err(RendererError::Staging(_))));
    assert!(renderer.scene_handle().is_none());
}
