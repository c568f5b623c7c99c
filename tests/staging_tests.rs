//! Scene staging: vertex order, material validation and texture slots.

mod common;

use common::{materials, strip};
use pinhole_renderer::resources::{Material, Scene, TextureData};
use pinhole_renderer::staging::{stage, StagedScene, StagedVertex, StagingError};
use rstest::rstest;
use std::sync::Arc;

#[test]
fn surfaces_are_flattened_in_order() {
    let scene = Scene::new(vec![strip("a", 0, 10), strip("b", 1, 5)], materials(2));
    let staged = stage(&scene).unwrap();

    assert_eq!(staged.vertex_count(), 45);
    assert_eq!(staged.triangle_count(), 15);
    assert_eq!(staged.vertex_bytes().len(), 45 * StagedVertex::STRIDE as usize);

    let indices: Vec<u32> = staged.vertices.iter().map(|v| v.material_index).collect();
    assert!(indices[..30].iter().all(|&i| i == 0));
    assert!(indices[30..].iter().all(|&i| i == 1));

    // Each strip triangle starts at its own x offset
    for (i, triangle) in staged.vertices.chunks_exact(3).enumerate() {
        let x = (if i < 10 { i } else { i - 10 }) as f32;
        assert_eq!(triangle[0].position, [x, 0.0, 0.0]);
    }

    assert_eq!(staged.draw_ranges.len(), 2);
    assert_eq!(staged.draw_ranges[0].vertices(), 0..30);
    assert_eq!(staged.draw_ranges[1].vertices(), 30..45);
}

#[rstest]
#[case::empty_table(0, 0)]
#[case::past_the_end(2, 2)]
#[case::far_past_the_end(1, 7)]
fn missing_material_is_reported(#[case] table_size: u32, #[case] material_index: u32) {
    let scene = Scene::new(vec![strip("broken", material_index, 1)], materials(table_size));
    let err = stage(&scene).unwrap_err();
    assert_eq!(
        err,
        StagingError::MissingMaterial {
            surface: "broken".to_string(),
            material_index,
            available: table_size as usize,
        }
    );
}

#[test]
fn material_table_must_be_dense() {
    let table = vec![Material::new("first", 0), Material::new("skipped", 2)];
    let scene = Scene::new(vec![strip("a", 0, 1)], table);
    assert!(matches!(
        stage(&scene),
        Err(StagingError::NonDenseMaterialIndex { position: 1, material_index: 2, .. })
    ));
}

#[test]
fn untextured_material_uses_fallback_slot() {
    let texture = Arc::new(TextureData::checkerboard(4, [0, 0, 0, 255], [255; 4]));
    let table = vec![
        Material::new("plain", 0),
        Material::new("checker", 1).with_diffuse_texture(Arc::clone(&texture)),
        Material::new("checker_again", 2).with_diffuse_texture(texture),
    ];
    let scene = Scene::new(vec![strip("a", 0, 1), strip("b", 1, 1), strip("c", 2, 1)], table);
    let staged = stage(&scene).unwrap();

    assert_eq!(staged.materials[0].texture_index, StagedScene::FALLBACK_TEXTURE);
    assert_eq!(staged.materials[1].texture_index, 1);
    assert_eq!(staged.materials[2].texture_index, 1);
    assert_eq!(staged.textures.len(), 2);
    assert_eq!(*staged.textures[0], TextureData::white());
}

#[test]
fn empty_scene_stages_to_nothing() {
    let staged = stage(&Scene::default()).unwrap();
    assert_eq!(staged.vertex_count(), 0);
    assert!(staged.draw_ranges.is_empty());
    assert_eq!(staged.textures.len(), 1);
}
