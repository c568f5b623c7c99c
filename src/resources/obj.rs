//! Wavefront OBJ scene loading
//!
//! Parsing is delegated to `tobj` and texture decoding to `image`. Each OBJ
//! model becomes one [`Surface`]; MTL materials become the dense material table.

use super::{Material, Scene, Surface, TextureData, Triangle, Vertex};
use crate::math::Vector3;
use glam::Vec2;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("failed to load '{path}': {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("'{0}' contains no triangles")]
    Empty(PathBuf),
}

/// Load an OBJ file and its MTL library into a [`Scene`]
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneError> {
    let path = path.as_ref();
    let options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };

    let (models, obj_materials) =
        tobj::load_obj(path, &options).map_err(|source| SceneError::Load {
            path: path.to_path_buf(),
            source,
        })?;

    let obj_materials = obj_materials.unwrap_or_else(|err| {
        log::warn!("No usable material library for {:?}: {}", path, err);
        Vec::new()
    });

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut textures = TextureCache::new(base_dir);
    let mut materials: Vec<Material> = obj_materials
        .iter()
        .enumerate()
        .map(|(index, m)| convert_material(m, index as u32, &mut textures))
        .collect();

    // Models without `usemtl` share one default material appended to the table
    let mut fallback_index = None;
    let mut surfaces = Vec::with_capacity(models.len());
    for model in &models {
        let material_index = match model.mesh.material_id {
            Some(id) if id < materials.len() => id as u32,
            _ => *fallback_index.get_or_insert_with(|| {
                let index = materials.len() as u32;
                materials.push(Material::new("default", index));
                index
            }),
        };

        let surface = convert_mesh(&model.name, &model.mesh, material_index);
        if surface.triangle_count() > 0 {
            surfaces.push(surface);
        }
    }

    let scene = Scene::new(surfaces, materials);
    if scene.is_empty() {
        return Err(SceneError::Empty(path.to_path_buf()));
    }

    log::info!(
        "Loaded {:?}: {} surfaces, {} triangles, {} materials, {} textures",
        path,
        scene.surfaces.len(),
        scene.triangle_count(),
        scene.materials.len(),
        textures.loaded()
    );
    Ok(scene)
}

fn convert_material(m: &tobj::Material, index: u32, textures: &mut TextureCache) -> Material {
    let defaults = Material::default();
    let mut material = Material::new(&m.name, index)
        .with_ambient(m.ambient.map(Vector3::from).unwrap_or(defaults.ambient))
        .with_diffuse(m.diffuse.map(Vector3::from).unwrap_or(defaults.diffuse))
        .with_specular(
            m.specular.map(Vector3::from).unwrap_or(defaults.specular),
            m.shininess.unwrap_or(defaults.shininess),
        )
        .with_opacity(m.dissolve.unwrap_or(1.0));

    if let Some(file) = m.diffuse_texture.as_deref().filter(|f| !f.is_empty()) {
        if let Some(texture) = textures.get(file) {
            material = material.with_diffuse_texture(texture);
        }
    }
    material
}

fn convert_mesh(name: &str, mesh: &tobj::Mesh, material_index: u32) -> Surface {
    let vertex = |i: usize| -> Vertex {
        let position = read3(&mesh.positions, i).unwrap_or(Vector3::ZERO);
        let normal = read3(&mesh.normals, i).unwrap_or(Vector3::ZERO);
        let color = read3(&mesh.vertex_color, i).unwrap_or(Vector3::ONE);
        // OBJ puts v = 0 at the bottom, images store the top row first
        let uv = mesh
            .texcoords
            .get(i * 2..i * 2 + 2)
            .map(|t| Vec2::new(t[0], 1.0 - t[1]))
            .unwrap_or(Vec2::ZERO);
        Vertex::new(position, normal, color, uv)
    };

    let mut surface = Surface::new(name, material_index);
    for face in mesh.indices.chunks_exact(3) {
        let mut vertices = [
            vertex(face[0] as usize),
            vertex(face[1] as usize),
            vertex(face[2] as usize),
        ];

        if mesh.normals.is_empty() {
            let flat = Triangle::new(vertices[0], vertices[1], vertices[2])
                .face_normal()
                .unwrap_or(Vector3::Z);
            for v in &mut vertices {
                v.normal = flat;
            }
        }

        let [a, b, c] = vertices;
        surface.push(Triangle::new(a, b, c));
    }
    surface
}

fn read3(data: &[f32], i: usize) -> Option<Vector3> {
    data.get(i * 3..i * 3 + 3)
        .map(|v| Vector3::new(v[0], v[1], v[2]))
}

/// Decodes each referenced texture file once
struct TextureCache<'a> {
    base_dir: &'a Path,
    entries: HashMap<String, Option<Arc<TextureData>>>,
}

impl<'a> TextureCache<'a> {
    fn new(base_dir: &'a Path) -> Self {
        Self {
            base_dir,
            entries: HashMap::new(),
        }
    }

    fn get(&mut self, file: &str) -> Option<Arc<TextureData>> {
        let base_dir = self.base_dir;
        self.entries
            .entry(file.to_string())
            .or_insert_with(|| match TextureData::from_file(base_dir.join(file)) {
                Ok(texture) => {
                    log::debug!("Texture '{}' {}x{}", file, texture.width, texture.height);
                    Some(Arc::new(texture))
                }
                Err(err) => {
                    log::warn!("{}, falling back to untextured material", err);
                    None
                }
            })
            .clone()
    }

    fn loaded(&self) -> usize {
        self.entries.values().filter(|t| t.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn fixture_dir(test: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pinhole-obj-{}-{}", test, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn quad_with_material_becomes_two_triangles() {
        let dir = fixture_dir("quad");
        write_fixture(
            &dir,
            "quad.mtl",
            "newmtl red\nKa 0.1 0 0\nKd 1 0 0\nKs 0.5 0.5 0.5\nNs 16\nmap_Kd missing.png\n",
        );
        let obj = write_fixture(
            &dir,
            "quad.obj",
            "mtllib quad.mtl\no quad\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\nusemtl red\nf 1/1 2/2 3/3 4/4\n",
        );

        let scene = load_scene(&obj).unwrap();
        assert_eq!(scene.surfaces.len(), 1);
        assert_eq!(scene.triangle_count(), 2);
        assert_eq!(scene.materials.len(), 1);

        let material = &scene.materials[0];
        assert_eq!(material.name, "red");
        assert_eq!(material.diffuse, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(material.shininess, 16.0);
        // Missing texture file falls back to no texture
        assert!(!material.has_texture());

        let first = scene.surfaces[0].triangles()[0];
        assert_eq!(first.vertex(0).uv(), Vec2::new(0.0, 1.0));
        assert_eq!(first.vertex(0).normal, Vector3::Z);
    }

    #[test]
    fn model_without_material_gets_default() {
        let dir = fixture_dir("nomtl");
        let obj = write_fixture(&dir, "tri.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");

        let scene = load_scene(&obj).unwrap();
        assert_eq!(scene.materials.len(), 1);
        assert_eq!(scene.materials[0].material_index, 0);
        assert_eq!(scene.surfaces[0].material_index, 0);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let result = load_scene("/definitely/not/here.obj");
        assert!(matches!(result, Err(SceneError::Load { .. })));
    }

    #[test]
    fn file_without_faces_is_empty() {
        let dir = fixture_dir("empty");
        let obj = write_fixture(&dir, "points.obj", "v 0 0 0\nv 1 0 0\n");
        assert!(matches!(load_scene(&obj), Err(SceneError::Empty(_))));
    }
}
