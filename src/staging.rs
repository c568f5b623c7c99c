//! Scene to GPU staging
//!
//! Flattens a [`Scene`] into one non-indexed vertex stream, a material table,
//! a texture table and per-material draw ranges. Both backends consume the
//! result; the vertex layout is defined once here.

use crate::backend::types::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};
use crate::resources::{Material, Scene, TextureData};
use bytemuck::{Pod, Zeroable};
use std::mem::{offset_of, size_of};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StagingError {
    #[error("surface '{surface}' references material {material_index}, but only {available} materials exist")]
    MissingMaterial {
        surface: String,
        material_index: u32,
        available: usize,
    },
    #[error("material '{name}' at table position {position} has material_index {material_index}")]
    NonDenseMaterialIndex {
        name: String,
        position: usize,
        material_index: u32,
    },
}

/// One vertex of the flattened stream
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct StagedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
    pub uv: [f32; 2],
    pub ambient: [f32; 3],
    pub specular: [f32; 3],
    pub material_index: u32,
}

impl StagedVertex {
    pub const STRIDE: u64 = size_of::<Self>() as u64;

    /// Attribute locations match the rasterizer's WGSL vertex input
    pub fn layout() -> VertexBufferLayout {
        let attribute = |location, format, offset: usize| VertexAttribute {
            location,
            format,
            offset: offset as u64,
        };
        VertexBufferLayout {
            array_stride: Self::STRIDE,
            step_mode: VertexStepMode::Vertex,
            attributes: vec![
                attribute(0, VertexFormat::Float32x3, offset_of!(Self, position)),
                attribute(1, VertexFormat::Float32x3, offset_of!(Self, normal)),
                attribute(2, VertexFormat::Float32x3, offset_of!(Self, color)),
                attribute(3, VertexFormat::Float32x2, offset_of!(Self, uv)),
                attribute(4, VertexFormat::Float32x3, offset_of!(Self, ambient)),
                attribute(5, VertexFormat::Float32x3, offset_of!(Self, specular)),
                attribute(6, VertexFormat::Uint32, offset_of!(Self, material_index)),
            ],
        }
    }
}

/// Material as laid out in the GPU storage buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuMaterial {
    /// rgb + opacity
    pub diffuse: [f32; 4],
    pub ambient: [f32; 4],
    /// rgb + shininess
    pub specular: [f32; 4],
    pub texture_index: u32,
    pub _pad: [u32; 3],
}

impl GpuMaterial {
    fn new(material: &Material, texture_index: u32) -> Self {
        Self {
            diffuse: material.diffuse.extend(material.opacity),
            ambient: material.ambient.extend(0.0),
            specular: material.specular.extend(material.shininess),
            texture_index,
            _pad: [0; 3],
        }
    }
}

/// Contiguous vertices drawn with one material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRange {
    pub first_vertex: u32,
    pub vertex_count: u32,
    pub material_index: u32,
}

impl DrawRange {
    pub fn vertices(&self) -> std::ops::Range<u32> {
        self.first_vertex..self.first_vertex + self.vertex_count
    }
}

/// Immutable staged scene
#[derive(Debug, Clone)]
pub struct StagedScene {
    pub vertices: Vec<StagedVertex>,
    pub materials: Vec<GpuMaterial>,
    /// Slot 0 is the white fallback
    pub textures: Vec<Arc<TextureData>>,
    pub draw_ranges: Vec<DrawRange>,
}

impl StagedScene {
    pub const FALLBACK_TEXTURE: u32 = 0;

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn material_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.materials)
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Texture the material samples, resolved through the texture table
    pub fn material_texture(&self, material_index: u32) -> Option<&Arc<TextureData>> {
        let material = self.materials.get(material_index as usize)?;
        self.textures.get(material.texture_index as usize)
    }
}

/// Flatten a scene into GPU-ready buffers
pub fn stage(scene: &Scene) -> Result<StagedScene, StagingError> {
    stage_inner(scene).map_err(|err| {
        log::error!("Staging failed: {}", err);
        err
    })
}

fn stage_inner(scene: &Scene) -> Result<StagedScene, StagingError> {
    for (position, material) in scene.materials.iter().enumerate() {
        if material.material_index as usize != position {
            return Err(StagingError::NonDenseMaterialIndex {
                name: material.name.clone(),
                position,
                material_index: material.material_index,
            });
        }
    }

    let mut textures = vec![Arc::new(TextureData::white())];
    let materials: Vec<GpuMaterial> = scene
        .materials
        .iter()
        .map(|material| {
            let texture_index = match &material.diffuse_texture {
                None => StagedScene::FALLBACK_TEXTURE,
                Some(texture) => match textures.iter().position(|t| Arc::ptr_eq(t, texture)) {
                    Some(slot) => slot as u32,
                    None => {
                        textures.push(Arc::clone(texture));
                        (textures.len() - 1) as u32
                    }
                },
            };
            GpuMaterial::new(material, texture_index)
        })
        .collect();

    let mut vertices = Vec::with_capacity(scene.triangle_count() * 3);
    let mut draw_ranges: Vec<DrawRange> = Vec::new();

    for surface in &scene.surfaces {
        let material = scene
            .materials
            .get(surface.material_index as usize)
            .ok_or_else(|| StagingError::MissingMaterial {
                surface: surface.name.clone(),
                material_index: surface.material_index,
                available: scene.materials.len(),
            })?;

        let first_vertex = vertices.len() as u32;
        for triangle in surface.triangles() {
            for vertex in triangle.vertices() {
                vertices.push(StagedVertex {
                    position: vertex.position.to_array(),
                    normal: vertex.normal.to_array(),
                    color: vertex.color.to_array(),
                    uv: vertex.uv().to_array(),
                    ambient: material.ambient.to_array(),
                    specular: material.specular.to_array(),
                    material_index: surface.material_index,
                });
            }
        }

        let vertex_count = vertices.len() as u32 - first_vertex;
        if vertex_count == 0 {
            continue;
        }
        match draw_ranges.last_mut() {
            Some(last)
                if last.material_index == surface.material_index
                    && last.first_vertex + last.vertex_count == first_vertex =>
            {
                last.vertex_count += vertex_count;
            }
            _ => draw_ranges.push(DrawRange {
                first_vertex,
                vertex_count,
                material_index: surface.material_index,
            }),
        }
    }

    log::debug!(
        "Staged {} vertices, {} materials, {} textures, {} draw ranges",
        vertices.len(),
        materials.len(),
        textures.len(),
        draw_ranges.len()
    );

    Ok(StagedScene {
        vertices,
        materials,
        textures,
        draw_ranges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Surface;

    #[test]
    fn vertex_layout_matches_struct() {
        assert_eq!(size_of::<StagedVertex>(), 72);
        let offsets: Vec<u64> = StagedVertex::layout()
            .attributes
            .iter()
            .map(|a| a.offset)
            .collect();
        assert_eq!(offsets, vec![0, 12, 24, 36, 44, 56, 68]);
        assert!(StagedVertex::layout().is_packed());
    }

    #[test]
    fn gpu_material_is_64_bytes() {
        assert_eq!(size_of::<GpuMaterial>(), 64);
    }

    #[test]
    fn material_records_are_indexed_by_material_index() {
        use crate::math::Vector3;

        let scene = Scene::new(
            vec![Surface::cube("a", 0)],
            vec![
                Material::new("m0", 0),
                Material::new("m1", 1).with_diffuse(Vector3::new(0.25, 0.5, 0.75)),
            ],
        );
        let staged = stage(&scene).unwrap();
        let bytes = staged.material_bytes();
        assert_eq!(bytes.len(), 2 * size_of::<GpuMaterial>());

        // One whole record per material, diffuse first
        let record: &GpuMaterial = bytemuck::from_bytes(&bytes[64..128]);
        assert_eq!(&record.diffuse[..3], &[0.25, 0.5, 0.75]);
        assert_eq!(*record, staged.materials[1]);
    }

    #[test]
    fn adjacent_surfaces_with_same_material_share_a_range() {
        let scene = Scene::new(
            vec![
                Surface::cube("a", 0),
                Surface::cube("b", 0),
                Surface::cube("c", 1),
            ],
            vec![Material::new("m0", 0), Material::new("m1", 1)],
        );
        let staged = stage(&scene).unwrap();
        assert_eq!(
            staged.draw_ranges,
            vec![
                DrawRange {
                    first_vertex: 0,
                    vertex_count: 72,
                    material_index: 0
                },
                DrawRange {
                    first_vertex: 72,
                    vertex_count: 36,
                    material_index: 1
                },
            ]
        );
    }

    #[test]
    fn shared_texture_occupies_one_slot() {
        let texture = Arc::new(TextureData::checkerboard(16, [0; 4], [255; 4]));
        let scene = Scene::new(
            vec![Surface::cube("a", 0)],
            vec![
                Material::new("m0", 0).with_diffuse_texture(Arc::clone(&texture)),
                Material::new("m1", 1).with_diffuse_texture(texture),
                Material::new("m2", 2),
            ],
        );
        let staged = stage(&scene).unwrap();
        assert_eq!(staged.textures.len(), 2);
        assert_eq!(staged.materials[0].texture_index, 1);
        assert_eq!(staged.materials[1].texture_index, 1);
        assert_eq!(staged.materials[2].texture_index, 0);
    }
}
