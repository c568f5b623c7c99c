//! CPU ray tracer backend
//!
//! Casts one primary ray per pixel from [`RayGenParams`], finds the closest
//! triangle through a BVH and shades it with a light placed at the eye.

mod bvh;

pub use bvh::{intersect_triangle, Aabb, Bvh, Hit};

use crate::backend::traits::*;
use crate::math::{Matrix4x4, Vector3};
use crate::resources::TextureData;
use crate::scene::{FrameSnapshot, RayGenParams};
use crate::staging::{GpuMaterial, StagedScene};
use bytemuck::Zeroable;
use glam::Vec2;
use std::sync::Arc;

/// Triangle soup in object space, three entries per triangle
struct SceneGeometry {
    handle: SceneHandle,
    positions: Vec<[Vector3; 3]>,
    normals: Vec<[Vector3; 3]>,
    colors: Vec<[Vector3; 3]>,
    uvs: Vec<[Vec2; 3]>,
    material_indices: Vec<u32>,
    materials: Vec<GpuMaterial>,
    textures: Vec<Arc<TextureData>>,
}

/// Geometry moved into world space by one model matrix
struct WorldGeometry {
    model: Matrix4x4,
    positions: Vec<[Vector3; 3]>,
    normals: Vec<[Vector3; 3]>,
    bvh: Bvh,
}

/// Renders the staged scene into an RGBA8 image sized by each frame's snapshot
pub struct RayTracer {
    background: [f32; 4],
    scene: Option<SceneGeometry>,
    world: Option<WorldGeometry>,
    next_scene_id: u64,
}

impl Default for RayTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl RayTracer {
    pub fn new() -> Self {
        Self {
            background: [0.2, 0.3, 0.3, 1.0],
            scene: None,
            world: None,
            next_scene_id: 1,
        }
    }

    /// Linear RGBA written where primary rays miss
    pub fn with_background(mut self, rgba: [f32; 4]) -> Self {
        self.background = rgba;
        self
    }

    /// Rebuild the world-space BVH if the model matrix changed
    fn prepare_world(&mut self, model: Matrix4x4) -> BackendResult<()> {
        let scene = self.scene.as_ref().ok_or(BackendError::NotStaged)?;
        if self.world.as_ref().is_some_and(|w| w.model == model) {
            return Ok(());
        }

        let positions: Vec<[Vector3; 3]> = scene
            .positions
            .iter()
            .map(|t| t.map(|p| model.transform_point(p)))
            .collect();
        let normal_matrix = model.normal_matrix().unwrap_or(model);
        let normals = scene
            .normals
            .iter()
            .map(|t| {
                t.map(|n| {
                    normal_matrix
                        .transform_vector(n)
                        .try_normalized()
                        .unwrap_or(n)
                })
            })
            .collect();

        let bvh = Bvh::build(&positions);
        log::debug!(
            "Built BVH: {} triangles, {} nodes",
            positions.len(),
            bvh.node_count()
        );

        self.world = Some(WorldGeometry {
            model,
            positions,
            normals,
            bvh,
        });
        Ok(())
    }

    fn trace(&self, params: &RayGenParams) -> BackendResult<FrameImage> {
        let scene = self.scene.as_ref().ok_or(BackendError::NotStaged)?;
        let world = self.world.as_ref().ok_or(BackendError::NotStaged)?;

        let background = encode(self.background);
        let mut image = FrameImage::new(params.width, params.height);
        for py in 0..params.height {
            for px in 0..params.width {
                let ray = params.primary_ray(px, py);
                let rgba = match world.bvh.intersect(&world.positions, &ray, f32::INFINITY) {
                    Some(hit) => encode(shade(scene, world, &hit, ray.direction)),
                    None => background,
                };
                image.set_pixel(px, py, rgba);
            }
        }
        Ok(image)
    }
}

impl RenderBackend for RayTracer {
    fn name(&self) -> &'static str {
        "cpu ray tracer"
    }

    fn stage(&mut self, staged: &StagedScene) -> BackendResult<SceneHandle> {
        let triangle_count = staged.triangle_count();
        let mut geometry = SceneGeometry {
            handle: SceneHandle(self.next_scene_id),
            positions: Vec::with_capacity(triangle_count),
            normals: Vec::with_capacity(triangle_count),
            colors: Vec::with_capacity(triangle_count),
            uvs: Vec::with_capacity(triangle_count),
            material_indices: Vec::with_capacity(triangle_count),
            materials: staged.materials.clone(),
            textures: staged.textures.clone(),
        };
        self.next_scene_id += 1;

        for tri in staged.vertices.chunks_exact(3) {
            geometry
                .positions
                .push([0, 1, 2].map(|i| Vector3::from(tri[i].position)));
            geometry
                .normals
                .push([0, 1, 2].map(|i| Vector3::from(tri[i].normal)));
            geometry
                .colors
                .push([0, 1, 2].map(|i| Vector3::from(tri[i].color)));
            geometry.uvs.push([0, 1, 2].map(|i| Vec2::from(tri[i].uv)));
            geometry.material_indices.push(tri[0].material_index);
        }

        log::info!(
            "Ray tracer staged {} triangles, {} materials",
            geometry.positions.len(),
            geometry.materials.len()
        );

        let handle = geometry.handle;
        self.scene = Some(geometry);
        self.world = None;
        Ok(handle)
    }

    /// No output targets to rebuild; images follow the camera resolution
    fn resize(&mut self, width: u32, height: u32) -> BackendResult<(u32, u32)> {
        Ok((width, height))
    }

    fn render_frame(&mut self, frame: &FrameSnapshot) -> BackendResult<FrameOutput> {
        self.prepare_world(frame.model())?;
        let params = frame.ray_generation();
        let image = self.trace(&params)?;
        log::debug!(
            "Frame {} traced at {}x{}",
            frame.frame_index(),
            params.width,
            params.height
        );
        Ok(FrameOutput::Image(image))
    }
}

/// Headlight Blinn-Phong: light and viewer both sit at the eye
fn shade(scene: &SceneGeometry, world: &WorldGeometry, hit: &Hit, direction: Vector3) -> [f32; 4] {
    let i = hit.triangle as usize;
    let w = 1.0 - hit.u - hit.v;
    let interpolate = |a: Vector3, b: Vector3, c: Vector3| a * w + b * hit.u + c * hit.v;

    let [n0, n1, n2] = world.normals[i];
    let [p0, p1, p2] = world.positions[i];
    let face = (p1 - p0).cross(p2 - p0).try_normalized().unwrap_or(-direction);
    let mut normal = interpolate(n0, n1, n2).try_normalized().unwrap_or(face);
    let to_eye = -direction;
    if normal.dot(to_eye) < 0.0 {
        normal = -normal;
    }

    let [c0, c1, c2] = scene.colors[i];
    let color = interpolate(c0, c1, c2);
    let [t0, t1, t2] = scene.uvs[i];
    let uv = t0 * w + t1 * hit.u + t2 * hit.v;

    let material = scene
        .materials
        .get(scene.material_indices[i] as usize)
        .copied()
        .unwrap_or_else(|| GpuMaterial {
            diffuse: [0.5, 0.5, 0.5, 1.0],
            ..GpuMaterial::zeroed()
        });
    let texel = scene
        .textures
        .get(material.texture_index as usize)
        .map(|t| t.sample_nearest(uv.x, uv.y))
        .unwrap_or([255; 4]);
    let tex = Vector3::new(
        srgb_to_linear(texel[0]),
        srgb_to_linear(texel[1]),
        srgb_to_linear(texel[2]),
    );

    let diffuse = Vector3::from([material.diffuse[0], material.diffuse[1], material.diffuse[2]]);
    let ambient = Vector3::from([material.ambient[0], material.ambient[1], material.ambient[2]]);
    let specular = Vector3::from([material.specular[0], material.specular[1], material.specular[2]]);
    let shininess = material.specular[3].max(1.0);

    let n_dot_l = normal.dot(to_eye).max(0.0);
    let rgb = ambient.mul_elem(tex)
        + diffuse.mul_elem(tex).mul_elem(color) * n_dot_l
        + specular * n_dot_l.powf(shininess);

    [rgb.x, rgb.y, rgb.z, material.diffuse[3] * texel[3] as f32 / 255.0]
}

fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> u8 {
    let c = c.clamp(0.0, 1.0);
    let s = if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (s * 255.0 + 0.5) as u8
}

fn encode(rgba: [f32; 4]) -> [u8; 4] {
    [
        linear_to_srgb(rgba[0]),
        linear_to_srgb(rgba[1]),
        linear_to_srgb(rgba[2]),
        (rgba[3].clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_encoding_round_trips_byte_values() {
        for byte in [0u8, 1, 10, 64, 128, 200, 255] {
            assert_eq!(linear_to_srgb(srgb_to_linear(byte)), byte);
        }
    }

    #[test]
    fn non_uniform_scale_keeps_normals_perpendicular() {
        use crate::resources::{Material, Scene, Surface, Triangle, Vertex};

        // Plane x + y = 1, tilted normal
        let normal = Vector3::new(1.0, 1.0, 0.0).try_normalized().unwrap();
        let vertex = |x, y, z| Vertex::new(Vector3::new(x, y, z), normal, Vector3::ONE, Vec2::ZERO);
        let triangle = Triangle::new(vertex(1.0, 0.0, 0.0), vertex(0.0, 1.0, 0.0), vertex(0.0, 1.0, 1.0));
        let scene = Scene::new(
            vec![Surface::new("tilted", 0).with_triangles(vec![triangle])],
            vec![Material::new("white", 0)],
        );

        let mut tracer = RayTracer::new();
        tracer.stage(&crate::staging::stage(&scene).unwrap()).unwrap();
        let model = Matrix4x4::from_scale(Vector3::new(4.0, 1.0, 1.0));
        tracer.prepare_world(model).unwrap();

        let world = tracer.world.as_ref().unwrap();
        let [p0, p1, p2] = world.positions[0];
        let n = world.normals[0][0];
        assert!(n.dot(p1 - p0).abs() < 1e-5);
        assert!(n.dot(p2 - p1).abs() < 1e-5);
        assert!((n.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn rendering_before_staging_fails() {
        let camera = crate::RendererConfig::default().camera().unwrap();
        let frame = FrameSnapshot::capture(&camera, Matrix4x4::IDENTITY, 0);
        let mut tracer = RayTracer::new();
        assert!(matches!(
            tracer.render_frame(&frame),
            Err(BackendError::NotStaged)
        ));
    }
}
