//! Triangles, surfaces and the scene they make up

use super::{Material, Vertex};
use crate::math::Vector3;
use glam::Vec2;

/// Three vertices in counter-clockwise order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    pub fn vertex(&self, i: usize) -> &Vertex {
        &self.vertices[i]
    }

    pub fn vertices(&self) -> &[Vertex; 3] {
        &self.vertices
    }

    /// Geometric normal from the winding order, `None` for degenerate triangles
    pub fn face_normal(&self) -> Option<Vector3> {
        let [a, b, c] = &self.vertices;
        (b.position - a.position)
            .cross(c.position - a.position)
            .try_normalized()
    }
}

/// A named group of triangles sharing one material
#[derive(Debug, Clone)]
pub struct Surface {
    pub name: String,
    pub material_index: u32,
    triangles: Vec<Triangle>,
}

impl Surface {
    pub fn new(name: &str, material_index: u32) -> Self {
        Self {
            name: name.to_string(),
            material_index,
            triangles: Vec::new(),
        }
    }

    pub fn with_triangles(mut self, triangles: Vec<Triangle>) -> Self {
        self.triangles = triangles;
        self
    }

    pub fn push(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Axis-aligned unit cube centered at the origin, two triangles per face
    pub fn cube(name: &str, material_index: u32) -> Self {
        let faces = [
            (Vector3::Z, Vector3::X, Vector3::Y),
            (-Vector3::Z, -Vector3::X, Vector3::Y),
            (Vector3::X, -Vector3::Z, Vector3::Y),
            (-Vector3::X, Vector3::Z, Vector3::Y),
            (Vector3::Y, Vector3::X, -Vector3::Z),
            (-Vector3::Y, Vector3::X, Vector3::Z),
        ];

        let mut surface = Self::new(name, material_index);
        for (normal, right, up) in faces {
            let center = normal * 0.5;
            let corner = |u: f32, v: f32| {
                Vertex::new(
                    center + right * (u - 0.5) + up * (v - 0.5),
                    normal,
                    Vector3::ONE,
                    Vec2::new(u, 1.0 - v),
                )
            };
            let (v00, v10, v11, v01) = (
                corner(0.0, 0.0),
                corner(1.0, 0.0),
                corner(1.0, 1.0),
                corner(0.0, 1.0),
            );
            surface.push(Triangle::new(v00, v10, v11));
            surface.push(Triangle::new(v00, v11, v01));
        }
        surface
    }

    /// Square in the XY plane facing +Z, split into `subdivisions`² quads
    pub fn plane(name: &str, material_index: u32, size: f32, subdivisions: u32) -> Self {
        let subdivisions = subdivisions.max(1);
        let half = size * 0.5;
        let step = size / subdivisions as f32;
        let vertex = |x: u32, y: u32| {
            Vertex::new(
                Vector3::new(-half + x as f32 * step, -half + y as f32 * step, 0.0),
                Vector3::Z,
                Vector3::ONE,
                Vec2::new(
                    x as f32 / subdivisions as f32,
                    1.0 - y as f32 / subdivisions as f32,
                ),
            )
        };

        let mut surface = Self::new(name, material_index);
        for y in 0..subdivisions {
            for x in 0..subdivisions {
                let (v00, v10, v11, v01) =
                    (vertex(x, y), vertex(x + 1, y), vertex(x + 1, y + 1), vertex(x, y + 1));
                surface.push(Triangle::new(v00, v10, v11));
                surface.push(Triangle::new(v00, v11, v01));
            }
        }
        surface
    }
}

/// Ordered surfaces and the material table they index into
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub surfaces: Vec<Surface>,
    pub materials: Vec<Material>,
}

impl Scene {
    pub fn new(surfaces: Vec<Surface>, materials: Vec<Material>) -> Self {
        Self {
            surfaces,
            materials,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.surfaces.iter().map(Surface::triangle_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    /// Center and radius of a sphere enclosing every vertex
    pub fn bounding_sphere(&self) -> Option<(Vector3, f32)> {
        let mut positions = self
            .surfaces
            .iter()
            .flat_map(|s| s.triangles())
            .flat_map(|t| t.vertices().iter().map(|v| v.position));

        let first = positions.next()?;
        let (min, max) = positions.fold((first, first), |(min, max), p| {
            (
                Vector3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
                Vector3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
            )
        });
        let center = (min + max) * 0.5;
        Some((center, (max - center).length()))
    }

    /// A single lit cube, used when no scene file is given
    pub fn demo() -> Self {
        let material = Material::new("default", 0)
            .with_diffuse(Vector3::new(0.8, 0.5, 0.3))
            .with_specular(Vector3::new(0.5, 0.5, 0.5), 32.0);
        let offset = Vector3::new(0.0, 0.0, 35.0);
        let unit = Surface::cube("cube", 0);
        let triangles = unit
            .triangles()
            .iter()
            .map(|t| {
                let [a, b, c] = (*t.vertices()).map(|mut v| {
                    v.position = v.position * 100.0 + offset;
                    v
                });
                Triangle::new(a, b, c)
            })
            .collect();
        Self::new(vec![unit.with_triangles(triangles)], vec![material])
    }
}
