//! Scene vertex

use crate::math::Vector3;
use glam::Vec2;

/// Number of texture coordinate sets carried by every vertex
pub const TEXTURE_COORD_SETS: usize = 1;

/// A loaded vertex, immutable once the scene is built
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: Vector3,
    pub normal: Vector3,
    pub color: Vector3,
    pub texture_coords: [Vec2; TEXTURE_COORD_SETS],
}

impl Vertex {
    pub fn new(position: Vector3, normal: Vector3, color: Vector3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            color,
            texture_coords: [uv; TEXTURE_COORD_SETS],
        }
    }

    /// First texture coordinate set
    pub fn uv(&self) -> Vec2 {
        self.texture_coords[0]
    }
}
