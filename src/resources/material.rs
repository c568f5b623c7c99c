//! Phong material definitions

use super::TextureData;
use crate::math::Vector3;
use std::sync::Arc;

/// Surface material as read from an MTL library
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    /// Position in the scene's material table
    pub material_index: u32,
    pub ambient: Vector3,
    pub diffuse: Vector3,
    pub specular: Vector3,
    pub shininess: f32,
    pub opacity: f32,
    /// Shared, never mutated after load
    pub diffuse_texture: Option<Arc<TextureData>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            material_index: 0,
            ambient: Vector3::new(0.1, 0.1, 0.1),
            diffuse: Vector3::new(0.5, 0.5, 0.5),
            specular: Vector3::ZERO,
            shininess: 1.0,
            opacity: 1.0,
            diffuse_texture: None,
        }
    }
}

impl Material {
    pub fn new(name: &str, material_index: u32) -> Self {
        Self {
            name: name.to_string(),
            material_index,
            ..Default::default()
        }
    }

    pub fn with_ambient(mut self, ambient: Vector3) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_diffuse(mut self, diffuse: Vector3) -> Self {
        self.diffuse = diffuse;
        self
    }

    pub fn with_specular(mut self, specular: Vector3, shininess: f32) -> Self {
        self.specular = specular;
        self.shininess = shininess;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_diffuse_texture(mut self, texture: Arc<TextureData>) -> Self {
        self.diffuse_texture = Some(texture);
        self
    }

    pub fn has_texture(&self) -> bool {
        self.diffuse_texture.is_some()
    }
}
