//! Scene resources
//!
//! Vertices, triangles, surfaces, materials and textures, plus the OBJ loader
//! that builds them.

mod material;
mod mesh;
mod obj;
mod texture;
mod vertex;

pub use material::*;
pub use mesh::*;
pub use obj::*;
pub use texture::*;
pub use vertex::*;
