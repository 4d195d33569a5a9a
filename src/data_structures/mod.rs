//! Engine data structures: meshes, textures, materials, entities and the light.
//!
//! - `mesh` holds the interleaved vertex layout, the cube geometry and GPU buffers
//! - `texture` decodes images and wraps GPU textures
//! - `material` pairs an albedo and a specular texture with a shininess
//! - `entity` places a mesh in the world with a shared material
//! - `light` is the single directional light of a scene

pub mod entity;
pub mod light;
pub mod material;
pub mod mesh;
pub mod texture;
