//! forward-ngin
//!
//! A minimal real-time 3D renderer: a fly-through camera, textured meshes with
//! albedo and specular maps, one directional light and a single forward pass.
//! Uniforms are set by name, as in classic shader programs, and only uploaded
//! when one of them changed.
//!
//! High-level modules
//! - `math`: look-at, perspective and pose composition
//! - `camera`: fly-through camera and its keyboard controller
//! - `input` and `surface`: keyboard, cursor, framebuffer size and frame timing
//! - `context`: GPU device, queue and render target (windowed or headless)
//! - `data_structures`: meshes, textures, materials, entities and the light
//! - `pipelines`: shader files, uniform reflection and the forward pipeline
//! - `render`: the begin/render/end frame protocol
//! - `resources`: loading textures and shaders from `assets/`
//! - `capture`: reading rendered pixels back
//! - `flow`: the application event loop
//!

pub mod camera;
pub mod capture;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod input;
pub mod math;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod surface;

// Re-exports commonly used types for convenience in downstream code.
pub use camera::{Camera, FlyCameraController};
pub use config::EngineConfig;
pub use context::Context;
pub use data_structures::{
    entity::{Entity, Transform},
    light::DirectionalLight,
    material::Material,
    texture::StridePolicy,
};
pub use error::{ShaderError, TextureError};
pub use flow::{GraphicsFlow, Scene, run};
pub use render::Renderer;
pub use surface::Surface;

pub use cgmath;
pub use wgpu;
pub use winit::{dpi::PhysicalPosition, event::WindowEvent, keyboard::KeyCode};
