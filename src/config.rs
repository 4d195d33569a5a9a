use cgmath::{Deg, Vector3};

use crate::data_structures::texture::StridePolicy;

/// Start-up settings of the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Wait for vertical sync when presenting.
    pub vsync: bool,
    pub clear_color: wgpu::Color,
    pub fov: Deg<f32>,
    pub camera_position: Vector3<f32>,
    /// Fly-through speed in world units per second.
    pub camera_speed: f32,
    /// Shader file under `assets/`.
    pub shader: String,
    pub stride_policy: StridePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "forward-ngin".to_string(),
            width: 800,
            height: 600,
            vsync: true,
            clear_color: wgpu::Color {
                r: 0.2,
                g: 0.3,
                b: 0.3,
                a: 1.0,
            },
            fov: Deg(90.0),
            camera_position: Vector3::new(0.0, 0.0, 3.0),
            camera_speed: 3.0,
            shader: "shaders/forward.wgsl".to_string(),
            stride_policy: StridePolicy::Repack,
        }
    }
}

impl EngineConfig {
    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}
