//! The per-frame draw protocol.
//!
//! A frame is `begin_frame` (clear colour and depth), one `render` per entity,
//! then `end_frame` (present). Every `render` call gathers camera, entity and
//! light state into a [`DrawUniforms`] value, pushes it into the shader by
//! name, uploads the uniform buffer only if a value changed and records a
//! single indexed draw in its own render pass.
//!
//! # Binding contract
//!
//! | uniform          | source                                  |
//! |------------------|-----------------------------------------|
//! | `mat.shininess`  | [`Material::shininess`]                 |
//! | `mat.diff_tex`   | texture unit of the albedo map (0)      |
//! | `mat.spec_tex`   | texture unit of the specular map (1)    |
//! | `model`          | [`Entity::model_matrix`]                |
//! | `view`           | [`Camera::view`]                        |
//! | `view_pos`       | [`Camera::position`](Camera)            |
//! | `projection`     | [`Camera::projection`] in wgpu depth    |
//! | `sun.intensity`  | [`DirectionalLight::intensity`]         |
//! | `sun.direction`  | [`DirectionalLight::direction`]         |
//!
//! Texture unit 0 is bind group 1, bindings 0/1; unit 1 is bindings 2/3.

use std::iter;

use cgmath::{Matrix4, Vector3};

use crate::{
    camera::Camera,
    context::Context,
    data_structures::{
        entity::{Entity, Transform},
        light::DirectionalLight,
        material::Material,
    },
    error::ShaderError,
    math::OPENGL_TO_WGPU_MATRIX,
    pipelines::{
        shader::{ShaderProgram, ShaderSource},
        uniforms::UniformSink,
    },
};

pub const MATERIAL_GROUP: u32 = 1;
pub const ALBEDO_UNIT: i32 = 0;
pub const SPECULAR_UNIT: i32 = 1;

/// Every uniform name the renderer writes, in push order.
pub const UNIFORM_NAMES: [&str; 9] = [
    "mat.shininess",
    "mat.diff_tex",
    "mat.spec_tex",
    "model",
    "view",
    "view_pos",
    "projection",
    "sun.intensity",
    "sun.direction",
];

/// Everything one draw call reads from the uniform buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawUniforms {
    pub shininess: f32,
    pub albedo_unit: i32,
    pub specular_unit: i32,
    pub model: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub view_pos: Vector3<f32>,
    /// Already converted to wgpu's `[0, 1]` depth range.
    pub projection: Matrix4<f32>,
    pub sun_intensity: f32,
    pub sun_direction: Vector3<f32>,
}

impl DrawUniforms {
    pub fn new(camera: &Camera, transform: &Transform, shininess: f32, light: &DirectionalLight) -> Self {
        Self {
            shininess,
            albedo_unit: ALBEDO_UNIT,
            specular_unit: SPECULAR_UNIT,
            model: transform.model_matrix(),
            view: camera.view(),
            view_pos: camera.position,
            projection: OPENGL_TO_WGPU_MATRIX * camera.projection(),
            sun_intensity: light.intensity(),
            sun_direction: light.direction(),
        }
    }

    pub fn for_entity(camera: &Camera, entity: &Entity, light: &DirectionalLight) -> Self {
        Self::new(camera, entity.transform(), entity.material().shininess(), light)
    }

    /// Writes every value into `sink` under the names in [`UNIFORM_NAMES`].
    pub fn push(&self, sink: &mut impl UniformSink) {
        sink.set_uniform_f32("mat.shininess", self.shininess);
        sink.set_uniform_i32("mat.diff_tex", self.albedo_unit);
        sink.set_uniform_i32("mat.spec_tex", self.specular_unit);
        sink.set_uniform_mat4("model", self.model);
        sink.set_uniform_mat4("view", self.view);
        sink.set_uniform_vec3("view_pos", self.view_pos);
        sink.set_uniform_mat4("projection", self.projection);
        sink.set_uniform_f32("sun.intensity", self.sun_intensity);
        sink.set_uniform_vec3("sun.direction", self.sun_direction);
    }
}

/// The colour target of the frame in flight.
///
/// Windowed contexts render into the swapchain image, which is presented by
/// [`Renderer::end_frame`]; headless contexts render into their offscreen
/// texture.
pub struct Frame {
    surface_texture: Option<wgpu::SurfaceTexture>,
    texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Frame {
    pub(crate) fn new(surface_texture: Option<wgpu::SurfaceTexture>, texture: wgpu::Texture) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            surface_texture,
            texture,
            view,
        }
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn present(self) {
        if let Some(output) = self.surface_texture {
            output.present();
        }
    }
}

/// Owns the active shader program and the clear colour.
#[derive(Debug)]
pub struct Renderer {
    shader: ShaderProgram,
    clear_color: wgpu::Color,
    draws: u32,
    uploads: u32,
}

impl Renderer {
    pub async fn new(ctx: &Context, source: &ShaderSource, clear_color: wgpu::Color) -> Result<Self, ShaderError> {
        let shader = ShaderProgram::new(&ctx.device, ctx.config.format, source, "Forward Shader").await?;
        Ok(Self {
            shader,
            clear_color,
            draws: 0,
            uploads: 0,
        })
    }

    pub fn shader(&self) -> &ShaderProgram {
        &self.shader
    }

    pub fn shader_mut(&mut self) -> &mut ShaderProgram {
        &mut self.shader
    }

    pub fn clear_color(&self) -> wgpu::Color {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: wgpu::Color) {
        self.clear_color = color;
    }

    /// Number of draw calls issued since the last [`Renderer::begin_frame`].
    pub fn draw_count(&self) -> u32 {
        self.draws
    }

    /// Number of uniform buffer uploads since the last [`Renderer::begin_frame`].
    pub fn upload_count(&self) -> u32 {
        self.uploads
    }

    /// Acquires the next frame and clears its colour and depth.
    pub fn begin_frame(&mut self, ctx: &Context) -> Result<Frame, wgpu::SurfaceError> {
        let frame = ctx.acquire_frame()?;
        self.draws = 0;
        self.uploads = 0;

        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Clear Encoder"),
        });
        {
            let _clear_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });
        }
        ctx.queue.submit(iter::once(encoder.finish()));
        Ok(frame)
    }

    /// Draws one entity lit by `light` as seen from `camera`.
    pub fn render(&mut self, ctx: &Context, frame: &Frame, camera: &Camera, entity: &Entity, light: &DirectionalLight) {
        DrawUniforms::for_entity(camera, entity, light).push(&mut self.shader);
        if self.shader.flush(&ctx.queue) {
            self.uploads += 1;
        }

        let mesh = entity.mesh();
        let material: &Material = entity.material();

        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Forward Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            self.shader.bind(&mut render_pass);
            render_pass.set_bind_group(MATERIAL_GROUP, material.bind_group(), &[]);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..entity.index_count(), 0, 0..1);
        }
        ctx.queue.submit(iter::once(encoder.finish()));
        self.draws += 1;
    }

    /// Presents the frame.
    pub fn end_frame(&mut self, frame: Frame) {
        log::trace!("Presenting frame with {} draws and {} uniform uploads", self.draws, self.uploads);
        frame.present();
    }
}
