//! Shader programs built from a single `#vertex` / `#fragment` source file.

use cgmath::{Matrix4, Vector3};
use wgpu::util::DeviceExt;

use super::{
    forward,
    uniforms::{UniformBlock, UniformLayout, UniformSink},
};
use crate::error::ShaderError;

pub const VERTEX_MARKER: &str = "#vertex";
pub const FRAGMENT_MARKER: &str = "#fragment";

/// The two WGSL sections of a shader file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    /// Splits `text` on the literal marker lines `#vertex` and `#fragment`.
    ///
    /// Lines before the first marker belong to the vertex section. Both
    /// sections must end up non-empty.
    pub fn parse(text: &str) -> Result<Self, ShaderError> {
        #[derive(PartialEq)]
        enum Section {
            Vertex,
            Fragment,
        }

        let mut section = Section::Vertex;
        let mut seen_fragment = false;
        let mut vertex = String::new();
        let mut fragment = String::new();
        for line in text.lines() {
            match line.trim_end() {
                VERTEX_MARKER => section = Section::Vertex,
                FRAGMENT_MARKER => {
                    section = Section::Fragment;
                    seen_fragment = true;
                }
                _ => {
                    let target = if section == Section::Vertex {
                        &mut vertex
                    } else {
                        &mut fragment
                    };
                    target.push_str(line);
                    target.push('\n');
                }
            }
        }

        if vertex.trim().is_empty() {
            return Err(ShaderError::MissingSection("vertex"));
        }
        if !seen_fragment || fragment.trim().is_empty() {
            return Err(ShaderError::MissingSection("fragment"));
        }
        Ok(Self { vertex, fragment })
    }

    /// Reflects both sections and merges their uniform tables.
    pub fn uniform_layout(&self) -> Result<UniformLayout, ShaderError> {
        let vertex = UniformLayout::reflect(&self.vertex)?;
        let fragment = UniformLayout::reflect(&self.fragment)?;
        Ok(UniformLayout::merge(vertex, fragment)?.unwrap_or_default())
    }
}

/// A compiled render pipeline plus the uniform buffer it reads at group 0.
///
/// Uniform setters only touch the CPU copy; [`ShaderProgram::flush`] uploads it.
#[derive(Debug)]
pub struct ShaderProgram {
    label: String,
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformBlock,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

impl ShaderProgram {
    /// Compiles both sections into the forward pipeline.
    ///
    /// WGSL errors are caught by naga while reflecting the uniforms; anything
    /// the device still rejects when building the pipeline (bindings that do
    /// not match the layouts, wrong entry points) is captured in a validation
    /// error scope. Both come back as [`ShaderError::Compile`].
    pub async fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        source: &ShaderSource,
        label: &str,
    ) -> Result<Self, ShaderError> {
        let layout = source.uniform_layout()?;
        log::debug!(
            "Shader {label} exposes {} uniforms in {} bytes",
            layout.entries().len(),
            layout.size()
        );
        let uniforms = UniformBlock::new(layout);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Uniform Buffer")),
            contents: uniforms.bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_layout = forward::uniform_layout(device);
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some(&format!("{label} uniform_bind_group")),
        });

        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = forward::mk_forward_pipeline(
            device,
            color_format,
            &uniform_layout,
            wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{label} vertex")),
                source: wgpu::ShaderSource::Wgsl(source.vertex.as_str().into()),
            },
            wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{label} fragment")),
                source: wgpu::ShaderSource::Wgsl(source.fragment.as_str().into()),
            },
        );
        if let Some(error) = scope.pop().await {
            return Err(ShaderError::Compile(error.to_string()));
        }

        Ok(Self {
            label: label.to_string(),
            pipeline,
            uniforms,
            uniform_buffer,
            uniform_bind_group,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn uniforms(&self) -> &UniformBlock {
        &self.uniforms
    }

    /// Uploads the staged uniforms if any of them changed. Returns whether it did.
    pub fn flush(&mut self, queue: &wgpu::Queue) -> bool {
        self.uniforms.flush(queue, &self.uniform_buffer)
    }

    /// Makes this program active on `pass` and binds its uniforms to group 0.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
    }
}

impl UniformSink for ShaderProgram {
    fn set_uniform_vec3(&mut self, name: &str, value: Vector3<f32>) {
        self.uniforms.set_uniform_vec3(name, value);
    }

    fn set_uniform_f32(&mut self, name: &str, value: f32) {
        self.uniforms.set_uniform_f32(name, value);
    }

    fn set_uniform_mat4(&mut self, name: &str, value: Matrix4<f32>) {
        self.uniforms.set_uniform_mat4(name, value);
    }

    fn set_uniform_i32(&mut self, name: &str, value: i32) {
        self.uniforms.set_uniform_i32(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_marker_lines() {
        let src = "#vertex\nfn vs_main() {}\n#fragment\nfn fs_main() {}\n";
        let parsed = ShaderSource::parse(src).unwrap();
        assert_eq!(parsed.vertex, "fn vs_main() {}\n");
        assert_eq!(parsed.fragment, "fn fs_main() {}\n");
    }

    #[test]
    fn lines_before_any_marker_are_vertex_code() {
        let src = "struct A { x: f32 }\n#vertex\nfn vs_main() {}\n#fragment\nfn fs_main() {}";
        let parsed = ShaderSource::parse(src).unwrap();
        assert_eq!(parsed.vertex, "struct A { x: f32 }\nfn vs_main() {}\n");
    }

    #[test]
    fn missing_sections_are_reported() {
        assert!(matches!(
            ShaderSource::parse("#vertex\nfn vs_main() {}\n"),
            Err(ShaderError::MissingSection("fragment"))
        ));
        assert!(matches!(
            ShaderSource::parse("#fragment\nfn fs_main() {}\n"),
            Err(ShaderError::MissingSection("vertex"))
        ));
    }

    #[test]
    fn markers_must_be_whole_lines() {
        let src = "#vertex\n// see #fragment below\nfn vs_main() {}\n#fragment\nfn fs_main() {}\n";
        let parsed = ShaderSource::parse(src).unwrap();
        assert!(parsed.vertex.contains("see #fragment below"));
    }

    #[test]
    fn bundled_shader_reflects_every_uniform_the_renderer_pushes() {
        let source = ShaderSource::parse(include_str!("../../assets/shaders/forward.wgsl")).unwrap();
        let layout = source.uniform_layout().unwrap();
        for name in crate::render::UNIFORM_NAMES {
            assert!(layout.get(name).is_some(), "`{name}` missing from the bundled shader");
        }
    }

    #[test]
    fn invalid_wgsl_without_uniforms_is_a_compile_error() {
        let src = "\
#vertex
@vertex fn vs_main() -> @builtin(position) vec4f { return oops; }
#fragment
@fragment fn fs_main() -> @location(0) vec4f { return vec4f(1.0); }
";
        let source = ShaderSource::parse(src).unwrap();
        match source.uniform_layout() {
            Err(ShaderError::Compile(message)) => assert!(message.contains("oops"), "{message}"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn sections_that_disagree_on_layout_are_rejected() {
        let src = "\
#vertex
struct U { model: mat4x4f, view_pos: vec3f }
@group(0) @binding(0) var<uniform> u: U;
#fragment
struct U { view_pos: vec3f }
@group(0) @binding(0) var<uniform> u: U;
";
        let source = ShaderSource::parse(src).unwrap();
        assert!(matches!(source.uniform_layout(), Err(ShaderError::LayoutMismatch(_))));
    }
}
