use wgpu::util::DeviceExt;

/// Describes how the bytes of a vertex buffer map onto shader locations.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// One interleaved vertex: position, texture coordinates, normal (8 floats).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl ModelVertex {
    const fn new(position: [f32; 3], tex_coords: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            tex_coords,
            normal,
        }
    }
}

/**
 * Stride layout: 3 floats position (location 0), 2 floats UV (location 1),
 * 3 floats normal (location 2), tightly packed into 32 bytes.
 */
impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

const BACK: [f32; 3] = [0.0, 0.0, -1.0];
const FRONT: [f32; 3] = [0.0, 0.0, 1.0];
const LEFT: [f32; 3] = [-1.0, 0.0, 0.0];
const RIGHT: [f32; 3] = [1.0, 0.0, 0.0];
const BOTTOM: [f32; 3] = [0.0, -1.0, 0.0];
const TOP: [f32; 3] = [0.0, 1.0, 0.0];

/// Unit cube centred on the origin: 6 quads with 4 vertices each.
#[rustfmt::skip]
pub const CUBE_VERTICES: [ModelVertex; 24] = [
    // back
    ModelVertex::new([ 0.5, -0.5, -0.5], [0.0, 0.0], BACK),
    ModelVertex::new([-0.5, -0.5, -0.5], [1.0, 0.0], BACK),
    ModelVertex::new([-0.5,  0.5, -0.5], [1.0, 1.0], BACK),
    ModelVertex::new([ 0.5,  0.5, -0.5], [0.0, 1.0], BACK),
    // front
    ModelVertex::new([-0.5, -0.5,  0.5], [0.0, 0.0], FRONT),
    ModelVertex::new([ 0.5, -0.5,  0.5], [1.0, 0.0], FRONT),
    ModelVertex::new([ 0.5,  0.5,  0.5], [1.0, 1.0], FRONT),
    ModelVertex::new([-0.5,  0.5,  0.5], [0.0, 1.0], FRONT),
    // left
    ModelVertex::new([-0.5, -0.5, -0.5], [0.0, 0.0], LEFT),
    ModelVertex::new([-0.5, -0.5,  0.5], [1.0, 0.0], LEFT),
    ModelVertex::new([-0.5,  0.5,  0.5], [1.0, 1.0], LEFT),
    ModelVertex::new([-0.5,  0.5, -0.5], [0.0, 1.0], LEFT),
    // right
    ModelVertex::new([ 0.5, -0.5,  0.5], [0.0, 0.0], RIGHT),
    ModelVertex::new([ 0.5, -0.5, -0.5], [1.0, 0.0], RIGHT),
    ModelVertex::new([ 0.5,  0.5, -0.5], [1.0, 1.0], RIGHT),
    ModelVertex::new([ 0.5,  0.5,  0.5], [0.0, 1.0], RIGHT),
    // bottom
    ModelVertex::new([ 0.5, -0.5,  0.5], [1.0, 0.0], BOTTOM),
    ModelVertex::new([-0.5, -0.5,  0.5], [0.0, 0.0], BOTTOM),
    ModelVertex::new([-0.5, -0.5, -0.5], [0.0, 1.0], BOTTOM),
    ModelVertex::new([ 0.5, -0.5, -0.5], [1.0, 1.0], BOTTOM),
    // top
    ModelVertex::new([-0.5,  0.5,  0.5], [0.0, 0.0], TOP),
    ModelVertex::new([ 0.5,  0.5,  0.5], [1.0, 0.0], TOP),
    ModelVertex::new([ 0.5,  0.5, -0.5], [1.0, 1.0], TOP),
    ModelVertex::new([-0.5,  0.5, -0.5], [0.0, 1.0], TOP),
];

/// Two counter-clockwise triangles per quad.
#[rustfmt::skip]
pub const CUBE_INDICES: [u32; 36] = [
     0,  2,  3,   0,  1,  2,
     4,  6,  7,   4,  5,  6,
     8, 10, 11,   8,  9, 10,
    12, 14, 15,  12, 13, 14,
    16, 18, 19,  16, 17, 18,
    20, 22, 23,  20, 21, 22,
];

/// GPU-resident geometry. Buffers are written once at construction and never resized.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_vertices: u32,
    pub num_elements: u32,
}

impl Mesh {
    pub fn new(device: &wgpu::Device, name: &str, vertices: &[ModelVertex], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", name)),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_vertices: vertices.len() as u32,
            num_elements: indices.len() as u32,
        }
    }

    pub fn cube(device: &wgpu::Device) -> Self {
        Self::new(device, "cube", &CUBE_VERTICES, &CUBE_INDICES)
    }
}
