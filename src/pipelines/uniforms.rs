//! Name-addressed uniforms on top of a single WGSL uniform buffer.
//!
//! wgpu has no "uniform location" lookup, so the uniform struct bound at
//! `@group(0) @binding(0)` is reflected from the WGSL module (parsed and
//! validated by naga) into a table of dotted member names (`model`,
//! `mat.shininess`, `sun.direction`, ...) with their byte offsets. A
//! [`UniformBlock`] stages values by name on the CPU and only uploads them when
//! a write actually changed a byte.

use std::collections::HashSet;

use cgmath::{Matrix4, Vector3};
use naga::{
    AddressSpace, ResourceBinding, Scalar, TypeInner, VectorSize,
    common::wgsl::TypeContext,
    valid::{Capabilities, ValidationFlags, Validator},
};

use crate::error::ShaderError;

/// Group and binding of the reflected uniform buffer.
pub const UNIFORM_GROUP: u32 = 0;
pub const UNIFORM_BINDING: u32 = 0;

/// Value types a uniform member can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    F32,
    I32,
    U32,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformKind {
    fn from_naga(inner: &TypeInner) -> Option<Self> {
        let kind = match *inner {
            TypeInner::Scalar(s) if s == Scalar::F32 => UniformKind::F32,
            TypeInner::Scalar(s) if s == Scalar::I32 => UniformKind::I32,
            TypeInner::Scalar(s) if s == Scalar::U32 => UniformKind::U32,
            TypeInner::Vector { size, scalar } if scalar == Scalar::F32 => match size {
                VectorSize::Bi => UniformKind::Vec2,
                VectorSize::Tri => UniformKind::Vec3,
                VectorSize::Quad => UniformKind::Vec4,
            },
            TypeInner::Matrix {
                columns: VectorSize::Quad,
                rows: VectorSize::Quad,
                scalar,
            } if scalar == Scalar::F32 => UniformKind::Mat4,
            _ => return None,
        };
        Some(kind)
    }

    pub fn size(self) -> u32 {
        match self {
            UniformKind::F32 | UniformKind::I32 | UniformKind::U32 => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 => 16,
            UniformKind::Mat4 => 64,
        }
    }

    pub fn align(self) -> u32 {
        match self {
            UniformKind::F32 | UniformKind::I32 | UniformKind::U32 => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 | UniformKind::Vec4 | UniformKind::Mat4 => 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformEntry {
    pub name: String,
    pub offset: u32,
    pub kind: UniformKind,
}

/// Flattened layout of the uniform buffer at group 0, binding 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniformLayout {
    entries: Vec<UniformEntry>,
    size: u32,
}

fn round_up(align: u32, n: u32) -> u32 {
    n.div_ceil(align) * align
}

/// Parses and validates one WGSL module with naga.
///
/// Any error is rendered against `source` so the message points at the
/// offending line.
pub fn compile(source: &str) -> Result<naga::Module, ShaderError> {
    let module =
        naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile(e.emit_to_string(source)))?;
    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| ShaderError::Compile(e.emit_to_string(source)))?;
    Ok(module)
}

impl UniformLayout {
    /// Reflects the uniform buffer declared in one WGSL module.
    ///
    /// Returns `Ok(None)` when the module declares no uniform at group 0, binding 0.
    pub fn reflect(source: &str) -> Result<Option<Self>, ShaderError> {
        let module = compile(source)?;
        Self::from_module(&module)
    }

    pub fn from_module(module: &naga::Module) -> Result<Option<Self>, ShaderError> {
        let block = ResourceBinding {
            group: UNIFORM_GROUP,
            binding: UNIFORM_BINDING,
        };
        let Some(var) = module
            .global_variables
            .iter()
            .map(|(_, var)| var)
            .find(|var| var.space == AddressSpace::Uniform && var.binding == Some(block))
        else {
            return Ok(None);
        };
        let var_name = var.name.clone().unwrap_or_default();

        let mut layout = UniformLayout::default();
        let size = match &module.types[var.ty].inner {
            TypeInner::Struct { members, span } => {
                layout.place_members(module, members, "", 0)?;
                *span
            }
            inner => {
                let kind = UniformKind::from_naga(inner).ok_or_else(|| ShaderError::UnsupportedType {
                    name: var_name.clone(),
                    ty: module.types.type_to_string(var.ty),
                })?;
                layout.entries.push(UniformEntry {
                    name: var_name,
                    offset: 0,
                    kind,
                });
                kind.size()
            }
        };
        // Buffer bindings are sized in whole 16-byte rows.
        layout.size = round_up(16, size);
        Ok(Some(layout))
    }

    /// Flattens struct members into dotted names at their absolute offsets.
    fn place_members(
        &mut self,
        module: &naga::Module,
        members: &[naga::StructMember],
        prefix: &str,
        base: u32,
    ) -> Result<(), ShaderError> {
        for member in members {
            let name = member.name.as_deref().unwrap_or_default();
            let path = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}.{name}")
            };
            let offset = base + member.offset;

            match &module.types[member.ty].inner {
                TypeInner::Struct { members, .. } => self.place_members(module, members, &path, offset)?,
                inner => {
                    let kind = UniformKind::from_naga(inner).ok_or_else(|| ShaderError::UnsupportedType {
                        name: path.clone(),
                        ty: module.types.type_to_string(member.ty),
                    })?;
                    self.entries.push(UniformEntry {
                        name: path,
                        offset,
                        kind,
                    });
                }
            }
        }
        Ok(())
    }

    /// Merges the tables reflected from the vertex and fragment modules.
    pub fn merge(a: Option<Self>, b: Option<Self>) -> Result<Option<Self>, ShaderError> {
        let (mut merged, other) = match (a, b) {
            (Some(a), Some(b)) => (a, b),
            (a, None) => return Ok(a),
            (None, b) => return Ok(b),
        };

        for entry in other.entries {
            match merged.get(&entry.name) {
                Some(existing) if existing.offset != entry.offset || existing.kind != entry.kind => {
                    return Err(ShaderError::LayoutMismatch(entry.name));
                }
                Some(_) => {}
                None => merged.entries.push(entry),
            }
        }
        merged.size = merged.size.max(other.size);
        Ok(Some(merged))
    }

    pub fn get(&self, name: &str) -> Option<&UniformEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entries(&self) -> &[UniformEntry] {
        &self.entries
    }

    /// Size of the uniform buffer in bytes.
    pub fn size(&self) -> u32 {
        self.size
    }
}

/// Typed "set uniform by name" operations.
pub trait UniformSink {
    fn set_uniform_vec3(&mut self, name: &str, value: Vector3<f32>);
    fn set_uniform_f32(&mut self, name: &str, value: f32);
    fn set_uniform_mat4(&mut self, name: &str, value: Matrix4<f32>);
    fn set_uniform_i32(&mut self, name: &str, value: i32);
}

/// CPU staging copy of the uniform buffer with a dirty flag.
#[derive(Debug)]
pub struct UniformBlock {
    layout: UniformLayout,
    data: Vec<u8>,
    dirty: bool,
    warned: HashSet<String>,
}

impl UniformBlock {
    /// Zero-initialised block. It starts dirty so the first flush uploads it.
    ///
    /// Never smaller than 16 bytes, so a shader without uniforms still gets a
    /// bindable buffer.
    pub fn new(layout: UniformLayout) -> Self {
        let data = vec![0; layout.size().max(16) as usize];
        Self {
            layout,
            data,
            dirty: true,
            warned: HashSet::new(),
        }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Uploads the staged bytes if anything changed since the last upload.
    ///
    /// Returns whether an upload happened.
    pub fn flush(&mut self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) -> bool {
        if !self.dirty {
            return false;
        }
        queue.write_buffer(buffer, 0, &self.data);
        self.dirty = false;
        true
    }

    /// Whether a warning was already logged for `name`.
    pub fn has_warned(&self, name: &str) -> bool {
        self.warned.contains(name)
    }

    fn write(&mut self, name: &str, kind: UniformKind, bytes: &[u8]) {
        let offset = match self.layout.get(name) {
            Some(entry) if entry.kind == kind => entry.offset as usize,
            Some(entry) => {
                let actual = entry.kind;
                self.warn_once(name, || format!("Uniform `{name}` is {actual:?}, not {kind:?}; value ignored"));
                return;
            }
            None => {
                self.warn_once(name, || format!("Uniform `{name}` is not active in the shader; value ignored"));
                return;
            }
        };

        let slot = &mut self.data[offset..offset + bytes.len()];
        if slot != bytes {
            slot.copy_from_slice(bytes);
            self.dirty = true;
        }
    }

    fn warn_once(&mut self, name: &str, message: impl FnOnce() -> String) {
        if self.warned.insert(name.to_string()) {
            log::warn!("{}", message());
        }
    }
}

impl UniformSink for UniformBlock {
    fn set_uniform_vec3(&mut self, name: &str, value: Vector3<f32>) {
        let value: &[f32; 3] = value.as_ref();
        self.write(name, UniformKind::Vec3, bytemuck::cast_slice(value));
    }

    fn set_uniform_f32(&mut self, name: &str, value: f32) {
        self.write(name, UniformKind::F32, bytemuck::bytes_of(&value));
    }

    fn set_uniform_mat4(&mut self, name: &str, value: Matrix4<f32>) {
        let value: &[f32; 16] = value.as_ref();
        self.write(name, UniformKind::Mat4, bytemuck::cast_slice(value));
    }

    fn set_uniform_i32(&mut self, name: &str, value: i32) {
        self.write(name, UniformKind::I32, bytemuck::bytes_of(&value));
    }
}
