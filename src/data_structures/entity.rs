use std::rc::Rc;

use cgmath::{Matrix4, Vector3};

use super::{material::Material, mesh::Mesh};
use crate::math;

/// Position and rotation of an entity together with the model matrix derived from them.
///
/// Every setter rebuilds the model matrix right away, so it is never stale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    position: Vector3<f32>,
    rotation: Vector3<f32>,
    model: Matrix4<f32>,
}

impl Transform {
    /// `rotation` holds degrees about X, Y and Z.
    pub fn new(position: Vector3<f32>, rotation: Vector3<f32>) -> Self {
        Self {
            position,
            rotation,
            model: math::model_matrix(position, rotation),
        }
    }

    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Vector3::new(x, y, z);
        self.model = math::model_matrix(self.position, self.rotation);
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
        self.model = math::model_matrix(self.position, self.rotation);
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn rotation(&self) -> Vector3<f32> {
        self.rotation
    }

    /// `Rx * Ry * Rz * T`
    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.model
    }
}

/// A mesh placed in the world and drawn with a shared material.
///
/// The entity exclusively owns its GPU buffers; the material may be shared
/// with any number of other entities.
#[derive(Debug)]
pub struct Entity {
    transform: Transform,
    mesh: Mesh,
    material: Rc<Material>,
}

impl Entity {
    pub fn new(mesh: Mesh, transform: Transform, material: Rc<Material>) -> Self {
        Self {
            transform,
            mesh,
            material,
        }
    }

    /// Uploads the unit cube (24 vertices, 36 indices) and places it.
    pub fn cube<P: Into<Vector3<f32>>, R: Into<Vector3<f32>>>(
        device: &wgpu::Device,
        position: P,
        rotation: R,
        material: Rc<Material>,
    ) -> Self {
        let transform = Transform::new(position.into(), rotation.into());
        Self::new(Mesh::cube(device), transform, material)
    }

    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.transform.set_rotation(x, y, z);
    }

    pub fn set_position<V: Into<Vector3<f32>>>(&mut self, position: V) {
        self.transform.set_position(position.into());
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.transform.model_matrix()
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn material(&self) -> &Rc<Material> {
        &self.material
    }

    pub fn index_count(&self) -> u32 {
        self.mesh.num_elements
    }

    pub fn vertex_count(&self) -> u32 {
        self.mesh.num_vertices
    }
}
