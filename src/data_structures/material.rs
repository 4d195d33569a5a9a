use image::RgbaImage;

use super::texture::{ColorSpace, StridePolicy, Texture};
use crate::{context::Context, error::TextureError, resources::load_image};

/// Bind group 1: albedo on bindings 0/1, specular on bindings 2/3.
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    };
    let sampler = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    };

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[texture(0), sampler(1), texture(2), sampler(3)],
        label: Some("Material bind_group_layout"),
    })
}

/// Albedo and specular textures plus a shininess exponent.
///
/// Immutable once built. Entities share one material through an `Rc`; the two
/// textures are owned here and released when the last reference drops.
#[derive(Debug)]
pub struct Material {
    name: String,
    albedo: Texture,
    specular: Texture,
    shininess: f32,
    bind_group: wgpu::BindGroup,
}

impl Material {
    /// Uploads both images and binds them to texture units 0 (albedo) and 1 (specular).
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        albedo: RgbaImage,
        specular: RgbaImage,
        shininess: f32,
    ) -> Result<Self, TextureError> {
        let albedo = Texture::from_rgba(device, queue, albedo, &format!("{name} albedo"), ColorSpace::Srgb)?;
        let specular = Texture::from_rgba(
            device,
            queue,
            specular,
            &format!("{name} specular"),
            ColorSpace::Linear,
        )?;
        let layout = material_layout(device);
        let bind_group = Self::create_bind_group(device, &layout, name, &albedo, &specular);

        Ok(Self {
            name: name.to_string(),
            albedo,
            specular,
            shininess,
            bind_group,
        })
    }

    /// Loads both images from `assets/` concurrently and uploads them.
    pub async fn load(
        ctx: &Context,
        albedo_file: &str,
        specular_file: &str,
        shininess: f32,
        policy: StridePolicy,
    ) -> Result<Self, TextureError> {
        let (albedo, specular) = futures::try_join!(
            load_image(albedo_file, policy),
            load_image(specular_file, policy)
        )?;
        log::debug!("Loaded material textures {albedo_file} and {specular_file}");
        Self::new(&ctx.device, &ctx.queue, albedo_file, albedo, specular, shininess)
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        name: &str,
        albedo: &Texture,
        specular: &Texture,
    ) -> wgpu::BindGroup {
        let fallback;
        let albedo_sampler = match &albedo.sampler {
            Some(sampler) => sampler,
            None => {
                fallback = super::texture::create_clamped_sampler(device, name);
                &fallback
            }
        };
        let specular_sampler = specular.sampler.as_ref().unwrap_or(albedo_sampler);

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&albedo.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(albedo_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&specular.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(specular_sampler),
                },
            ],
            label: Some(name),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn albedo(&self) -> &Texture {
        &self.albedo
    }

    pub fn specular(&self) -> &Texture {
        &self.specular
    }

    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
