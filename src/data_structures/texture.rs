//! GPU textures and the CPU-side decoding that feeds them.
//!
//! Decoding is split from uploading so the pixel work (vertical flip, stride
//! repacking, mip chain) can run and be checked without a GPU. [`Texture`]
//! then owns the wgpu texture, its view and sampler; dropping it releases all
//! three exactly once.

use image::{DynamicImage, RgbaImage, imageops::FilterType};

use crate::error::TextureError;

/// What to do when a decoded image is not tightly packed 4-byte RGBA.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StridePolicy {
    /// Convert any decoded pixel layout into tightly packed RGBA8.
    #[default]
    Repack,
    /// Reject images whose decoded rows are not `width * 4` bytes.
    Strict,
}

/// Colour space the texels are sampled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Colour data such as albedo maps.
    Srgb,
    /// Non-colour data such as specular maps.
    Linear,
}

impl ColorSpace {
    fn format(self) -> wgpu::TextureFormat {
        match self {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// Decodes image file bytes into bottom-up, tightly packed RGBA8 rows.
///
/// The rows are flipped so that the first row in memory is the bottom of the
/// picture, which is where texture coordinate `v = 0` of the bundled meshes
/// points.
pub fn decode_texture(bytes: &[u8], label: &str, policy: StridePolicy) -> Result<RgbaImage, TextureError> {
    let img = image::load_from_memory(bytes).map_err(|source| TextureError::Decode {
        label: label.to_string(),
        source,
    })?;
    prepare_image(img, label, policy)
}

/// Applies the stride policy and the vertical flip to an already decoded image.
pub fn prepare_image(img: DynamicImage, label: &str, policy: StridePolicy) -> Result<RgbaImage, TextureError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(TextureError::Empty {
            label: label.to_string(),
        });
    }

    let expected = img.width() * 4;
    let actual = img.width() * img.color().bytes_per_pixel() as u32;
    if policy == StridePolicy::Strict && actual != expected {
        return Err(TextureError::UnsupportedStride {
            label: label.to_string(),
            expected,
            actual,
        });
    }
    if actual != expected {
        log::debug!("Repacking {label} from {actual} to {expected} bytes per row");
    }

    let mut rgba = img.into_rgba8();
    image::imageops::flip_vertical_in_place(&mut rgba);
    Ok(rgba)
}

/// Full mip chain down to 1x1, level 0 first.
pub fn mip_chain(base: RgbaImage) -> Vec<RgbaImage> {
    let levels = mip_level_count(base.width(), base.height());
    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(base);
    for _ in 1..levels {
        let prev = &chain[chain.len() - 1];
        let width = (prev.width() / 2).max(1);
        let height = (prev.height() / 2).max(1);
        let next = image::imageops::resize(prev, width, height, FilterType::Triangle);
        chain.push(next);
    }
    chain
}

pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// A GPU texture with a view and optional sampler.
#[derive(Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Option<wgpu::Sampler>,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// # Arguments
    ///
    /// * `size` is [width, height] of the texture in pixels
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            sampler: None,
        }
    }

    /// Uploads a prepared RGBA image together with its generated mip chain.
    ///
    /// Sampling is linear for minification, magnification and between mip
    /// levels, and clamps to the edge in every direction. Images larger than
    /// the device's 2D texture limit are rejected before anything is created.
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: RgbaImage,
        label: &str,
        color_space: ColorSpace,
    ) -> Result<Self, TextureError> {
        let max = device.limits().max_texture_dimension_2d;
        if rgba.width() > max || rgba.height() > max {
            return Err(TextureError::TooLarge {
                label: label.to_string(),
                width: rgba.width(),
                height: rgba.height(),
                max,
            });
        }

        let mips = mip_chain(rgba);
        let size = wgpu::Extent3d {
            width: mips[0].width(),
            height: mips[0].height(),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: mips.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: color_space.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, mip) in mips.iter().enumerate() {
            let (width, height) = mip.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                },
                mip.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(create_clamped_sampler(device, label));

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }
}

pub fn create_clamped_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        ..Default::default()
    })
}
