//! Reads rendered pixels back from the GPU.
//!
//! Copies from a texture into a buffer must use rows padded to
//! [`wgpu::COPY_BYTES_PER_ROW_ALIGNMENT`]; the padding is stripped again before
//! the pixels are handed out as an [`image::RgbaImage`].

use anyhow::{Context as _, anyhow};
use instant::Duration;

/// Bytes per row of a tightly packed RGBA8 row of `width` pixels, padded for a copy.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Drops the per-row copy padding.
pub fn strip_row_padding(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let padded = padded_bytes_per_row(width) as usize;
    let unpadded = (width * 4) as usize;
    data.chunks(padded)
        .take(height as usize)
        .flat_map(|row| &row[..unpadded])
        .copied()
        .collect()
}

/// Copies an RGBA8 texture (`COPY_SRC` usage required) into CPU memory.
///
/// The image comes back in the texture's own row order: row 0 is the top of
/// the framebuffer.
pub async fn read_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
) -> anyhow::Result<image::RgbaImage> {
    let width = texture.width();
    let height = texture.height();
    let bytes_per_row = padded_bytes_per_row(width);

    let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Capture Buffer"),
        size: (bytes_per_row * height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Capture Encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &output_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    // The mapping has to be requested before polling, then awaited.
    let buffer_slice = output_buffer.slice(..);
    let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).ok();
    });
    device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })
        .context("GPU did not finish the capture copy")?;
    rx.receive()
        .await
        .ok_or_else(|| anyhow!("capture mapping was cancelled"))?
        .context("Failed to map the capture buffer")?;

    let pixels = {
        let data = buffer_slice.get_mapped_range();
        strip_row_padding(&data, width, height)
    };
    output_buffer.unmap();

    image::RgbaImage::from_raw(width, height, pixels).ok_or_else(|| anyhow!("capture buffer is too small"))
}
