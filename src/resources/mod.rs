//! Loading textures and shaders from the `assets/` directory.

use std::path::PathBuf;

use image::RgbaImage;

use crate::{
    data_structures::texture::{StridePolicy, decode_texture},
    error::{ShaderError, TextureError},
    pipelines::shader::ShaderSource,
};

pub const ASSET_DIR: &str = "assets";

pub fn asset_path(file_name: &str) -> PathBuf {
    std::path::Path::new("./").join(ASSET_DIR).join(file_name)
}

pub async fn load_string(file_name: &str) -> std::io::Result<String> {
    tokio::fs::read_to_string(asset_path(file_name)).await
}

pub async fn load_binary(file_name: &str) -> std::io::Result<Vec<u8>> {
    tokio::fs::read(asset_path(file_name)).await
}

/// Reads and decodes an image into bottom-up RGBA8 rows.
pub async fn load_image(file_name: &str, policy: StridePolicy) -> Result<RgbaImage, TextureError> {
    let data = load_binary(file_name).await.map_err(|source| TextureError::Io {
        path: asset_path(file_name).display().to_string(),
        source,
    })?;
    decode_texture(&data, file_name, policy)
}

/// Reads a `#vertex` / `#fragment` shader file.
pub async fn load_shader(file_name: &str) -> Result<ShaderSource, ShaderError> {
    let text = load_string(file_name).await.map_err(|source| ShaderError::Io {
        path: asset_path(file_name).display().to_string(),
        source,
    })?;
    ShaderSource::parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_on<F: std::future::Future>(fut: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("test runtime")
            .block_on(fut)
    }

    #[test]
    fn bundled_assets_load() {
        let shader = block_on(load_shader("shaders/forward.wgsl")).unwrap();
        assert!(shader.vertex.contains("fn vs_main"));
        assert!(shader.fragment.contains("fn fs_main"));

        let albedo = block_on(load_image("textures/container.png", StridePolicy::Strict)).unwrap();
        assert_eq!(albedo.as_raw().len(), (albedo.width() * albedo.height() * 4) as usize);
    }

    #[test]
    fn missing_files_report_their_path() {
        match block_on(load_image("textures/nope.png", StridePolicy::Repack)) {
            Err(TextureError::Io { path, .. }) => assert!(path.ends_with("nope.png")),
            other => panic!("unexpected result {:?}", other),
        }
        assert!(matches!(
            block_on(load_shader("shaders/nope.wgsl")),
            Err(ShaderError::Io { .. })
        ));
    }
}
