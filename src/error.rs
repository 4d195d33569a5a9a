//! Typed errors raised at the resource-load boundaries.
//!
//! All of them are load-time failures: the startup sequence decides whether to
//! abort or fall back to another asset. Per-frame rendering never fails; an
//! unknown uniform only logs a warning.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to read texture `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode texture `{label}`: {source}")]
    Decode {
        label: String,
        #[source]
        source: image::ImageError,
    },
    /// Geometry format error: the decoded pixel rows are not tightly packed
    /// 4-byte RGBA and the strict stride policy forbids repacking them.
    #[error("row stride of `{label}` is unsupported: expected {expected} bytes per row, decoded {actual}")]
    UnsupportedStride {
        label: String,
        expected: u32,
        actual: u32,
    },
    #[error("texture `{label}` has no pixels")]
    Empty { label: String },
    #[error("texture `{label}` is {width}x{height}, the device allows at most {max}x{max}")]
    TooLarge {
        label: String,
        width: u32,
        height: u32,
        max: u32,
    },
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("shader source has no `#{0}` section")]
    MissingSection(&'static str),
    /// WGSL that naga or the device rejected. Carries the rendered diagnostic.
    #[error("shader failed to compile:\n{0}")]
    Compile(String),
    #[error("uniform `{name}` has unsupported type `{ty}`")]
    UnsupportedType { name: String, ty: String },
    #[error("uniform `{0}` has a different layout in the vertex and fragment sections")]
    LayoutMismatch(String),
}
