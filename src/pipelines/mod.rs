//! Shader programs and the forward render pipeline.
//!
//! - `shader` splits `#vertex` / `#fragment` files and owns compiled programs
//! - `uniforms` reflects the WGSL uniform struct and stages values by name
//! - `forward` creates the pipeline and its bind group layouts

pub mod forward;
pub mod shader;
pub mod uniforms;
