//! Umbra Renderer
//!
//! wgpu implementation of two-pass shadow mapping with percentage-closer
//! filtering, rendered into a multisampled offscreen target and resolved onto
//! the presentable surface by a shader.
//!
//! # Frame
//!
//! 1. Shadow pass: scene depth from the light into [`targets::ShadowMapTarget`]
//! 2. Scene pass: shaded scene from the eye into [`targets::SceneColorTarget`],
//!    sampling the shadow map with a comparison sampler
//! 3. Resolve pass: full-screen quad averaging every sample into the output
//!
//! # Module Structure
//!
//! ```text
//! umbra-renderer/
//! ├── context.rs       # Adapter/device/queue and capability queries
//! ├── error.rs         # Error types, checked() and capture()
//! ├── targets.rs       # Shadow map, scene color and output targets
//! ├── mesh.rs          # Mesh and full-screen quad buffers
//! ├── uniforms.rs      # Uniform layouts
//! ├── programs.rs      # Pipelines and bind group layouts
//! ├── passes/          # Shadow, scene and resolve passes
//! ├── readback.rs      # Texture readback
//! └── renderer.rs      # ShadowRenderer (init / draw_frame / shutdown)
//! ```

pub mod constants;
pub mod context;
pub mod error;
pub mod mesh;
pub mod passes;
pub mod programs;
pub mod readback;
pub mod renderer;
pub mod targets;
pub mod uniforms;

pub use context::GpuContext;
pub use error::{GraphicsError, RendererError, TargetError, capture, checked};
pub use readback::RgbaImage;
pub use renderer::ShadowRenderer;
pub use targets::{OutputTarget, SceneColorTarget, ShadowMapTarget, TargetLayout};
