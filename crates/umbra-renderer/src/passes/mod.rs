//! Per-frame render passes.
//!
//! Each pass receives only the resources it touches through a params struct.
//! Passes are recorded into one encoder in order, so every pass sees the
//! previous pass's writes.

mod resolve;
mod scene;
mod shadow;

pub use resolve::{ResolvePassParams, render_resolve_pass};
pub use scene::{ScenePassParams, render_scene_pass};
pub use shadow::{ShadowPassParams, render_shadow_pass};

use crate::mesh::GpuMesh;

/// One object to draw: its mesh and its per-object uniform bind group
#[derive(Clone, Copy)]
pub struct MeshDraw<'a> {
    /// Mesh buffers
    pub mesh: &'a GpuMesh,
    /// Per-object uniform (matrices and color)
    pub object: &'a wgpu::BindGroup,
}

/// Converts an RGBA array into a clear color
pub fn clear_color(rgba: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: rgba[0] as f64,
        g: rgba[1] as f64,
        b: rgba[2] as f64,
        a: rgba[3] as f64,
    }
}
