//! Global constants for umbra-renderer

/// Attachment formats
pub mod formats {
    /// Shadow map depth format
    pub const SHADOW_DEPTH: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    /// Multisampled scene color format
    pub const SCENE_COLOR: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
    /// Multisampled scene depth/stencil format
    pub const SCENE_DEPTH_STENCIL: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;
    /// Presentable texture format used by offscreen callers
    pub const OUTPUT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
}

/// Bind group indices shared by the Rust side and the WGSL sources
pub mod bindings {
    /// Per-object uniform (shadow and scene programs)
    pub const OBJECT_GROUP: u32 = 0;
    /// Shadow sampling group (scene program)
    pub const SHADOW_GROUP: u32 = 1;
    /// Scene-color texture group (resolve program)
    pub const RESOLVE_GROUP: u32 = 0;
}

/// Depth clear value (far plane)
pub const DEPTH_CLEAR: f32 = 1.0;

/// Full-screen quad as two triangles of `[x, y, u, v]`
///
/// UVs are flipped vertically so the top-left corner reads texel row 0.
pub const QUAD_VERTICES: [[f32; 4]; 6] = [
    [-1.0, 1.0, 0.0, 0.0],
    [-1.0, -1.0, 0.0, 1.0],
    [1.0, -1.0, 1.0, 1.0],
    [-1.0, 1.0, 0.0, 0.0],
    [1.0, -1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0, 0.0],
];
