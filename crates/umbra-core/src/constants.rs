//! Global constants for umbra-core

/// MSAA sample counts the scene-color target may be created with
pub const SUPPORTED_SAMPLE_COUNTS: [u32; 4] = [1, 2, 4, 8];

/// Default ground grid dimension (N x N vertices)
pub const DEFAULT_GRID_SIZE: u32 = 3;

/// Largest accepted ground grid dimension
pub const MAX_GRID_SIZE: u32 = 4096;

/// Largest accepted PCF kernel radius (a 17x17 kernel)
pub const MAX_KERNEL_RADIUS: u32 = 8;

/// Ground color (light gray, RGBA)
pub const GROUND_COLOR: [f32; 4] = [0.9, 0.9, 0.9, 1.0];

/// Cube color (red, RGBA)
pub const CUBE_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// Clear color of the multisampled scene target (white, zero alpha)
pub const SCENE_CLEAR_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.0];

/// Clear color of the presentable surface before the resolve quad is drawn
pub const OUTPUT_CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Vertices in the generated cube (4 per face)
pub const CUBE_VERTEX_COUNT: usize = 24;

/// Indices in the generated cube (6 faces * 2 triangles * 3 indices)
pub const CUBE_INDEX_COUNT: usize = 36;
