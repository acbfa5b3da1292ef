//! Primitive mesh generation for the demo scene
//!
//! Generates positions and triangle indices for:
//! - Square grid (the ground plane)
//! - Cube

mod cube;
mod grid;

pub use cube::generate_cube_mesh;
pub use grid::{generate_grid_mesh, grid_index_count};

use glam::Vec3;

use crate::bounds::BoundingBox;

/// Owned mesh data: vertex positions and triangle indices
///
/// Generators hand out an owned value; uploading it to the GPU consumes it,
/// so the CPU copy is released as soon as the buffers exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions
    pub positions: Vec<[f32; 3]>,
    /// Triangle list indices into `positions`
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of indices
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Bounds of the untransformed positions
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(self.positions.iter().map(|p| Vec3::from_array(*p)))
    }
}
