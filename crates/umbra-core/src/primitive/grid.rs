//! Square grid mesh generation

use super::MeshData;

/// Index count of an N x N grid, or `None` if it does not fit in `u32`
///
/// Vertex indices never exceed the index count for `size >= 2`, so this also
/// bounds the largest index.
pub fn grid_index_count(size: u32) -> Option<u32> {
    let quads = size.checked_sub(1)?;
    quads.checked_mul(quads)?.checked_mul(6)
}

/// Generate an N x N vertex grid covering the unit square in the XY plane
///
/// Vertex `(row, col)` sits at `(row / (N-1), col / (N-1), 0)`. Each of the
/// `(N-1)^2` quads is split into two triangles.
///
/// # Panics
/// Panics if `size < 2` or the index count overflows `u32`;
/// `SceneConfig::validate` rejects such grids.
pub fn generate_grid_mesh(size: u32) -> MeshData {
    assert!(size >= 2, "grid size must be at least 2");
    let index_count = grid_index_count(size);
    assert!(index_count.is_some(), "grid size {size} overflows u32 indices");

    let step = (size - 1) as f32;
    let mut positions = Vec::with_capacity(size as usize * size as usize);
    for row in 0..size {
        for col in 0..size {
            positions.push([row as f32 / step, col as f32 / step, 0.0]);
        }
    }

    let quads = size - 1;
    let mut indices = Vec::with_capacity(index_count.unwrap_or_default() as usize);
    for row in 0..quads {
        for col in 0..quads {
            let top_left = col + row * size;
            let bottom_left = col + (row + 1) * size;
            indices.extend_from_slice(&[
                top_left,
                top_left + 1,
                bottom_left + 1,
                top_left,
                bottom_left + 1,
                bottom_left,
            ]);
        }
    }

    MeshData { positions, indices }
}
