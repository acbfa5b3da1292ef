//! Cube mesh generation

use super::MeshData;

/// Generate an axis-aligned cube centered on the origin
///
/// # Returns
/// 24 vertices (4 per face, so faces share no vertices) and 36 indices
pub fn generate_cube_mesh(edge_length: f32) -> MeshData {
    let h = edge_length / 2.0;

    let mut positions = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    let mut add_face = |corners: [[f32; 3]; 4]| {
        let base = positions.len() as u32;
        positions.extend_from_slice(&corners);
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    };

    // -Y
    add_face([[-h, -h, -h], [-h, -h, h], [h, -h, h], [h, -h, -h]]);
    // +Y
    add_face([[-h, h, -h], [h, h, -h], [h, h, h], [-h, h, h]]);
    // -Z
    add_face([[-h, -h, -h], [h, -h, -h], [h, h, -h], [-h, h, -h]]);
    // +Z
    add_face([[-h, -h, h], [-h, h, h], [h, h, h], [h, -h, h]]);
    // -X
    add_face([[-h, -h, -h], [-h, h, -h], [-h, h, h], [-h, -h, h]]);
    // +X
    add_face([[h, -h, -h], [h, -h, h], [h, h, h], [h, h, -h]]);

    MeshData { positions, indices }
}
