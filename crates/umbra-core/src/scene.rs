//! Scene geometry: the ground grid and the cube

use crate::bounds::BoundingBox;
use crate::config::SceneConfig;
use crate::primitive::{MeshData, generate_cube_mesh, generate_grid_mesh};

/// CPU-side meshes of the two scene objects
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMeshes {
    /// N x N ground grid in the unit square of the XY plane
    pub ground: MeshData,
    /// Cube centered on the origin
    pub cube: MeshData,
}

impl SceneMeshes {
    /// Generates both meshes from a validated configuration
    pub fn generate(config: &SceneConfig) -> Self {
        Self {
            ground: generate_grid_mesh(config.ground.grid_size),
            cube: generate_cube_mesh(config.cube.edge_length),
        }
    }

    /// World-space bounds of both objects after their model transforms
    pub fn world_bounds(&self, config: &SceneConfig) -> BoundingBox {
        let ground = self.ground.bounds().transform(&config.ground.transform.matrix());
        let cube = self.cube.bounds().transform(&config.cube.transform.matrix());
        ground.union(&cube)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_generate_uses_config() {
        let mut config = SceneConfig::default();
        config.ground.grid_size = 6;
        let meshes = SceneMeshes::generate(&config);
        assert_eq!(meshes.ground.vertex_count(), 36);
        assert_eq!(meshes.cube.vertex_count(), 24);
    }

    #[test]
    fn test_world_bounds_cover_both_objects() {
        let config = SceneConfig::default();
        let bounds = SceneMeshes::generate(&config).world_bounds(&config);
        // Ground spans (-2, -2, 0)..(8, -2, 10); the cube reaches lower in z
        // and higher in y
        assert_relative_eq!(bounds.min.x, -2.0, epsilon = 1e-4);
        assert_relative_eq!(bounds.min.y, -2.0, epsilon = 1e-4);
        assert_relative_eq!(bounds.max.x, 8.0, epsilon = 1e-4);
        assert_relative_eq!(bounds.max.z, 10.0, epsilon = 1e-4);
        assert!(bounds.min.z < -3.0);
        // Top of the stretched cube
        assert!(bounds.max.y >= -0.4 + 1.25 - 1e-4);
    }
}
