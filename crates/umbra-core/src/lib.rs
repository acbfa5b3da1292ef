//! Umbra Core
//!
//! GPU-independent parts of the shadow-mapping demo: configuration, scene
//! geometry, transform construction and a CPU model of the shader math.
//!
//! # Module Structure
//!
//! ```text
//! umbra-core/
//! ├── config.rs        # SceneConfig and RON persistence
//! ├── constants.rs     # Colors, sample counts, mesh sizes
//! ├── bounds.rs        # Axis-aligned bounding boxes
//! ├── primitive/       # Grid and cube generators
//! ├── scene.rs         # Scene meshes and world bounds
//! ├── transform.rs     # Eye and light matrices
//! └── reference.rs     # CPU model of PCF and the MSAA resolve
//! ```

pub mod bounds;
pub mod config;
pub mod constants;
pub mod primitive;
pub mod reference;
pub mod scene;
pub mod transform;

pub use bounds::BoundingBox;
pub use config::{
    CameraConfig, ConfigError, CubeConfig, GroundConfig, LightConfig, LightFrustum,
    ModelTransform, MsaaConfig, PcfConfig, SceneConfig, ShadowConfig, WindowConfig,
};
pub use primitive::{MeshData, generate_cube_mesh, generate_grid_mesh, grid_index_count};
pub use scene::SceneMeshes;
pub use transform::{FrameTransforms, OrthoBox, TransformBuilder, TransformSet};
