//! Scene and renderer configuration
//!
//! Every tunable of the shadow pipeline lives here: window and shadow-map
//! resolution, MSAA sample count, projections, eye and light placement, the
//! depth-bias factors of the shadow pass and the PCF kernel. Defaults
//! reproduce the demo scene. Configurations are stored as RON.

use std::path::Path;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::{
    CUBE_COLOR, DEFAULT_GRID_SIZE, GROUND_COLOR, MAX_GRID_SIZE, MAX_KERNEL_RADIUS,
    OUTPUT_CLEAR_COLOR, SCENE_CLEAR_COLOR, SUPPORTED_SAMPLE_COUNTS,
};
use crate::primitive::grid_index_count;

/// Window configuration
///
/// The scene-color target and the presentable surface share this resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Shadow Rendering".to_string(),
            width: 2560,
            height: 1392,
        }
    }
}

impl WindowConfig {
    /// Width divided by height
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Extent of the light's orthographic projection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum LightFrustum {
    /// Hand-tuned symmetric box in light view space
    Fixed {
        /// Half extent along the light's right axis
        half_width: f32,
        /// Half extent along the light's up axis
        half_height: f32,
        /// Near plane distance (may be negative)
        near: f32,
        /// Far plane distance
        far: f32,
    },
    /// Box fitted to the light-space bounds of the scene, padded by `margin`
    FitScene {
        /// Padding added on every side of the fitted box
        margin: f32,
    },
}

impl Default for LightFrustum {
    fn default() -> Self {
        Self::Fixed {
            half_width: 10.0,
            half_height: 10.0,
            near: -30.0,
            far: 30.0,
        }
    }
}

/// Shadow map configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShadowConfig {
    /// Shadow map width in texels
    pub map_width: u32,
    /// Shadow map height in texels
    pub map_height: u32,
    /// Depth bias scaled by the polygon's depth slope (shadow pass only)
    pub slope_bias: f32,
    /// Constant depth bias in depth-buffer units (shadow pass only)
    pub constant_bias: i32,
    /// Orthographic box used for every light-space transform
    pub light_frustum: LightFrustum,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_width: 2560,
            map_height: 1392,
            slope_bias: 5.0,
            constant_bias: 100,
            light_frustum: LightFrustum::default(),
        }
    }
}

impl ShadowConfig {
    /// Size of one shadow-map texel in texture coordinates
    pub fn texel_size(&self) -> [f32; 2] {
        [
            1.0 / self.map_width.max(1) as f32,
            1.0 / self.map_height.max(1) as f32,
        ]
    }
}

/// Percentage-closer filtering configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PcfConfig {
    /// Distance between neighbouring taps, in shadow-map texels
    pub tap_spacing: f32,
    /// Taps on each side of the center tap (1 gives a 3x3 kernel)
    pub kernel_radius: u32,
    /// Offset added to the comparison depth, scaled by the coordinate's w
    pub depth_bias: f32,
}

impl Default for PcfConfig {
    fn default() -> Self {
        Self {
            tap_spacing: 2.0,
            kernel_radius: 1,
            depth_bias: -0.005,
        }
    }
}

impl PcfConfig {
    /// Kernel width in taps
    pub fn kernel_width(&self) -> u32 {
        self.kernel_radius.saturating_mul(2).saturating_add(1)
    }

    /// Number of hardware comparison taps per fragment
    pub fn tap_count(&self) -> u32 {
        self.kernel_width().saturating_mul(self.kernel_width())
    }

    /// Weight applied to the tap sum to produce a lit fraction in [0, 1]
    pub fn tap_weight(&self) -> f32 {
        1.0 / self.tap_count() as f32
    }

    /// Tap offsets in texels, row by row
    pub fn tap_offsets(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        let r = self.kernel_radius as i32;
        (-r..=r).flat_map(move |y| {
            (-r..=r).map(move |x| (x as f32 * self.tap_spacing, y as f32 * self.tap_spacing))
        })
    }
}

/// Multisample anti-aliasing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MsaaConfig {
    /// Samples per pixel of the scene-color target (1, 2, 4 or 8)
    pub sample_count: u32,
}

impl Default for MsaaConfig {
    fn default() -> Self {
        Self { sample_count: 4 }
    }
}

/// Eye (camera) configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance
    pub near_plane: f32,
    /// Far clipping plane distance
    pub far_plane: f32,
    /// Eye position
    pub position: [f32; 3],
    /// Look-at target
    pub target: [f32; 3],
    /// Up vector
    pub up: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near_plane: 0.1,
            far_plane: 100.0,
            position: [-5.0, 3.0, 5.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
        }
    }
}

/// Light configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightConfig {
    /// Light position
    pub position: [f32; 3],
    /// Look-at target
    pub target: [f32; 3],
    /// Up vector
    pub up: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [10.0, 5.0, 2.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
        }
    }
}

/// Model transform of a scene object
///
/// Applied as rotate, then scale, then translate. Fields left out of a RON
/// file take the identity values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelTransform {
    /// Translation
    pub translation: [f32; 3],
    /// Per-axis scale
    pub scale: [f32; 3],
    /// Rotation axis (normalized on use)
    pub rotation_axis: [f32; 3],
    /// Rotation angle in degrees
    pub rotation_degrees: f32,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            translation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
            rotation_axis: [0.0, 1.0, 0.0],
            rotation_degrees: 0.0,
        }
    }
}

impl ModelTransform {
    /// Builds the model matrix
    pub fn matrix(&self) -> Mat4 {
        let axis = Vec3::from_array(self.rotation_axis).normalize_or_zero();
        let rotation = if axis == Vec3::ZERO {
            Mat4::IDENTITY
        } else {
            Mat4::from_axis_angle(axis, self.rotation_degrees.to_radians())
        };
        Mat4::from_translation(Vec3::from_array(self.translation))
            * Mat4::from_scale(Vec3::from_array(self.scale))
            * rotation
    }
}

/// Ground plane configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GroundConfig {
    /// Grid dimension N (N x N vertices)
    pub grid_size: u32,
    /// Model transform
    pub transform: ModelTransform,
    /// Flat color (RGBA)
    pub color: [f32; 4],
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            transform: ModelTransform {
                translation: [-2.0, -2.0, 0.0],
                scale: [10.0, 10.0, 10.0],
                rotation_axis: [1.0, 0.0, 0.0],
                rotation_degrees: 90.0,
            },
            color: GROUND_COLOR,
        }
    }
}

/// Cube configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CubeConfig {
    /// Edge length of the generated cube before the model transform
    pub edge_length: f32,
    /// Model transform
    pub transform: ModelTransform,
    /// Flat color (RGBA)
    pub color: [f32; 4],
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            edge_length: 1.0,
            transform: ModelTransform {
                translation: [5.0, -0.4, -3.0],
                scale: [1.0, 2.5, 1.0],
                rotation_axis: [0.0, 1.0, 0.0],
                rotation_degrees: -15.0,
            },
            color: CUBE_COLOR,
        }
    }
}

/// Complete scene configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneConfig {
    /// Window settings
    #[serde(default)]
    pub window: WindowConfig,
    /// Shadow map settings
    #[serde(default)]
    pub shadow: ShadowConfig,
    /// PCF kernel settings
    #[serde(default)]
    pub pcf: PcfConfig,
    /// MSAA settings
    #[serde(default)]
    pub msaa: MsaaConfig,
    /// Eye settings
    #[serde(default)]
    pub camera: CameraConfig,
    /// Light settings
    #[serde(default)]
    pub light: LightConfig,
    /// Ground plane
    #[serde(default)]
    pub ground: GroundConfig,
    /// Cube
    #[serde(default)]
    pub cube: CubeConfig,
    /// Clear color of the multisampled scene target
    #[serde(default = "default_scene_clear")]
    pub scene_clear_color: [f32; 4],
    /// Clear color of the presentable surface
    #[serde(default = "default_output_clear")]
    pub output_clear_color: [f32; 4],
}

fn default_scene_clear() -> [f32; 4] {
    SCENE_CLEAR_COLOR
}

fn default_output_clear() -> [f32; 4] {
    OUTPUT_CLEAR_COLOR
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            shadow: ShadowConfig::default(),
            pcf: PcfConfig::default(),
            msaa: MsaaConfig::default(),
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            ground: GroundConfig::default(),
            cube: CubeConfig::default(),
            scene_clear_color: SCENE_CLEAR_COLOR,
            output_clear_color: OUTPUT_CLEAR_COLOR,
        }
    }
}

impl SceneConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Parse a configuration from RON text
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Serialize to pretty-printed RON
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Save the configuration to a RON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = self.to_ron_string()?;
        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Check every value the pipeline relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::ZeroExtent {
                name: "window",
                width: self.window.width,
                height: self.window.height,
            });
        }
        if self.shadow.map_width == 0 || self.shadow.map_height == 0 {
            return Err(ConfigError::ZeroExtent {
                name: "shadow map",
                width: self.shadow.map_width,
                height: self.shadow.map_height,
            });
        }
        if !SUPPORTED_SAMPLE_COUNTS.contains(&self.msaa.sample_count) {
            return Err(ConfigError::SampleCount(self.msaa.sample_count));
        }
        let grid_size = self.ground.grid_size;
        if !(2..=MAX_GRID_SIZE).contains(&grid_size) || grid_index_count(grid_size).is_none() {
            return Err(ConfigError::GridSize(grid_size));
        }
        if self.cube.edge_length <= 0.0 {
            return Err(ConfigError::Mesh(format!(
                "cube edge length must be positive, got {}",
                self.cube.edge_length
            )));
        }

        let camera = &self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(ConfigError::Projection(format!(
                "field of view must be in (0, 180) degrees, got {}",
                camera.fov_degrees
            )));
        }
        if camera.near_plane <= 0.0 || camera.far_plane <= camera.near_plane {
            return Err(ConfigError::Projection(format!(
                "expected 0 < near < far, got near={} far={}",
                camera.near_plane, camera.far_plane
            )));
        }

        match self.shadow.light_frustum {
            LightFrustum::Fixed {
                half_width,
                half_height,
                near,
                far,
            } => {
                if half_width <= 0.0 || half_height <= 0.0 || far <= near {
                    return Err(ConfigError::LightFrustum(format!(
                        "degenerate box: half_width={half_width} half_height={half_height} near={near} far={far}"
                    )));
                }
            }
            LightFrustum::FitScene { margin } => {
                if margin < 0.0 {
                    return Err(ConfigError::LightFrustum(format!(
                        "margin must not be negative, got {margin}"
                    )));
                }
            }
        }

        check_view("eye", camera.position, camera.target, camera.up)?;
        check_view("light", self.light.position, self.light.target, self.light.up)?;

        if self.pcf.tap_spacing < 0.0 {
            return Err(ConfigError::Pcf(format!(
                "tap spacing must not be negative, got {}",
                self.pcf.tap_spacing
            )));
        }
        if self.pcf.kernel_radius > MAX_KERNEL_RADIUS {
            return Err(ConfigError::KernelRadius(self.pcf.kernel_radius));
        }

        Ok(())
    }
}

fn check_view(
    name: &'static str,
    position: [f32; 3],
    target: [f32; 3],
    up: [f32; 3],
) -> Result<(), ConfigError> {
    let forward = Vec3::from_array(target) - Vec3::from_array(position);
    let up = Vec3::from_array(up);
    if forward.length_squared() < f32::EPSILON || forward.cross(up).length_squared() < 1e-10 {
        return Err(ConfigError::DegenerateView(name));
    }
    Ok(())
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("{name} extent must be non-zero, got {width}x{height}")]
    ZeroExtent {
        name: &'static str,
        width: u32,
        height: u32,
    },
    #[error("Unsupported MSAA sample count {0} (expected 1, 2, 4 or 8)")]
    SampleCount(u32),
    #[error("Ground grid size must be in 2..={max}, got {0}", max = MAX_GRID_SIZE)]
    GridSize(u32),
    #[error("Invalid mesh: {0}")]
    Mesh(String),
    #[error("Invalid projection: {0}")]
    Projection(String),
    #[error("Invalid light frustum: {0}")]
    LightFrustum(String),
    #[error("Degenerate {0} view: position equals target or up is parallel to the view direction")]
    DegenerateView(&'static str),
    #[error("Invalid PCF kernel: {0}")]
    Pcf(String),
    #[error("PCF kernel radius must be at most {max}, got {0}", max = MAX_KERNEL_RADIUS)]
    KernelRadius(u32),
}
