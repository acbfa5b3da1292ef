//! Light-space and eye-space transform construction
//!
//! Matrices are column-major (glam), so a vertex is transformed as
//! `projection * view * model * position`. The WGSL shaders multiply in the
//! same order.

use glam::{Mat4, Vec3};

use crate::bounds::BoundingBox;
use crate::config::{LightFrustum, SceneConfig};

/// Builds the eye's perspective projection (depth mapped to [0, 1]).
pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_degrees.to_radians(), aspect, near, far)
}

/// Builds a right-handed view matrix looking from `eye` toward `target`.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, target, up)
}

/// Orthographic box in light view space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoBox {
    /// Left plane
    pub left: f32,
    /// Right plane
    pub right: f32,
    /// Bottom plane
    pub bottom: f32,
    /// Top plane
    pub top: f32,
    /// Near plane distance along the view direction
    pub near: f32,
    /// Far plane distance along the view direction
    pub far: f32,
}

impl OrthoBox {
    /// Symmetric box around the light's view axis
    pub fn symmetric(half_width: f32, half_height: f32, near: f32, far: f32) -> Self {
        Self {
            left: -half_width,
            right: half_width,
            bottom: -half_height,
            top: half_height,
            near,
            far,
        }
    }

    /// Box enclosing `view_bounds` (already in light view space) plus `margin`
    ///
    /// The light looks down -Z, so the nearest geometry has the largest z.
    pub fn enclosing(view_bounds: &BoundingBox, margin: f32) -> Self {
        Self {
            left: view_bounds.min.x - margin,
            right: view_bounds.max.x + margin,
            bottom: view_bounds.min.y - margin,
            top: view_bounds.max.y + margin,
            near: -view_bounds.max.z - margin,
            far: -view_bounds.min.z + margin,
        }
    }

    /// Projection matrix (depth mapped to [0, 1])
    pub fn matrix(&self) -> Mat4 {
        Mat4::orthographic_rh(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        )
    }
}

/// Resolves the configured light frustum into a concrete box.
///
/// `FitScene` with an empty scene falls back to the default fixed box.
pub fn resolve_light_frustum(
    frustum: &LightFrustum,
    light_view: &Mat4,
    world_bounds: &BoundingBox,
) -> OrthoBox {
    match *frustum {
        LightFrustum::Fixed {
            half_width,
            half_height,
            near,
            far,
        } => OrthoBox::symmetric(half_width, half_height, near, far),
        LightFrustum::FitScene { margin } if world_bounds.is_valid() => {
            OrthoBox::enclosing(&world_bounds.transform(light_view), margin)
        }
        LightFrustum::FitScene { .. } => {
            resolve_light_frustum(&LightFrustum::default(), light_view, world_bounds)
        }
    }
}

/// Per-object matrix pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSet {
    /// Model, eye view and perspective projection (for shading)
    pub mvp_eye: Mat4,
    /// Model, light view and orthographic projection (for the shadow map)
    pub mvp_light: Mat4,
}

impl TransformSet {
    /// Combines a model matrix with both view-projections
    pub fn new(model: Mat4, eye_view_proj: Mat4, light_view_proj: Mat4) -> Self {
        Self {
            mvp_eye: eye_view_proj * model,
            mvp_light: light_view_proj * model,
        }
    }
}

/// Matrices for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransforms {
    /// Ground plane
    pub ground: TransformSet,
    /// Cube
    pub cube: TransformSet,
}

/// Computes [`FrameTransforms`] from the fixed scene configuration.
///
/// Everything except the aspect ratio is resolved once at construction.
#[derive(Debug, Clone)]
pub struct TransformBuilder {
    fov_degrees: f32,
    near_plane: f32,
    far_plane: f32,
    eye_view: Mat4,
    light_view: Mat4,
    light_box: OrthoBox,
    ground_model: Mat4,
    cube_model: Mat4,
}

impl TransformBuilder {
    /// Creates a builder. `world_bounds` is only consulted for
    /// [`LightFrustum::FitScene`].
    pub fn new(config: &SceneConfig, world_bounds: &BoundingBox) -> Self {
        let camera = &config.camera;
        let light = &config.light;
        let eye_view = look_at(
            Vec3::from_array(camera.position),
            Vec3::from_array(camera.target),
            Vec3::from_array(camera.up),
        );
        let light_view = look_at(
            Vec3::from_array(light.position),
            Vec3::from_array(light.target),
            Vec3::from_array(light.up),
        );
        let light_box =
            resolve_light_frustum(&config.shadow.light_frustum, &light_view, world_bounds);

        Self {
            fov_degrees: camera.fov_degrees,
            near_plane: camera.near_plane,
            far_plane: camera.far_plane,
            eye_view,
            light_view,
            light_box,
            ground_model: config.ground.transform.matrix(),
            cube_model: config.cube.transform.matrix(),
        }
    }

    /// View matrix from the eye position
    pub fn eye_view(&self) -> Mat4 {
        self.eye_view
    }

    /// View matrix from the light position
    pub fn light_view(&self) -> Mat4 {
        self.light_view
    }

    /// Resolved light frustum
    pub fn light_box(&self) -> OrthoBox {
        self.light_box
    }

    /// Eye projection for the given aspect ratio
    pub fn projection(&self, aspect: f32) -> Mat4 {
        perspective(self.fov_degrees, aspect, self.near_plane, self.far_plane)
    }

    /// Light projection
    pub fn light_projection(&self) -> Mat4 {
        self.light_box.matrix()
    }

    /// Builds all four matrices for a frame
    pub fn build(&self, aspect: f32) -> FrameTransforms {
        let eye_view_proj = self.projection(aspect) * self.eye_view;
        let light_view_proj = self.light_projection() * self.light_view;

        FrameTransforms {
            ground: TransformSet::new(self.ground_model, eye_view_proj, light_view_proj),
            cube: TransformSet::new(self.cube_model, eye_view_proj, light_view_proj),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::Vec4;

    use super::*;
    use crate::scene::SceneMeshes;

    fn assert_orthonormal(view: Mat4) {
        let cols = [
            view.x_axis.truncate(),
            view.y_axis.truncate(),
            view.z_axis.truncate(),
        ];
        for (i, a) in cols.iter().enumerate() {
            assert_relative_eq!(a.length(), 1.0, epsilon = 1e-5);
            for b in cols.iter().skip(i + 1) {
                assert_relative_eq!(a.dot(*b), 0.0, epsilon = 1e-5);
            }
        }
        assert!(view.determinant().abs() > 1e-3);
        let roundtrip = view * view.inverse();
        assert!(roundtrip.abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    #[test]
    fn test_perspective_aspect_only_scales_x() {
        let a1 = 2560.0 / 1392.0;
        let a2 = 4.0 / 3.0;
        let p1 = perspective(45.0, a1, 0.1, 100.0);
        let p2 = perspective(45.0, a2, 0.1, 100.0);
        let c1 = p1.x_axis * a1;
        let c2 = p2.x_axis * a2;
        assert!(c1.abs_diff_eq(c2, 1e-5));
        assert_eq!(p1.y_axis, p2.y_axis);
        assert_eq!(p1.z_axis, p2.z_axis);
        assert_eq!(p1.w_axis, p2.w_axis);
    }

    #[test]
    fn test_eye_and_light_views_are_orthonormal() {
        let builder = TransformBuilder::new(&SceneConfig::default(), &BoundingBox::empty());
        assert_orthonormal(builder.eye_view());
        assert_orthonormal(builder.light_view());
    }

    #[test]
    fn test_views_look_at_origin() {
        let config = SceneConfig::default();
        let builder = TransformBuilder::new(&config, &BoundingBox::empty());
        // The target lies on the view's -Z axis.
        let target = builder.eye_view().transform_point3(Vec3::ZERO);
        assert_relative_eq!(target.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(target.y, 0.0, epsilon = 1e-5);
        assert!(target.z < 0.0);
        let eye_distance = Vec3::from_array(config.camera.position).length();
        assert_relative_eq!(-target.z, eye_distance, epsilon = 1e-4);
    }

    #[test]
    fn test_mvp_multiplication_order() {
        let config = SceneConfig::default();
        let builder = TransformBuilder::new(&config, &BoundingBox::empty());
        let aspect = config.window.aspect();
        let frame = builder.build(aspect);

        let model = config.cube.transform.matrix();
        let expected_eye = builder.projection(aspect) * builder.eye_view() * model;
        let expected_light = builder.light_projection() * builder.light_view() * model;
        assert!(frame.cube.mvp_eye.abs_diff_eq(expected_eye, 1e-5));
        assert!(frame.cube.mvp_light.abs_diff_eq(expected_light, 1e-5));
    }

    #[test]
    fn test_build_is_deterministic() {
        let config = SceneConfig::default();
        let builder = TransformBuilder::new(&config, &BoundingBox::empty());
        let first = builder.build(config.window.aspect());
        for _ in 0..8 {
            assert_eq!(builder.build(config.window.aspect()), first);
        }
        let rebuilt = TransformBuilder::new(&config, &BoundingBox::empty());
        assert_eq!(rebuilt.build(config.window.aspect()), first);
    }

    #[test]
    fn test_ground_model_lies_flat() {
        let model = SceneConfig::default().ground.transform.matrix();
        // Grid spans the unit square in XY; rotated onto XZ, scaled by 10
        // and lowered to y = -2.
        let far_corner = model.transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(far_corner.x, 8.0, epsilon = 1e-4);
        assert_relative_eq!(far_corner.y, -2.0, epsilon = 1e-4);
        assert_relative_eq!(far_corner.z, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_fixed_light_box_is_symmetric() {
        let builder = TransformBuilder::new(&SceneConfig::default(), &BoundingBox::empty());
        assert_eq!(
            builder.light_box(),
            OrthoBox::symmetric(10.0, 10.0, -30.0, 30.0)
        );
    }

    #[test]
    fn test_fit_scene_box_encloses_scene() {
        let mut config = SceneConfig::default();
        config.shadow.light_frustum = LightFrustum::FitScene { margin: 0.5 };
        let meshes = SceneMeshes::generate(&config);
        let bounds = meshes.world_bounds(&config);
        let builder = TransformBuilder::new(&config, &bounds);
        let light_view_proj = builder.light_projection() * builder.light_view();

        for corner in bounds.corners() {
            let clip: Vec4 = light_view_proj * corner.extend(1.0);
            let ndc = clip.truncate() / clip.w;
            assert!(ndc.x.abs() <= 1.0 + 1e-4, "x out of box: {ndc:?}");
            assert!(ndc.y.abs() <= 1.0 + 1e-4, "y out of box: {ndc:?}");
            assert!((-1e-4..=1.0 + 1e-4).contains(&ndc.z), "z out of box: {ndc:?}");
        }
    }

    #[test]
    fn test_fit_scene_without_geometry_uses_default_box() {
        let mut config = SceneConfig::default();
        config.shadow.light_frustum = LightFrustum::FitScene { margin: 1.0 };
        let builder = TransformBuilder::new(&config, &BoundingBox::empty());
        assert_eq!(
            builder.light_box(),
            OrthoBox::symmetric(10.0, 10.0, -30.0, 30.0)
        );
    }
}
