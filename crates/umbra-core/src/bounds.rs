//! Axis-aligned bounds of scene geometry
//!
//! Only used to fit the light's orthographic box around the scene.

use glam::{Mat4, Vec3};

/// Axis-aligned box; `min > max` on any axis means empty
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Lowest corner
    pub min: Vec3,
    /// Highest corner
    pub max: Vec3,
}

impl BoundingBox {
    /// Box spanning `min..=max`
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box containing nothing; the identity for [`BoundingBox::union`]
    pub fn empty() -> Self {
        Self::new(Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY))
    }

    /// Smallest box around `points`
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::empty(), |bounds, p| {
            Self::new(bounds.min.min(p), bounds.max.max(p))
        })
    }

    /// Smallest box around both boxes
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// False for an empty box
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// The eight corners, min corner first
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            )
        })
    }

    /// Box around the corners after `matrix` is applied
    ///
    /// Rotations make the result looser than the tightest fit. Empty boxes
    /// stay empty.
    pub fn transform(&self, matrix: &Mat4) -> BoundingBox {
        if !self.is_valid() {
            return *self;
        }
        Self::from_points(self.corners().map(|c| matrix.transform_point3(c)))
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}
