//! Rays for picking

use glam::{Quat, Vec3};

/// 3D ray for intersection testing
///
/// Distances reported by the intersection routines are in units of
/// `direction`, so a ray with a unit direction measures world distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Ray origin point
    pub origin: Vec3,
    /// Ray direction
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray with normalized direction
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Create a ray from two points
    #[inline]
    pub fn from_points(start: Vec3, end: Vec3) -> Self {
        Self::new(start, end - start)
    }

    /// Get a point at parameter t along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Express the ray in the local frame of a transform
    ///
    /// The direction is not renormalized, so a parameter `t` names the same
    /// point in both frames. Returns `None` when any scale component is zero.
    pub fn to_local(&self, position: Vec3, rotation: Quat, scale: Vec3) -> Option<Self> {
        if scale.cmpeq(Vec3::ZERO).any() || !scale.is_finite() {
            return None;
        }
        let inv_rotation = rotation.inverse();
        Some(Self {
            origin: inv_rotation * (self.origin - position) / scale,
            direction: inv_rotation * self.direction / scale,
        })
    }

    /// Get the inverse direction (1.0 / direction component)
    #[inline]
    pub fn inverse_direction(&self) -> Vec3 {
        self.direction.recip()
    }

    /// Check if the ray direction is valid (non-zero length)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.direction.length_squared() > 1e-10 && self.origin.is_finite()
    }
}
