//! Perspective camera used to build pointer rays

use crate::ray::Ray;
use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Right-handed perspective camera looking down its local -Z
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerspectiveCamera {
    /// Eye position
    pub position: Vec3,
    /// Camera-to-world rotation
    pub orientation: Quat,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Width over height
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            orientation: Quat::IDENTITY,
            fov_y: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn new(fov_y_degrees: f32, aspect: f32) -> Self {
        Self {
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            ..Default::default()
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Turn the camera toward a target
    ///
    /// A target at the eye position, or an `up` parallel to the view
    /// direction, leaves the orientation unchanged.
    pub fn look_at(mut self, target: Vec3, up: Vec3) -> Self {
        let forward = target - self.position;
        if forward.length_squared() < 1e-12 || forward.cross(up).length_squared() < 1e-12 {
            log::debug!("Degenerate look_at from {:?} to {:?}", self.position, target);
            return self;
        }
        let view = Mat4::look_at_rh(self.position, target, up);
        self.orientation = Quat::from_mat4(&view.inverse()).normalize();
        self
    }

    /// Update the aspect ratio, e.g. after a host resize
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Ray from the eye through a point in normalized device coordinates
    ///
    /// NDC spans `[-1, 1]` on both axes with +Y up.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let half_height = (self.fov_y * 0.5).tan();
        let local = Vec3::new(ndc.x * half_height * self.aspect, ndc.y * half_height, -1.0);
        Ray::new(self.position, self.orientation * local)
    }

    /// Project a world point to NDC, or `None` when it is behind the eye
    pub fn project(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.projection_matrix() * self.view_matrix() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(Vec2::new(clip.x, clip.y) / clip.w)
    }
}
