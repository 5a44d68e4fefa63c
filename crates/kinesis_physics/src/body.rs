//! Rigid body handles, descriptions and state

use crate::material::MaterialId;
use crate::shape::Shape;
use glam::{Quat, Vec3};
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Handle to a rigid body in the physics world
///
/// Handles are generational: once a body is removed its handle never
/// resolves again, even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) rapier::RigidBodyHandle);

impl BodyHandle {
    /// Create from raw Rapier handle
    pub fn from_raw(handle: rapier::RigidBodyHandle) -> Self {
        Self(handle)
    }

    /// Get the raw Rapier handle
    pub fn raw(&self) -> rapier::RigidBodyHandle {
        self.0
    }
}

/// Position and orientation of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    /// Position as three floats, orientation as an `[x, y, z, w]` quaternion
    pub fn to_arrays(&self) -> ([f32; 3], [f32; 4]) {
        (self.position.to_array(), self.orientation.to_array())
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.orientation.is_finite()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Simulation state of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyState {
    /// Integrated every step
    Awake,
    /// Excluded from integration until woken by an impulse or an awake contact
    Asleep,
    /// Removed from its world; terminal
    Removed,
}

/// Description for creating a rigid body
///
/// `mass == 0` makes the body static: it never moves and never sleeps.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    /// Mass in kg; 0 for static bodies
    pub mass: f32,
    /// Collision shape
    pub shape: Shape,
    /// Surface material
    pub material: MaterialId,
    /// Initial pose
    pub pose: Pose,
    /// Initial linear velocity
    pub linear_velocity: Vec3,
    /// Initial angular velocity
    pub angular_velocity: Vec3,
    /// Linear damping (air resistance)
    pub linear_damping: f32,
    /// Angular damping (rotational resistance)
    pub angular_damping: f32,
    /// Opt this body out of sleeping even when the world allows it
    pub can_sleep: bool,
}

impl BodyDesc {
    /// Create a dynamic body description
    pub fn dynamic(mass: f32, shape: Shape) -> Self {
        Self {
            mass,
            shape,
            material: MaterialId::DEFAULT,
            pose: Pose::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            linear_damping: 0.0,
            angular_damping: 0.0,
            can_sleep: true,
        }
    }

    /// Create a static body description
    pub fn fixed(shape: Shape) -> Self {
        Self::dynamic(0.0, shape)
    }

    /// Set material
    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = material;
        self
    }

    /// Set position
    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.pose.position = Vec3::new(x, y, z);
        self
    }

    /// Set full pose
    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    /// Set rotation from euler angles (radians)
    pub fn with_rotation_euler(mut self, x: f32, y: f32, z: f32) -> Self {
        self.pose.orientation = Quat::from_euler(glam::EulerRot::XYZ, x, y, z);
        self
    }

    /// Set linear velocity
    pub fn with_linear_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Set angular velocity
    pub fn with_angular_velocity(mut self, velocity: Vec3) -> Self {
        self.angular_velocity = velocity;
        self
    }

    /// Set damping
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    /// Allow or forbid sleeping for this body
    pub fn with_can_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    /// Whether this body will be created static
    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }
}
