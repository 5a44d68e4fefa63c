//! Collision shapes
//!
//! Shapes are immutable and cheap to clone: the solver geometry sits behind a
//! shared pointer, so one [`Shape`] can back any number of bodies.

use crate::error::{PhysicsError, Result};
use glam::Vec3;
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geometric description of a collision shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Sphere with radius
    Sphere { radius: f32 },
    /// Box with half-extents
    Box { half_extents: [f32; 3] },
    /// Infinite half-space whose surface passes through the body origin,
    /// outward normal +Y in the body frame
    Plane,
}

impl ShapeKind {
    fn validate(&self) -> Result<()> {
        match self {
            Self::Sphere { radius } => {
                if !radius.is_finite() || *radius <= 0.0 {
                    return Err(PhysicsError::InvalidShape(format!(
                        "sphere radius must be positive, got {}",
                        radius
                    )));
                }
            }
            Self::Box { half_extents } => {
                if half_extents.iter().any(|e| !e.is_finite() || *e <= 0.0) {
                    return Err(PhysicsError::InvalidShape(format!(
                        "box half-extents must be positive, got {:?}",
                        half_extents
                    )));
                }
            }
            Self::Plane => {}
        }
        Ok(())
    }
}

/// Validated, shareable collision shape
#[derive(Clone)]
pub struct Shape {
    kind: ShapeKind,
    shared: rapier::SharedShape,
}

impl Shape {
    /// Build a shape, rejecting negative, zero or non-finite parameters
    pub fn new(kind: ShapeKind) -> Result<Self> {
        kind.validate()?;
        let shared = match kind {
            ShapeKind::Sphere { radius } => rapier::SharedShape::ball(radius),
            ShapeKind::Box { half_extents } => {
                rapier::SharedShape::cuboid(half_extents[0], half_extents[1], half_extents[2])
            }
            ShapeKind::Plane => rapier::SharedShape::halfspace(rapier::Vector::y_axis()),
        };
        Ok(Self { kind, shared })
    }

    /// Create a sphere shape
    pub fn sphere(radius: f32) -> Result<Self> {
        Self::new(ShapeKind::Sphere { radius })
    }

    /// Create a box shape from half-extents
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Result<Self> {
        Self::new(ShapeKind::Box {
            half_extents: [hx, hy, hz],
        })
    }

    /// Create a box shape from full size
    pub fn from_size(size: Vec3) -> Result<Self> {
        Self::cuboid(size.x * 0.5, size.y * 0.5, size.z * 0.5)
    }

    /// Create an infinite ground plane
    pub fn plane() -> Self {
        Self {
            kind: ShapeKind::Plane,
            shared: rapier::SharedShape::halfspace(rapier::Vector::y_axis()),
        }
    }

    /// The descriptor this shape was built from
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Whether this shape has no finite volume and so can only be static
    pub fn is_unbounded(&self) -> bool {
        matches!(self.kind, ShapeKind::Plane)
    }

    pub(crate) fn shared(&self) -> rapier::SharedShape {
        self.shared.clone()
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape").field("kind", &self.kind).finish()
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}
