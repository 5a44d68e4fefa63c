//! Kinesis Physics - fixed-step rigid bodies on Rapier 3D
//!
//! The simulation half of the Kinesis core: a rigid-body world advanced on a
//! fixed timestep, pairwise contact materials, and collision events the host
//! drains after stepping.
//!
//! # Features
//!
//! - Spheres, boxes and infinite ground planes
//! - Static (mass 0) and dynamic bodies with island sleeping
//! - Friction and restitution per unordered material pair
//! - Collision-start events carrying the impact speed
//! - Degenerate contacts dropped and non-finite bodies restored each step
//! - A fixed-step clock with a catch-up cap
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                 PhysicsWorld                   │
//! │  ┌─────────────┐ ┌─────────────┐ ┌──────────┐ │
//! │  │ RigidBodySet│ │ ColliderSet │ │EventQueue│ │
//! │  └─────────────┘ └─────────────┘ └──────────┘ │
//! │  ┌───────────────────────────────────────────┐│
//! │  │ PhysicsPipeline + ContactHooks            ││
//! │  │ (materials, contact discard)              ││
//! │  └───────────────────────────────────────────┘│
//! └───────────────────────────────────────────────┘
//!                        ▲
//!                        │ steps
//!                   ┌──────────┐
//!                   │ SimClock │ ◄── wall-clock delta
//!                   └──────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use kinesis_physics::prelude::*;
//!
//! let mut world = PhysicsWorld::new(PhysicsConfig::default())?;
//! let mut clock = SimClock::from_config(world.config());
//!
//! world.create_body(BodyDesc::fixed(Shape::plane()))?;
//! let ball = world.create_body(
//!     BodyDesc::dynamic(1.0, Shape::sphere(0.5)?).with_position(0.0, 3.0, 0.0),
//! )?;
//!
//! for _ in 0..clock.advance(1.0 / 60.0) {
//!     world.step();
//! }
//! for event in world.drain_collision_events() {
//!     println!("{:?} hit {:?} at {} m/s", event.body_a, event.body_b, event.impact_speed);
//! }
//! ```

pub mod body;
pub mod clock;
pub mod config;
mod convert;
pub mod error;
pub mod events;
mod hooks;
pub mod material;
pub mod shape;
pub mod world;

pub mod prelude {
    //! Common imports for physics functionality
    pub use crate::body::{BodyDesc, BodyHandle, BodyState, Pose};
    pub use crate::clock::SimClock;
    pub use crate::config::PhysicsConfig;
    pub use crate::error::{PhysicsError, Result};
    pub use crate::events::{CollisionEvent, EventQueue};
    pub use crate::material::{ContactMaterial, MaterialId, MaterialRegistry};
    pub use crate::shape::{Shape, ShapeKind};
    pub use crate::world::{PhysicsWorld, WorldStats};
}

pub use prelude::*;
