//! Kinesis Scene - render sync and pointer interaction
//!
//! Connects a [`kinesis_physics::PhysicsWorld`] to the renderer's visual
//! proxies:
//!
//! - [`ProxyBindings`] pairs bodies with proxies, one to one
//! - [`sync_all`] copies body poses onto proxies once per frame
//! - [`pick_and_impulse`] turns a pointer click into an impulse on the body
//!   behind the proxy under the cursor
//! - [`SimContext`] owns all of it and runs a frame in the right order
//!
//! # Example
//!
//! ```ignore
//! use kinesis_scene::prelude::*;
//!
//! let mut scene = ProxyScene::new();
//! let mut sim = SimContext::new(SimConfig::default())?;
//!
//! let proxy = scene.insert(VisualProxy::sphere(0.5));
//! sim.spawn(BodyDesc::dynamic(1.0, Shape::sphere(0.5)?).with_position(0.0, 3.0, 0.0), proxy)?;
//!
//! loop {
//!     let report = sim.advance(frame_delta, &mut scene);
//!     for event in &report.events {
//!         play_impact_sound(event.impact_speed);
//!     }
//! }
//! ```

pub mod binding;
pub mod camera;
pub mod config;
pub mod context;
pub mod error;
pub mod intersect;
pub mod picking;
pub mod pointer;
pub mod proxy;
pub mod ray;
pub mod sync;

pub use binding::ProxyBindings;
pub use camera::PerspectiveCamera;
pub use config::SimConfig;
pub use context::{FrameReport, SimContext};
pub use error::{Result, SceneError};
pub use picking::{pick_and_impulse, raycast_proxies, InteractionConfig, PickOutcome, ProxyHit};
pub use pointer::PointerState;
pub use proxy::{
    ProxyGeometry, ProxyHandle, ProxyHost, ProxyScene, ProxyTransform, TriMesh, VisualProxy,
};
pub use ray::Ray;
pub use sync::{sync_all, StaleBinding, StaleReason, SyncReport};

pub mod prelude {
    //! Common imports for a demo host
    pub use crate::{
        FrameReport, InteractionConfig, PerspectiveCamera, ProxyHandle, ProxyHost, ProxyScene,
        ProxyTransform, SceneError, SimConfig, SimContext, VisualProxy,
    };
    pub use kinesis_physics::prelude::*;
}
