//! Per-demo simulation context
//!
//! One owner for the world, the clock, the bindings and the pointer. The host
//! calls [`SimContext::advance`] once per rendered frame with the wall-clock
//! delta; everything else happens in a fixed order inside it:
//!
//! ```text
//! pending click ─► pick_and_impulse
//! wall delta    ─► SimClock ─► N × PhysicsWorld::step ─► drain events
//!                                                      ─► sync_all ─► host
//! ```
//!
//! A click is resolved against the transforms the user saw last frame, and its
//! impulse shows up in this frame's steps.

use crate::binding::ProxyBindings;
use crate::camera::PerspectiveCamera;
use crate::config::SimConfig;
use crate::error::{Result, SceneError};
use crate::picking::{pick_and_impulse, InteractionConfig, PickOutcome};
use crate::pointer::PointerState;
use crate::proxy::{ProxyHandle, ProxyHost};
use crate::sync::{sync_all, SyncReport};
use glam::Vec2;
use kinesis_physics::{BodyDesc, BodyHandle, CollisionEvent, PhysicsError, PhysicsWorld, SimClock};

/// What happened during one [`SimContext::advance`]
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Fixed steps run this frame
    pub steps: u32,
    /// Collision events from those steps, in step order
    pub events: Vec<CollisionEvent>,
    /// Transform sync outcome
    pub sync: SyncReport,
    /// The pick made for a pending click, if it hit a bound body
    pub pick: Option<PickOutcome>,
    /// Why a pending click failed
    pub pick_error: Option<SceneError>,
    /// Leftover fraction of a step, for render interpolation
    pub alpha: f32,
}

/// Owns one simulation and drives it frame by frame
pub struct SimContext {
    world: PhysicsWorld,
    clock: SimClock,
    bindings: ProxyBindings,
    camera: PerspectiveCamera,
    pointer: PointerState,
    interaction: InteractionConfig,
    frame: u64,
}

impl SimContext {
    /// Create a context; the configuration is fixed from here on
    pub fn new(config: SimConfig) -> Result<Self> {
        let world = PhysicsWorld::new(config.physics)?;
        let clock = SimClock::from_config(world.config());
        Ok(Self {
            world,
            clock,
            bindings: ProxyBindings::new(),
            camera: PerspectiveCamera::default(),
            pointer: PointerState::new(),
            interaction: config.interaction,
            frame: 0,
        })
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn bindings(&self) -> &ProxyBindings {
        &self.bindings
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: PerspectiveCamera) {
        self.camera = camera;
    }

    pub fn interaction(&self) -> &InteractionConfig {
        &self.interaction
    }

    /// Frames advanced so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    // ==================== Bodies & bindings ====================

    /// Create a body and bind it to a proxy in one go
    pub fn spawn(&mut self, desc: BodyDesc, proxy: ProxyHandle) -> Result<BodyHandle> {
        let body = self.world.create_body(desc)?;
        self.bindings.bind(body, proxy);
        Ok(body)
    }

    /// Bind an existing body to a proxy
    pub fn bind(&mut self, body: BodyHandle, proxy: ProxyHandle) -> Result<()> {
        if !self.world.contains(body) {
            return Err(PhysicsError::InvalidHandle(body).into());
        }
        self.bindings.bind(body, proxy);
        Ok(())
    }

    /// Sever a proxy's binding, e.g. before the host deletes it
    pub fn unbind_proxy(&mut self, proxy: ProxyHandle) -> Option<BodyHandle> {
        self.bindings.unbind_proxy(proxy)
    }

    /// Remove a body and its binding
    pub fn remove_body(&mut self, body: BodyHandle) -> Result<()> {
        self.world.remove_body(body)?;
        self.bindings.unbind_body(body);
        Ok(())
    }

    // ==================== Input ====================

    /// Forward a pointer move in pixels
    pub fn pointer_moved(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.pointer.pointer_moved(x, y, width, height);
    }

    /// Forward a pointer move in NDC
    pub fn pointer_moved_ndc(&mut self, ndc: Vec2) {
        self.pointer.pointer_moved_ndc(ndc);
    }

    /// Queue a pick for the next frame
    pub fn click(&mut self) {
        self.pointer.click();
    }

    /// Pick immediately at an NDC position
    pub fn pick(&mut self, ndc: Vec2, host: &dyn ProxyHost) -> Result<Option<PickOutcome>> {
        pick_and_impulse(
            ndc,
            &self.camera,
            host,
            &self.bindings,
            &mut self.world,
            &self.interaction,
        )
    }

    // ==================== Frame ====================

    /// Run one frame: pending click, fixed steps, events, sync
    pub fn advance(&mut self, wall_delta: f64, host: &mut dyn ProxyHost) -> FrameReport {
        let steps = self.clock.advance(wall_delta);
        self.run_frame(steps, host)
    }

    /// Run one frame ending at an absolute wall-clock timestamp in seconds
    ///
    /// The first call only establishes the reference point and runs no steps.
    pub fn advance_to(&mut self, timestamp: f64, host: &mut dyn ProxyHost) -> FrameReport {
        let steps = self.clock.advance_to(timestamp);
        self.run_frame(steps, host)
    }

    fn run_frame(&mut self, steps: u32, host: &mut dyn ProxyHost) -> FrameReport {
        let mut report = FrameReport::default();

        if let Some(ndc) = self.pointer.take_click() {
            match self.pick(ndc, &*host) {
                Ok(pick) => report.pick = pick,
                Err(err) => {
                    log::warn!("Pick failed: {}", err);
                    report.pick_error = Some(err);
                }
            }
        }

        report.steps = steps;
        self.world.step_n(steps);
        report.events = self.world.drain_collision_events();
        report.sync = sync_all(&self.world, &self.bindings, host);
        report.alpha = self.clock.alpha();

        self.frame += 1;
        log::trace!(
            "Frame {}: {} steps, {} events, {} synced",
            self.frame,
            report.steps,
            report.events.len(),
            report.sync.synced
        );
        report
    }

    /// Remove every body and binding and reset the clock and pointer
    pub fn teardown(&mut self) {
        let bodies = self.world.body_count();
        self.world.clear();
        self.bindings.clear();
        self.clock.reset();
        self.pointer.reset();
        log::info!("Simulation torn down ({} bodies removed)", bodies);
    }
}
