//! Physics world - owns the Rapier simulation and every live body

use crate::body::{BodyDesc, BodyHandle, BodyState, Pose};
use crate::config::PhysicsConfig;
use crate::convert::{from_point, from_rotation, from_vector, to_isometry, to_point, to_vector};
use crate::error::{PhysicsError, Result};
use crate::events::{ChannelEventCollector, CollisionEvent, EventQueue};
use crate::hooks::ContactHooks;
use crate::material::{ContactMaterial, MaterialId, MaterialRegistry};
use crossbeam_channel::Receiver;
use glam::{Quat, Vec3};
use rapier3d::prelude as rapier;
use std::collections::HashMap;
use std::num::NonZeroUsize;

/// Counters kept for debugging and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Fixed steps run since creation
    pub steps_taken: u64,
    /// Contacts or pairs dropped because their geometry was degenerate
    pub discarded_contacts: u64,
    /// Bodies put back to their pre-step state after going non-finite
    pub restored_bodies: u64,
}

#[derive(Clone, Copy)]
struct BodySnapshot {
    position: rapier::Isometry<f32>,
    com: rapier::Point<f32>,
    linvel: rapier::Vector<f32>,
    angvel: rapier::Vector<f32>,
}

/// The physics world
pub struct PhysicsWorld {
    /// Physics pipeline
    pipeline: rapier::PhysicsPipeline,

    /// Gravity
    gravity: rapier::Vector<f32>,

    /// Integration parameters
    integration_params: rapier::IntegrationParameters,

    /// Island manager, drives sleeping
    islands: rapier::IslandManager,

    /// Broad phase
    broad_phase: rapier::DefaultBroadPhase,

    /// Narrow phase
    narrow_phase: rapier::NarrowPhase,

    /// Impulse joints (unused, required by the pipeline)
    impulse_joints: rapier::ImpulseJointSet,

    /// Multibody joints (unused, required by the pipeline)
    multibody_joints: rapier::MultibodyJointSet,

    /// CCD solver
    ccd_solver: rapier::CCDSolver,

    /// Rigid body set
    bodies: rapier::RigidBodySet,

    /// Collider set
    colliders: rapier::ColliderSet,

    /// Material pairing and contact sanitizing
    hooks: ContactHooks,

    /// Solver event sink and its receiving end
    event_collector: ChannelEventCollector,
    event_receiver: Receiver<rapier::CollisionEvent>,

    /// Events waiting to be drained
    events: EventQueue,

    /// Bodies with a force pending for the next step
    forced: Vec<rapier::RigidBodyHandle>,

    /// Configuration
    config: PhysicsConfig,

    stats: WorldStats,
}

impl PhysicsWorld {
    /// Create a new physics world, rejecting configurations that cannot drive it
    pub fn new(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: PhysicsConfig) -> Self {
        let gravity = rapier::Vector::new(config.gravity[0], config.gravity[1], config.gravity[2]);

        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = config.timestep;
        integration_params.num_solver_iterations =
            NonZeroUsize::new(config.velocity_iterations).unwrap_or(NonZeroUsize::MIN);

        let materials = MaterialRegistry::new(ContactMaterial::new(
            config.default_friction,
            config.default_restitution,
        ));
        let (event_collector, event_receiver) = ChannelEventCollector::new();

        log::debug!(
            "Physics world created: gravity {:?}, timestep {}",
            config.gravity,
            config.timestep
        );

        Self {
            pipeline: rapier::PhysicsPipeline::new(),
            gravity,
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            hooks: ContactHooks::new(materials),
            event_collector,
            event_receiver,
            events: EventQueue::new(),
            forced: Vec::new(),
            config,
            stats: WorldStats::default(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Get gravity
    pub fn gravity(&self) -> Vec3 {
        from_vector(&self.gravity)
    }

    /// Fixed step length in seconds
    pub fn timestep(&self) -> f32 {
        self.config.timestep
    }

    /// Debug counters
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            discarded_contacts: self.hooks.discarded(),
            ..self.stats
        }
    }

    // ==================== Materials ====================

    /// The material registry
    pub fn materials(&self) -> &MaterialRegistry {
        &self.hooks.materials
    }

    /// Define a surface material by name
    pub fn define_material(&mut self, name: &str) -> MaterialId {
        self.hooks.materials.define_material(name)
    }

    /// Register friction and restitution for an unordered material pair
    pub fn define_contact(
        &mut self,
        a: MaterialId,
        b: MaterialId,
        contact: ContactMaterial,
    ) -> Result<()> {
        self.hooks.materials.define_contact(a, b, contact)
    }

    /// Coefficients the solver will use when the two materials touch
    pub fn contact_material(&self, a: MaterialId, b: MaterialId) -> ContactMaterial {
        self.hooks.materials.contact_material(a, b)
    }

    // ==================== Bodies ====================

    fn validate_desc(&self, desc: &BodyDesc) -> Result<()> {
        if !desc.mass.is_finite() || desc.mass < 0.0 {
            return Err(PhysicsError::InvalidBody(format!(
                "mass must be finite and non-negative, got {}",
                desc.mass
            )));
        }
        if desc.shape.is_unbounded() && desc.mass > 0.0 {
            return Err(PhysicsError::InvalidBody(
                "a plane can only back a static body".into(),
            ));
        }
        if !desc.pose.is_finite() {
            return Err(PhysicsError::InvalidBody("pose must be finite".into()));
        }
        if desc.pose.orientation.length_squared() < 1.0e-12 {
            return Err(PhysicsError::InvalidBody(
                "orientation quaternion has zero length".into(),
            ));
        }
        if !desc.linear_velocity.is_finite() || !desc.angular_velocity.is_finite() {
            return Err(PhysicsError::InvalidBody("initial velocity must be finite".into()));
        }
        let damping = [desc.linear_damping, desc.angular_damping];
        if damping.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(PhysicsError::InvalidBody(
                "damping must be finite and non-negative".into(),
            ));
        }
        if !self.hooks.materials.contains(desc.material) {
            return Err(PhysicsError::UnknownMaterial(desc.material));
        }
        Ok(())
    }

    /// Create a body and register it with this world
    ///
    /// Nothing is registered when the description is rejected.
    pub fn create_body(&mut self, desc: BodyDesc) -> Result<BodyHandle> {
        self.validate_desc(&desc)?;

        let is_static = desc.is_static();
        let body_type = if is_static {
            rapier::RigidBodyType::Fixed
        } else {
            rapier::RigidBodyType::Dynamic
        };
        let can_sleep = desc.can_sleep && self.config.sleeping_enabled;

        let mut builder = rapier::RigidBodyBuilder::new(body_type)
            .position(to_isometry(desc.pose.position, desc.pose.orientation.normalize()))
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .can_sleep(can_sleep)
            .ccd_enabled(self.config.ccd_enabled && !is_static);
        if !is_static {
            builder = builder
                .linvel(to_vector(desc.linear_velocity))
                .angvel(to_vector(desc.angular_velocity));
        }
        let handle = self.bodies.insert(builder.build());

        let mut collider = rapier::ColliderBuilder::new(desc.shape.shared())
            .friction(self.config.default_friction)
            .restitution(self.config.default_restitution)
            .user_data(desc.material.to_user_data())
            .active_events(rapier::ActiveEvents::COLLISION_EVENTS)
            .active_hooks(
                rapier::ActiveHooks::FILTER_CONTACT_PAIRS
                    | rapier::ActiveHooks::MODIFY_SOLVER_CONTACTS,
            );
        collider = if is_static {
            collider.density(0.0)
        } else {
            collider.mass(desc.mass)
        };
        self.colliders
            .insert_with_parent(collider.build(), handle, &mut self.bodies);

        if let Some(rb) = self.bodies.get_mut(handle) {
            if !is_static {
                // Impulses applied before the first step need real mass properties.
                rb.recompute_mass_properties_from_colliders(&self.colliders);
            }
            if can_sleep {
                let activation = rb.activation_mut();
                activation.normalized_linear_threshold = self.config.sleep_linear_threshold;
                activation.angular_threshold = self.config.sleep_angular_threshold;
                activation.time_until_sleep = self.config.sleep_time;
            }
        }

        log::debug!(
            "Created {} body {:?} ({:?}, mass {})",
            if is_static { "static" } else { "dynamic" },
            handle,
            desc.shape.kind(),
            desc.mass
        );
        Ok(BodyHandle(handle))
    }

    /// Remove a body; its handle is invalid from now on
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<()> {
        self.bodies
            .remove(
                handle.0,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .ok_or(PhysicsError::InvalidHandle(handle))?;

        self.forced.retain(|h| *h != handle.0);
        let purged = self.events.purge(handle);
        log::debug!("Removed body {:?} ({} queued events dropped)", handle.0, purged);
        Ok(())
    }

    /// Remove every body
    pub fn clear(&mut self) {
        let handles: Vec<_> = self.bodies.iter().map(|(h, _)| h).collect();
        for handle in &handles {
            self.bodies.remove(
                *handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
        self.events.clear();
        self.forced.clear();
        while self.event_receiver.try_recv().is_ok() {}
        log::debug!("Cleared physics world ({} bodies)", handles.len());
    }

    /// Check whether a handle still resolves to a live body
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of dynamic bodies the solver is currently integrating
    pub fn awake_body_count(&self) -> usize {
        self.bodies
            .iter()
            .filter(|(_, b)| b.is_dynamic() && !b.is_sleeping())
            .count()
    }

    /// Iterate all live body handles
    pub fn body_handles(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.bodies.iter().map(|(h, _)| BodyHandle(h))
    }

    fn body(&self, handle: BodyHandle) -> Result<&rapier::RigidBody> {
        self.bodies
            .get(handle.0)
            .ok_or(PhysicsError::InvalidHandle(handle))
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut rapier::RigidBody> {
        self.bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::InvalidHandle(handle))
    }

    /// Simulation state of a body; handles that no longer resolve are `Removed`
    pub fn body_state(&self, handle: BodyHandle) -> BodyState {
        match self.bodies.get(handle.0) {
            None => BodyState::Removed,
            Some(b) if b.is_dynamic() && b.is_sleeping() => BodyState::Asleep,
            Some(_) => BodyState::Awake,
        }
    }

    /// Whether a body was created with zero mass
    pub fn is_static(&self, handle: BodyHandle) -> Result<bool> {
        Ok(self.body(handle)?.is_fixed())
    }

    /// Material the body's collider was created with
    pub fn body_material(&self, handle: BodyHandle) -> Result<MaterialId> {
        let body = self.body(handle)?;
        Ok(body
            .colliders()
            .first()
            .and_then(|c| self.colliders.get(*c))
            .map(|c| MaterialId::from_user_data(c.user_data))
            .unwrap_or(MaterialId::DEFAULT))
    }

    /// Current position and orientation
    pub fn pose(&self, handle: BodyHandle) -> Result<Pose> {
        let position = self.body(handle)?.position();
        Ok(Pose::new(
            from_vector(&position.translation.vector),
            from_rotation(&position.rotation),
        ))
    }

    /// Current position
    pub fn position(&self, handle: BodyHandle) -> Result<Vec3> {
        Ok(from_vector(self.body(handle)?.translation()))
    }

    /// Current orientation
    pub fn orientation(&self, handle: BodyHandle) -> Result<Quat> {
        Ok(from_rotation(self.body(handle)?.rotation()))
    }

    /// Teleport a body; wakes it
    pub fn set_pose(&mut self, handle: BodyHandle, pose: Pose) -> Result<()> {
        if !pose.is_finite() || pose.orientation.length_squared() < 1.0e-12 {
            return Err(PhysicsError::NonFinite("pose"));
        }
        let body = self.body_mut(handle)?;
        body.set_position(
            to_isometry(pose.position, pose.orientation.normalize()),
            true,
        );
        Ok(())
    }

    /// Linear velocity in m/s
    pub fn linear_velocity(&self, handle: BodyHandle) -> Result<Vec3> {
        Ok(from_vector(self.body(handle)?.linvel()))
    }

    /// Angular velocity in rad/s
    pub fn angular_velocity(&self, handle: BodyHandle) -> Result<Vec3> {
        Ok(from_vector(self.body(handle)?.angvel()))
    }

    /// Set linear velocity; wakes the body, ignored for static bodies
    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) -> Result<()> {
        if !velocity.is_finite() {
            return Err(PhysicsError::NonFinite("linear velocity"));
        }
        let body = self.body_mut(handle)?;
        if body.is_dynamic() {
            body.set_linvel(to_vector(velocity), true);
        }
        Ok(())
    }

    /// Set angular velocity; wakes the body, ignored for static bodies
    pub fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: Vec3) -> Result<()> {
        if !velocity.is_finite() {
            return Err(PhysicsError::NonFinite("angular velocity"));
        }
        let body = self.body_mut(handle)?;
        if body.is_dynamic() {
            body.set_angvel(to_vector(velocity), true);
        }
        Ok(())
    }

    /// Wake a sleeping body
    pub fn wake_up(&mut self, handle: BodyHandle) -> Result<()> {
        self.body_mut(handle)?.wake_up(true);
        Ok(())
    }

    /// Apply a force at the center of mass, consumed by the next step
    pub fn apply_force(&mut self, handle: BodyHandle, force: Vec3) -> Result<()> {
        if !force.is_finite() {
            return Err(PhysicsError::NonFinite("force"));
        }
        let body = self.body_mut(handle)?;
        if !body.is_dynamic() {
            return Ok(());
        }
        body.add_force(to_vector(force), true);
        if !self.forced.contains(&handle.0) {
            self.forced.push(handle.0);
        }
        Ok(())
    }

    /// Apply an impulse at a world-space point
    ///
    /// Wakes a sleeping body first; the velocity change is visible
    /// immediately. Static bodies ignore impulses.
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3, point: Vec3) -> Result<()> {
        if !impulse.is_finite() {
            return Err(PhysicsError::NonFinite("impulse"));
        }
        if !point.is_finite() {
            return Err(PhysicsError::NonFinite("impulse point"));
        }
        let body = self.body_mut(handle)?;
        if !body.is_dynamic() {
            return Ok(());
        }
        body.wake_up(true);
        body.apply_impulse_at_point(to_vector(impulse), to_point(point), true);
        Ok(())
    }

    /// Apply an impulse given in the body frame at a body-frame point
    pub fn apply_local_impulse(
        &mut self,
        handle: BodyHandle,
        impulse: Vec3,
        local_point: Vec3,
    ) -> Result<()> {
        let position = *self.body(handle)?.position();
        let world_impulse = from_vector(&(position * to_vector(impulse)));
        let world_point = from_point(&(position * to_point(local_point)));
        self.apply_impulse(handle, world_impulse, world_point)
    }

    // ==================== Simulation ====================

    /// Advance the simulation by one fixed step
    pub fn step(&mut self) {
        let snapshots = self.snapshot_dynamic_bodies();

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &self.hooks,
            &self.event_collector,
        );

        self.restore_non_finite(&snapshots);
        self.reset_forces();
        self.collect_events(&snapshots);

        self.stats.steps_taken += 1;
        log::trace!(
            "Step {}: {} bodies, {} awake, {} queued events",
            self.stats.steps_taken,
            self.bodies.len(),
            self.awake_body_count(),
            self.events.len()
        );
    }

    /// Run `count` fixed steps back to back
    pub fn step_n(&mut self, count: u32) {
        for _ in 0..count {
            self.step();
        }
    }

    /// Record the pre-step state of every dynamic body
    ///
    /// A body that already carries a non-finite velocity is zeroed here so
    /// that it never reaches the solver.
    fn snapshot_dynamic_bodies(&mut self) -> HashMap<rapier::RigidBodyHandle, BodySnapshot> {
        let mut snapshots: HashMap<_, _> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.is_dynamic())
            .map(|(h, b)| {
                (
                    h,
                    BodySnapshot {
                        position: *b.position(),
                        com: *b.center_of_mass(),
                        linvel: *b.linvel(),
                        angvel: *b.angvel(),
                    },
                )
            })
            .collect();

        for (handle, snapshot) in snapshots.iter_mut() {
            if vector_is_finite(&snapshot.linvel) && vector_is_finite(&snapshot.angvel) {
                continue;
            }
            log::warn!("Body {:?} entered the step with a non-finite velocity, zeroing it", handle);
            snapshot.linvel = rapier::Vector::zeros();
            snapshot.angvel = rapier::Vector::zeros();
            if let Some(body) = self.bodies.get_mut(*handle) {
                body.set_linvel(snapshot.linvel, false);
                body.set_angvel(snapshot.angvel, false);
            }
            self.stats.restored_bodies += 1;
        }
        snapshots
    }

    fn restore_non_finite(&mut self, snapshots: &HashMap<rapier::RigidBodyHandle, BodySnapshot>) {
        let broken: Vec<_> = snapshots
            .keys()
            .copied()
            .filter(|h| {
                self.bodies.get(*h).is_some_and(|b| {
                    !(isometry_is_finite(b.position())
                        && vector_is_finite(b.linvel())
                        && vector_is_finite(b.angvel()))
                })
            })
            .collect();

        for handle in broken {
            let Some(snapshot) = snapshots.get(&handle) else {
                continue;
            };
            let Some(body) = self.bodies.get_mut(handle) else {
                continue;
            };
            log::warn!("Body {:?} went non-finite during the step, restoring pre-step state", handle);
            body.set_position(snapshot.position, false);
            if vector_is_finite(&snapshot.linvel) && vector_is_finite(&snapshot.angvel) {
                body.set_linvel(snapshot.linvel, false);
                body.set_angvel(snapshot.angvel, false);
            } else {
                body.set_linvel(rapier::Vector::zeros(), false);
                body.set_angvel(rapier::Vector::zeros(), false);
            }
            self.stats.restored_bodies += 1;
        }
    }

    fn reset_forces(&mut self) {
        for handle in self.forced.drain(..) {
            if let Some(body) = self.bodies.get_mut(handle) {
                body.reset_forces(false);
            }
        }
    }

    /// Turn solver start events into one event per contact point
    ///
    /// Each contact's impact speed is the pre-step relative velocity at that
    /// point, angular part included, projected on the manifold normal.
    fn collect_events(&mut self, snapshots: &HashMap<rapier::RigidBodyHandle, BodySnapshot>) {
        let velocity_at = |h: rapier::RigidBodyHandle, point: &rapier::Point<f32>| {
            snapshots
                .get(&h)
                .map(|s| s.linvel + s.angvel.cross(&(point.coords - s.com.coords)))
                .unwrap_or_else(rapier::Vector::zeros)
        };

        while let Ok(event) = self.event_receiver.try_recv() {
            let rapier::CollisionEvent::Started(c1, c2, _) = event else {
                continue;
            };
            let parent = |c: rapier::ColliderHandle| self.colliders.get(c).and_then(|c| c.parent());
            let (Some(b1), Some(b2)) = (parent(c1), parent(c2)) else {
                continue;
            };

            let mut emitted = 0;
            if let Some(pair) = self.narrow_phase.contact_pair(c1, c2) {
                for manifold in &pair.manifolds {
                    let normal = manifold.data.normal;
                    let usable = vector_is_finite(&normal) && normal.norm_squared() > 0.0;
                    for contact in &manifold.data.solver_contacts {
                        let relative = velocity_at(b1, &contact.point) - velocity_at(b2, &contact.point);
                        let impact_speed = if usable {
                            relative.dot(&normal).abs()
                        } else {
                            relative.norm()
                        };
                        self.events.push(CollisionEvent {
                            body_a: BodyHandle(b1),
                            body_b: BodyHandle(b2),
                            impact_speed,
                        });
                        emitted += 1;
                    }
                }
            }

            // Every solver contact was discarded: still report the touch once.
            if emitted == 0 {
                let linvel = |h: rapier::RigidBodyHandle| {
                    snapshots
                        .get(&h)
                        .map(|s| s.linvel)
                        .unwrap_or_else(rapier::Vector::zeros)
                };
                self.events.push(CollisionEvent {
                    body_a: BodyHandle(b1),
                    body_b: BodyHandle(b2),
                    impact_speed: (linvel(b1) - linvel(b2)).norm(),
                });
            }
        }
    }

    // ==================== Events ====================

    /// Take every collision event queued so far, in step order
    pub fn drain_collision_events(&mut self) -> Vec<CollisionEvent> {
        self.events.drain().collect()
    }

    /// Number of queued collision events
    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::build(PhysicsConfig::default())
    }
}

fn vector_is_finite(v: &rapier::Vector<f32>) -> bool {
    v.iter().all(|c| c.is_finite())
}

fn isometry_is_finite(iso: &rapier::Isometry<f32>) -> bool {
    vector_is_finite(&iso.translation.vector) && iso.rotation.coords.iter().all(|c| c.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use approx::assert_relative_eq;
    use rapier3d::prelude::PhysicsHooks;

    fn zero_g_world() -> PhysicsWorld {
        PhysicsWorld::new(PhysicsConfig::default().with_gravity(0.0, 0.0, 0.0)).unwrap()
    }

    #[test]
    fn test_create_world() {
        let world = PhysicsWorld::default();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.stats(), WorldStats::default());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = PhysicsWorld::new(PhysicsConfig::default().with_timestep(-1.0));
        assert!(matches!(result, Err(PhysicsError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_descriptions_register_nothing() {
        let mut world = PhysicsWorld::default();
        let sphere = Shape::sphere(0.5).unwrap();

        let bad = [
            BodyDesc::dynamic(-1.0, sphere.clone()),
            BodyDesc::dynamic(f32::NAN, sphere.clone()),
            BodyDesc::dynamic(1.0, Shape::plane()),
            BodyDesc::dynamic(1.0, sphere.clone()).with_position(f32::INFINITY, 0.0, 0.0),
            BodyDesc::dynamic(1.0, sphere.clone())
                .with_pose(Pose::new(Vec3::ZERO, Quat::from_xyzw(0.0, 0.0, 0.0, 0.0))),
        ];
        for desc in bad {
            assert!(matches!(
                world.create_body(desc),
                Err(PhysicsError::InvalidBody(_))
            ));
        }

        let unknown = BodyDesc::dynamic(1.0, sphere).with_material(MaterialId(7));
        assert_eq!(
            world.create_body(unknown),
            Err(PhysicsError::UnknownMaterial(MaterialId(7)))
        );
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_removed_handle_is_invalid() {
        let mut world = PhysicsWorld::default();
        let body = world
            .create_body(BodyDesc::dynamic(1.0, Shape::sphere(0.5).unwrap()))
            .unwrap();

        world.remove_body(body).unwrap();
        assert!(!world.contains(body));
        assert_eq!(world.body_state(body), BodyState::Removed);
        assert_eq!(world.remove_body(body), Err(PhysicsError::InvalidHandle(body)));
        assert_eq!(world.pose(body), Err(PhysicsError::InvalidHandle(body)));
        assert_eq!(
            world.apply_impulse(body, Vec3::Y, Vec3::ZERO),
            Err(PhysicsError::InvalidHandle(body))
        );
    }

    #[test]
    fn test_static_body_ignores_impulse() {
        let mut world = PhysicsWorld::default();
        let ground = world.create_body(BodyDesc::fixed(Shape::plane())).unwrap();

        world.apply_impulse(ground, Vec3::new(0.0, 100.0, 0.0), Vec3::ZERO).unwrap();
        world.step();

        assert_eq!(world.linear_velocity(ground).unwrap(), Vec3::ZERO);
        assert_eq!(world.body_state(ground), BodyState::Awake);
        assert!(world.is_static(ground).unwrap());
    }

    #[test]
    fn test_non_finite_impulse_rejected() {
        let mut world = zero_g_world();
        let body = world
            .create_body(BodyDesc::dynamic(1.0, Shape::sphere(0.5).unwrap()))
            .unwrap();

        assert_eq!(
            world.apply_impulse(body, Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ZERO),
            Err(PhysicsError::NonFinite("impulse"))
        );
        assert_eq!(world.linear_velocity(body).unwrap(), Vec3::ZERO);
    }

    #[test]
    fn test_non_finite_velocity_is_restored() {
        let mut world = zero_g_world();
        let shape = Shape::sphere(0.5).unwrap();
        let broken = world
            .create_body(BodyDesc::dynamic(1.0, shape.clone()).with_position(0.0, 0.0, 0.0))
            .unwrap();
        let healthy = world
            .create_body(
                BodyDesc::dynamic(1.0, shape)
                    .with_position(10.0, 0.0, 0.0)
                    .with_linear_velocity(Vec3::new(1.0, 0.0, 0.0)),
            )
            .unwrap();

        // Bypass the public API, which refuses non-finite input.
        world
            .bodies
            .get_mut(broken.0)
            .unwrap()
            .set_linvel(rapier::Vector::new(f32::NAN, 0.0, 0.0), false);

        world.step();

        let pose = world.pose(broken).unwrap();
        assert!(pose.is_finite());
        assert_relative_eq!(pose.position.x, 0.0, epsilon = 1e-6);
        assert_eq!(world.linear_velocity(broken).unwrap(), Vec3::ZERO);
        assert_eq!(world.stats().restored_bodies, 1);

        let dt = world.timestep();
        assert_relative_eq!(world.position(healthy).unwrap().x, 10.0 + dt, epsilon = 1e-5);
        assert_relative_eq!(world.linear_velocity(healthy).unwrap().x, 1.0, epsilon = 1e-6);
    }

    fn first_collider(world: &PhysicsWorld, body: BodyHandle) -> rapier::ColliderHandle {
        world.bodies[body.0].colliders()[0]
    }

    #[test]
    fn test_pair_with_non_finite_body_is_discarded() {
        let mut world = zero_g_world();
        let shape = Shape::sphere(0.5).unwrap();
        let broken = world.create_body(BodyDesc::dynamic(1.0, shape.clone())).unwrap();
        let healthy = world
            .create_body(BodyDesc::dynamic(1.0, shape).with_position(0.9, 0.0, 0.0))
            .unwrap();
        let healthy_before = world.pose(healthy).unwrap();
        let (c1, c2) = (first_collider(&world, broken), first_collider(&world, healthy));

        let filter = |world: &PhysicsWorld| {
            world.hooks.filter_contact_pair(&rapier::PairFilterContext {
                bodies: &world.bodies,
                colliders: &world.colliders,
                rigid_body1: Some(broken.0),
                rigid_body2: Some(healthy.0),
                collider1: c1,
                collider2: c2,
            })
        };
        assert!(filter(&world).is_some());
        assert_eq!(world.stats().discarded_contacts, 0);

        // Bypass the public API, which refuses non-finite poses.
        world
            .bodies
            .get_mut(broken.0)
            .unwrap()
            .set_translation(rapier::Vector::new(f32::NAN, 0.0, 0.0), false);

        assert!(filter(&world).is_none());
        assert_eq!(world.stats().discarded_contacts, 1);
        assert_eq!(world.pose(healthy).unwrap(), healthy_before);
        assert_eq!(world.linear_velocity(healthy).unwrap(), Vec3::ZERO);
    }

    #[test]
    fn test_degenerate_solver_contacts_are_discarded() {
        let mut world = zero_g_world();
        let shape = Shape::sphere(0.5).unwrap();
        let a = world.create_body(BodyDesc::dynamic(1.0, shape.clone())).unwrap();
        let b = world
            .create_body(BodyDesc::dynamic(1.0, shape).with_position(0.95, 0.0, 0.0))
            .unwrap();
        world.step();
        assert_eq!(world.stats().discarded_contacts, 0);

        let (c1, c2) = (first_collider(&world, a), first_collider(&world, b));
        let pair = world
            .narrow_phase
            .contact_pair(c1, c2)
            .expect("overlapping spheres should be in contact");
        let manifold = &pair.manifolds[0];
        let contact = manifold.data.solver_contacts[0].clone();

        let mut contacts = vec![contact.clone(), contact];
        contacts[0].point = rapier::Point::new(f32::NAN, 0.0, 0.0);
        let mut normal = manifold.data.normal;
        let mut user_data = 0u32;
        world.hooks.modify_solver_contacts(&mut rapier::ContactModificationContext {
            bodies: &world.bodies,
            colliders: &world.colliders,
            collider1: c1,
            collider2: c2,
            rigid_body1: Some(a.0),
            rigid_body2: Some(b.0),
            manifold,
            solver_contacts: &mut contacts,
            normal: &mut normal,
            user_data: &mut user_data,
        });
        assert_eq!(contacts.len(), 1);
        assert!(contacts[0].point.coords.iter().all(|v| v.is_finite()));
        assert_eq!(world.stats().discarded_contacts, 1);

        // A degenerate normal takes the whole manifold with it.
        let mut normal = rapier::Vector::zeros();
        world.hooks.modify_solver_contacts(&mut rapier::ContactModificationContext {
            bodies: &world.bodies,
            colliders: &world.colliders,
            collider1: c1,
            collider2: c2,
            rigid_body1: Some(a.0),
            rigid_body2: Some(b.0),
            manifold,
            solver_contacts: &mut contacts,
            normal: &mut normal,
            user_data: &mut user_data,
        });
        assert!(contacts.is_empty());
        assert_eq!(world.stats().discarded_contacts, 2);
    }

    #[test]
    fn test_impact_speed_includes_spin() {
        let mut world = zero_g_world();
        world.create_body(BodyDesc::fixed(Shape::plane())).unwrap();
        // A stick spinning clockwise about Z: its right end swings down into
        // the ground while its center of mass stays put.
        let stick = world
            .create_body(
                BodyDesc::dynamic(1.0, Shape::cuboid(1.0, 0.05, 0.05).unwrap())
                    .with_position(0.0, 0.3, 0.0)
                    .with_angular_velocity(Vec3::new(0.0, 0.0, -3.0)),
            )
            .unwrap();
        assert_eq!(world.linear_velocity(stick).unwrap(), Vec3::ZERO);

        let mut events = Vec::new();
        for _ in 0..60 {
            world.step();
            events.extend(world.drain_collision_events());
            if !events.is_empty() {
                break;
            }
        }

        assert!(!events.is_empty(), "stick never touched the ground");
        for event in &events {
            assert!(event.involves(stick));
            // The tip moves at about |w| * 1m = 3 m/s.
            assert!(event.impact_speed > 1.5, "impact speed {}", event.impact_speed);
        }
    }

    #[test]
    fn test_collision_events_and_purge() {
        let mut world = PhysicsWorld::default();
        let ground = world.create_body(BodyDesc::fixed(Shape::plane())).unwrap();
        let ball = world
            .create_body(
                BodyDesc::dynamic(1.0, Shape::sphere(0.5).unwrap()).with_position(0.0, 1.0, 0.0),
            )
            .unwrap();

        for _ in 0..60 {
            world.step();
            if world.pending_event_count() > 0 {
                break;
            }
        }
        let event = world
            .events
            .iter()
            .next()
            .copied()
            .expect("ball should hit the ground within a second");
        assert!(event.involves(ground));
        assert!(event.involves(ball));
        assert!(event.impact_speed > 1.0);

        world.remove_body(ball).unwrap();
        assert!(world.drain_collision_events().is_empty());
    }

    #[test]
    fn test_apply_force_lasts_one_step() {
        let mut world = zero_g_world();
        let body = world
            .create_body(BodyDesc::dynamic(2.0, Shape::sphere(0.5).unwrap()).with_can_sleep(false))
            .unwrap();

        world.apply_force(body, Vec3::new(120.0, 0.0, 0.0)).unwrap();
        world.step();
        let after_one = world.linear_velocity(body).unwrap().x;
        world.step();
        let after_two = world.linear_velocity(body).unwrap().x;

        assert_relative_eq!(after_one, 120.0 / 2.0 * world.timestep(), epsilon = 1e-4);
        assert_relative_eq!(after_one, after_two, epsilon = 1e-6);
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut world = PhysicsWorld::default();
        let shape = Shape::cuboid(0.5, 0.5, 0.5).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                world
                    .create_body(BodyDesc::dynamic(1.0, shape.clone()).with_position(0.0, i as f32, 0.0))
                    .unwrap()
            })
            .collect();

        world.clear();

        assert_eq!(world.body_count(), 0);
        assert!(handles.iter().all(|h| !world.contains(*h)));
    }

    #[test]
    fn test_local_impulse_uses_body_frame() {
        let mut world = zero_g_world();
        let body = world
            .create_body(
                BodyDesc::dynamic(1.0, Shape::sphere(0.5).unwrap())
                    .with_rotation_euler(0.0, 0.0, std::f32::consts::FRAC_PI_2),
            )
            .unwrap();

        world.apply_local_impulse(body, Vec3::X, Vec3::ZERO).unwrap();

        let v = world.linear_velocity(body).unwrap();
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(v.y, 1.0, epsilon = 1e-5);
    }
}
