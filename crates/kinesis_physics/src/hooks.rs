//! Solver hooks: material pairing and degenerate-contact discard

use crate::material::{MaterialId, MaterialRegistry};
use rapier3d::prelude as rapier;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hooks installed on every collider the world creates
pub(crate) struct ContactHooks {
    pub(crate) materials: MaterialRegistry,
    discarded: AtomicU64,
}

impl ContactHooks {
    pub(crate) fn new(materials: MaterialRegistry) -> Self {
        Self {
            materials,
            discarded: AtomicU64::new(0),
        }
    }

    /// Contacts and pairs dropped since creation
    pub(crate) fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    fn discard(&self, count: u64) {
        self.discarded.fetch_add(count, Ordering::Relaxed);
    }

    fn material_of(colliders: &rapier::ColliderSet, handle: rapier::ColliderHandle) -> MaterialId {
        colliders
            .get(handle)
            .map(|c| MaterialId::from_user_data(c.user_data))
            .unwrap_or(MaterialId::DEFAULT)
    }
}

fn body_is_finite(bodies: &rapier::RigidBodySet, handle: Option<rapier::RigidBodyHandle>) -> bool {
    let Some(body) = handle.and_then(|h| bodies.get(h)) else {
        return true;
    };
    let pos = body.position();
    pos.translation.vector.iter().all(|v| v.is_finite())
        && pos.rotation.coords.iter().all(|v| v.is_finite())
        && body.linvel().iter().all(|v| v.is_finite())
        && body.angvel().iter().all(|v| v.is_finite())
}

impl rapier::PhysicsHooks for ContactHooks {
    fn filter_contact_pair(&self, context: &rapier::PairFilterContext) -> Option<rapier::SolverFlags> {
        if !body_is_finite(context.bodies, context.rigid_body1)
            || !body_is_finite(context.bodies, context.rigid_body2)
        {
            log::warn!(
                "Discarding contact pair {:?}/{:?}: non-finite body state",
                context.rigid_body1,
                context.rigid_body2
            );
            self.discard(1);
            return None;
        }
        Some(rapier::SolverFlags::COMPUTE_IMPULSES)
    }

    fn modify_solver_contacts(&self, context: &mut rapier::ContactModificationContext) {
        if !context.normal.iter().all(|v| v.is_finite()) || context.normal.norm_squared() == 0.0 {
            log::warn!(
                "Discarding {} contacts between {:?}/{:?}: degenerate normal",
                context.solver_contacts.len(),
                context.collider1,
                context.collider2
            );
            self.discard(context.solver_contacts.len() as u64);
            context.solver_contacts.clear();
            return;
        }

        let before = context.solver_contacts.len();
        context
            .solver_contacts
            .retain(|c| c.dist.is_finite() && c.point.iter().all(|v| v.is_finite()));
        let dropped = before - context.solver_contacts.len();
        if dropped > 0 {
            log::warn!(
                "Discarded {} degenerate contacts between {:?}/{:?}",
                dropped,
                context.collider1,
                context.collider2
            );
            self.discard(dropped as u64);
        }

        let contact = self.materials.contact_material(
            Self::material_of(context.colliders, context.collider1),
            Self::material_of(context.colliders, context.collider2),
        );
        for solver_contact in context.solver_contacts.iter_mut() {
            solver_contact.friction = contact.friction;
            solver_contact.restitution = contact.restitution;
        }
    }
}
