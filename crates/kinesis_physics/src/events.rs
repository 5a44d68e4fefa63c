//! Collision events
//!
//! Rapier reports pair transitions through [`rapier::EventHandler`] while it
//! steps. Those are funnelled through a channel, converted to
//! [`CollisionEvent`]s once the step is over, and queued until the owner drains
//! them. Handlers never run inside the step, so nothing can mutate the world
//! re-entrantly.

use crate::body::BodyHandle;
use crossbeam_channel::{Receiver, Sender};
use rapier3d::prelude as rapier;
use std::collections::VecDeque;

/// A contact point between two bodies that started touching during a step
///
/// A pair touching at several points at once (a box landing flat) yields one
/// event per point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// First body of the pair
    pub body_a: BodyHandle,
    /// Second body of the pair
    pub body_b: BodyHandle,
    /// Relative speed of the two surfaces at the contact point along the
    /// contact normal, just before the step (m/s, >= 0)
    ///
    /// Not filtered: consumers decide what counts as an audible impact.
    pub impact_speed: f32,
}

impl CollisionEvent {
    /// Check whether the event involves a body
    pub fn involves(&self, body: BodyHandle) -> bool {
        self.body_a == body || self.body_b == body
    }

    /// The body on the other side of the pair
    pub fn other(&self, body: BodyHandle) -> Option<BodyHandle> {
        if self.body_a == body {
            Some(self.body_b)
        } else if self.body_b == body {
            Some(self.body_a)
        } else {
            None
        }
    }
}

/// FIFO of collision events, in step order
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<CollisionEvent>,
}

impl EventQueue {
    /// Create a new event queue
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, event: CollisionEvent) {
        self.events.push_back(event);
    }

    /// Take every queued event, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = CollisionEvent> + '_ {
        self.events.drain(..)
    }

    /// Drop events that reference a body
    pub fn purge(&mut self, body: BodyHandle) -> usize {
        let before = self.events.len();
        self.events.retain(|e| !e.involves(body));
        before - self.events.len()
    }

    /// Queued events without consuming them
    pub fn iter(&self) -> impl Iterator<Item = &CollisionEvent> {
        self.events.iter()
    }

    /// Get pending count
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all collected events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Channel-based event collector for Rapier
pub(crate) struct ChannelEventCollector {
    collision_events: Sender<rapier::CollisionEvent>,
}

impl ChannelEventCollector {
    pub(crate) fn new() -> (Self, Receiver<rapier::CollisionEvent>) {
        let (collision_events, receiver) = crossbeam_channel::unbounded();
        (Self { collision_events }, receiver)
    }
}

impl rapier::EventHandler for ChannelEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        event: rapier::CollisionEvent,
        _contact_pair: Option<&rapier::ContactPair>,
    ) {
        let _ = self.collision_events.send(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        _contact_pair: &rapier::ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}
