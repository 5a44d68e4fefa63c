//! Pointer state
//!
//! The host forwards pointer motion and clicks as they arrive; the context
//! consumes at most one pending click per frame.

use glam::Vec2;

/// Last pointer position and any click waiting to be handled
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerState {
    ndc: Option<Vec2>,
    pending_click: bool,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer position in pixels, origin top-left
    ///
    /// Ignored when the viewport is empty.
    pub fn pointer_moved(&mut self, x: f32, y: f32, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0) || !x.is_finite() || !y.is_finite() {
            return;
        }
        self.ndc = Some(Vec2::new(x / width * 2.0 - 1.0, 1.0 - y / height * 2.0));
    }

    /// Record a pointer position already in normalized device coordinates
    pub fn pointer_moved_ndc(&mut self, ndc: Vec2) {
        if ndc.is_finite() {
            self.ndc = Some(ndc);
        }
    }

    /// Request a pick at the current pointer position
    pub fn click(&mut self) {
        self.pending_click = true;
    }

    /// Last known position in NDC
    pub fn ndc(&self) -> Option<Vec2> {
        self.ndc
    }

    pub fn has_pending_click(&self) -> bool {
        self.pending_click
    }

    /// Consume the pending click
    ///
    /// A click before any pointer motion is dropped: there is nothing to aim at.
    pub fn take_click(&mut self) -> Option<Vec2> {
        if !std::mem::take(&mut self.pending_click) {
            return None;
        }
        if self.ndc.is_none() {
            log::debug!("Click with no pointer position, ignoring");
        }
        self.ndc
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
