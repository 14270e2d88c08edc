//! Forced-posture side effect (crouching onto a climbable lattice).
//!
//! The host implements [`PostureControl`]; the engine only drives it through
//! a [`PostureGuard`], which remembers whether it caused the active state so
//! releasing never undoes a posture the player chose themselves.

use log::debug;

/// Capability to force the entity into a crouched, slowed posture.
pub trait PostureControl {
    /// Forces the posture on.
    fn activate(&mut self);
    /// Lets the posture go.
    fn release(&mut self);
    /// Whether the posture is currently forced.
    fn is_active(&self) -> bool;
}

/// Tracks whether this engine owns the current forced posture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostureGuard {
    engaged: bool,
}

impl PostureGuard {
    /// Guard that owns nothing yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { engaged: false }
    }

    /// Whether the guard activated the posture and has not released it.
    #[must_use]
    pub const fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Activates the posture unless it is already active.
    ///
    /// Calling this repeatedly has no further effect. A posture that was
    /// active before the first call is left alone and never claimed.
    pub fn engage(&mut self, control: &mut dyn PostureControl) {
        if self.engaged || control.is_active() {
            return;
        }
        control.activate();
        self.engaged = true;
        debug!("forced crouch engaged");
    }

    /// Releases the posture if, and only if, this guard activated it.
    pub fn release(&mut self, control: &mut dyn PostureControl) {
        if !self.engaged {
            return;
        }
        control.release();
        self.engaged = false;
        debug!("forced crouch released");
    }
}

/// Posture control for hosts without a crouch capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPosture;

impl PostureControl for NoPosture {
    fn activate(&mut self) {}

    fn release(&mut self) {}

    fn is_active(&self) -> bool {
        false
    }
}
