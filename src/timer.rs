//! Cancellable delayed actions measured in elapsed seconds.
//!
//! Each [`DelayedTask`] is one logical slot: arming it again replaces whatever was pending, so the
//! previous arming can never fire.

use bevy_reflect::Reflect;

#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct DelayedTask {
    deadline: Option<f64>,
}

impl DelayedTask {
    /// Schedules the task `delay` seconds after `now`, superseding any pending arming.
    pub fn arm(&mut self, now: f64, delay: f64) {
        self.deadline = Some(now + delay.max(0.0));
    }

    /// Cancels the pending arming. Returns `true` if something was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    /// Returns `true` exactly once, on the first poll at or after the deadline.
    pub fn poll(&mut self, now: f64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
