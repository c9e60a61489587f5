//! # Tap gestures
//!
//! [`TapGesture`] turns pointer presses into either a delayed single tap or an immediate
//! double tap. A double tap toggles [`TargetingMode`]; entering targeting captures a
//! [`TargetLock`]. A single tap is only reported once the double-tap window has passed without a
//! second press, so one physical double tap never produces both actions.

use bevy_ecs::prelude::*;
use bevy_math::{Quat, Vec2, Vec3};
use bevy_reflect::Reflect;
use bevy_utils::tracing::*;

use crate::{settings::GestureSettings, timer::DelayedTask};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
pub enum TargetingMode {
    #[default]
    Idle,
    Targeting,
}

impl TargetingMode {
    pub fn toggled(self) -> Self {
        match self {
            TargetingMode::Idle => TargetingMode::Targeting,
            TargetingMode::Targeting => TargetingMode::Idle,
        }
    }

    pub fn is_targeting(self) -> bool {
        self == TargetingMode::Targeting
    }
}

/// The world point and camera orientation remembered when targeting starts.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct TargetLock {
    pub point: Vec3,
    pub camera_rotation: Quat,
}

/// What a press did to the gesture state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapOutcome {
    /// The press landed inside the debounce window and was dropped.
    Debounced,
    /// A single tap will fire after the double-tap window unless another press arrives.
    SingleTapArmed,
    /// The press completed a double tap.
    Toggled {
        mode: TargetingMode,
        lock: Option<TargetLock>,
    },
}

/// A single tap that survived the double-tap window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingleTap {
    /// Where the pointer was when pressed, if the input source reported it.
    pub position: Option<Vec2>,
}

/// Published whenever a cursor's targeting mode changes.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct TargetingEvent {
    pub cursor: Entity,
    pub mode: TargetingMode,
    /// The lock captured on entering targeting; `None` when leaving it.
    pub lock: Option<TargetLock>,
}

#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct TapGesture {
    settings: GestureSettings,
    mode: TargetingMode,
    last_tap: Option<f64>,
    debounce: DelayedTask,
    pending_tap: DelayedTask,
    pending_position: Option<Vec2>,
    lock: Option<TargetLock>,
}

impl TapGesture {
    pub fn new(settings: GestureSettings) -> Self {
        TapGesture {
            settings,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> TargetingMode {
        self.mode
    }

    /// The most recent lock. It stays readable after targeting ends and is replaced on the next
    /// transition into targeting.
    pub fn lock(&self) -> Option<TargetLock> {
        self.lock
    }

    pub fn is_debouncing(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn has_pending_tap(&self) -> bool {
        self.pending_tap.is_pending()
    }

    /// Feeds a press at time `now`. `capture_lock` is only called when the press enters targeting.
    pub fn press(
        &mut self,
        now: f64,
        position: Option<Vec2>,
        capture_lock: impl FnOnce() -> TargetLock,
    ) -> TapOutcome {
        self.debounce.poll(now);
        if self.debounce.is_pending() {
            trace!("Press at {now:.3}s debounced");
            return TapOutcome::Debounced;
        }
        self.debounce.arm(now, self.settings.debounce);

        let is_double_tap = self
            .last_tap
            .is_some_and(|last| now - last < self.settings.double_tap_threshold);

        let outcome = if is_double_tap {
            self.mode = self.mode.toggled();
            let lock = match self.mode {
                TargetingMode::Targeting => {
                    let lock = capture_lock();
                    self.lock = Some(lock);
                    Some(lock)
                }
                TargetingMode::Idle => None,
            };
            self.pending_tap.cancel();
            self.pending_position = None;
            debug!("Double tap at {now:.3}s, mode is now {:?}", self.mode);
            TapOutcome::Toggled {
                mode: self.mode,
                lock,
            }
        } else {
            self.pending_tap
                .arm(now, self.settings.double_tap_threshold);
            self.pending_position = position;
            TapOutcome::SingleTapArmed
        };

        self.last_tap = Some(now);
        outcome
    }

    /// Advances timers to `now`, returning the single tap whose window just closed.
    pub fn tick(&mut self, now: f64) -> Option<SingleTap> {
        self.debounce.poll(now);
        self.pending_tap.poll(now).then(|| SingleTap {
            position: self.pending_position.take(),
        })
    }
}
