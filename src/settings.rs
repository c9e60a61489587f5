use std::f32::consts::FRAC_PI_4;

use bevy_ecs::prelude::*;
use bevy_reflect::Reflect;

/// Tunables for every component in this crate. Spawn helpers copy the relevant part into the
/// components they create, so changing this resource only affects entities spawned afterwards.
#[derive(Resource, Debug, Clone, Default, Reflect)]
#[reflect(Resource)]
pub struct TargetingSettings {
    pub gesture: GestureSettings,
    pub cursor: CursorSettings,
    pub reticle: ReticleSettings,
    pub range_finder: RangeFinderSettings,
}

impl TargetingSettings {
    pub fn with_gesture(self, gesture: GestureSettings) -> Self {
        Self { gesture, ..self }
    }

    pub fn with_cursor(self, cursor: CursorSettings) -> Self {
        Self { cursor, ..self }
    }

    pub fn with_reticle(self, reticle: ReticleSettings) -> Self {
        Self { reticle, ..self }
    }

    pub fn with_range_finder(self, range_finder: RangeFinderSettings) -> Self {
        Self {
            range_finder,
            ..self
        }
    }
}

/// Timing of the tap classifier, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct GestureSettings {
    /// Presses arriving within this window after an accepted press are ignored.
    pub debounce: f64,
    /// Two accepted presses closer than this form a double tap.
    pub double_tap_threshold: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            debounce: 0.05,
            double_tap_threshold: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct CursorSettings {
    /// Distance in front of the camera used when the cursor is not on a surface.
    pub depth: f32,
    /// Rate of the exponential approach towards the target pose, per second.
    pub lerp_speed: f32,
    /// Seconds a surface snap is held before the cursor returns to its default offset.
    pub return_delay: f64,
}

impl Default for CursorSettings {
    fn default() -> Self {
        Self {
            depth: 1.0,
            lerp_speed: 5.0,
            return_delay: 2.0,
        }
    }
}

/// Order in which the dots of a prong pulse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum SweepOrder {
    /// Innermost dot first.
    #[default]
    Outward,
    /// Outermost dot first.
    Inward,
}

#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct ReticleSettings {
    pub prong_count: usize,
    pub dots_per_prong: usize,
    /// Radial spacing between consecutive dots.
    pub line_spacing: f32,
    pub line_length: f32,
    pub line_thickness: f32,
    /// Radius of the innermost dot.
    pub central_offset: f32,
    /// Base duration of one dot pulse, in seconds.
    pub animation_speed: f32,
    /// Scale factor a dot grows to at the peak of its pulse.
    pub grow_scale: f32,
    pub rest_alpha: f32,
    pub peak_alpha: f32,
    pub sweep: SweepOrder,
    /// Arrow ring radius is `central_offset - arrow_inset * line_spacing`.
    pub arrow_inset: f32,
    /// Outward arrow bounce, in multiples of `line_spacing`.
    pub arrow_pulse: f32,
    pub arrow_pulse_out: f32,
    pub arrow_pulse_in: f32,
    /// Largest angle, in radians, a marker slides towards the locked point. Keep at or below one
    /// radian so markers never pass the locked direction.
    pub compass_gather: f32,
    /// Off-axis angle, in radians, at which markers are fully deflected.
    pub compass_full_deflection: f32,
}

impl Default for ReticleSettings {
    fn default() -> Self {
        Self {
            prong_count: 4,
            dots_per_prong: 20,
            line_spacing: 0.005,
            line_length: 0.005,
            line_thickness: 0.005,
            central_offset: 0.065,
            animation_speed: 0.0125,
            grow_scale: 2.0,
            rest_alpha: 179.0 / 255.0,
            peak_alpha: 229.0 / 255.0,
            sweep: SweepOrder::Outward,
            arrow_inset: 3.0,
            arrow_pulse: 5.0,
            arrow_pulse_out: 0.1,
            arrow_pulse_in: 0.4,
            compass_gather: 1.0,
            compass_full_deflection: FRAC_PI_4,
        }
    }
}

impl ReticleSettings {
    pub fn arrow_radius(&self) -> f32 {
        self.central_offset - self.arrow_inset * self.line_spacing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct RangeFinderSettings {
    /// Approach rate of the forward nudge, per second.
    pub move_speed: f32,
    /// Maximum dial rotation, in radians per second.
    pub rotation_speed: f32,
    /// How far the dial moves forward while the point cloud is empty.
    pub forward_nudge: f32,
}

impl Default for RangeFinderSettings {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            rotation_speed: std::f32::consts::TAU,
            forward_nudge: 0.05,
        }
    }
}

/// Per-stage switches, checked as run conditions by [`crate::TargetingPlugin`].
#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource)]
pub struct TargetingPluginState {
    pub read_input: bool,
    pub update_cursor: bool,
    pub update_reticle: bool,
    pub update_range_finder: bool,
    #[cfg(feature = "debug")]
    pub debug_gizmos: bool,
}

impl Default for TargetingPluginState {
    fn default() -> Self {
        TargetingPluginState {
            read_input: true,
            update_cursor: true,
            update_reticle: true,
            update_range_finder: true,
            #[cfg(feature = "debug")]
            debug_gizmos: false,
        }
    }
}

#[cfg(feature = "debug")]
impl TargetingPluginState {
    pub fn with_debug_gizmos(self) -> Self {
        TargetingPluginState {
            debug_gizmos: true,
            ..self
        }
    }
}
