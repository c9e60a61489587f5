//! Reticle geometry in the reticle's local XY plane (x right, y up, z towards the viewer).
//!
//! Prong `i` of `n` lies along [`base_angle`]`(i, n)`, measured counterclockwise from +X, starting
//! straight up: for four prongs that is up, left, down, right.

use std::f32::consts::{FRAC_PI_2, TAU};

use bevy_math::{Quat, Vec2, Vec3};

/// Below this lateral magnitude the locked direction counts as dead ahead.
const COMPASS_DEAD_ZONE: f32 = 1e-6;

pub fn base_angle(index: usize, count: usize) -> f32 {
    FRAC_PI_2 + index as f32 * TAU / count.max(1) as f32
}

/// Unit vector along prong `index`.
pub fn prong_axis(index: usize, count: usize) -> Vec2 {
    Vec2::from_angle(base_angle(index, count))
}

/// Position on a ring of `radius` at `angle`.
pub fn ring_position(angle: f32, radius: f32) -> Vec2 {
    Vec2::from_angle(angle) * radius
}

/// Z rotation that points an element's local +Y from `position` towards the centre.
pub fn inward_rotation(position: Vec2) -> f32 {
    let inward = -position;
    if inward.length_squared() == 0.0 {
        return 0.0;
    }
    inward.y.atan2(inward.x) - FRAC_PI_2
}

/// Where the locked view direction lies relative to the current camera view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compass {
    /// Screen-plane direction of the locked forward axis, counterclockwise from +X.
    pub bearing: f32,
    /// How strongly markers are pulled towards `bearing`, from 0 (dead ahead) to 1.
    pub weight: f32,
}

impl Compass {
    pub const AHEAD: Compass = Compass {
        bearing: 0.0,
        weight: 0.0,
    };

    /// Expresses the locked camera orientation in the current camera frame and projects its
    /// forward axis onto the screen plane.
    ///
    /// Roll about the view axis leaves the forward axis in place, so rolling the device does not
    /// deflect the markers while the locked direction is still dead ahead.
    pub fn from_orientations(locked: Quat, current: Quat, full_deflection: f32) -> Self {
        let relative = current.inverse() * locked;
        let forward = relative * Vec3::NEG_Z;
        let lateral = forward.truncate();
        if lateral.length() < COMPASS_DEAD_ZONE {
            return Compass::AHEAD;
        }
        let off_axis = forward.angle_between(Vec3::NEG_Z);
        let weight = if full_deflection > 0.0 {
            (off_axis / full_deflection).clamp(0.0, 1.0)
        } else {
            1.0
        };
        Compass {
            bearing: lateral.y.atan2(lateral.x),
            weight,
        }
    }

    /// Ring angle of a marker whose resting angle is `base`.
    ///
    /// The marker slides towards the bearing by `gather * weight * sin(bearing - base)`, which is
    /// continuous in both the bearing and the weight. With `gather` at most one radian a marker is
    /// never carried past the bearing.
    pub fn marker_angle(&self, base: f32, gather: f32) -> f32 {
        base + gather * self.weight * (self.bearing - base).sin()
    }
}

/// Outward arrow bounce in `0..=1`: a fast rise over `out` seconds, then a slow fall over `back`.
pub fn arrow_pulse(clock: f64, out: f32, back: f32) -> f32 {
    let cycle = (out + back) as f64;
    if cycle <= 0.0 {
        return 0.0;
    }
    let t = clock.rem_euclid(cycle) as f32;
    if t < out {
        t / out
    } else if back > 0.0 {
        1.0 - (t - out) / back
    } else {
        0.0
    }
}
