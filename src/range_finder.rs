//! # Range dial
//!
//! A dial attached to a cursor that turns with the distance to the surface under the cursor,
//! relative to the farthest known point. While the point cloud is empty the dial leans forward.

use std::f32::consts::TAU;

use bevy_ecs::prelude::*;
use bevy_math::{Quat, Vec3};
use bevy_reflect::Reflect;
use bevy_render::prelude::SpatialBundle;
use bevy_time::Time;
use bevy_transform::components::Transform;

use crate::{
    camera::{CameraPose, ProjectedCamera},
    cursor::{ArCursor, CursorReadout},
    point_cloud::PointCloud,
    settings::RangeFinderSettings,
};

/// Dial that reads the [`CursorReadout`] of `cursor`. Usually spawned as a child of the cursor.
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct RangeFinder {
    pub cursor: Entity,
}

/// Dial angle for a `range` measured against the `farthest` known point.
///
/// A full turn means the surface under the cursor is the farthest point. Without a range or with
/// an empty cloud the dial sits at zero.
pub fn dial_angle(range: Option<f32>, farthest: f32) -> f32 {
    match range {
        Some(range) if farthest > 0.0 => TAU * (range / farthest).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Animation state of a range dial. Its resting local pose is captured on the first tick.
#[derive(Component, Debug, Clone)]
pub struct RangeDial {
    settings: RangeFinderSettings,
    rest: Option<(Vec3, Quat)>,
    angle: f32,
}

impl RangeDial {
    pub fn new(settings: RangeFinderSettings) -> Self {
        RangeDial {
            settings,
            rest: None,
            angle: 0.0,
        }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn rest_translation(&self) -> Option<Vec3> {
        self.rest.map(|(translation, _)| translation)
    }

    /// Turns the dial towards [`dial_angle`] and moves it towards its rest position, or in front of
    /// it when `farthest` is zero.
    pub fn tick(&mut self, dt: f32, range: Option<f32>, farthest: f32, transform: &mut Transform) {
        let dt = dt.max(0.0);
        let (rest_translation, rest_rotation) = *self
            .rest
            .get_or_insert((transform.translation, transform.rotation));

        let target = dial_angle(range, farthest);
        let max_step = self.settings.rotation_speed * dt;
        self.angle += (target - self.angle).clamp(-max_step, max_step);
        transform.rotation = rest_rotation * Quat::from_rotation_z(self.angle);

        let goal = if farthest > 0.0 {
            rest_translation
        } else {
            rest_translation + Vec3::NEG_Z * self.settings.forward_nudge
        };
        let t = 1.0 - (-self.settings.move_speed * dt).exp();
        transform.translation = transform.translation.lerp(goal, t);
    }
}

#[derive(Bundle)]
pub struct RangeFinderBundle {
    pub range_finder: RangeFinder,
    pub dial: RangeDial,
    pub spatial: SpatialBundle,
}

impl RangeFinderBundle {
    pub fn new(cursor: Entity, settings: RangeFinderSettings) -> Self {
        RangeFinderBundle {
            range_finder: RangeFinder { cursor },
            dial: RangeDial::new(settings),
            spatial: SpatialBundle::default(),
        }
    }
}

pub fn update_range_finders(
    time: Res<Time>,
    cloud: Res<PointCloud>,
    cursors: Query<(&ArCursor, &CursorReadout)>,
    cameras: Query<&ProjectedCamera>,
    mut dials: Query<(&RangeFinder, &mut RangeDial, &mut Transform)>,
) {
    let dt = time.delta_seconds();
    for (range_finder, mut dial, mut transform) in &mut dials {
        let Ok((cursor, readout)) = cursors.get(range_finder.cursor) else {
            continue;
        };
        let Ok(camera) = cameras.get(cursor.camera) else {
            continue;
        };
        let farthest = cloud.farthest_distance_from_point(camera.position());
        dial.tick(dt, readout.range, farthest, &mut transform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_maps_range_over_farthest() {
        assert_eq!(dial_angle(None, 4.0), 0.0);
        assert_eq!(dial_angle(Some(2.0), 0.0), 0.0);
        assert!((dial_angle(Some(1.0), 4.0) - TAU / 4.0).abs() < 1e-6);
        assert_eq!(dial_angle(Some(9.0), 4.0), TAU);
    }

    #[test]
    fn dial_turns_at_limited_speed() {
        let mut dial = RangeDial::new(RangeFinderSettings::default());
        let mut transform = Transform::default();
        // Target is half a turn; one turn per second takes half a second.
        dial.tick(0.1, Some(2.0), 4.0, &mut transform);
        assert!((dial.angle() - TAU * 0.1).abs() < 1e-5);
        for _ in 0..10 {
            dial.tick(0.1, Some(2.0), 4.0, &mut transform);
        }
        assert!((dial.angle() - TAU / 2.0).abs() < 1e-5);
        let turned = transform.rotation * Vec3::X;
        assert!(turned.distance(Vec3::NEG_X) < 1e-4);
    }

    #[test]
    fn empty_cloud_nudges_forward_and_returns() {
        let settings = RangeFinderSettings::default();
        let mut dial = RangeDial::new(settings);
        let rest = Vec3::new(0.0, 0.1, 0.0);
        let mut transform = Transform::from_translation(rest);

        for _ in 0..200 {
            dial.tick(0.02, None, 0.0, &mut transform);
        }
        let nudged = rest + Vec3::NEG_Z * settings.forward_nudge;
        assert!(transform.translation.distance(nudged) < 1e-4);
        assert_eq!(dial.rest_translation(), Some(rest));

        for _ in 0..200 {
            dial.tick(0.02, Some(1.0), 3.0, &mut transform);
        }
        assert!(transform.translation.distance(rest) < 1e-4);
    }
}
