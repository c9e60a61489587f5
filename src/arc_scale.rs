//! # Arc scale
//!
//! A curved gauge in its entity's local XY plane. Pressing on the band of the arc moves the thumb
//! entity to the pressed angle, clamped to the arc's extent.

use std::f32::consts::TAU;

use bevy_ecs::prelude::*;
use bevy_math::{Vec2, Vec3};
use bevy_reflect::Reflect;
use bevy_transform::components::{GlobalTransform, Transform};

use crate::{
    camera::{CameraPose, ProjectedCamera},
    input::PointerPress,
    primitives::{intersect_primitive, Primitive3d},
};

/// Angles are in radians, counterclockwise from local +X.
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct ArcScale {
    pub camera: Entity,
    /// Moved to the pressed position. Expected to be a child of the scale.
    pub thumb: Entity,
    pub center: Vec2,
    pub radius: f32,
    /// Width of the pressable band, centred on `radius`.
    pub arc_width: f32,
    pub start_angle: f32,
    pub end_angle: f32,
}

impl ArcScale {
    pub fn new(camera: Entity, thumb: Entity) -> Self {
        ArcScale {
            camera,
            thumb,
            center: Vec2::ZERO,
            radius: 0.1,
            arc_width: 0.018,
            start_angle: 130f32.to_radians(),
            end_angle: 200f32.to_radians(),
        }
    }

    /// Clamps `angle` to the arc. Angles outside of it go to the nearer end.
    pub fn clamp_angle(&self, angle: f32) -> f32 {
        let span = (self.end_angle - self.start_angle).clamp(0.0, TAU);
        let offset = (angle - self.start_angle).rem_euclid(TAU);
        if offset <= span {
            return self.start_angle + offset;
        }
        // Past the end: measure the way back to the end against the way round to the start.
        if offset - span <= TAU - offset {
            self.end_angle
        } else {
            self.start_angle
        }
    }

    /// The thumb position for a press at `local`, or `None` if the press misses the band.
    pub fn thumb_position(&self, local: Vec2) -> Option<Vec2> {
        let offset = local - self.center;
        let distance = offset.length();
        let half_width = self.arc_width / 2.0;
        if distance < self.radius - half_width || distance > self.radius + half_width {
            return None;
        }
        let angle = self.clamp_angle(offset.y.atan2(offset.x));
        Some(self.center + Vec2::from_angle(angle) * self.radius)
    }

    /// Where a press at `screen` lands on the scale's plane, in the scale's local coordinates.
    pub fn local_press(
        &self,
        screen: Vec2,
        camera: &impl CameraPose,
        transform: &GlobalTransform,
    ) -> Option<Vec2> {
        let ray = camera.screen_to_ray(screen)?;
        let plane = Primitive3d::Plane {
            point: transform.translation(),
            normal: *transform.back(),
        };
        let (_, hit) = intersect_primitive(ray, plane)?;
        let local: Vec3 = transform.affine().inverse().transform_point3(hit);
        Some(local.truncate())
    }
}

pub fn handle_arc_scale_presses(
    mut presses: EventReader<PointerPress>,
    cameras: Query<&ProjectedCamera>,
    scales: Query<(&ArcScale, &GlobalTransform)>,
    mut thumbs: Query<&mut Transform>,
) {
    for press in presses.read() {
        let Some(screen) = press.position else {
            continue;
        };
        for (scale, transform) in &scales {
            let Ok(camera) = cameras.get(scale.camera) else {
                continue;
            };
            let Some(position) = scale
                .local_press(screen, camera, transform)
                .and_then(|local| scale.thumb_position(local))
            else {
                continue;
            };
            if let Ok(mut thumb) = thumbs.get_mut(scale.thumb) {
                thumb.translation = position.extend(thumb.translation.z);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy_math::Quat;

    use super::*;

    fn scale() -> ArcScale {
        ArcScale::new(Entity::PLACEHOLDER, Entity::PLACEHOLDER)
    }

    #[test]
    fn press_inside_band_moves_thumb_onto_arc() {
        let scale = scale();
        let angle = 150f32.to_radians();
        let press = Vec2::from_angle(angle) * 0.105;
        let thumb = scale.thumb_position(press).unwrap();
        assert!(thumb.distance(Vec2::from_angle(angle) * 0.1) < 1e-6);
    }

    #[test]
    fn press_off_band_is_ignored() {
        let scale = scale();
        let direction = Vec2::from_angle(150f32.to_radians());
        assert!(scale.thumb_position(direction * 0.05).is_none());
        assert!(scale.thumb_position(direction * 0.2).is_none());
    }

    #[test]
    fn angle_is_clamped_to_arc() {
        let scale = scale();
        let past_end = scale.thumb_position(Vec2::from_angle(230f32.to_radians()) * 0.1);
        let end = Vec2::from_angle(scale.end_angle) * 0.1;
        assert!(past_end.unwrap().distance(end) < 1e-6);

        let before_start = scale.thumb_position(Vec2::from_angle(100f32.to_radians()) * 0.1);
        let start = Vec2::from_angle(scale.start_angle) * 0.1;
        assert!(before_start.unwrap().distance(start) < 1e-6);

        // atan2 reports 200 degrees as -160; it still maps inside the arc.
        let wrapped = scale.clamp_angle((-160f32).to_radians());
        assert!((wrapped - 200f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn screen_press_lands_on_scale_plane() {
        let scale = scale();
        let camera = ProjectedCamera::default();
        let transform = GlobalTransform::from(
            Transform::from_xyz(0.0, 0.0, -1.0).with_rotation(Quat::IDENTITY),
        );
        let local = scale
            .local_press(camera.screen_center(), &camera, &transform)
            .unwrap();
        assert!(local.length() < 1e-5);

        let target = Vec3::new(-0.08, 0.03, -1.0);
        let screen = camera.world_to_screen(target).unwrap();
        let local = scale.local_press(screen, &camera, &transform).unwrap();
        assert!(local.distance(target.truncate()) < 1e-4);
    }
}
