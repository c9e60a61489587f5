#![allow(clippy::type_complexity)]

use bevy_color::palettes::css;
use bevy_ecs::prelude::*;
use bevy_gizmos::gizmos::Gizmos;
use bevy_math::{Quat, Vec3};
use bevy_transform::components::GlobalTransform;

use crate::{
    camera::{CameraPose, ProjectedCamera},
    cursor::{ArCursor, CursorReadout},
    gesture::TapGesture,
    point_cloud::PointCloud,
    reticle::ReticleArrow,
};

const SAMPLE_RADIUS: f32 = 0.01;

/// Draws point cloud samples, each cursor's ray and locked point, and the reticle arrows.
pub fn draw_targeting_gizmos(
    cloud: Res<PointCloud>,
    cameras: Query<&ProjectedCamera>,
    cursors: Query<(&ArCursor, &GlobalTransform, &CursorReadout, &TapGesture)>,
    arrows: Query<&GlobalTransform, With<ReticleArrow>>,
    mut gizmos: Gizmos,
) {
    for sample in cloud.iter() {
        gizmos.sphere(sample, Quat::IDENTITY, SAMPLE_RADIUS, css::YELLOW);
    }

    for (cursor, transform, readout, gesture) in &cursors {
        let Ok(camera) = cameras.get(cursor.camera) else {
            continue;
        };
        let position = transform.translation();
        let color = if readout.on_surface {
            css::GREEN
        } else {
            css::BLUE
        };
        if let Some(ray) = camera.ray_through(position) {
            let length = readout
                .range
                .unwrap_or_else(|| position.distance(camera.position()));
            gizmos.ray(ray.origin, *ray.direction * length, color);
        }
        gizmos.sphere(position, transform.compute_transform().rotation, 0.02, color);

        if gesture.mode().is_targeting() {
            if let Some(lock) = gesture.lock() {
                gizmos.sphere(lock.point, lock.camera_rotation, 0.05, css::RED);
                gizmos.line(position, lock.point, css::PINK);
            }
        }
    }

    for transform in &arrows {
        let up = transform.compute_transform().rotation * Vec3::Y;
        gizmos.ray(transform.translation(), up * 0.01, css::ORANGE);
    }
}
