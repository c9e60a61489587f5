use std::{f32::consts::TAU, thread, time::Duration};

use bevy::{color::palettes::css, prelude::*};
use bevy_mod_ar_targeting::prelude::*;

// A fake tracking session: a background thread streams a drifting point cloud over a channel, and
// the camera sways the way a hand-held device would. Click once to snap the cursor onto the cloud,
// double click to lock a target and watch the reticle arrows point back at it.

fn main() {
    let (sender, feed) = PointCloudFeed::unbounded();
    thread::spawn(move || simulate_tracking(sender));

    App::new()
        .add_plugins((DefaultPlugins, TargetingPlugin))
        .insert_resource(TargetingPluginState::default().with_debug_gizmos())
        .insert_resource(feed)
        .add_systems(Startup, setup)
        .add_systems(Update, (sway_camera, dress_reticle, log_targeting))
        .run();
}

fn simulate_tracking(sender: crossbeam_channel::Sender<PointCloudUpdate>) {
    for frame in 0u32.. {
        let phase = frame as f32 * 0.01;
        let positions = (0..200)
            .map(|i| {
                let f = i as f32;
                let angle = f / 200.0 * TAU;
                Vec3::new(
                    angle.cos() * 2.0 + (phase + f).sin() * 0.02,
                    (f * 0.37).sin() * 0.8,
                    -3.0 + angle.sin() * 0.5,
                )
            })
            .collect();
        let update = PointCloudUpdate::Updated {
            trackable: 0,
            positions,
        };
        if sender.send(update).is_err() {
            return;
        }
        thread::sleep(Duration::from_millis(33));
    }
}

fn setup(mut commands: Commands, settings: Res<TargetingSettings>) {
    let camera = commands
        .spawn((Camera3dBundle::default(), ProjectedCamera::default()))
        .id();
    let cursor = commands.spawn(ArCursorBundle::new(camera, &settings)).id();
    spawn_reticle(&mut commands, cursor, camera, &settings.reticle);
    commands.spawn(DirectionalLightBundle {
        transform: Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });
}

fn sway_camera(time: Res<Time>, mut cameras: Query<&mut Transform, With<ProjectedCamera>>) {
    let t = time.elapsed_seconds();
    for mut transform in &mut cameras {
        transform.rotation =
            Quat::from_rotation_y((t * 0.3).sin() * 0.4) * Quat::from_rotation_x((t * 0.5).sin() * 0.1);
    }
}

/// Gives the reticle's dots and arrows something to render.
fn dress_reticle(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    dots: Query<Entity, Added<ReticleDot>>,
    arrows: Query<Entity, Added<ReticleArrow>>,
) {
    if dots.is_empty() && arrows.is_empty() {
        return;
    }
    let quad = meshes.add(Cuboid::new(1.0, 1.0, 0.001));
    let dot_material = materials.add(StandardMaterial {
        base_color: Color::from(css::WHITE),
        unlit: true,
        ..default()
    });
    let arrow = meshes.add(Cuboid::new(0.006, 0.01, 0.001));
    let arrow_material = materials.add(StandardMaterial {
        base_color: Color::from(css::ORANGE),
        unlit: true,
        ..default()
    });
    for entity in &dots {
        commands
            .entity(entity)
            .insert((quad.clone(), dot_material.clone()));
    }
    for entity in &arrows {
        commands
            .entity(entity)
            .insert((arrow.clone(), arrow_material.clone()));
    }
}

fn log_targeting(mut events: EventReader<TargetingEvent>) {
    for event in events.read() {
        match event.lock {
            Some(lock) => info!("Targeting {:?} at {}", event.cursor, lock.point),
            None => info!("{:?} stopped targeting", event.cursor),
        }
    }
}
