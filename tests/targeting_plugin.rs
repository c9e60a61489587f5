use std::time::Duration;

use bevy::{prelude::*, time::TimeUpdateStrategy};
use bevy_mod_ar_targeting::prelude::*;

const FRAME: Duration = Duration::from_millis(20);

fn setup(mut commands: Commands, settings: Res<TargetingSettings>) {
    let camera = commands.spawn(ProjectedCamera::default()).id();
    let cursor = commands.spawn(ArCursorBundle::new(camera, &settings)).id();
    spawn_reticle(&mut commands, cursor, camera, &settings.reticle);
    let dial = commands
        .spawn(RangeFinderBundle::new(cursor, settings.range_finder))
        .id();
    commands.entity(cursor).add_child(dial);
}

fn app(cloud: PointCloud) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, TargetingPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
        .insert_resource(cloud)
        .add_systems(Startup, setup);
    // Startup plus one frame so the cursor has settled in front of the camera.
    app.update();
    app
}

fn cursor(app: &mut App) -> Entity {
    app.world_mut()
        .query_filtered::<Entity, With<ArCursor>>()
        .single(app.world())
}

fn press(app: &mut App, position: Vec2) {
    app.world_mut().send_event(PointerPress {
        position: Some(position),
    });
}

fn frames(app: &mut App, count: usize) {
    for _ in 0..count {
        app.update();
    }
}

fn centre() -> Vec2 {
    ProjectedCamera::default().screen_center()
}

#[test]
fn cursor_starts_in_front_of_camera() {
    let mut app = app(PointCloud::default());
    let cursor = cursor(&mut app);
    let transform = app.world().get::<Transform>(cursor).unwrap();
    assert!(transform.translation.distance(Vec3::NEG_Z) < 1e-4);
}

#[test]
fn single_tap_snaps_cursor_onto_cloud() {
    let mut app = app(PointCloud::from_points([Vec3::new(0.0, 0.0, -3.0)]));
    let cursor = cursor(&mut app);

    press(&mut app, centre());
    frames(&mut app, 5);
    // Still inside the double-tap window.
    assert!(!app.world().get::<CursorReadout>(cursor).unwrap().on_surface);

    frames(&mut app, 15);
    let tracker = app.world().get::<CursorTracker>(cursor).unwrap();
    assert!(tracker.is_on_surface());
    assert!(tracker.target_position().distance(Vec3::new(0.0, 0.0, -3.0)) < 1e-4);
    let readout = app.world().get::<CursorReadout>(cursor).unwrap();
    assert!(readout.on_surface);
    assert_eq!(readout.mode, TargetingMode::Idle);
    assert!((readout.range.unwrap() - 3.0).abs() < 1e-3);

    // Well before the auto-return.
    frames(&mut app, 50);
    let transform = app.world().get::<Transform>(cursor).unwrap();
    assert!(transform.translation.distance(Vec3::new(0.0, 0.0, -3.0)) < 0.1);
}

#[test]
fn double_tap_enters_targeting_and_locks() {
    let mut app = app(PointCloud::from_points([Vec3::new(0.0, 0.0, -3.0)]));
    let cursor = cursor(&mut app);

    press(&mut app, centre());
    frames(&mut app, 3);
    press(&mut app, centre());
    frames(&mut app, 1);

    let gesture = app.world().get::<TapGesture>(cursor).unwrap();
    assert_eq!(gesture.mode(), TargetingMode::Targeting);
    let lock = gesture.lock().unwrap();
    assert!(lock.point.distance(Vec3::new(0.0, 0.0, -3.0)) < 1e-4);
    assert_eq!(lock.camera_rotation, Quat::IDENTITY);

    let animator = app
        .world_mut()
        .query::<&ReticleAnimator>()
        .single(app.world());
    assert_eq!(animator.mode(), TargetingMode::Targeting);
    assert_eq!(animator.lock(), Some(lock));

    // The single tap of the double tap never fires.
    frames(&mut app, 30);
    let tracker = app.world().get::<CursorTracker>(cursor).unwrap();
    assert!(!tracker.is_on_surface());
    assert_eq!(
        app.world().get::<CursorReadout>(cursor).unwrap().mode,
        TargetingMode::Targeting
    );
}

#[test]
fn presses_inside_debounce_are_dropped() {
    let mut app = app(PointCloud::default());
    let cursor = cursor(&mut app);

    press(&mut app, centre());
    frames(&mut app, 1);
    press(&mut app, centre());
    frames(&mut app, 1);

    let gesture = app.world().get::<TapGesture>(cursor).unwrap();
    assert_eq!(gesture.mode(), TargetingMode::Idle);
    assert!(gesture.has_pending_tap());
}

#[test]
fn reticle_children_follow_animator() {
    let mut app = app(PointCloud::default());
    frames(&mut app, 2);

    let dots = app
        .world_mut()
        .query::<&ReticleDot>()
        .iter(app.world())
        .count();
    let arrows = app
        .world_mut()
        .query::<&ReticleArrow>()
        .iter(app.world())
        .count();
    let settings = ReticleSettings::default();
    assert_eq!(dots, settings.prong_count * settings.dots_per_prong);
    assert_eq!(arrows, settings.prong_count);

    let mut arrows = app.world_mut().query::<(&ReticleArrow, &Transform)>();
    for (arrow, transform) in arrows.iter(app.world()) {
        // Pulse offsets only push outward from the ring.
        assert!(transform.translation.length() >= settings.arrow_radius() - 1e-6);
        assert!(arrow.index < settings.prong_count);
    }
}

#[test]
fn disabled_stage_ignores_presses() {
    let mut app = app(PointCloud::default());
    let cursor = cursor(&mut app);
    app.world_mut()
        .resource_mut::<TargetingPluginState>()
        .update_cursor = false;

    press(&mut app, centre());
    frames(&mut app, 3);
    press(&mut app, centre());
    frames(&mut app, 1);

    let gesture = app.world().get::<TapGesture>(cursor).unwrap();
    assert_eq!(gesture.mode(), TargetingMode::Idle);
    assert!(!gesture.has_pending_tap());
}

#[test]
fn point_cloud_feed_is_drained_every_frame() {
    let mut app = app(PointCloud::default());
    let (sender, feed) = PointCloudFeed::unbounded();
    app.insert_resource(feed);

    sender
        .send(PointCloudUpdate::Updated {
            trackable: 1,
            positions: vec![Vec3::new(0.0, 0.0, -2.0), Vec3::new(0.5, 0.0, -4.0)],
        })
        .unwrap();
    frames(&mut app, 1);
    assert_eq!(app.world().resource::<PointCloud>().len(), 2);

    sender
        .send(PointCloudUpdate::Removed { trackable: 1 })
        .unwrap();
    frames(&mut app, 1);
    assert!(app.world().resource::<PointCloud>().is_empty());
}

#[test]
fn range_dial_leans_forward_without_cloud() {
    let mut app = app(PointCloud::default());
    frames(&mut app, 100);
    let mut dials = app.world_mut().query::<(&RangeDial, &Transform)>();
    let (dial, transform) = dials.single(app.world());
    let nudge = RangeFinderSettings::default().forward_nudge;
    assert_eq!(dial.angle(), 0.0);
    assert!(transform.translation.distance(Vec3::NEG_Z * nudge) < 1e-3);
}

#[test]
fn cursor_without_camera_stays_put() {
    let mut app = app(PointCloud::default());
    let settings = TargetingSettings::default();
    let orphan = app
        .world_mut()
        .spawn(ArCursorBundle::new(Entity::PLACEHOLDER, &settings))
        .id();
    press(&mut app, centre());
    frames(&mut app, 20);
    let readout = app.world().get::<CursorReadout>(orphan).unwrap();
    assert_eq!(*readout, CursorReadout::default());
    assert_eq!(
        app.world().get::<Transform>(orphan).unwrap().translation,
        Vec3::ZERO
    );
}
