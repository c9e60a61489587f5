//! # World cursor
//!
//! The cursor floats at a fixed depth in front of the camera and rides along with it. A single tap
//! snaps it onto the point cloud under the touch; after [`CursorSettings::return_delay`] without a
//! new snap it floats back to its default offset. All motion is smoothed with an exponential
//! approach, so the displayed transform trails the target pose.

use bevy_ecs::prelude::*;
use bevy_math::{Quat, Vec2, Vec3};
use bevy_reflect::Reflect;
use bevy_render::prelude::SpatialBundle;
use bevy_time::Time;
use bevy_transform::components::Transform;
use bevy_utils::tracing::*;

use crate::{
    camera::{look_rotation, CameraPose, ProjectedCamera},
    gesture::{TapGesture, TapOutcome, TargetLock, TargetingEvent, TargetingMode},
    input::PointerPress,
    point_cloud::PointCloud,
    settings::{CursorSettings, TargetingSettings},
    timer::DelayedTask,
};

/// Camera-relative cursor state and its smoothing targets.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct CursorTracker {
    settings: CursorSettings,
    local_offset: Vec3,
    on_surface: bool,
    target_position: Vec3,
    target_rotation: Quat,
    auto_return: DelayedTask,
    initialized: bool,
}

impl Default for CursorTracker {
    fn default() -> Self {
        CursorTracker::new(CursorSettings::default())
    }
}

impl CursorTracker {
    pub fn new(settings: CursorSettings) -> Self {
        CursorTracker {
            local_offset: Self::default_offset_for(&settings),
            settings,
            on_surface: false,
            target_position: Vec3::ZERO,
            target_rotation: Quat::IDENTITY,
            auto_return: DelayedTask::default(),
            initialized: false,
        }
    }

    fn default_offset_for(settings: &CursorSettings) -> Vec3 {
        Vec3::NEG_Z * settings.depth
    }

    /// Straight ahead of the camera at the configured depth.
    pub fn default_offset(&self) -> Vec3 {
        Self::default_offset_for(&self.settings)
    }

    pub fn local_offset(&self) -> Vec3 {
        self.local_offset
    }

    pub fn is_on_surface(&self) -> bool {
        self.on_surface
    }

    pub fn target_position(&self) -> Vec3 {
        self.target_position
    }

    pub fn target_rotation(&self) -> Quat {
        self.target_rotation
    }

    /// When the cursor will return from its surface snap, if it is on one.
    pub fn return_deadline(&self) -> Option<f64> {
        self.auto_return.deadline()
    }

    /// Places the target, and `transform`, at the default offset in front of `camera`.
    pub fn reset(&mut self, camera: &impl CameraPose, transform: &mut Transform) {
        self.local_offset = self.default_offset();
        self.on_surface = false;
        self.auto_return.cancel();
        self.target_position = camera.transform_point(self.local_offset);
        self.target_rotation = camera.rotation();
        transform.translation = self.target_position;
        transform.rotation = self.target_rotation;
        self.initialized = true;
    }

    /// Moves the cursor under a touch at `screen`.
    ///
    /// In [`TargetingMode::Idle`] the cursor snaps onto the point cloud if it has a point near the
    /// touch ray. Otherwise it is placed at the configured depth along the ray.
    pub fn move_to_touch(
        &mut self,
        now: f64,
        screen: Vec2,
        mode: TargetingMode,
        camera: &impl CameraPose,
        cloud: &PointCloud,
    ) {
        let Some(ray) = camera.screen_to_ray(screen) else {
            return;
        };
        self.auto_return.cancel();

        let hit = match mode {
            TargetingMode::Idle => cloud.nearest_point_along_ray(ray),
            TargetingMode::Targeting => None,
        };
        let world = match hit {
            Some(point) => {
                self.on_surface = true;
                self.auto_return.arm(now, self.settings.return_delay);
                debug!("Cursor snapped to surface at {point}");
                point
            }
            None => {
                self.on_surface = false;
                ray.get_point(self.settings.depth)
            }
        };
        self.local_offset = camera.inverse_transform_point(world);
        self.target_position = world;
        self.target_rotation = camera.rotation();
    }

    /// Advances the cursor by one frame and moves `transform` towards the target pose.
    pub fn tick(&mut self, now: f64, dt: f32, camera: &impl CameraPose, transform: &mut Transform) {
        if !self.initialized {
            self.reset(camera, transform);
        }

        if self.auto_return.poll(now) {
            self.local_offset = self.default_offset();
            self.on_surface = false;
            debug!("Cursor returned from surface");
        }

        if !self.on_surface {
            self.target_position = camera.transform_point(self.local_offset);
            self.target_rotation =
                look_rotation(transform.translation - camera.position(), camera.up());
        }

        let t = 1.0 - (-self.settings.lerp_speed * dt.max(0.0)).exp();
        transform.translation = transform.translation.lerp(self.target_position, t);
        transform.rotation = transform.rotation.slerp(self.target_rotation, t);
    }

    /// Distance from the camera to the point cloud along the ray through `cursor`.
    pub fn measure_range(
        &self,
        cursor: Vec3,
        camera: &impl CameraPose,
        cloud: &PointCloud,
    ) -> Option<f32> {
        let ray = camera.ray_through(cursor)?;
        cloud
            .nearest_point_along_ray(ray)
            .map(|point| point.distance(camera.position()))
    }
}

/// The lock for a cursor at `cursor`: the cloud point under it, or the cursor itself when the
/// cloud has nothing to offer, together with the camera's current orientation.
pub fn capture_lock(cursor: Vec3, camera: &impl CameraPose, cloud: &PointCloud) -> TargetLock {
    let point = camera
        .ray_through(cursor)
        .and_then(|ray| cloud.nearest_point_along_ray(ray))
        .unwrap_or(cursor);
    TargetLock {
        point,
        camera_rotation: camera.rotation(),
    }
}

/// Marks an AR cursor and names the camera entity, carrying a [`ProjectedCamera`], it follows.
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct ArCursor {
    pub camera: Entity,
}

/// Per-frame readout of a cursor, for widgets that display it.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CursorReadout {
    /// Camera-to-surface distance along the cursor ray, if the point cloud has any samples.
    pub range: Option<f32>,
    pub on_surface: bool,
    pub mode: TargetingMode,
}

#[derive(Bundle)]
pub struct ArCursorBundle {
    pub cursor: ArCursor,
    pub tracker: CursorTracker,
    pub gesture: TapGesture,
    pub readout: CursorReadout,
    pub spatial: SpatialBundle,
}

impl ArCursorBundle {
    pub fn new(camera: Entity, settings: &TargetingSettings) -> Self {
        ArCursorBundle {
            cursor: ArCursor { camera },
            tracker: CursorTracker::new(settings.cursor),
            gesture: TapGesture::new(settings.gesture),
            readout: CursorReadout::default(),
            spatial: SpatialBundle::default(),
        }
    }
}

/// Feeds pointer presses to every cursor's gesture machine and publishes mode changes.
pub fn handle_cursor_presses(
    time: Res<Time>,
    cloud: Res<PointCloud>,
    mut presses: EventReader<PointerPress>,
    cameras: Query<&ProjectedCamera>,
    mut cursors: Query<(Entity, &ArCursor, &Transform, &mut TapGesture)>,
    mut targeting_events: EventWriter<TargetingEvent>,
) {
    let now = time.elapsed_seconds_f64();
    for press in presses.read() {
        for (entity, cursor, transform, mut gesture) in &mut cursors {
            let Ok(camera) = cameras.get(cursor.camera) else {
                continue;
            };
            let outcome = gesture.press(now, press.position, || {
                capture_lock(transform.translation, camera, &cloud)
            });
            if let TapOutcome::Toggled { mode, lock } = outcome {
                targeting_events.send(TargetingEvent {
                    cursor: entity,
                    mode,
                    lock,
                });
            }
        }
    }
}

/// Resolves single taps, advances cursor motion and refreshes [`CursorReadout`].
pub fn update_cursors(
    time: Res<Time>,
    cloud: Res<PointCloud>,
    cameras: Query<&ProjectedCamera>,
    mut cursors: Query<(
        &ArCursor,
        &mut TapGesture,
        &mut CursorTracker,
        &mut Transform,
        &mut CursorReadout,
    )>,
) {
    let now = time.elapsed_seconds_f64();
    let dt = time.delta_seconds();
    for (cursor, mut gesture, mut tracker, mut transform, mut readout) in &mut cursors {
        let Ok(camera) = cameras.get(cursor.camera) else {
            continue;
        };
        let mode = gesture.mode();
        if let Some(position) = gesture.tick(now).and_then(|tap| tap.position) {
            tracker.move_to_touch(now, position, mode, camera, &cloud);
        }
        tracker.tick(now, dt, camera, &mut transform);

        let range = tracker.measure_range(transform.translation, camera, &cloud);
        readout.set_if_neq(CursorReadout {
            range,
            on_surface: tracker.is_on_surface(),
            mode,
        });
    }
}
