//! # Targeting reticle
//!
//! A reticle is spawned as a child of an [`ArCursor`](crate::cursor::ArCursor) with
//! [`spawn_reticle`]. It is made of prongs of dots that pulse outward in a sweep, and one arrow
//! marker per prong on an inner ring. While targeting, the arrows slide around the ring towards
//! the locked direction and the prongs facing the locked point pulse faster.
//!
//! [`ReticleAnimator`] holds all animation state and can be driven without an app; the systems in
//! this module copy its output onto the [`ReticleDot`] and [`ReticleArrow`] child transforms.

pub mod layout;
pub mod pulse;

use bevy_ecs::prelude::*;
use bevy_hierarchy::prelude::*;
use bevy_math::{Quat, Vec2, Vec3};
use bevy_reflect::Reflect;
use bevy_render::prelude::SpatialBundle;
use bevy_time::Time;
use bevy_transform::components::Transform;

use crate::{
    camera::{CameraPose, ProjectedCamera},
    gesture::{TargetLock, TargetingEvent, TargetingMode},
    settings::ReticleSettings,
};

use self::{
    layout::{arrow_pulse, base_angle, inward_rotation, prong_axis, ring_position, Compass},
    pulse::{DotPulse, DotStyle, ProngSweep},
};

/// Root of a reticle. Follows the targeting mode of `cursor` and reads the pose of `camera`.
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct TargetingReticle {
    pub cursor: Entity,
    pub camera: Entity,
}

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct ReticleDot {
    pub prong: usize,
    pub index: usize,
}

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct ReticleArrow {
    pub index: usize,
}

/// Display state of one arrow marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowMarker {
    /// Ring angle, counterclockwise from +X.
    pub angle: f32,
    pub ring_position: Vec2,
    /// Z rotation pointing the arrow at the reticle centre.
    pub rotation: f32,
    /// Outward bounce added on top of `ring_position` for display.
    pub pulse_offset: Vec2,
}

impl ArrowMarker {
    fn resting(angle: f32, radius: f32) -> Self {
        let ring_position = ring_position(angle, radius);
        ArrowMarker {
            angle,
            ring_position,
            rotation: inward_rotation(ring_position),
            pulse_offset: Vec2::ZERO,
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct ReticleAnimator {
    settings: ReticleSettings,
    mode: TargetingMode,
    lock: Option<TargetLock>,
    /// Prong-major: dot `index` of prong `prong` is at `prong * dots_per_prong + index`.
    dots: Vec<DotPulse>,
    sweeps: Vec<ProngSweep>,
    arrows: Vec<ArrowMarker>,
    clock: f64,
}

impl ReticleAnimator {
    pub fn new(settings: ReticleSettings) -> Self {
        let rest = Self::rest_style(&settings);
        let prongs = settings.prong_count;
        let radius = settings.arrow_radius();
        ReticleAnimator {
            dots: vec![DotPulse::at_rest(rest); prongs * settings.dots_per_prong],
            sweeps: vec![ProngSweep::default(); prongs],
            arrows: (0..prongs)
                .map(|i| ArrowMarker::resting(base_angle(i, prongs), radius))
                .collect(),
            settings,
            mode: TargetingMode::Idle,
            lock: None,
            clock: 0.0,
        }
    }

    fn rest_style(settings: &ReticleSettings) -> DotStyle {
        DotStyle {
            scale: 1.0,
            alpha: settings.rest_alpha,
        }
    }

    fn peak_style(settings: &ReticleSettings) -> DotStyle {
        DotStyle {
            scale: settings.grow_scale,
            alpha: settings.peak_alpha,
        }
    }

    pub fn settings(&self) -> &ReticleSettings {
        &self.settings
    }

    pub fn mode(&self) -> TargetingMode {
        self.mode
    }

    pub fn lock(&self) -> Option<TargetLock> {
        self.lock
    }

    /// Switches mode. Markers return to rest on the next tick after leaving targeting.
    pub fn set_targeting(&mut self, mode: TargetingMode, lock: Option<TargetLock>) {
        self.mode = mode;
        self.lock = match mode {
            TargetingMode::Targeting => lock,
            TargetingMode::Idle => None,
        };
    }

    pub fn dot(&self, prong: usize, index: usize) -> Option<&DotPulse> {
        if index >= self.settings.dots_per_prong {
            return None;
        }
        self.dots.get(prong * self.settings.dots_per_prong + index)
    }

    pub fn arrows(&self) -> &[ArrowMarker] {
        &self.arrows
    }

    pub fn dot_rest_position(&self, prong: usize, index: usize) -> Vec2 {
        let settings = &self.settings;
        prong_axis(prong, settings.prong_count)
            * (settings.central_offset + index as f32 * settings.line_spacing)
    }

    pub fn arrow_rest_position(&self, index: usize) -> Vec2 {
        ring_position(
            base_angle(index, self.settings.prong_count),
            self.settings.arrow_radius(),
        )
    }

    /// Local transform of a dot. Its rectangle is `line_thickness` wide and `line_length` long,
    /// aligned with the prong, times the pulse scale.
    pub fn dot_transform(&self, prong: usize, index: usize) -> Transform {
        let scale = self.dot(prong, index).map_or(1.0, |dot| dot.style().scale);
        let rotation = base_angle(prong, self.settings.prong_count) - std::f32::consts::FRAC_PI_2;
        Transform {
            translation: self.dot_rest_position(prong, index).extend(0.0),
            rotation: Quat::from_rotation_z(rotation),
            scale: Vec3::new(
                self.settings.line_thickness * scale,
                self.settings.line_length * scale,
                1.0,
            ),
        }
    }

    pub fn arrow_transform(&self, index: usize) -> Transform {
        let Some(arrow) = self.arrows.get(index) else {
            return Transform::from_translation(self.arrow_rest_position(index).extend(0.0));
        };
        Transform::from_translation((arrow.ring_position + arrow.pulse_offset).extend(0.0))
            .with_rotation(Quat::from_rotation_z(arrow.rotation))
    }

    /// Pulse duration for `prong`. While targeting a point that is on screen, prongs pointing
    /// towards it pulse faster in proportion to how closely they line up with it.
    pub fn prong_speed<C: CameraPose>(&self, prong: usize, camera: Option<&C>) -> f32 {
        let default = self.settings.animation_speed;
        let (TargetingMode::Targeting, Some(lock), Some(camera)) = (self.mode, self.lock, camera)
        else {
            return default;
        };
        let Some(screen) = camera.world_to_screen(lock.point) else {
            return default;
        };
        let offset = screen - camera.screen_center();
        // Screen y points down, reticle y points up.
        let towards = Vec2::new(offset.x, -offset.y).normalize_or_zero();
        let alignment = towards.dot(prong_axis(prong, self.settings.prong_count));
        // A third of the default when pointing straight at the lock, the default at right angles.
        default * (1.0 - 2.0 / 3.0 * alignment.max(0.0))
    }

    /// Advances pulses, the arrow bounce and the compass by `dt` seconds.
    pub fn tick<C: CameraPose>(&mut self, dt: f32, camera: Option<&C>) {
        let dt = dt.max(0.0);
        self.clock += dt as f64;

        let rest = Self::rest_style(&self.settings);
        let peak = Self::peak_style(&self.settings);
        let per_prong = self.settings.dots_per_prong;
        if per_prong > 0 {
            for prong in 0..self.sweeps.len() {
                let speed = self.prong_speed(prong, camera);
                let dots = &mut self.dots[prong * per_prong..(prong + 1) * per_prong];
                self.sweeps[prong].advance(dt, dots, self.settings.sweep, rest, peak, || speed);
            }
        }

        self.update_arrows(camera);
    }

    fn update_arrows<C: CameraPose>(&mut self, camera: Option<&C>) {
        let settings = &self.settings;
        let radius = settings.arrow_radius();
        let compass = match (self.mode, self.lock, camera) {
            (TargetingMode::Targeting, Some(lock), Some(camera)) => Some(
                Compass::from_orientations(
                    lock.camera_rotation,
                    camera.rotation(),
                    settings.compass_full_deflection,
                ),
            ),
            _ => None,
        };
        let bounce = arrow_pulse(self.clock, settings.arrow_pulse_out, settings.arrow_pulse_in)
            * settings.arrow_pulse
            * settings.line_spacing;

        let count = self.arrows.len();
        for (index, arrow) in self.arrows.iter_mut().enumerate() {
            let base = base_angle(index, count);
            let angle = compass.map_or(base, |compass| {
                compass.marker_angle(base, settings.compass_gather)
            });
            *arrow = ArrowMarker::resting(angle, radius);
            arrow.pulse_offset = Vec2::from_angle(angle) * bounce;
        }
    }
}

/// Spawns a reticle under `cursor` with one child entity per dot and arrow, and returns it.
///
/// The children only get transforms; attach sprites or meshes to [`ReticleDot`] and
/// [`ReticleArrow`] entities to make them visible.
pub fn spawn_reticle(
    commands: &mut Commands,
    cursor: Entity,
    camera: Entity,
    settings: &ReticleSettings,
) -> Entity {
    let animator = ReticleAnimator::new(settings.clone());
    let reticle = commands
        .spawn((TargetingReticle { cursor, camera }, SpatialBundle::default()))
        .with_children(|parent| {
            for prong in 0..settings.prong_count {
                for index in 0..settings.dots_per_prong {
                    parent.spawn((
                        ReticleDot { prong, index },
                        SpatialBundle::from_transform(animator.dot_transform(prong, index)),
                    ));
                }
            }
            for index in 0..settings.prong_count {
                parent.spawn((
                    ReticleArrow { index },
                    SpatialBundle::from_transform(animator.arrow_transform(index)),
                ));
            }
        })
        .insert(animator)
        .id();
    commands.entity(cursor).add_child(reticle);
    reticle
}

/// Hands cursor mode changes to the reticles that follow them.
pub fn apply_targeting_events(
    mut events: EventReader<TargetingEvent>,
    mut reticles: Query<(&TargetingReticle, &mut ReticleAnimator)>,
) {
    for event in events.read() {
        for (reticle, mut animator) in &mut reticles {
            if reticle.cursor == event.cursor {
                animator.set_targeting(event.mode, event.lock);
            }
        }
    }
}

pub fn animate_reticles(
    time: Res<Time>,
    cameras: Query<&ProjectedCamera>,
    mut reticles: Query<(&TargetingReticle, &mut ReticleAnimator)>,
) {
    let dt = time.delta_seconds();
    for (reticle, mut animator) in &mut reticles {
        let camera = cameras.get(reticle.camera).ok();
        animator.tick(dt, camera);
    }
}

pub fn apply_reticle_transforms(
    reticles: Query<(&ReticleAnimator, &Children)>,
    mut dots: Query<(&ReticleDot, &mut Transform), Without<ReticleArrow>>,
    mut arrows: Query<(&ReticleArrow, &mut Transform), Without<ReticleDot>>,
) {
    for (animator, children) in &reticles {
        for &child in children {
            if let Ok((dot, mut transform)) = dots.get_mut(child) {
                transform.set_if_neq(animator.dot_transform(dot.prong, dot.index));
            } else if let Ok((arrow, mut transform)) = arrows.get_mut(child) {
                transform.set_if_neq(animator.arrow_transform(arrow.index));
            }
        }
    }
}

/// Writes each dot's pulse alpha into its sprite color.
#[cfg(feature = "2d")]
pub fn tint_reticle_dots(
    reticles: Query<(&ReticleAnimator, &Children)>,
    mut sprites: Query<(&ReticleDot, &mut bevy_sprite::Sprite)>,
) {
    use bevy_color::Alpha;

    for (animator, children) in &reticles {
        for &child in children {
            let Ok((dot, mut sprite)) = sprites.get_mut(child) else {
                continue;
            };
            if let Some(pulse) = animator.dot(dot.prong, dot.index) {
                let alpha = pulse.style().alpha;
                if sprite.color.alpha() != alpha {
                    sprite.color.set_alpha(alpha);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{pulse::DotPhase, *};

    fn camera() -> ProjectedCamera {
        ProjectedCamera::default()
    }

    fn targeting(animator: &mut ReticleAnimator, point: Vec3, rotation: Quat) {
        animator.set_targeting(
            TargetingMode::Targeting,
            Some(TargetLock {
                point,
                camera_rotation: rotation,
            }),
        );
    }

    #[test]
    fn idle_markers_sit_exactly_at_rest() {
        let mut animator = ReticleAnimator::new(ReticleSettings::default());
        let rotated = camera().with_pose(Vec3::ZERO, Quat::from_rotation_y(0.8));
        targeting(&mut animator, Vec3::NEG_Z, Quat::IDENTITY);
        animator.tick(0.1, Some(&rotated));
        assert_ne!(animator.arrows()[0].ring_position, animator.arrow_rest_position(0));

        animator.set_targeting(TargetingMode::Idle, None);
        animator.tick(0.016, Some(&rotated));
        for (index, arrow) in animator.arrows().iter().enumerate() {
            let rest = animator.arrow_rest_position(index);
            assert_eq!(arrow.ring_position, rest);
            assert_eq!(arrow.rotation, inward_rotation(rest));
        }
    }

    #[test]
    fn unrotated_camera_keeps_base_angles() {
        let mut animator = ReticleAnimator::new(ReticleSettings::default());
        let pose = Quat::from_rotation_y(0.3) * Quat::from_rotation_x(0.1);
        let camera = camera().with_pose(Vec3::ZERO, pose);
        targeting(&mut animator, Vec3::new(0.0, 0.0, -2.0), pose);
        animator.tick(0.016, Some(&camera));
        for (index, arrow) in animator.arrows().iter().enumerate() {
            assert!((arrow.angle - base_angle(index, 4)).abs() < 1e-5);
        }
    }

    #[test]
    fn arrows_slide_towards_locked_direction() {
        let mut animator = ReticleAnimator::new(ReticleSettings::default());
        // Locked straight ahead, then the camera turns right: the lock is now to the left.
        targeting(&mut animator, Vec3::new(0.0, 0.0, -2.0), Quat::IDENTITY);
        let camera = camera().with_pose(Vec3::ZERO, Quat::from_rotation_y(-0.5));
        animator.tick(0.016, Some(&camera));

        let left = Vec2::NEG_X;
        let up = animator.arrows()[0].ring_position.normalize();
        let down = animator.arrows()[2].ring_position.normalize();
        assert!(up.dot(left) > 0.0);
        assert!(down.dot(left) > 0.0);
        // The left marker already points at the lock and stays put.
        assert!((animator.arrows()[1].angle - base_angle(1, 4)).abs() < 1e-4);
    }

    #[test]
    fn arrow_bounce_leaves_ring_position_exact() {
        let mut animator = ReticleAnimator::new(ReticleSettings::default());
        animator.tick::<ProjectedCamera>(0.05, None);
        let arrow = animator.arrows()[0];
        assert!(arrow.pulse_offset.length() > 0.0);
        assert_eq!(arrow.ring_position, animator.arrow_rest_position(0));
        let display = animator.arrow_transform(0).translation.truncate();
        assert!(display.length() > animator.settings().arrow_radius());
    }

    #[test]
    fn aligned_prong_pulses_faster() {
        let settings = ReticleSettings::default();
        let mut animator = ReticleAnimator::new(settings.clone());
        let camera = camera();
        // Straight to the right of the view centre.
        targeting(&mut animator, Vec3::new(1.0, 0.0, -2.0), Quat::IDENTITY);

        let right = animator.prong_speed(3, Some(&camera));
        assert!((right - settings.animation_speed / 3.0).abs() < 1e-6);
        assert_eq!(animator.prong_speed(1, Some(&camera)), settings.animation_speed);

        // Halfway between right and up: both prongs speed up equally.
        targeting(&mut animator, Vec3::new(1.0, 1.0, -2.0), Quat::IDENTITY);
        let up = animator.prong_speed(0, Some(&camera));
        let right = animator.prong_speed(3, Some(&camera));
        assert!(up < settings.animation_speed);
        assert!(right < settings.animation_speed);
    }

    #[test]
    fn closer_aligned_prong_is_never_slower() {
        let settings = ReticleSettings::default();
        let mut animator = ReticleAnimator::new(settings.clone());
        let camera = camera();
        // One degree above the right prong.
        let direction = Vec2::from_angle(1f32.to_radians());
        targeting(
            &mut animator,
            Vec3::new(direction.x, direction.y, -2.0),
            Quat::IDENTITY,
        );
        let right = animator.prong_speed(3, Some(&camera));
        let up = animator.prong_speed(0, Some(&camera));
        assert!(right <= up);
        assert!(up <= settings.animation_speed);
        assert!(settings.animation_speed - up < settings.animation_speed * 0.02);
    }

    #[test]
    fn off_screen_lock_uses_default_speed() {
        let settings = ReticleSettings::default();
        let mut animator = ReticleAnimator::new(settings.clone());
        targeting(&mut animator, Vec3::new(1.0, 0.0, 2.0), Quat::IDENTITY);
        let speed = animator.prong_speed(3, Some(&camera()));
        assert_eq!(speed, settings.animation_speed);

        animator.set_targeting(TargetingMode::Idle, None);
        assert_eq!(animator.lock(), None);
    }

    #[test]
    fn every_prong_starts_pulsing() {
        let mut animator = ReticleAnimator::new(ReticleSettings::default());
        animator.tick::<ProjectedCamera>(0.001, None);
        for prong in 0..4 {
            assert_eq!(animator.dot(prong, 0).unwrap().phase(), DotPhase::Growing);
            assert_eq!(animator.dot(prong, 1).unwrap().phase(), DotPhase::Resting);
        }
        assert!(animator.dot(0, 20).is_none());
    }

    #[test]
    fn dot_transforms_line_up_along_prongs() {
        let animator = ReticleAnimator::new(ReticleSettings::default());
        let inner = animator.dot_transform(1, 0);
        let outer = animator.dot_transform(1, 19);
        assert!(inner.translation.distance(Vec3::new(-0.065, 0.0, 0.0)) < 1e-6);
        assert!(outer.translation.distance(Vec3::new(-0.16, 0.0, 0.0)) < 1e-6);
        // The dot's long side follows the prong.
        let along = inner.rotation * Vec3::Y;
        assert!(along.distance(Vec3::NEG_X) < 1e-6);
    }
}
