//! # Camera pose
//!
//! Everything in this crate sees the AR camera through [`CameraPose`]. [`ProjectedCamera`] is the
//! component implementation: it is kept in sync with Bevy's [`Camera`] by
//! [`sync_projected_cameras`], or can be built directly with [`ProjectedCamera::perspective`] when
//! no render camera exists (headless apps, tests).

use bevy_ecs::prelude::*;
use bevy_math::{Mat3, Mat4, Quat, Ray3d, Vec2, Vec3};
use bevy_render::camera::Camera;
use bevy_transform::components::GlobalTransform;

use crate::primitives::ray_towards;

/// Camera collaborator interface. Screen coordinates follow Bevy's viewport convention: origin at
/// the top left, y pointing down, in logical pixels.
pub trait CameraPose {
    fn position(&self) -> Vec3;
    fn rotation(&self) -> Quat;
    fn viewport_size(&self) -> Vec2;
    /// Projects a world position to the screen. `None` if it is behind the camera.
    fn world_to_screen(&self, world: Vec3) -> Option<Vec2>;
    /// The ray from the camera through a screen position.
    fn screen_to_ray(&self, screen: Vec2) -> Option<Ray3d>;

    /// Converts a camera-local position to world space.
    fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position() + self.rotation() * local
    }

    /// Converts a world position to camera-local space.
    fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation().inverse() * (world - self.position())
    }

    /// The ray from the camera through a world position.
    fn ray_through(&self, world: Vec3) -> Option<Ray3d> {
        ray_towards(self.position(), world - self.position())
    }

    fn up(&self) -> Vec3 {
        self.rotation() * Vec3::Y
    }

    fn screen_center(&self) -> Vec2 {
        self.viewport_size() / 2.0
    }
}

/// A snapshot of a camera's pose and projection.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ProjectedCamera {
    pub position: Vec3,
    pub rotation: Quat,
    /// Clip-from-view projection matrix.
    pub projection: Mat4,
    pub viewport: Vec2,
}

impl Default for ProjectedCamera {
    fn default() -> Self {
        ProjectedCamera::perspective(
            Vec3::ZERO,
            Quat::IDENTITY,
            std::f32::consts::FRAC_PI_4,
            Vec2::new(1280.0, 720.0),
        )
    }
}

impl ProjectedCamera {
    /// A perspective camera with an infinite reverse-z projection, matching Bevy's default.
    pub fn perspective(position: Vec3, rotation: Quat, fov_y: f32, viewport: Vec2) -> Self {
        let aspect = if viewport.y > 0.0 {
            viewport.x / viewport.y
        } else {
            1.0
        };
        ProjectedCamera {
            position,
            rotation,
            projection: Mat4::perspective_infinite_reverse_rh(fov_y, aspect, 0.1),
            viewport,
        }
    }

    pub fn from_camera(camera: &Camera, transform: &GlobalTransform) -> Option<Self> {
        let (_, rotation, position) = transform.to_scale_rotation_translation();
        Some(ProjectedCamera {
            position,
            rotation,
            projection: camera.clip_from_view(),
            viewport: camera.logical_viewport_size()?,
        })
    }

    pub fn with_pose(self, position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..self
        }
    }

    fn view_from_world(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }
}

impl CameraPose for ProjectedCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn viewport_size(&self) -> Vec2 {
        self.viewport
    }

    fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
        let view = self.view_from_world().transform_point3(world);
        // The camera looks down -Z.
        if view.z >= 0.0 {
            return None;
        }
        let ndc = self.projection.project_point3(view);
        if !ndc.is_finite() {
            return None;
        }
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }

    fn screen_to_ray(&self, screen: Vec2) -> Option<Ray3d> {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return None;
        }
        // 2D Normalized device coordinate position from (-1, -1) to (1, 1), y up.
        let ndc = Vec2::new(
            screen.x / self.viewport.x * 2.0 - 1.0,
            1.0 - screen.y / self.viewport.y * 2.0,
        );
        let view_from_clip = self.projection.inverse();
        // Any depth on the view ray works for a perspective projection; use the near plane.
        let near = view_from_clip.project_point3(ndc.extend(1.0));
        ray_towards(self.position, self.rotation * near)
    }
}

/// Keeps every [`ProjectedCamera`] attached to a Bevy [`Camera`] up to date.
pub fn sync_projected_cameras(
    mut cameras: Query<(&Camera, &GlobalTransform, &mut ProjectedCamera)>,
) {
    for (camera, transform, mut projected) in &mut cameras {
        if let Some(snapshot) = ProjectedCamera::from_camera(camera, transform) {
            *projected = snapshot;
        }
    }
}

/// A rotation whose -Z axis points along `forward`, rolled so that +Y is as close to `up` as
/// possible. A zero `forward` yields the identity rotation.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let Some(back) = (-forward).try_normalize() else {
        return Quat::IDENTITY;
    };
    let right = up
        .cross(back)
        .try_normalize()
        .unwrap_or_else(|| back.any_orthonormal_vector());
    let up = back.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, back))
}
