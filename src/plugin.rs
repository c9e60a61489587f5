//! # Targeting plugin
//!
//! [`TargetingPlugin`] wires every system of this crate into `Update` as one chained
//! [`TargetingSystem`] set. Each stage can be switched off through [`TargetingPluginState`].

use std::fmt;

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_utils::tracing::*;

use crate::{
    arc_scale::{handle_arc_scale_presses, ArcScale},
    camera::{sync_projected_cameras, ProjectedCamera},
    cursor::{handle_cursor_presses, update_cursors, ArCursor, CursorReadout, CursorTracker},
    gesture::{TapGesture, TargetingEvent},
    input::{read_pointer_input, PointerPress},
    point_cloud::{drain_point_cloud_feed, PointCloud},
    range_finder::{update_range_finders, RangeFinder},
    reticle::{
        animate_reticles, apply_reticle_transforms, apply_targeting_events, ReticleArrow,
        ReticleDot, TargetingReticle,
    },
    settings::{TargetingPluginState, TargetingSettings},
};

#[derive(Default)]
pub struct TargetingPlugin;

impl Plugin for TargetingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TargetingSettings>()
            .init_resource::<TargetingPluginState>()
            .init_resource::<PointCloud>()
            .add_event::<PointerPress>()
            .add_event::<TargetingEvent>();

        app.configure_sets(
            Update,
            (
                TargetingSystem::ReadInput,
                TargetingSystem::SyncCamera,
                TargetingSystem::UpdatePointCloud,
                TargetingSystem::Gesture,
                TargetingSystem::Cursor,
                TargetingSystem::Reticle,
                TargetingSystem::RangeFinder,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            (
                (validate_cursors, validate_reticles, validate_range_finders, validate_arc_scales)
                    .before(TargetingSystem::Gesture),
                read_pointer_input
                    .in_set(TargetingSystem::ReadInput)
                    .run_if(|state: Res<TargetingPluginState>| state.read_input),
                sync_projected_cameras.in_set(TargetingSystem::SyncCamera),
                drain_point_cloud_feed.in_set(TargetingSystem::UpdatePointCloud),
                (handle_cursor_presses, handle_arc_scale_presses)
                    .in_set(TargetingSystem::Gesture)
                    .run_if(|state: Res<TargetingPluginState>| state.update_cursor),
                update_cursors
                    .in_set(TargetingSystem::Cursor)
                    .run_if(|state: Res<TargetingPluginState>| state.update_cursor),
                (apply_targeting_events, animate_reticles, apply_reticle_transforms)
                    .chain()
                    .in_set(TargetingSystem::Reticle)
                    .run_if(|state: Res<TargetingPluginState>| state.update_reticle),
                update_range_finders
                    .in_set(TargetingSystem::RangeFinder)
                    .run_if(|state: Res<TargetingPluginState>| state.update_range_finder),
            ),
        );

        #[cfg(feature = "2d")]
        app.add_systems(
            Update,
            crate::reticle::tint_reticle_dots
                .in_set(TargetingSystem::Reticle)
                .after(apply_reticle_transforms)
                .run_if(|state: Res<TargetingPluginState>| state.update_reticle),
        );

        // Gizmos need `GizmoPlugin`, which headless apps do not have.
        #[cfg(feature = "debug")]
        if app
            .world()
            .contains_resource::<bevy_gizmos::config::GizmoConfigStore>()
        {
            app.add_systems(
                Update,
                crate::debug::draw_targeting_gizmos
                    .in_set(TargetingSystem::Debug)
                    .after(TargetingSystem::RangeFinder)
                    .run_if(|state: Res<TargetingPluginState>| state.debug_gizmos),
            );
        } else {
            debug!("GizmoPlugin not found, targeting gizmos are disabled");
        }

        app.register_type::<TargetingSettings>()
            .register_type::<TargetingPluginState>()
            .register_type::<ArCursor>()
            .register_type::<CursorTracker>()
            .register_type::<CursorReadout>()
            .register_type::<TapGesture>()
            .register_type::<TargetingReticle>()
            .register_type::<ReticleDot>()
            .register_type::<ReticleArrow>()
            .register_type::<RangeFinder>()
            .register_type::<ArcScale>();
    }
}

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetingSystem {
    ReadInput,
    SyncCamera,
    UpdatePointCloud,
    Gesture,
    Cursor,
    Reticle,
    RangeFinder,
    #[cfg(feature = "debug")]
    Debug,
}

/// A component names an entity that lacks the component it needs from it. The dependent
/// component does nothing until the reference is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollaboratorError {
    MissingCamera { entity: Entity, camera: Entity },
    MissingCursor { entity: Entity, cursor: Entity },
}

impl fmt::Display for CollaboratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollaboratorError::MissingCamera { entity, camera } => write!(
                f,
                "{entity:?} follows camera {camera:?}, which has no ProjectedCamera component"
            ),
            CollaboratorError::MissingCursor { entity, cursor } => write!(
                f,
                "{entity:?} follows cursor {cursor:?}, which has no ArCursor component"
            ),
        }
    }
}

impl std::error::Error for CollaboratorError {}

fn check_camera(
    entity: Entity,
    camera: Entity,
    cameras: &Query<(), With<ProjectedCamera>>,
) -> Result<(), CollaboratorError> {
    if cameras.contains(camera) {
        Ok(())
    } else {
        Err(CollaboratorError::MissingCamera { entity, camera })
    }
}

fn check_cursor(
    entity: Entity,
    cursor: Entity,
    cursors: &Query<(), With<ArCursor>>,
) -> Result<(), CollaboratorError> {
    if cursors.contains(cursor) {
        Ok(())
    } else {
        Err(CollaboratorError::MissingCursor { entity, cursor })
    }
}

pub fn validate_cursors(
    added: Query<(Entity, &ArCursor), Added<ArCursor>>,
    cameras: Query<(), With<ProjectedCamera>>,
) {
    for (entity, cursor) in &added {
        if let Err(e) = check_camera(entity, cursor.camera, &cameras) {
            error!("{e}");
        }
    }
}

pub fn validate_reticles(
    added: Query<(Entity, &TargetingReticle), Added<TargetingReticle>>,
    cursors: Query<(), With<ArCursor>>,
    cameras: Query<(), With<ProjectedCamera>>,
) {
    for (entity, reticle) in &added {
        let checked = check_cursor(entity, reticle.cursor, &cursors)
            .and_then(|_| check_camera(entity, reticle.camera, &cameras));
        if let Err(e) = checked {
            error!("{e}");
        }
    }
}

pub fn validate_range_finders(
    added: Query<(Entity, &RangeFinder), Added<RangeFinder>>,
    cursors: Query<(), With<ArCursor>>,
) {
    for (entity, range_finder) in &added {
        if let Err(e) = check_cursor(entity, range_finder.cursor, &cursors) {
            error!("{e}");
        }
    }
}

pub fn validate_arc_scales(
    added: Query<(Entity, &ArcScale), Added<ArcScale>>,
    cameras: Query<(), With<ProjectedCamera>>,
) {
    for (entity, scale) in &added {
        if let Err(e) = check_camera(entity, scale.camera, &cameras) {
            error!("{e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collaborator_errors_name_both_entities() {
        let entity = Entity::from_raw(3);
        let camera = Entity::from_raw(7);
        let message = CollaboratorError::MissingCamera { entity, camera }.to_string();
        assert!(message.contains(&format!("{entity:?}")));
        assert!(message.contains(&format!("{camera:?}")));
        assert!(message.contains("ProjectedCamera"));
    }

    #[test]
    fn checks_report_missing_components() {
        let mut world = World::new();
        let camera = world.spawn(ProjectedCamera::default()).id();
        let bare = world.spawn_empty().id();
        let cursor = world.spawn(ArCursor { camera }).id();

        let mut system_state: bevy_ecs::system::SystemState<(
            Query<(), With<ProjectedCamera>>,
            Query<(), With<ArCursor>>,
        )> = bevy_ecs::system::SystemState::new(&mut world);
        let (cameras, cursors) = system_state.get(&world);

        assert_eq!(check_camera(cursor, camera, &cameras), Ok(()));
        assert_eq!(
            check_camera(cursor, bare, &cameras),
            Err(CollaboratorError::MissingCamera {
                entity: cursor,
                camera: bare
            })
        );
        assert_eq!(check_cursor(bare, cursor, &cursors), Ok(()));
        assert!(check_cursor(bare, camera, &cursors).is_err());
    }
}
