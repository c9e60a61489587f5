//! A world-space cursor, double-tap targeting and a compass reticle for AR apps built on Bevy.
//!
//! The AR session is seen through two collaborators: a camera pose ([`camera::ProjectedCamera`])
//! and the tracked [`point_cloud::PointCloud`]. Pointer presses become [`input::PointerPress`]
//! events; each [`cursor::ArCursor`] classifies them with a [`gesture::TapGesture`]. A single tap
//! snaps the cursor onto the surface under the touch. A double tap toggles targeting, which locks
//! a world point and the camera orientation; the [`reticle`] then points back towards that lock.
//!
//! Add [`TargetingPlugin`], give a camera entity a [`ProjectedCamera`](camera::ProjectedCamera),
//! and spawn an [`ArCursorBundle`](cursor::ArCursorBundle) with a reticle under it:
//!
//! ```no_run
//! use bevy::prelude::*;
//! use bevy_mod_ar_targeting::prelude::*;
//!
//! fn setup(mut commands: Commands, settings: Res<TargetingSettings>) {
//!     let camera = commands
//!         .spawn((Camera3dBundle::default(), ProjectedCamera::default()))
//!         .id();
//!     let cursor = commands.spawn(ArCursorBundle::new(camera, &settings)).id();
//!     spawn_reticle(&mut commands, cursor, camera, &settings.reticle);
//! }
//!
//! App::new()
//!     .add_plugins((DefaultPlugins, TargetingPlugin))
//!     .add_systems(Startup, setup)
//!     .run();
//! ```

pub mod arc_scale;
pub mod camera;
pub mod cursor;
#[cfg(feature = "debug")]
pub mod debug;
pub mod gesture;
pub mod input;
pub mod plugin;
pub mod point_cloud;
pub mod primitives;
pub mod range_finder;
pub mod reticle;
pub mod settings;
pub mod timer;

pub use crate::plugin::{CollaboratorError, TargetingPlugin, TargetingSystem};

pub mod prelude {
    pub use crate::{
        arc_scale::ArcScale,
        camera::{look_rotation, CameraPose, ProjectedCamera},
        cursor::{capture_lock, ArCursor, ArCursorBundle, CursorReadout, CursorTracker},
        gesture::{TapGesture, TapOutcome, TargetLock, TargetingEvent, TargetingMode},
        input::PointerPress,
        plugin::{CollaboratorError, TargetingPlugin, TargetingSystem},
        point_cloud::{PointCloud, PointCloudFeed, PointCloudUpdate},
        primitives::*,
        range_finder::{RangeDial, RangeFinder, RangeFinderBundle},
        reticle::{spawn_reticle, ReticleAnimator, ReticleArrow, ReticleDot, TargetingReticle},
        settings::*,
        timer::DelayedTask,
    };
}
