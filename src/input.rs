use bevy_ecs::prelude::*;
use bevy_input::{mouse::MouseButton, touch::Touches, ButtonInput};
use bevy_math::Vec2;
use bevy_window::{PrimaryWindow, Window};

/// A pointer press edge. Hosts with their own input source can send these directly.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PointerPress {
    /// Screen position in logical pixels, top-left origin. `None` if the source did not report one.
    pub position: Option<Vec2>,
}

/// Turns left mouse button presses and new touches into [`PointerPress`] events.
///
/// The input resources are optional so that headless apps without `InputPlugin` keep running.
pub fn read_pointer_input(
    mouse: Option<Res<ButtonInput<MouseButton>>>,
    touches: Option<Res<Touches>>,
    window: Query<&Window, With<PrimaryWindow>>,
    mut presses: EventWriter<PointerPress>,
) {
    if let Some(mouse) = mouse {
        if mouse.just_pressed(MouseButton::Left) {
            let position = window
                .get_single()
                .ok()
                .and_then(|window| window.cursor_position());
            presses.send(PointerPress { position });
        }
    }
    if let Some(touches) = touches {
        for touch in touches.iter_just_pressed() {
            presses.send(PointerPress {
                position: Some(touch.position()),
            });
        }
    }
}
