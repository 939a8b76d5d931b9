//! Winit input adapter
//!
//! Translates winit window events into engine [`PointerEvent`]s, tagged with
//! the listener category they belong to so the host can filter on what the
//! viewport registered.

use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::resources::input::{DragButton, ListenerKind, PointerEvent};

/// Pixel scroll deltas are scaled down to roughly match line deltas.
const PIXEL_SCALE: f32 = 0.01;

#[must_use]
pub fn translate_button(button: MouseButton) -> Option<DragButton> {
    match button {
        MouseButton::Left => Some(DragButton::Rotate),
        MouseButton::Right => Some(DragButton::Pan),
        _ => None,
    }
}

/// Maps a window event to a pointer event. Non-pointer events and
/// unsupported buttons yield `None`.
#[must_use]
pub fn translate_event(event: &WindowEvent) -> Option<(ListenerKind, PointerEvent)> {
    match event {
        WindowEvent::CursorMoved { position, .. } => Some((
            ListenerKind::PointerMove,
            PointerEvent::Move {
                x: position.x as f32,
                y: position.y as f32,
            },
        )),
        WindowEvent::MouseInput { state, button, .. } => {
            let button = translate_button(*button)?;
            Some(match state {
                ElementState::Pressed => (ListenerKind::PointerDown, PointerEvent::Down(button)),
                ElementState::Released => (ListenerKind::PointerUp, PointerEvent::Up(button)),
            })
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let delta = match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * PIXEL_SCALE,
            };
            Some((ListenerKind::Wheel, PointerEvent::Wheel { delta }))
        }
        WindowEvent::CursorEntered { .. } => Some((ListenerKind::PointerEnter, PointerEvent::Enter)),
        WindowEvent::CursorLeft { .. } => Some((ListenerKind::PointerLeave, PointerEvent::Leave)),
        _ => None,
    }
}
