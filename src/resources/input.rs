//! Platform-agnostic input system
//!
//! Defines pointer event types and the shared state container the frame loop
//! reads. Concrete platform adapters (e.g., the winit adapter) translate
//! platform events into [`PointerEvent`] and push them through an
//! [`InputHandle`].
//!
//! Writers only ever store the latest value (last-write-wins); the frame loop
//! takes one [`Input::snapshot`] per tick.

use std::sync::Arc;

use glam::Vec2;
use parking_lot::Mutex;

/// Which drag gesture a button drives.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DragButton {
    /// Orbit the camera (primary button).
    Rotate,
    /// Pan the camera (secondary button).
    Pan,
}

/// Pointer events delivered by the host. Positions are in surface pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerEvent {
    Move { x: f32, y: f32 },
    Down(DragButton),
    Up(DragButton),
    Wheel { delta: f32 },
    Enter,
    Leave,
}

/// Listener categories the viewport registers with its host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    PointerMove,
    PointerDown,
    PointerUp,
    Wheel,
    PointerEnter,
    PointerLeave,
    Resize,
}

impl ListenerKind {
    pub const ALL: [ListenerKind; 7] = [
        ListenerKind::PointerMove,
        ListenerKind::PointerDown,
        ListenerKind::PointerUp,
        ListenerKind::Wheel,
        ListenerKind::PointerEnter,
        ListenerKind::PointerLeave,
        ListenerKind::Resize,
    ];
}

/// Pointer moves closer together than this are coalesced into one sample.
const MOVE_SAMPLE_INTERVAL: f32 = 0.016;

/// Plain input state.
#[derive(Debug, Clone)]
pub struct Input {
    pointer_position: Vec2,
    pointer_ndc: Vec2,
    pointer_delta: Vec2,
    /// Magnitude of the last sampled NDC step.
    pointer_speed: f32,
    /// Seconds since the pointer last moved.
    since_last_move: f32,
    since_last_sample: f32,

    wheel_delta: f32,
    rotate_drag: bool,
    pan_drag: bool,
    hovered: bool,

    screen_size: Vec2,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pointer_position: Vec2::ZERO,
            pointer_ndc: Vec2::ZERO,
            pointer_delta: Vec2::ZERO,
            pointer_speed: 0.0,
            since_last_move: f32::INFINITY,
            since_last_sample: f32::INFINITY,
            wheel_delta: 0.0,
            rotate_drag: false,
            pan_drag: false,
            hovered: false,
            screen_size: Vec2::ONE,
        }
    }

    // ========== System API (called by Viewport/Adapter) ==========

    /// Applies one pointer event.
    pub fn apply(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Move { x, y } => self.inject_pointer_position(x, y),
            PointerEvent::Down(button) => self.set_drag(button, true),
            PointerEvent::Up(button) => self.set_drag(button, false),
            PointerEvent::Wheel { delta } => self.wheel_delta += delta,
            PointerEvent::Enter => self.hovered = true,
            PointerEvent::Leave => {
                self.hovered = false;
                self.rotate_drag = false;
                self.pan_drag = false;
            }
        }
    }

    fn set_drag(&mut self, button: DragButton, pressed: bool) {
        match button {
            DragButton::Rotate => self.rotate_drag = pressed,
            DragButton::Pan => self.pan_drag = pressed,
        }
    }

    fn inject_pointer_position(&mut self, x: f32, y: f32) {
        let position = Vec2::new(x, y);
        self.pointer_delta += position - self.pointer_position;
        self.pointer_position = position;
        self.since_last_move = 0.0;

        if self.since_last_sample > MOVE_SAMPLE_INTERVAL {
            let size = self.screen_size.max(Vec2::ONE);
            let ndc = Vec2::new(x / size.x * 2.0 - 1.0, -(y / size.y) * 2.0 + 1.0);
            self.pointer_speed = (ndc - self.pointer_ndc).length();
            self.pointer_ndc = ndc;
            self.since_last_sample = 0.0;
        }
    }

    pub fn inject_resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width as f32, height as f32);
    }

    /// Advances the recency clocks.
    pub fn advance(&mut self, dt: f32) {
        self.since_last_move += dt;
        self.since_last_sample += dt;
    }

    /// Clears per-frame deltas after the frame consumed them.
    pub fn start_frame(&mut self) {
        self.pointer_delta = Vec2::ZERO;
        self.wheel_delta = 0.0;
    }

    // ========== Query API ==========

    /// Pointer position in normalized device coordinates, y up.
    #[must_use]
    pub fn pointer_ndc(&self) -> Vec2 {
        self.pointer_ndc
    }

    #[must_use]
    pub fn pointer_position(&self) -> Vec2 {
        self.pointer_position
    }

    /// Pixel movement accumulated since the last [`start_frame`](Self::start_frame).
    #[must_use]
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }

    #[must_use]
    pub fn pointer_speed(&self) -> f32 {
        self.pointer_speed
    }

    /// True if the pointer moved within the last `window` seconds.
    #[must_use]
    pub fn moved_within(&self, window: f32) -> bool {
        self.since_last_move <= window
    }

    #[must_use]
    pub fn wheel_delta(&self) -> f32 {
        self.wheel_delta
    }

    #[must_use]
    pub fn is_dragging(&self, button: DragButton) -> bool {
        match button {
            DragButton::Rotate => self.rotate_drag,
            DragButton::Pan => self.pan_drag,
        }
    }

    #[must_use]
    pub fn hovered(&self) -> bool {
        self.hovered
    }

    #[must_use]
    pub fn screen_size(&self) -> Vec2 {
        self.screen_size
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle the host's event handlers write through.
#[derive(Debug, Clone, Default)]
pub struct InputHandle(Arc<Mutex<Input>>);

impl InputHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self, event: PointerEvent) {
        self.0.lock().apply(event);
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.0.lock().inject_resize(width, height);
    }

    /// Copies the current state out and clears the per-frame deltas.
    pub fn take_frame(&self, dt: f32) -> Input {
        let mut guard = self.0.lock();
        guard.advance(dt);
        let snapshot = guard.clone();
        guard.start_frame();
        snapshot
    }

    /// Copies the current state without consuming anything.
    #[must_use]
    pub fn snapshot(&self) -> Input {
        self.0.lock().clone()
    }
}
