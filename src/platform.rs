//! Seams between the pipeline and the native windowing system.
//!
//! The pipeline never talks to the platform directly. Inbound queries go
//! through [`NativePlatform`], redraw requests go out through
//! [`NativeCompositor`]. The [`crate::backend::headless`] backend implements
//! both in memory.

use crate::input::modifiers::{NativeButtons, NativeModifierFlags};
use crate::region::Rect;

/// Opaque identifier of a native view (the content view of a native window)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeViewId(pub u64);

/// A point in native screen coordinates (origin bottom-left, Y grows upward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NativePoint {
    pub x: f64,
    pub y: f64,
}

impl NativePoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangle in native screen coordinates, `(x, y)` being its bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NativeRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NativeRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Live state queries answered by the native platform.
pub trait NativePlatform {
    /// Keyboard modifiers held right now
    fn keyboard_modifiers(&self) -> NativeModifierFlags;

    /// Mouse buttons held right now
    fn pressed_mouse_buttons(&self) -> NativeButtons;

    /// Current pointer location in native screen coordinates
    fn pointer_location(&self) -> NativePoint;

    /// Frames of every attached monitor
    fn monitor_frames(&self) -> Vec<NativeRect>;

    /// Native windows front to back, including windows we don't own
    fn ordered_views(&self) -> Vec<NativeViewId>;

    /// Content frame of a native view, `None` once the view is gone
    fn view_frame(&self, view: NativeViewId) -> Option<NativeRect>;
}

/// Redraw requests sent to the native compositor.
///
/// Rectangles are in the view's own top-left-origin coordinates.
pub trait NativeCompositor {
    /// Marks part of a view as needing display
    fn set_needs_display(&mut self, view: NativeViewId, rect: Rect);

    /// Pushes a view's pending redraws to the screen
    fn flush_view(&mut self, view: NativeViewId);
}
