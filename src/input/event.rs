//! Normalized events handed to the application

use crate::input::modifiers::{EventMask, ModifierState};
use crate::region::{Point, Region, Rect};
use crate::window::WindowId;

/// How a crossing came about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingMode {
    /// The pointer moved
    Normal,
    /// A pointer grab started
    Grab,
    /// A pointer grab ended
    Ungrab,
}

/// Where the pointer went relative to the window receiving the crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingDetail {
    /// Into or out of an ancestor
    Ancestor,
    /// Passing through, between an ancestor and a descendant
    Virtual,
    /// Into or out of a descendant
    Inferior,
    /// Between windows with no ancestry relation
    Nonlinear,
    /// Passing through, on the path of a nonlinear crossing
    NonlinearVirtual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DndPhase {
    Enter,
    Motion,
    Leave,
    Drop,
}

/// Pointing device that produced a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputSource {
    #[default]
    Mouse,
    Pen,
    Eraser,
    Cursor,
}

/// Extra axes reported by tablet devices
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeviceAxes {
    /// 0.0 to 1.0
    pub pressure: f64,
    /// -1.0 to 1.0
    pub x_tilt: f64,
    /// -1.0 to 1.0
    pub y_tilt: f64,
}

/// Position shared by pointer events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerPosition {
    /// In the target window's coordinates
    pub local: Point,
    /// In virtual-desktop coordinates
    pub root: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Motion {
        position: PointerPosition,
        source: InputSource,
        axes: Option<DeviceAxes>,
    },
    ButtonPress {
        button: u32,
        position: PointerPosition,
        source: InputSource,
        axes: Option<DeviceAxes>,
    },
    ButtonRelease {
        button: u32,
        position: PointerPosition,
        source: InputSource,
        axes: Option<DeviceAxes>,
    },
    Scroll {
        direction: ScrollDirection,
        delta_x: f64,
        delta_y: f64,
        position: PointerPosition,
    },
    KeyPress(KeyData),
    KeyRelease(KeyData),
    Enter {
        mode: CrossingMode,
        detail: CrossingDetail,
        position: PointerPosition,
    },
    Leave {
        mode: CrossingMode,
        detail: CrossingDetail,
        position: PointerPosition,
    },
    FocusChange {
        focus_in: bool,
    },
    /// New bounds, parent-relative
    Configure {
        bounds: Rect,
    },
    Map,
    Unmap,
    /// The user asked to close the window
    Delete,
    /// Area to repaint, window-local
    Expose {
        region: Region,
    },
    GrabBroken {
        keyboard: bool,
        implicit: bool,
        /// Window taking over the grab, if any
        grab_window: Option<WindowId>,
    },
    Dnd {
        phase: DndPhase,
        position: PointerPosition,
    },
    /// Application-defined payload
    Client {
        subtype: i16,
        data: [i64; 2],
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyData {
    /// Native hardware keycode
    pub keycode: u16,
    /// Text produced by the key, empty for modifiers and dead keys
    pub text: String,
    pub is_modifier: bool,
    /// Keyboard group (1 while Option is held)
    pub group: u8,
}

/// A translated event addressed to a logical window
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub window: WindowId,
    /// Milliseconds, wraps at `u32::MAX`
    pub time: u32,
    pub state: ModifierState,
    /// `true` for events synthesized by the toolkit rather than the platform
    pub send_event: bool,
    pub kind: EventKind,
}

impl Event {
    pub fn new(window: WindowId, time: u32, state: ModifierState, kind: EventKind) -> Self {
        Self {
            window,
            time,
            state,
            send_event: false,
            kind,
        }
    }

    pub fn synthesized(mut self) -> Self {
        self.send_event = true;
        self
    }

    /// Pointer position for events that have one
    pub fn position(&self) -> Option<PointerPosition> {
        match &self.kind {
            EventKind::Motion { position, .. }
            | EventKind::ButtonPress { position, .. }
            | EventKind::ButtonRelease { position, .. }
            | EventKind::Scroll { position, .. }
            | EventKind::Enter { position, .. }
            | EventKind::Leave { position, .. }
            | EventKind::Dnd { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Mask a window must select to receive this event, empty if unconditional
    pub fn selection_mask(&self) -> EventMask {
        match &self.kind {
            EventKind::Motion { .. } => EventMask::POINTER_MOTION,
            EventKind::ButtonPress { .. } => EventMask::BUTTON_PRESS,
            EventKind::ButtonRelease { .. } => EventMask::BUTTON_RELEASE,
            EventKind::Scroll { .. } => EventMask::SCROLL,
            EventKind::KeyPress(_) => EventMask::KEY_PRESS,
            EventKind::KeyRelease(_) => EventMask::KEY_RELEASE,
            EventKind::Enter { .. } => EventMask::ENTER_NOTIFY,
            EventKind::Leave { .. } => EventMask::LEAVE_NOTIFY,
            EventKind::Configure { .. } | EventKind::Map | EventKind::Unmap => EventMask::STRUCTURE,
            EventKind::Expose { .. } => EventMask::EXPOSURE,
            EventKind::FocusChange { .. }
            | EventKind::Delete
            | EventKind::GrabBroken { .. }
            | EventKind::Dnd { .. }
            | EventKind::Client { .. } => EventMask::empty(),
        }
    }
}
