//! Raw events as delivered by the native platform

use crate::input::event::{DeviceAxes, DndPhase, InputSource};
use crate::input::modifiers::NativeModifierFlags;
use crate::platform::{NativePoint, NativeRect, NativeViewId};
use crate::region::Rect;

/// Every native event shape the translator understands
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEventKind {
    /// `button` uses native numbering: 0 primary, 1 secondary, 2 middle
    MouseDown { button: u32 },
    MouseUp { button: u32 },
    MouseMoved,
    MouseDragged { button: u32 },
    ScrollWheel { delta_x: f64, delta_y: f64 },
    /// The pointer entered a view's tracking area
    MouseEntered,
    MouseExited,
    KeyDown {
        keycode: u16,
        characters: String,
        is_repeat: bool,
    },
    KeyUp { keycode: u16, characters: String },
    /// A modifier key went up or down
    FlagsChanged { keycode: u16 },
    TabletProximity { entering: bool, device: InputSource },
    /// The view's window became or stopped being the key window
    KeyWindowChanged { became_key: bool },
    /// The view's content frame moved or resized
    WindowFrameChanged { frame: NativeRect },
    WindowMapped,
    WindowUnmapped,
    /// The close button was pressed
    WindowShouldClose,
    /// The native stacking order changed
    WindowOrderChanged,
    Drag { phase: DndPhase },
    ApplicationDefined { subtype: i16, data1: i64, data2: i64 },
    AppActivated,
    AppDeactivated,
    /// Monitors were added, removed or rearranged
    ScreenParametersChanged,
    /// Native paint callback: the system is about to draw `rect` of the view
    Paint { rect: Rect },
    /// Anything else, carrying the native type code
    Other(u32),
}

/// A raw platform event
#[derive(Debug, Clone, PartialEq)]
pub struct NativeEvent {
    pub kind: NativeEventKind,
    /// View the event was delivered to, `None` for app-level events
    pub view: Option<NativeViewId>,
    /// Pointer location in native screen coordinates
    pub location: NativePoint,
    /// Seconds since an arbitrary epoch
    pub timestamp: f64,
    pub modifier_flags: NativeModifierFlags,
    /// Pressure and tilt of a tablet stylus
    pub tablet: Option<DeviceAxes>,
    /// The native window is being dragged by its title bar
    pub in_live_move: bool,
    /// The native window is being resized by the user
    pub in_live_resize: bool,
}

impl NativeEvent {
    pub fn new(kind: NativeEventKind, timestamp: f64) -> Self {
        Self {
            kind,
            view: None,
            location: NativePoint::default(),
            timestamp,
            modifier_flags: NativeModifierFlags::empty(),
            tablet: None,
            in_live_move: false,
            in_live_resize: false,
        }
    }

    pub fn with_view(mut self, view: NativeViewId) -> Self {
        self.view = Some(view);
        self
    }

    pub fn at(mut self, location: NativePoint) -> Self {
        self.location = location;
        self
    }

    pub fn with_modifiers(mut self, flags: NativeModifierFlags) -> Self {
        self.modifier_flags = flags;
        self
    }

    pub fn with_tablet(mut self, axes: DeviceAxes) -> Self {
        self.tablet = Some(axes);
        self
    }

    /// Timestamp in wrapping milliseconds
    pub fn time_ms(&self) -> u32 {
        (self.timestamp * 1000.0) as u64 as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_ms_wraps() {
        let event = NativeEvent::new(NativeEventKind::MouseMoved, 1.5);
        assert_eq!(event.time_ms(), 1500);

        // 2^32 ms plus 204 ms
        let wrapped = NativeEvent::new(NativeEventKind::MouseMoved, 4_294_967.5);
        assert_eq!(wrapped.time_ms(), 204);
    }

    #[test]
    fn test_builder() {
        let event = NativeEvent::new(NativeEventKind::MouseDown { button: 0 }, 0.0)
            .with_view(NativeViewId(3))
            .at(NativePoint::new(1.0, 2.0))
            .with_modifiers(NativeModifierFlags::SHIFT);

        assert_eq!(event.view, Some(NativeViewId(3)));
        assert_eq!(event.location, NativePoint::new(1.0, 2.0));
        assert!(event.modifier_flags.contains(NativeModifierFlags::SHIFT));
    }
}
