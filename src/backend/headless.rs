//! Headless backend
//!
//! Answers platform queries from plain fields and records every redraw
//! request, so the whole pipeline can run without a display: in tests, in
//! benchmarks, or when replaying recorded native events.
//!
//! # Example
//!
//! ```
//! use casement::backend::HeadlessPlatform;
//! use casement::platform::{NativePlatform, NativeRect, NativeViewId};
//!
//! let mut platform = HeadlessPlatform::single_monitor(1440.0, 900.0);
//! platform.add_view(NativeViewId(1), NativeRect::new(100.0, 100.0, 640.0, 480.0));
//!
//! assert_eq!(platform.ordered_views(), vec![NativeViewId(1)]);
//! assert_eq!(platform.monitor_frames().len(), 1);
//! ```

use log::debug;
use std::collections::HashMap;

use crate::input::modifiers::{NativeButtons, NativeModifierFlags};
use crate::platform::{NativeCompositor, NativePlatform, NativePoint, NativeRect, NativeViewId};
use crate::region::Rect;

/// In-memory platform and compositor
#[derive(Debug, Clone, Default)]
pub struct HeadlessPlatform {
    pub modifiers: NativeModifierFlags,
    pub buttons: NativeButtons,
    pub pointer: NativePoint,
    pub monitors: Vec<NativeRect>,
    /// Native views front to back
    pub order: Vec<NativeViewId>,
    pub frames: HashMap<NativeViewId, NativeRect>,
    /// Every `set_needs_display` call, in order
    pub needs_display: Vec<(NativeViewId, Rect)>,
    /// Every `flush_view` call, in order
    pub flushed: Vec<NativeViewId>,
}

impl HeadlessPlatform {
    pub fn new(monitors: Vec<NativeRect>) -> Self {
        Self {
            monitors,
            ..Self::default()
        }
    }

    /// One monitor at the native origin
    pub fn single_monitor(width: f64, height: f64) -> Self {
        Self::new(vec![NativeRect::new(0.0, 0.0, width, height)])
    }

    /// Adds a view in front of all others
    pub fn add_view(&mut self, view: NativeViewId, frame: NativeRect) {
        self.order.retain(|&v| v != view);
        self.order.insert(0, view);
        self.frames.insert(view, frame);
        debug!("🧪 Headless view {:?} added at {:?}", view, frame);
    }

    pub fn remove_view(&mut self, view: NativeViewId) {
        self.order.retain(|&v| v != view);
        self.frames.remove(&view);
    }

    /// Moves a view in front of all others
    pub fn bring_to_front(&mut self, view: NativeViewId) {
        if let Some(pos) = self.order.iter().position(|&v| v == view) {
            self.order.remove(pos);
            self.order.insert(0, view);
        }
    }

    pub fn press(&mut self, buttons: NativeButtons) {
        self.buttons.insert(buttons);
    }

    pub fn release(&mut self, buttons: NativeButtons) {
        self.buttons.remove(buttons);
    }

    /// Takes the recorded redraw requests
    pub fn take_needs_display(&mut self) -> Vec<(NativeViewId, Rect)> {
        std::mem::take(&mut self.needs_display)
    }

    /// Takes the recorded flushes
    pub fn take_flushed(&mut self) -> Vec<NativeViewId> {
        std::mem::take(&mut self.flushed)
    }
}

impl NativePlatform for HeadlessPlatform {
    fn keyboard_modifiers(&self) -> NativeModifierFlags {
        self.modifiers
    }

    fn pressed_mouse_buttons(&self) -> NativeButtons {
        self.buttons
    }

    fn pointer_location(&self) -> NativePoint {
        self.pointer
    }

    fn monitor_frames(&self) -> Vec<NativeRect> {
        self.monitors.clone()
    }

    fn ordered_views(&self) -> Vec<NativeViewId> {
        self.order.clone()
    }

    fn view_frame(&self, view: NativeViewId) -> Option<NativeRect> {
        self.frames.get(&view).copied()
    }
}

impl NativeCompositor for HeadlessPlatform {
    fn set_needs_display(&mut self, view: NativeViewId, rect: Rect) {
        self.needs_display.push((view, rect));
    }

    fn flush_view(&mut self, view: NativeViewId) {
        self.flushed.push(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_order() {
        let mut platform = HeadlessPlatform::single_monitor(800.0, 600.0);
        platform.add_view(NativeViewId(1), NativeRect::default());
        platform.add_view(NativeViewId(2), NativeRect::default());
        assert_eq!(platform.ordered_views(), vec![NativeViewId(2), NativeViewId(1)]);

        platform.bring_to_front(NativeViewId(1));
        assert_eq!(platform.ordered_views(), vec![NativeViewId(1), NativeViewId(2)]);

        platform.remove_view(NativeViewId(1));
        assert_eq!(platform.ordered_views(), vec![NativeViewId(2)]);
        assert_eq!(platform.view_frame(NativeViewId(1)), None);
    }

    #[test]
    fn test_records_compositor_calls() {
        let mut platform = HeadlessPlatform::default();
        platform.set_needs_display(NativeViewId(3), Rect::new(0, 0, 4, 4));
        platform.flush_view(NativeViewId(3));

        assert_eq!(platform.take_needs_display(), vec![(NativeViewId(3), Rect::new(0, 0, 4, 4))]);
        assert_eq!(platform.take_flushed(), vec![NativeViewId(3)]);
        assert!(platform.needs_display.is_empty());
    }
}
