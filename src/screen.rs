//! Coordinate mapping between native screen space and toolkit space
//!
//! The native screen space has its origin at the bottom-left of the primary
//! monitor with Y growing upward; monitors left of or below the primary one
//! have negative origins. Toolkit space puts `(0, 0)` at the top-left corner
//! of the virtual desktop (the bounding box of every monitor) with Y growing
//! downward, so every on-screen toolkit coordinate is non-negative.
//!
//! ```text
//! toolkit_x = native_x - desktop_min_x
//! toolkit_y = desktop_height - native_y + desktop_min_y
//! ```
//!
//! # Example
//!
//! ```
//! use casement::platform::{NativePoint, NativeRect};
//! use casement::region::Point;
//! use casement::screen::CoordinateMapper;
//!
//! let mapper = CoordinateMapper::new(&[NativeRect::new(0.0, 0.0, 1440.0, 900.0)]);
//!
//! assert_eq!(mapper.native_to_desktop(NativePoint::new(10.0, 900.0)), Point::new(10, 0));
//! assert_eq!(mapper.desktop_to_native(Point::new(10, 0)), NativePoint::new(10.0, 900.0));
//! ```

use log::info;

use crate::platform::{NativePoint, NativeRect};
use crate::region::{Point, Rect};
use crate::window::{WindowId, WindowTree};

/// A monitor in both coordinate spaces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Monitor {
    pub native_frame: NativeRect,
    /// Frame in virtual-desktop coordinates
    pub geometry: Rect,
}

/// Converts points and rectangles between native, desktop and window spaces
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMapper {
    min_x: i32,
    min_y: i32,
    width: i32,
    height: i32,
    monitors: Vec<Monitor>,
}

impl CoordinateMapper {
    /// Builds a mapper for the given native monitor frames
    pub fn new(frames: &[NativeRect]) -> Self {
        // The native origin is always part of the desktop box
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (0, 0, 0, 0);
        for frame in frames {
            min_x = min_x.min(frame.x.floor() as i32);
            min_y = min_y.min(frame.y.floor() as i32);
            max_x = max_x.max((frame.x + frame.width).ceil() as i32);
            max_y = max_y.max((frame.y + frame.height).ceil() as i32);
        }

        let mut mapper = Self {
            min_x,
            min_y,
            width: max_x - min_x,
            height: max_y - min_y,
            monitors: Vec::with_capacity(frames.len()),
        };
        mapper.monitors = frames
            .iter()
            .map(|&frame| Monitor {
                native_frame: frame,
                geometry: mapper.native_rect_to_desktop(frame),
            })
            .collect();
        mapper
    }

    /// Recomputes the desktop after a monitor topology change.
    ///
    /// # Returns
    ///
    /// `true` if the desktop or any monitor changed
    pub fn update_monitors(&mut self, frames: &[NativeRect]) -> bool {
        let next = Self::new(frames);
        if next == *self {
            return false;
        }

        info!(
            "🖥️ Monitor topology changed: {} monitors, desktop {}x{} at native ({}, {})",
            next.monitors.len(),
            next.width,
            next.height,
            next.min_x,
            next.min_y
        );
        *self = next;
        true
    }

    /// The virtual desktop in toolkit coordinates, always at the origin
    pub fn desktop_bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    /// Index of the monitor containing a desktop point
    pub fn monitor_at(&self, point: Point) -> Option<usize> {
        self.monitors
            .iter()
            .position(|m| m.geometry.contains_point(point.x, point.y))
    }

    /// Native screen point to virtual-desktop point
    pub fn native_to_desktop(&self, point: NativePoint) -> Point {
        Point::new(
            point.x.floor() as i32 - self.min_x,
            (self.height as f64 - point.y + self.min_y as f64).floor() as i32,
        )
    }

    /// Virtual-desktop point to native screen point
    pub fn desktop_to_native(&self, point: Point) -> NativePoint {
        NativePoint::new(
            (point.x + self.min_x) as f64,
            (self.height - point.y + self.min_y) as f64,
        )
    }

    /// Native rectangle (bottom-left origin) to desktop rectangle (top-left origin)
    pub fn native_rect_to_desktop(&self, rect: NativeRect) -> Rect {
        let top = (rect.y + rect.height).round() as i32;
        Rect::new(
            rect.x.round() as i32 - self.min_x,
            self.height - top + self.min_y,
            rect.width.round() as i32,
            rect.height.round() as i32,
        )
    }

    pub fn desktop_rect_to_native(&self, rect: Rect) -> NativeRect {
        NativeRect::new(
            (rect.x + self.min_x) as f64,
            (self.height - rect.bottom() + self.min_y) as f64,
            rect.width as f64,
            rect.height as f64,
        )
    }

    /// Desktop point to a window's local coordinates
    pub fn screen_to_local(&self, tree: &WindowTree, window: WindowId, point: Point) -> Option<Point> {
        tree.absolute_origin(window).map(|origin| point - origin)
    }

    /// Window-local point to desktop coordinates
    pub fn local_to_screen(&self, tree: &WindowTree, window: WindowId, point: Point) -> Option<Point> {
        tree.absolute_origin(window).map(|origin| point + origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::NativeViewId;
    use crate::window::WindowAttributes;

    fn dual_monitor() -> CoordinateMapper {
        // Secondary monitor to the left and lower than the primary one
        CoordinateMapper::new(&[
            NativeRect::new(0.0, 0.0, 1920.0, 1080.0),
            NativeRect::new(-1280.0, -200.0, 1280.0, 1024.0),
        ])
    }

    #[test]
    fn test_desktop_bounds_cover_all_monitors() {
        let mapper = dual_monitor();
        assert_eq!(mapper.desktop_bounds(), Rect::new(0, 0, 3200, 1280));
        assert_eq!(mapper.monitors()[0].geometry, Rect::new(1280, 0, 1920, 1080));
        assert_eq!(mapper.monitors()[1].geometry, Rect::new(0, 256, 1280, 1024));
    }

    #[test]
    fn test_point_conversion_flips_y() {
        let mapper = dual_monitor();

        // Top-left corner of the primary monitor
        assert_eq!(
            mapper.native_to_desktop(NativePoint::new(0.0, 1080.0)),
            Point::new(1280, 0)
        );
        // Bottom-left corner of the secondary monitor
        assert_eq!(
            mapper.native_to_desktop(NativePoint::new(-1280.0, -200.0)),
            Point::new(0, 1280)
        );
    }

    #[test]
    fn test_round_trip_is_exact_for_integers() {
        let mapper = dual_monitor();
        for &(x, y) in &[(0, 0), (1279, 1279), (3199, 5), (-50, -50), (640, 900)] {
            let p = Point::new(x, y);
            assert_eq!(mapper.native_to_desktop(mapper.desktop_to_native(p)), p);
        }

        let rect = Rect::new(300, 200, 640, 480);
        assert_eq!(
            mapper.native_rect_to_desktop(mapper.desktop_rect_to_native(rect)),
            rect
        );
    }

    #[test]
    fn test_monitor_at() {
        let mapper = dual_monitor();
        assert_eq!(mapper.monitor_at(Point::new(1300, 10)), Some(0));
        assert_eq!(mapper.monitor_at(Point::new(10, 300)), Some(1));
        assert_eq!(mapper.monitor_at(Point::new(10, 10)), None);
    }

    #[test]
    fn test_update_monitors_reports_changes() {
        let mut mapper = CoordinateMapper::new(&[NativeRect::new(0.0, 0.0, 800.0, 600.0)]);
        assert!(!mapper.update_monitors(&[NativeRect::new(0.0, 0.0, 800.0, 600.0)]));
        assert!(mapper.update_monitors(&[NativeRect::new(0.0, 0.0, 1024.0, 768.0)]));
        assert_eq!(mapper.desktop_bounds(), Rect::new(0, 0, 1024, 768));
    }

    #[test]
    fn test_local_round_trip() {
        let mapper = CoordinateMapper::new(&[NativeRect::new(0.0, 0.0, 800.0, 600.0)]);
        let mut tree = WindowTree::new(mapper.desktop_bounds());
        let top = tree
            .create_toplevel(NativeViewId(1), WindowAttributes::toplevel(Rect::new(30, 40, 200, 200)))
            .unwrap();
        let child = tree
            .create_child(top, WindowAttributes::child(Rect::new(5, 6, 20, 20)))
            .unwrap();

        let p = Point::new(100, 100);
        let local = mapper.screen_to_local(&tree, child, p).unwrap();
        assert_eq!(local, Point::new(65, 54));
        assert_eq!(mapper.local_to_screen(&tree, child, local), Some(p));
    }
}
