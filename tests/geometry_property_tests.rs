//! Property-based tests for coordinate mapping and hit testing

use casement::platform::{NativePoint, NativeRect, NativeViewId};
use casement::region::{Point, Rect};
use casement::screen::CoordinateMapper;
use casement::window::{HitTarget, WindowAttributes, WindowId, WindowTree};
use proptest::prelude::*;

prop_compose! {
    fn monitor_frame()(x in -2000i32..2000, y in -1500i32..1500, width in 1i32..2000, height in 1i32..1500) -> NativeRect {
        NativeRect::new(x as f64, y as f64, width as f64, height as f64)
    }
}

prop_compose! {
    fn window_rect(max: i32)(x in 0..max, y in 0..max, width in 0i32..150, height in 0i32..150) -> Rect {
        Rect::new(x, y, width, height)
    }
}

/// A toplevel and its children, each with a mapped flag
type Layout = Vec<((Rect, bool), Vec<(Rect, bool)>)>;

fn layout() -> impl Strategy<Value = Layout> {
    prop::collection::vec(
        (
            (window_rect(400), any::<bool>()),
            prop::collection::vec((window_rect(120), any::<bool>()), 0..4),
        ),
        1..4,
    )
}

fn build(layout: &Layout) -> WindowTree {
    let mut tree = WindowTree::new(Rect::new(0, 0, 600, 600));
    for (i, ((bounds, mapped), children)) in layout.iter().enumerate() {
        let top = tree
            .create_toplevel(NativeViewId(i as u64), WindowAttributes::toplevel(*bounds))
            .unwrap();
        if *mapped {
            tree.map(top).unwrap();
        }
        for (child_bounds, child_mapped) in children {
            let child = tree
                .create_child(top, WindowAttributes::child(*child_bounds))
                .unwrap();
            if *child_mapped {
                tree.map(child).unwrap();
            }
        }
    }
    tree
}

fn absolute_bounds(tree: &WindowTree, window: WindowId) -> Rect {
    let node = tree.get(window).unwrap();
    Rect::new(
        node.absolute_origin.x,
        node.absolute_origin.y,
        node.bounds.width,
        node.bounds.height,
    )
}

proptest! {
    #[test]
    fn test_desktop_native_round_trip(
        frames in prop::collection::vec(monitor_frame(), 1..4),
        x in -3000i32..3000,
        y in -3000i32..3000,
    ) {
        let mapper = CoordinateMapper::new(&frames);
        let p = Point::new(x, y);
        prop_assert_eq!(mapper.native_to_desktop(mapper.desktop_to_native(p)), p);
    }

    #[test]
    fn test_native_points_map_to_the_containing_pixel(
        frames in prop::collection::vec(monitor_frame(), 1..4),
        x in -12000i32..12000,
        y in -12000i32..12000,
    ) {
        // Quarter pixels are exact in f64
        let native = NativePoint::new(x as f64 / 4.0, y as f64 / 4.0);
        let mapper = CoordinateMapper::new(&frames);
        let back = mapper.desktop_to_native(mapper.native_to_desktop(native));

        prop_assert!(native.x - back.x >= 0.0 && native.x - back.x < 1.0);
        prop_assert!(back.y - native.y >= 0.0 && back.y - native.y < 1.0);
    }

    #[test]
    fn test_rect_round_trip(frames in prop::collection::vec(monitor_frame(), 1..4), rect in window_rect(1000)) {
        let mapper = CoordinateMapper::new(&frames);
        prop_assert_eq!(mapper.native_rect_to_desktop(mapper.desktop_rect_to_native(rect)), rect);
    }

    #[test]
    fn test_local_round_trip(layout in layout(), x in -50i32..650, y in -50i32..650) {
        let tree = build(&layout);
        let mapper = CoordinateMapper::new(&[NativeRect::new(0.0, 0.0, 600.0, 600.0)]);
        let p = Point::new(x, y);

        for window in tree.toplevels() {
            let local = mapper.screen_to_local(&tree, window, p).unwrap();
            prop_assert_eq!(mapper.local_to_screen(&tree, window, local), Some(p));
        }
    }

    #[test]
    fn test_hit_window_contains_the_point(layout in layout(), x in -10i32..610, y in -10i32..610) {
        let tree = build(&layout);
        let p = Point::new(x, y);

        match tree.find_window_at(tree.root(), p) {
            HitTarget::Window(window) => {
                prop_assert!(tree.is_viewable(window));
                prop_assert!(absolute_bounds(&tree, window).contains_point(p.x, p.y));

                // Deepest: no mapped child also contains the point
                let node = tree.get(window).unwrap();
                for child in node.children.top_down() {
                    let child_node = tree.get(child).unwrap();
                    if child_node.mapped {
                        prop_assert!(!absolute_bounds(&tree, child).contains_point(p.x, p.y));
                    }
                }
            }
            HitTarget::Decoration(_) => prop_assert!(false, "no window has a title bar"),
            HitTarget::Foreign => {
                prop_assert!(!Rect::new(0, 0, 600, 600).contains_point(p.x, p.y));
            }
        }
    }
}
