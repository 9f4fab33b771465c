//! Property-based tests for region set operations
//!
//! Regions are compared both structurally (the banded representation is
//! canonical) and pixel by pixel on a small grid.

use casement::region::{Rect, Region};
use proptest::prelude::*;

const GRID: i32 = 48;

prop_compose! {
    fn small_rect()(x in -4i32..36, y in -4i32..36, width in 0i32..16, height in 0i32..16) -> Rect {
        Rect::new(x, y, width, height)
    }
}

prop_compose! {
    fn small_region()(rects in prop::collection::vec(small_rect(), 0..6)) -> Region {
        Region::from_rects(rects)
    }
}

fn pixels(region: &Region) -> Vec<bool> {
    (-8..GRID)
        .flat_map(|y| (-8..GRID).map(move |x| (x, y)))
        .map(|(x, y)| region.contains_point(x, y))
        .collect()
}

fn union(a: &Region, b: &Region) -> Region {
    let mut out = a.clone();
    out.union(b);
    out
}

fn intersection(a: &Region, b: &Region) -> Region {
    let mut out = a.clone();
    out.intersect(b);
    out
}

fn difference(a: &Region, b: &Region) -> Region {
    let mut out = a.clone();
    out.subtract(b);
    out
}

proptest! {
    #[test]
    fn test_union_is_commutative(a in small_region(), b in small_region()) {
        prop_assert_eq!(union(&a, &b), union(&b, &a));
    }

    #[test]
    fn test_union_matches_pixel_or(a in small_region(), b in small_region()) {
        let expected: Vec<bool> = pixels(&a)
            .into_iter()
            .zip(pixels(&b))
            .map(|(p, q)| p || q)
            .collect();
        prop_assert_eq!(pixels(&union(&a, &b)), expected);
    }

    #[test]
    fn test_subtract_is_idempotent(a in small_region(), b in small_region()) {
        let once = difference(&a, &b);
        prop_assert_eq!(difference(&once, &b), once.clone());
        prop_assert!(intersection(&once, &b).is_empty());
    }

    #[test]
    fn test_area_inclusion_exclusion(a in small_region(), b in small_region()) {
        prop_assert_eq!(
            union(&a, &b).area(),
            a.area() + b.area() - intersection(&a, &b).area()
        );
    }

    #[test]
    fn test_xor_is_union_minus_intersection(a in small_region(), b in small_region()) {
        let mut xor = a.clone();
        xor.xor(&b);
        prop_assert_eq!(xor, difference(&union(&a, &b), &intersection(&a, &b)));
    }

    #[test]
    fn test_rectangles_are_disjoint_and_inside_extents(region in small_region()) {
        let rects = region.rectangles();
        let extents = region.extents();
        for (i, r) in rects.iter().enumerate() {
            prop_assert!(!r.is_empty());
            prop_assert!(extents.contains_rect(r));
            for other in &rects[i + 1..] {
                prop_assert!(!r.intersects(other));
            }
        }
    }

    #[test]
    fn test_offset_moves_every_pixel(region in small_region(), dx in -5i32..5, dy in -5i32..5) {
        let moved = region.translated(dx, dy);
        prop_assert_eq!(moved.area(), region.area());
        for r in region.rectangles() {
            prop_assert!(moved.contains_point(r.x + dx, r.y + dy));
        }
        prop_assert_eq!(moved.translated(-dx, -dy), region);
    }
}
