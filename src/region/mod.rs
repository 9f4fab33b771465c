//! Integer regions for damage tracking and clipping
//!
//! A [`Region`] is a set of pixels described by non-overlapping axis-aligned
//! rectangles. Regions are always kept in y-x banded canonical form:
//!
//! 1. Rectangles are grouped into horizontal bands sorted top to bottom
//! 2. Every rectangle in a band shares the band's `y` and `height`
//! 3. Inside a band rectangles are sorted by `x` and never touch
//! 4. Vertically adjacent bands with identical x-spans are merged
//!
//! Because the form is unique for a given pixel set, two regions compare equal
//! exactly when they cover the same pixels, independent of how they were built.
//!
//! # Example
//!
//! ```
//! use casement::region::{Overlap, Rect, Region};
//!
//! let mut damage = Region::from_rect(Rect::new(0, 0, 100, 100));
//! damage.subtract(&Region::from_rect(Rect::new(0, 0, 100, 50)));
//!
//! assert_eq!(damage.rectangles(), &[Rect::new(0, 50, 100, 50)]);
//! assert_eq!(damage.contains_rect(Rect::new(10, 60, 5, 5)), Overlap::In);
//! ```

use std::ops::{Add, Sub};

/// A point in toolkit coordinates (origin top-left, Y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// An axis-aligned rectangle in integer pixel coordinates
///
/// A rectangle with a non-positive width or height is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// X coordinate (pixels)
    pub x: i32,
    /// Y coordinate (pixels)
    pub y: i32,
    /// Width (pixels)
    pub width: i32,
    /// Height (pixels)
    pub height: i32,
}

impl Rect {
    /// Creates a new rectangle
    ///
    /// # Example
    ///
    /// ```
    /// use casement::region::Rect;
    ///
    /// let rect = Rect::new(100, 100, 200, 150);
    /// assert_eq!(rect.area(), 30000);
    /// ```
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from two corners
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let x = x1.min(x2);
        let y = y1.min(y2);

        Self {
            x,
            y,
            width: x1.max(x2) - x,
            height: y1.max(y2) - y,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Exclusive right edge
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns the area of this rectangle in pixels, 0 when empty
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    /// Checks if this rectangle contains a point
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Checks if this rectangle completely contains another one
    pub fn contains_rect(&self, other: &Rect) -> bool {
        !other.is_empty()
            && other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Checks if two rectangles share any pixels
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.is_empty()
            || other.is_empty()
            || self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }

    /// Computes the intersection of two rectangles
    ///
    /// Returns `None` if the rectangles don't intersect.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }

        Some(Rect::from_corners(
            self.x.max(other.x),
            self.y.max(other.y),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        ))
    }

    /// Smallest rectangle containing both (empty inputs are ignored)
    pub fn bounding_union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }

        Rect::from_corners(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Returns this rectangle moved by `(dx, dy)`
    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// Result of testing a rectangle against a region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// Every pixel of the rectangle is in the region
    In,
    /// No pixel of the rectangle is in the region
    Out,
    /// Some pixels are in the region, some are not
    Partial,
}

/// A set of pixels stored as canonical y-x banded rectangles
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Region {
    rects: Vec<Rect>,
}

/// Half-open horizontal span `[start, end)` inside one band
type Span = (i32, i32);

#[derive(Debug, Clone, Copy)]
enum SetOp {
    Union,
    Intersect,
    Subtract,
    Xor,
}

impl SetOp {
    fn keep(self, in_a: bool, in_b: bool) -> bool {
        match self {
            SetOp::Union => in_a || in_b,
            SetOp::Intersect => in_a && in_b,
            SetOp::Subtract => in_a && !in_b,
            SetOp::Xor => in_a != in_b,
        }
    }
}

impl Region {
    /// Creates an empty region
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a region covering a single rectangle
    pub fn from_rect(rect: Rect) -> Self {
        if rect.is_empty() {
            Self::new()
        } else {
            Self { rects: vec![rect] }
        }
    }

    /// Creates a region covering the union of arbitrary, possibly overlapping rectangles
    pub fn from_rects<I>(rects: I) -> Self
    where
        I: IntoIterator<Item = Rect>,
    {
        let input: Vec<Rect> = rects.into_iter().filter(|r| !r.is_empty()).collect();
        Self {
            rects: combine(&input, &[], SetOp::Union),
        }
    }

    /// The canonical rectangles, bands top to bottom, left to right inside a band
    pub fn rectangles(&self) -> &[Rect] {
        &self.rects
    }

    pub fn into_rectangles(self) -> Vec<Rect> {
        self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Number of pixels covered
    pub fn area(&self) -> i64 {
        self.rects.iter().map(Rect::area).sum()
    }

    /// Bounding box of the region, an empty rectangle for the empty region
    pub fn extents(&self) -> Rect {
        self.rects
            .iter()
            .fold(Rect::default(), |acc, r| acc.bounding_union(r))
    }

    /// Adds every pixel of `other` to this region
    pub fn union(&mut self, other: &Region) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            self.rects = other.rects.clone();
            return;
        }
        self.rects = combine(&self.rects, &other.rects, SetOp::Union);
    }

    pub fn union_rect(&mut self, rect: Rect) {
        self.union(&Region::from_rect(rect));
    }

    /// Keeps only the pixels also covered by `other`
    pub fn intersect(&mut self, other: &Region) {
        if self.is_empty() || other.is_empty() {
            self.rects.clear();
            return;
        }
        self.rects = combine(&self.rects, &other.rects, SetOp::Intersect);
    }

    pub fn intersect_rect(&mut self, rect: Rect) {
        self.intersect(&Region::from_rect(rect));
    }

    /// Removes every pixel of `other` from this region
    ///
    /// Subtracting a disjoint region leaves this one unchanged.
    pub fn subtract(&mut self, other: &Region) {
        if self.is_empty() || other.is_empty() {
            return;
        }
        self.rects = combine(&self.rects, &other.rects, SetOp::Subtract);
    }

    /// Keeps the pixels covered by exactly one of the two regions
    pub fn xor(&mut self, other: &Region) {
        self.rects = combine(&self.rects, &other.rects, SetOp::Xor);
    }

    /// Moves the region by `(dx, dy)`
    pub fn offset(&mut self, dx: i32, dy: i32) {
        for rect in &mut self.rects {
            *rect = rect.translated(dx, dy);
        }
    }

    /// Returns a copy moved by `(dx, dy)`
    pub fn translated(&self, dx: i32, dy: i32) -> Region {
        let mut moved = self.clone();
        moved.offset(dx, dy);
        moved
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.rects
            .iter()
            .take_while(|r| r.y <= y)
            .any(|r| r.contains_point(x, y))
    }

    /// Classifies how much of `rect` lies inside this region
    pub fn contains_rect(&self, rect: Rect) -> Overlap {
        if rect.is_empty() || !self.extents().intersects(&rect) {
            return Overlap::Out;
        }

        let mut inside = self.clone();
        inside.intersect_rect(rect);

        if inside.is_empty() {
            Overlap::Out
        } else if inside.area() == rect.area() {
            Overlap::In
        } else {
            Overlap::Partial
        }
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Region::from_rect(rect)
    }
}

/// Sorted, merged x-spans of every rectangle covering the band `[y0, y1)`
///
/// Band edges always come from rectangle edges, so a rectangle either spans
/// the whole band or misses it entirely.
fn band_spans(rects: &[Rect], y0: i32, y1: i32, spans: &mut Vec<Span>) {
    spans.clear();
    spans.extend(
        rects
            .iter()
            .filter(|r| r.y <= y0 && r.bottom() >= y1)
            .map(|r| (r.x, r.right())),
    );
    spans.sort_unstable();

    let mut merged = 0;
    for i in 0..spans.len() {
        if merged > 0 && spans[i].0 <= spans[merged - 1].1 {
            spans[merged - 1].1 = spans[merged - 1].1.max(spans[i].1);
        } else {
            spans[merged] = spans[i];
            merged += 1;
        }
    }
    spans.truncate(merged);
}

fn combine_spans(a: &[Span], b: &[Span], op: SetOp, out: &mut Vec<Span>) {
    out.clear();

    let mut edges: Vec<i32> = a.iter().chain(b).flat_map(|&(s, e)| [s, e]).collect();
    edges.sort_unstable();
    edges.dedup();

    let (mut ia, mut ib) = (0, 0);
    for pair in edges.windows(2) {
        let (x0, x1) = (pair[0], pair[1]);
        while ia < a.len() && a[ia].1 <= x0 {
            ia += 1;
        }
        while ib < b.len() && b[ib].1 <= x0 {
            ib += 1;
        }
        let in_a = ia < a.len() && a[ia].0 <= x0;
        let in_b = ib < b.len() && b[ib].0 <= x0;

        if op.keep(in_a, in_b) {
            match out.last_mut() {
                Some(last) if last.1 == x0 => last.1 = x1,
                _ => out.push((x0, x1)),
            }
        }
    }
}

/// Sweeps both rectangle sets band by band and emits the canonical result
fn combine(a: &[Rect], b: &[Rect], op: SetOp) -> Vec<Rect> {
    let mut ys: Vec<i32> = a
        .iter()
        .chain(b)
        .filter(|r| !r.is_empty())
        .flat_map(|r| [r.y, r.bottom()])
        .collect();
    ys.sort_unstable();
    ys.dedup();

    let mut out: Vec<Rect> = Vec::new();
    let mut spans_a = Vec::new();
    let mut spans_b = Vec::new();
    let mut spans = Vec::new();

    // Previous emitted band: index of its first rect, its spans and its bottom edge
    let mut last_band_start = 0;
    let mut last_spans: Vec<Span> = Vec::new();
    let mut last_bottom: Option<i32> = None;

    for pair in ys.windows(2) {
        let (y0, y1) = (pair[0], pair[1]);
        band_spans(a, y0, y1, &mut spans_a);
        band_spans(b, y0, y1, &mut spans_b);
        combine_spans(&spans_a, &spans_b, op, &mut spans);

        if spans.is_empty() {
            continue;
        }

        if last_bottom == Some(y0) && spans == last_spans {
            for rect in &mut out[last_band_start..] {
                rect.height += y1 - y0;
            }
        } else {
            last_band_start = out.len();
            out.extend(spans.iter().map(|&(x0, x1)| Rect::new(x0, y0, x1 - x0, y1 - y0)));
            std::mem::swap(&mut last_spans, &mut spans);
        }
        last_bottom = Some(y1);
    }

    out
}
