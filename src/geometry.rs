// ============================================================================
// GEOMETRY — integer points, float vectors and edge-based rectangles
// ============================================================================

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Integer 2D point / offset (screen or canvas pixels).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise floor division (rounds toward negative infinity, so a
    /// point one pixel left of the origin maps to -1 rather than 0).
    #[inline]
    pub fn div_floor(self, by: Point) -> Point {
        Point::new(self.x.div_euclid(by.x), self.y.div_euclid(by.y))
    }

    /// Snap down to the nearest multiple of `step` on both axes.
    #[inline]
    pub fn snapped_down(self, step: Point) -> Point {
        Point::new(self.x - self.x.rem_euclid(step.x), self.y - self.y.rem_euclid(step.y))
    }

    #[inline]
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<i32> for Point {
    type Output = Point;
    fn mul(self, rhs: i32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Float 2D vector (viewport offset and per-axis scale).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    /// Truncate both components toward zero.
    #[inline]
    pub fn to_point(self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

/// Rectangle stored as edges. `right` and `bottom` are exclusive, so
/// `width() == right - left`. Edges may be "inverted" (right < left) while a
/// drag gesture is in progress; `normalized()` fixes that up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Rect {
    #[inline]
    pub const fn from_edges(left: i32, right: i32, top: i32, bottom: i32) -> Self {
        Self { left, right, top, bottom }
    }

    #[inline]
    pub const fn from_pos_size(pos: Point, width: i32, height: i32) -> Self {
        Self::from_edges(pos.x, pos.x + width, pos.y, pos.y + height)
    }

    /// Rectangle spanning two corner points, in whichever order they were given.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::from_edges(a.x.min(b.x), a.x.max(b.x), a.y.min(b.y), a.y.max(b.y))
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    #[inline]
    pub fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }

    /// True when `self` lies completely inside `outer`.
    pub fn is_contained_by(&self, outer: &Rect) -> bool {
        self.left >= outer.left
            && self.right <= outer.right
            && self.top >= outer.top
            && self.bottom <= outer.bottom
    }

    pub fn moved_by(&self, d: Point) -> Rect {
        Rect::from_edges(self.left + d.x, self.right + d.x, self.top + d.y, self.bottom + d.y)
    }

    pub fn normalized(&self) -> Rect {
        Rect::from_corners(
            Point::new(self.left, self.top),
            Point::new(self.right, self.bottom),
        )
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        let r = Rect::from_edges(
            self.left.max(other.left),
            self.right.min(other.right),
            self.top.max(other.top),
            self.bottom.min(other.bottom),
        );
        if r.is_empty() { Rect::default() } else { r }
    }

    /// Grow the shorter side so width and height have equal magnitude. The
    /// top-left corner stays put and each side keeps its drag direction.
    pub fn squareized(&self) -> Rect {
        let w = self.width();
        let h = self.height();
        let side = w.abs().max(h.abs());
        let sx = if w < 0 { -1 } else { 1 };
        let sy = if h < 0 { -1 } else { 1 };
        Rect::from_edges(self.left, self.left + side * sx, self.top, self.top + side * sy)
    }

    /// Divide every edge by `by` (screen pixels → canvas pixels).
    pub fn divided_by(&self, by: Point) -> Rect {
        Rect::from_edges(
            self.left.div_euclid(by.x),
            self.right.div_euclid(by.x),
            self.top.div_euclid(by.y),
            self.bottom.div_euclid(by.y),
        )
    }

    /// Multiply every edge by `by` (canvas pixels → screen pixels).
    pub fn scaled_by(&self, by: Point) -> Rect {
        Rect::from_edges(self.left * by.x, self.right * by.x, self.top * by.y, self.bottom * by.y)
    }
}
