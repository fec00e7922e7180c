//! Axis-aligned rectangles in screen space (x right, y down, top-left origin).

use glam::Vec2;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Bounding rectangle of a point set. Returns `None` for an empty set.
    pub fn bounding(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Zero or negative extent on either axis. Empty rects never collide.
    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Strict overlap test: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    pub fn translated(&self, delta: Vec2) -> Rect {
        Rect::new(self.x + delta.x, self.y + delta.y, self.w, self.h)
    }

    /// Grow (or shrink, for negative values) around the center.
    pub fn inflated(&self, dw: f32, dh: f32) -> Rect {
        Rect::new(
            self.x - dw * 0.5,
            self.y - dh * 0.5,
            self.w + dw,
            self.h + dh,
        )
    }

    pub fn scaled(&self, scale: f32) -> Rect {
        Rect::new(
            self.x * scale,
            self.y * scale,
            self.w * scale,
            self.h * scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_strict_on_shared_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 10.0, 10.0);
        let inside = Rect::new(9.0, 9.0, 5.0, 5.0);
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&inside));
        assert!(inside.overlaps(&a));
    }

    #[test]
    fn empty_rects_never_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(!a.overlaps(&Rect::new(10.0, 10.0, 0.0, 50.0)));
        assert!(!a.overlaps(&Rect::new(10.0, 10.0, 50.0, 0.0)));
        assert!(!Rect::new(10.0, 10.0, -5.0, 5.0).overlaps(&a));
    }

    #[test]
    fn inflate_keeps_center() {
        let r = Rect::new(10.0, 20.0, 48.0, 128.0);
        let grown = r.inflated(0.0, 120.0);
        assert_eq!(grown.center(), r.center());
        assert_eq!(grown.h, 248.0);
        assert_eq!(grown.w, 48.0);
    }

    #[test]
    fn bounding_box_of_polygon() {
        let pts = [
            Vec2::new(4.0, -2.0),
            Vec2::new(-1.0, 3.0),
            Vec2::new(2.0, 8.0),
        ];
        let r = Rect::bounding(pts).expect("non-empty");
        assert_eq!(r, Rect::new(-1.0, -2.0, 5.0, 10.0));
        assert!(Rect::bounding(Vec::<Vec2>::new()).is_none());
    }

    #[test]
    fn contains_point_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains_point(Vec2::new(0.0, 0.0)));
        assert!(!r.contains_point(Vec2::new(10.0, 5.0)));
    }
}
