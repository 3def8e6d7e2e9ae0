// Geometry primitives in a bottom-left origin coordinate space: `y` grows upward
// and a rect's `y` is its bottom edge. Platform backends convert at the boundary.

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// True when both coordinates are within `eps` of `other`.
    #[inline]
    pub fn approx_eq(self, other: Self, eps: f64) -> bool {
        approx_eq(self.x, other.x, eps) && approx_eq(self.y, other.y, eps)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[inline]
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    #[inline]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y
    }
    #[inline]
    pub fn top(&self) -> f64 {
        self.y + self.h
    }
    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// True when `inner` lies entirely inside `self`, allowing `eps` of slack.
    pub fn contains_rect(&self, inner: &Self, eps: f64) -> bool {
        inner.left() >= self.left() - eps
            && inner.right() <= self.right() + eps
            && inner.bottom() >= self.bottom() - eps
            && inner.top() <= self.top() + eps
    }
}

impl From<(Point, Size)> for Rect {
    fn from(v: (Point, Size)) -> Self {
        let (p, s) = v;
        Self {
            x: p.x,
            y: p.y,
            w: s.width,
            h: s.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_works() {
        assert!(approx_eq(1.0, 1.0, 0.0));
        assert!(approx_eq(1.0, 1.000_5, 0.001));
        assert!(!approx_eq(1.0, 1.01, 0.001));
    }

    #[test]
    fn rect_edges_use_bottom_left_origin() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 20.0);
        assert_eq!(r.top(), 60.0);
    }

    #[test]
    fn contains_rect_respects_slack() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(outer.contains_rect(&Rect::new(0.0, 0.0, 100.0, 100.0), 0.0));
        assert!(!outer.contains_rect(&Rect::new(0.5, 0.0, 100.0, 100.0), 0.0));
        assert!(outer.contains_rect(&Rect::new(0.5, 0.0, 100.0, 100.0), 0.5));
    }
}
