//! Axis-aligned rectangles in logical pixels

/// Axis-aligned rectangle, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// True for zero, negative or NaN extents
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Grow by `margin` on every side
    pub fn expand(&self, margin: f32) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + 2.0 * margin,
            height: self.height + 2.0 * margin,
        }
    }

    /// Overlap of two rectangles. Edge contact yields a zero-area rectangle.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Fraction of `self` covered by `root`, `None` when they do not touch.
    ///
    /// A zero-area target that touches `root` counts as fully covered.
    pub fn intersection_ratio(&self, root: &Rect) -> Option<f32> {
        let overlap = self.intersection(root)?;
        let area = self.area();
        if area <= 0.0 {
            return Some(1.0);
        }
        Some(overlap.area() / area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
        assert_eq!(a.intersection(&Rect::new(20.0, 0.0, 1.0, 1.0)), None);
    }

    #[test]
    fn test_edge_contact() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert_eq!(below.intersection_ratio(&a), Some(0.0));
    }

    #[test]
    fn test_ratio() {
        let root = Rect::new(0.0, 0.0, 100.0, 100.0);
        let half_in = Rect::new(0.0, 90.0, 10.0, 20.0);
        assert_eq!(half_in.intersection_ratio(&root), Some(0.5));
    }

    #[test]
    fn test_expand_and_degenerate() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).expand(5.0);
        assert_eq!(r, Rect::new(-5.0, -5.0, 20.0, 20.0));
        assert!(Rect::new(0.0, 0.0, 0.0, 10.0).is_degenerate());
        assert!(Rect::new(0.0, 0.0, f32::NAN, 10.0).is_degenerate());
        assert!(!r.is_degenerate());
    }
}
