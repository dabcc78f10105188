/// Axis-aligned rectangle in pixel coordinates produced by a detector.
///
/// Boxes are transient: created per frame, translated into frame
/// coordinates, drawn, and dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DetectionBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DetectionBox {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Moves a box from a sub-region's local coordinates into the parent's.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Intersection with a `width` x `height` image, or `None` if the box
    /// lies entirely outside it.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = self.right().min(width as i32);
        let y2 = self.bottom().min(height as i32);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Self::new(x1, y1, x2 - x1, y2 - y1))
    }

    /// Whether two boxes describe the same object, allowing every edge to
    /// move by `eps` times the mean of the smaller dimensions.
    pub fn is_similar(&self, other: &DetectionBox, eps: f64) -> bool {
        let delta = eps
            * (self.width.min(other.width) as f64 + self.height.min(other.height) as f64)
            * 0.5;
        (self.x - other.x).abs() as f64 <= delta
            && (self.y - other.y).abs() as f64 <= delta
            && (self.right() - other.right()).abs() as f64 <= delta
            && (self.bottom() - other.bottom()).abs() as f64 <= delta
    }

    /// Whether `self` lies inside `outer` grown by `eps` of its size.
    pub fn is_inside(&self, outer: &DetectionBox, eps: f64) -> bool {
        let dx = (outer.width as f64 * eps).round() as i32;
        let dy = (outer.height as f64 * eps).round() as i32;
        self.x >= outer.x - dx
            && self.y >= outer.y - dy
            && self.right() <= outer.right() + dx
            && self.bottom() <= outer.bottom() + dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_edges_and_area() {
        let b = DetectionBox::new(10, 20, 30, 40);
        assert_eq!(b.right(), 40);
        assert_eq!(b.bottom(), 60);
        assert_eq!(b.area(), 1200);
        assert!(!b.is_empty());
    }

    #[test]
    fn test_translate_keeps_size() {
        let eye = DetectionBox::new(5, 7, 12, 8);
        let global = eye.translate(100, 50);
        assert_eq!(global, DetectionBox::new(105, 57, 12, 8));
    }

    #[test]
    fn test_clamp_inside_is_identity() {
        let b = DetectionBox::new(10, 10, 20, 20);
        assert_eq!(b.clamp_to(100, 100), Some(b));
    }

    #[test]
    fn test_clamp_partial_overlap() {
        let b = DetectionBox::new(-5, 90, 20, 20);
        assert_eq!(b.clamp_to(100, 100), Some(DetectionBox::new(0, 90, 15, 10)));
    }

    #[test]
    fn test_clamp_outside_is_none() {
        let b = DetectionBox::new(200, 200, 10, 10);
        assert_eq!(b.clamp_to(100, 100), None);
    }

    #[rstest]
    #[case::identical(DetectionBox::new(10, 10, 50, 50), true)]
    #[case::small_shift(DetectionBox::new(14, 12, 50, 50), true)]
    #[case::large_shift(DetectionBox::new(30, 10, 50, 50), false)]
    #[case::different_size(DetectionBox::new(10, 10, 80, 80), false)]
    fn test_is_similar(#[case] other: DetectionBox, #[case] expected: bool) {
        let b = DetectionBox::new(10, 10, 50, 50);
        assert_eq!(b.is_similar(&other, 0.2), expected);
    }

    #[test]
    fn test_is_inside_with_margin() {
        let outer = DetectionBox::new(0, 0, 100, 100);
        assert!(DetectionBox::new(10, 10, 20, 20).is_inside(&outer, 0.2));
        assert!(DetectionBox::new(-15, 0, 20, 20).is_inside(&outer, 0.2));
        assert!(!DetectionBox::new(-30, 0, 20, 20).is_inside(&outer, 0.2));
    }
}
