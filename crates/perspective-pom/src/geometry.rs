//! Viewport geometry for resolved elements.

use serde::{Deserialize, Serialize};

/// A point in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rendered rectangle of an element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// X position of the left edge
    pub x: f64,
    /// Y position of the top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Bottom-right corner
    #[must_use]
    pub fn termination(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    /// Get the center point
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if a point is inside this rectangle, edges included
    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        let end = self.termination();
        point.x >= self.x && point.x <= end.x && point.y >= self.y && point.y <= end.y
    }

    /// Strict overlap: rectangles that only share an edge do not collide.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let (a_end, b_end) = (self.termination(), other.termination());
        self.x < b_end.x && other.x < a_end.x && self.y < b_end.y && other.y < a_end.y
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod rect_tests {
        use super::*;

        #[test]
        fn test_origin_and_termination() {
            let r = Rect::new(5.0, 10.0, 20.0, 30.0);
            assert_eq!(r.origin(), Point::new(5.0, 10.0));
            assert_eq!(r.termination(), Point::new(25.0, 40.0));
        }

        #[test]
        fn test_center() {
            let r = Rect::new(0.0, 0.0, 100.0, 50.0);
            assert_eq!(r.center(), Point::new(50.0, 25.0));
        }

        #[test]
        fn test_contains_edges() {
            let r = Rect::new(0.0, 0.0, 10.0, 10.0);
            assert!(r.contains(&Point::new(0.0, 0.0)));
            assert!(r.contains(&Point::new(10.0, 10.0)));
            assert!(!r.contains(&Point::new(10.5, 5.0)));
        }

        #[test]
        fn test_shared_edge_is_not_overlap() {
            let a = Rect::new(0.0, 0.0, 10.0, 10.0);
            let b = Rect::new(10.0, 0.0, 10.0, 10.0);
            assert!(!a.overlaps(&b));
            assert!(!b.overlaps(&a));
        }

        #[test]
        fn test_shared_corner_is_not_overlap() {
            let a = Rect::new(0.0, 0.0, 10.0, 10.0);
            let b = Rect::new(10.0, 10.0, 5.0, 5.0);
            assert!(!a.overlaps(&b));
        }

        #[test]
        fn test_overlap_and_containment() {
            let a = Rect::new(0.0, 0.0, 10.0, 10.0);
            assert!(a.overlaps(&Rect::new(9.0, 9.0, 10.0, 10.0)));
            assert!(a.overlaps(&Rect::new(2.0, 2.0, 2.0, 2.0)));
            assert!(!a.overlaps(&Rect::new(0.0, 20.0, 10.0, 10.0)));
        }

        #[test]
        fn test_serde_shape() {
            let r: Rect =
                serde_json::from_str(r#"{"x":1.0,"y":2.0,"width":3.0,"height":4.0}"#).unwrap();
            assert_eq!(r, Rect::new(1.0, 2.0, 3.0, 4.0));
        }
    }
}
