//! 2D geometry primitives
//!
//! Document-space points, sizes and rectangles. The y axis grows downward,
//! matching page layout coordinates.

use serde::{Deserialize, Serialize};

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Area, treating negative or non-finite extents as empty
    pub fn area(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.width * self.height
        }
    }

    /// True when either extent is zero, negative, or not a number
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0) || !self.width.is_finite() || !self.height.is_finite()
    }

    /// Convert to a Rect at the origin (0, 0)
    pub const fn to_rect(self) -> Rect {
        Rect {
            origin: Point::ZERO,
            size: self,
        }
    }
}

/// Axis-aligned rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    pub fn area(&self) -> f32 {
        self.size.area()
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Offset the rect by a delta
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Rect {
            origin: Point::new(self.origin.x + dx, self.origin.y + dy),
            size: self.size,
        }
    }

    /// Overlapping region of two rects, `None` when they do not overlap
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x().max(other.x());
        let top = self.y().max(other.y());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        let overlap = Rect::new(left, top, right - left, bottom - top);
        if overlap.is_empty() {
            None
        } else {
            Some(overlap)
        }
    }

    /// Fraction of this rect's area that lies inside `viewport`
    ///
    /// Empty rects report 0.0 so that elements which have not been laid out
    /// yet never count as visible.
    pub fn visible_fraction(&self, viewport: &Rect) -> f32 {
        let area = self.area();
        if area <= 0.0 {
            return 0.0;
        }
        match self.intersection(viewport) {
            Some(overlap) => (overlap.area() / area).clamp(0.0, 1.0),
            None => 0.0,
        }
    }
}
