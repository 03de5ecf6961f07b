//! Millimetre geometry shared by the grid, the engine and the document model.
//!
//! Photo-book coordinates have their origin at the top-left corner of the
//! page with `y` growing downwards. Elements are stored by their center, so
//! [`Rect`] converts between center/size and edge form.

/// A point on the page, in millimetres.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width × height, in millimetres (or pixels for source image dimensions).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Both dimensions shrunk by `amount`.
    pub fn shrink(self, amount: f64) -> Self {
        Self {
            width: self.width - amount,
            height: self.height - amount,
        }
    }
}

/// Axis-aligned rectangle stored as its four edges.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    /// Create a rect from its edges.
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rect of the given size centered on `center`.
    pub fn from_center(center: Point, size: Size) -> Self {
        Self {
            left: center.x - 0.5 * size.width,
            top: center.y - 0.5 * size.height,
            right: center.x + 0.5 * size.width,
            bottom: center.y + 0.5 * size.height,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Midpoint of the rect.
    pub fn center(&self) -> Point {
        Point::new(
            0.5 * (self.left + self.right),
            0.5 * (self.top + self.bottom),
        )
    }

    /// Whether `other` lies inside this rect, allowing `tolerance` of overshoot.
    pub fn contains_rect(&self, other: &Rect, tolerance: f64) -> bool {
        other.left >= self.left - tolerance
            && other.top >= self.top - tolerance
            && other.right <= self.right + tolerance
            && other.bottom <= self.bottom + tolerance
    }
}
