//! The layout engine: snap one picture frame to its page grid.
//!
//! [`align_picture`] is a pure function of the picture's current frame, the
//! aspect ratio of its source image, the page size and a [`GridConfig`].
//! Pictures are aligned independently; nothing stops two aligned frames from
//! overlapping.
//!
//! # Example
//!
//! ```
//! use bookalign::{align_picture, Axis, GridConfig, Placement, Point, Size};
//!
//! let aligned = align_picture(
//!     Point::new(105.0, 100.0),
//!     Size::new(80.0, 60.0),
//!     Size::new(800.0, 600.0),
//!     Size::new(210.0, 297.0),
//!     &GridConfig::DEFAULT,
//! );
//!
//! assert_eq!(aligned.axis, Axis::Horizontal);
//! assert_eq!(aligned.placement, Placement::Center);
//! assert!((aligned.position.y - 148.5).abs() < 1e-9);
//! assert!((aligned.size.height - 40.0).abs() < 1e-9);
//! ```

use num_traits::Float;

use crate::geometry::{Point, Rect, Size};
use crate::grid::{GridConfig, GridSnap, PageGrid};

/// The axis whose two edges were snapped to grid lines.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Left and right edges snapped; height follows from the aspect ratio.
    Horizontal,
    /// Top and bottom edges snapped; width follows from the aspect ratio.
    Vertical,
}

/// How the frame was placed along the axis that was not snapped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Centered between the page bounds.
    Center,
    /// Flush with the top (or left) bound.
    Start,
    /// Flush with the bottom (or right) bound.
    End,
}

/// Edge snaps of the original frame, one per side.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeSnaps {
    pub left: GridSnap,
    pub right: GridSnap,
    pub top: GridSnap,
    pub bottom: GridSnap,
}

impl EdgeSnaps {
    /// Summed penalty of the left and right edges.
    pub fn horizontal_penalty(&self) -> f64 {
        self.left.penalty + self.right.penalty
    }

    /// Summed penalty of the top and bottom edges.
    pub fn vertical_penalty(&self) -> f64 {
        self.top.penalty + self.bottom.penalty
    }
}

/// Outcome of aligning one picture.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Alignment {
    /// Axis that drove the resize.
    pub axis: Axis,
    /// Placement along the other axis.
    pub placement: Placement,
    /// Snap results for all four original edges.
    pub snaps: EdgeSnaps,
    /// Page (or half-spread) bounds the frame was aligned within.
    pub bounds: Rect,
    /// Grid-aligned rectangle before the spacing is taken off.
    pub snapped: Rect,
    /// New center to store on the element.
    pub position: Point,
    /// New size to store on the element (`snapped` shrunk by the spacing).
    pub size: Size,
}

impl Alignment {
    /// The stored frame as edges.
    pub fn frame(&self) -> Rect {
        Rect::from_center(self.position, self.size)
    }
}

/// Align one picture frame to the grid of its page.
///
/// `position` and `size` are the element's current center and size,
/// `source` the pixel dimensions of the image inside it (only their ratio
/// matters) and `page` the page size. The result always preserves the
/// source aspect ratio on the snapped rectangle.
///
/// The computation trusts its inputs: a zero page or source dimension
/// yields non-finite output rather than an error.
pub fn align_picture(
    position: Point,
    size: Size,
    source: Size,
    page: Size,
    config: &GridConfig,
) -> Alignment {
    let grid = PageGrid::new(page, config);
    let frame = Rect::from_center(position, size);
    let aspect = source.aspect();
    let bounds = grid.bounds_for(position.x);
    let half_gap = 0.5 * config.spacing;

    let snaps = EdgeSnaps {
        left: grid.snap_x(frame.left - bounds.left, -half_gap),
        right: grid.snap_x(frame.right - bounds.left, half_gap),
        top: grid.snap_y(frame.top - bounds.top, -half_gap),
        bottom: grid.snap_y(frame.bottom - bounds.top, half_gap),
    };

    // Ties go to horizontal sizing.
    let axis = if snaps.horizontal_penalty() <= snaps.vertical_penalty() {
        Axis::Horizontal
    } else {
        Axis::Vertical
    };

    let (snapped, placement) = match axis {
        Axis::Horizontal => {
            let left = frame.left - snaps.left.delta;
            let right = frame.right - snaps.right.delta;
            let height = (right - left) / aspect;
            let span = CrossSpan {
                start: frame.top - bounds.top - half_gap,
                end: frame.bottom - bounds.bottom + half_gap,
                center: position.y - 0.5 * (bounds.top + bounds.bottom),
            };
            let placement = span.placement();
            let (top, bottom) = place(placement, bounds.top, bounds.bottom, height);
            (Rect::new(left, top, right, bottom), placement)
        }
        Axis::Vertical => {
            let top = frame.top - snaps.top.delta;
            let bottom = frame.bottom - snaps.bottom.delta;
            let width = aspect * (bottom - top);
            let span = CrossSpan {
                start: frame.left - bounds.left,
                end: frame.right - bounds.right,
                center: position.x - 0.5 * (bounds.left + bounds.right),
            };
            let placement = span.placement();
            let (left, right) = place(placement, bounds.left, bounds.right, width);
            (Rect::new(left, top, right, bottom), placement)
        }
    };

    tracing::debug!(
        ?axis,
        ?placement,
        horizontal_penalty = snaps.horizontal_penalty(),
        vertical_penalty = snaps.vertical_penalty(),
        "aligned picture frame"
    );

    Alignment {
        axis,
        placement,
        snaps,
        bounds,
        snapped,
        position: snapped.center(),
        size: snapped.size().shrink(config.spacing),
    }
}

/// Signed distances of the original frame from the bounds along the unsnapped axis.
///
/// Vertical edge distances are measured half a gap in from the bounds;
/// horizontal ones are measured from the bounds themselves.
struct CrossSpan {
    start: f64,
    end: f64,
    center: f64,
}

impl CrossSpan {
    fn placement(&self) -> Placement {
        let start = Float::abs(self.start);
        let end = Float::abs(self.end);
        if Float::abs(self.center) < Float::min(start, end) {
            Placement::Center
        } else if start < end {
            Placement::Start
        } else {
            Placement::End
        }
    }
}

/// Place a segment of `length` between `start` and `end` per `placement`.
fn place(placement: Placement, start: f64, end: f64, length: f64) -> (f64, f64) {
    match placement {
        Placement::Center => {
            let mid = 0.5 * (start + end);
            (mid - 0.5 * length, mid + 0.5 * length)
        }
        Placement::Start => (start, start + length),
        Placement::End => (end - length, end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;
    const A4: Size = Size::new(210.0, 297.0);
    const SPREAD: Size = Size::new(594.0, 297.0);

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    fn align(x: f64, y: f64, w: f64, h: f64, sw: f64, sh: f64, page: Size) -> Alignment {
        align_picture(
            Point::new(x, y),
            Size::new(w, h),
            Size::new(sw, sh),
            page,
            &GridConfig::DEFAULT,
        )
    }

    #[test]
    fn reference_scenario_horizontal_center() {
        let a = align(105.0, 100.0, 80.0, 60.0, 800.0, 600.0, A4);

        assert!(close(a.snaps.horizontal_penalty(), 70.0 / 3.0));
        assert!(close(a.snaps.vertical_penalty(), 12.0 + 1.0 / 6.0 + 13.5));
        assert_eq!(a.axis, Axis::Horizontal);
        assert_eq!(a.placement, Placement::Center);

        assert!(close(a.snapped.left, 5.0 + 2.0 * 200.0 / 6.0));
        assert!(close(a.snapped.right, 5.0 + 4.0 * 200.0 / 6.0));
        assert!(close(a.snapped.height(), 50.0));
        assert!(close(a.position.x, 105.0));
        assert!(close(a.position.y, 148.5));
        assert!(close(a.size.width, 200.0 / 3.0 - 10.0));
        assert!(close(a.size.height, 40.0));
    }

    #[test]
    fn vertical_sizing_when_rows_fit_better() {
        // Top and bottom already half a gap inside lines 1 and 3, sides far off.
        let gy = 287.0 / 6.0;
        let top = 5.0 + gy + 5.0;
        let bottom = 5.0 + 3.0 * gy - 5.0;
        let a = align(
            100.0,
            0.5 * (top + bottom),
            73.0,
            bottom - top,
            1000.0,
            1000.0,
            A4,
        );
        assert_eq!(a.axis, Axis::Vertical);
        assert!(close(a.snapped.top, 5.0 + gy));
        assert!(close(a.snapped.bottom, 5.0 + 3.0 * gy));
        assert!(close(a.snapped.width(), a.snapped.height()));
        assert!(close(a.frame().top, top));
        assert!(close(a.frame().bottom, bottom));
    }

    #[test]
    fn vertical_sizing_centers_horizontally() {
        let gy = 287.0 / 6.0;
        let a = align(
            107.0,
            5.0 + 2.0 * gy,
            73.0,
            2.0 * gy - 10.0,
            1000.0,
            1000.0,
            A4,
        );
        assert_eq!(a.axis, Axis::Vertical);
        assert_eq!(a.placement, Placement::Center);
        assert!(close(a.position.x, 105.0));
    }

    #[test]
    fn vertical_sizing_flush_left_and_right() {
        let gy = 287.0 / 6.0;
        let cy = 5.0 + 2.0 * gy;
        let h = 2.0 * gy - 10.0;

        let left = align(30.0, cy, 40.0, h, 1000.0, 1000.0, A4);
        assert_eq!(left.axis, Axis::Vertical);
        assert_eq!(left.placement, Placement::Start);
        assert!(close(left.snapped.left, 5.0));

        let right = align(180.0, cy, 40.0, h, 1000.0, 1000.0, A4);
        assert_eq!(right.axis, Axis::Vertical);
        assert_eq!(right.placement, Placement::End);
        assert!(close(right.snapped.right, 205.0));
    }

    #[test]
    fn horizontal_sizing_flush_top_and_bottom() {
        let gx = 200.0 / 6.0;
        let left = 5.0 + gx + 5.0;
        let right = 5.0 + 3.0 * gx - 5.0;
        let cx = 0.5 * (left + right);
        let w = right - left;

        let top = align(cx, 40.0, w, 50.0, 400.0, 300.0, A4);
        assert_eq!(top.axis, Axis::Horizontal);
        assert_eq!(top.placement, Placement::Start);
        assert!(close(top.snapped.top, 5.0));
        assert!(close(top.frame().top, 10.0));

        let bottom = align(cx, 260.0, w, 50.0, 400.0, 300.0, A4);
        assert_eq!(bottom.axis, Axis::Horizontal);
        assert_eq!(bottom.placement, Placement::End);
        assert!(close(bottom.snapped.bottom, 292.0));
        assert!(close(bottom.frame().bottom, 287.0));
    }

    #[test]
    fn tie_prefers_horizontal() {
        // Square frame on a square page: identical penalties on both axes.
        let page = Size::new(130.0, 130.0);
        let a = align(47.0, 47.0, 50.0, 50.0, 1.0, 1.0, page);
        assert!(close(
            a.snaps.horizontal_penalty(),
            a.snaps.vertical_penalty()
        ));
        assert_eq!(a.axis, Axis::Horizontal);
    }

    #[test]
    fn aspect_preserved_on_snapped_rect() {
        let a = align(120.0, 180.0, 70.0, 90.0, 3000.0, 2000.0, A4);
        assert!(close(a.snapped.width() / a.snapped.height(), 1.5));
        assert!(close(a.size.width, a.snapped.width() - 10.0));
        assert!(close(a.size.height, a.snapped.height() - 10.0));
    }

    #[test]
    fn spread_right_half_uses_right_bounds() {
        let a = align(450.0, 150.0, 100.0, 80.0, 1200.0, 900.0, SPREAD);
        assert_eq!(a.bounds, Rect::new(302.0, 5.0, 589.0, 292.0));
        assert!(a.position.x > 297.0);
    }

    #[test]
    fn spread_left_half_uses_left_bounds() {
        let a = align(150.0, 150.0, 100.0, 80.0, 1200.0, 900.0, SPREAD);
        assert_eq!(a.bounds, Rect::new(5.0, 5.0, 292.0, 292.0));
        assert!(a.position.x < 297.0);
    }

    #[test]
    fn aligned_frame_is_fixed_point() {
        let first = align(105.0, 100.0, 80.0, 60.0, 800.0, 600.0, A4);
        let second = align_picture(
            first.position,
            first.size,
            Size::new(800.0, 600.0),
            A4,
            &GridConfig::DEFAULT,
        );
        assert_eq!(second.axis, first.axis);
        assert!(close(second.position.x, first.position.x));
        assert!(close(second.position.y, first.position.y));
        assert!(close(second.size.width, first.size.width));
        assert!(close(second.size.height, first.size.height));
        assert!(close(second.snaps.horizontal_penalty(), 0.0));
    }

    #[test]
    fn zero_source_width_is_not_finite() {
        // Horizontal sizing divides by a zero aspect.
        let a = align(105.0, 100.0, 80.0, 60.0, 0.0, 600.0, A4);
        assert_eq!(a.axis, Axis::Horizontal);
        assert!(!a.size.height.is_finite());
    }

    #[test]
    fn place_segment() {
        assert_eq!(place(Placement::Start, 5.0, 105.0, 20.0), (5.0, 25.0));
        assert_eq!(place(Placement::End, 5.0, 105.0, 20.0), (85.0, 105.0));
        assert_eq!(place(Placement::Center, 5.0, 105.0, 20.0), (45.0, 65.0));
    }
}
