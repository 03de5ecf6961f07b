//! Page grid derivation and grid-line snapping.
//!
//! Every page carries an implicit `grid_n × grid_n` grid inset by the page
//! margin. A double-page spread gets one grid per half. Picture edges are
//! snapped to the lines of that grid by [`nearest_grid_line`].
//!
//! # Example
//!
//! ```
//! use bookalign::{GridConfig, PageGrid, Size};
//!
//! let grid = PageGrid::new(Size::new(210.0, 297.0), &GridConfig::DEFAULT);
//! assert!(!grid.is_double_page());
//! assert!((grid.spacing_x() - 200.0 / 6.0).abs() < 1e-12);
//! ```

use core::fmt;

use num_traits::Float;

use crate::geometry::{Rect, Size};

/// Width/height ratio of a double-page spread.
const SPREAD_ASPECT: f64 = 2.0;
/// How far a page's ratio may stray from [`SPREAD_ASPECT`] and still count as a spread.
const SPREAD_TOLERANCE: f64 = 0.2;

/// Parameters of the alignment grid.
///
/// All lengths are millimetres. The defaults are what the book layouts are
/// tuned for; changing any of them changes every result deterministically.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridConfig {
    /// Gap left between neighbouring pictures. Half of it is kept on each side.
    pub spacing: f64,
    /// Inset of the grid from the page border, on top of the picture spacing.
    pub page_margin: f64,
    /// Number of grid cells along each axis of a single page.
    pub grid_n: u32,
    /// Penalty reduction when an edge snaps to the first or last grid line.
    pub outer_pref: f64,
}

impl GridConfig {
    pub const DEFAULT: Self = Self {
        spacing: 10.0,
        page_margin: 5.0,
        grid_n: 6,
        outer_pref: 5.0,
    };

    /// Set the inter-picture spacing.
    pub fn spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the page margin.
    pub fn page_margin(mut self, page_margin: f64) -> Self {
        self.page_margin = page_margin;
        self
    }

    /// Set the number of grid cells per axis.
    pub fn grid_lines(mut self, grid_n: u32) -> Self {
        self.grid_n = grid_n;
        self
    }

    /// Set the outer-edge preference.
    pub fn outer_preference(mut self, outer_pref: f64) -> Self {
        self.outer_pref = outer_pref;
        self
    }

    /// Check the invariants the engine relies on.
    ///
    /// The engine itself never fails; a configuration that does not pass
    /// this check produces NaN or infinite geometry instead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_n == 0 {
            return Err(ConfigError::ZeroGridLines);
        }
        let lengths = [self.spacing, self.page_margin, self.outer_pref];
        if lengths.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::NonFinite);
        }
        if self.spacing < 0.0 {
            return Err(ConfigError::NegativeSpacing);
        }
        if self.page_margin < 0.0 {
            return Err(ConfigError::NegativeMargin);
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Invalid grid configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `grid_n` is zero.
    ZeroGridLines,
    /// `spacing` is negative.
    NegativeSpacing,
    /// `page_margin` is negative.
    NegativeMargin,
    /// A length is NaN or infinite.
    NonFinite,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroGridLines => f.write_str("grid must have at least one cell per axis"),
            Self::NegativeSpacing => f.write_str("picture spacing must not be negative"),
            Self::NegativeMargin => f.write_str("page margin must not be negative"),
            Self::NonFinite => f.write_str("grid lengths must be finite"),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Result of snapping one edge to its nearest grid line.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridSnap {
    /// Index of the chosen line, `0..=grid_n` for edges inside the grid.
    pub line: i64,
    /// Signed distance of the edge from that line. Subtract it to snap.
    pub delta: f64,
    /// Snapping cost; lower is better. May go negative on outer lines.
    pub penalty: f64,
}

/// Find the grid line nearest to `pos` and the cost of snapping to it.
///
/// `pos` is measured from the first grid line. `margin` is the signed half
/// spacing: negative for start edges (left, top), positive for end edges
/// (right, bottom), so that the edges on either side of a gap move apart.
/// Lines `0` and `line_count` get their penalty reduced by `outer_bonus`.
///
/// The line index is `(pos + margin) / grid_spacing + 0.5` truncated toward
/// zero, so positions slightly outside the grid still resolve to line 0.
pub fn nearest_grid_line(
    pos: f64,
    grid_spacing: f64,
    margin: f64,
    line_count: u32,
    outer_bonus: f64,
) -> GridSnap {
    let line = ((pos + margin) / grid_spacing + 0.5) as i64;
    let delta = pos - line as f64 * grid_spacing;
    let mut penalty = Float::abs(delta + margin);
    if line == 0 || line == i64::from(line_count) {
        penalty -= outer_bonus;
    }
    GridSnap {
        line,
        delta,
        penalty,
    }
}

/// The alignment grid of one page.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PageGrid {
    page: Size,
    config: GridConfig,
    double_page: bool,
    spacing_x: f64,
    spacing_y: f64,
}

impl PageGrid {
    /// Derive the grid for a page of the given size.
    pub fn new(page: Size, config: &GridConfig) -> Self {
        let double_page = is_double_page(page);
        let usable_width = if double_page {
            0.5 * page.width
        } else {
            page.width
        };
        let n = f64::from(config.grid_n);
        Self {
            page,
            config: *config,
            double_page,
            spacing_x: (usable_width - 2.0 * config.page_margin) / n,
            spacing_y: (page.height - 2.0 * config.page_margin) / n,
        }
    }

    pub fn page(&self) -> Size {
        self.page
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Whether the page is a double-page spread.
    pub fn is_double_page(&self) -> bool {
        self.double_page
    }

    /// Distance between vertical grid lines.
    pub fn spacing_x(&self) -> f64 {
        self.spacing_x
    }

    /// Distance between horizontal grid lines.
    pub fn spacing_y(&self) -> f64 {
        self.spacing_y
    }

    /// Margin-inset bounds of the (half) page an element centered at `x` belongs to.
    ///
    /// On a spread, an element exactly on the fold belongs to the left half.
    pub fn bounds_for(&self, x: f64) -> Rect {
        let m = self.config.page_margin;
        let top = m;
        let bottom = self.page.height - m;
        let half = 0.5 * self.page.width;
        if !self.double_page {
            Rect::new(m, top, self.page.width - m, bottom)
        } else if x <= half {
            Rect::new(m, top, half - m, bottom)
        } else {
            Rect::new(half + m, top, self.page.width - m, bottom)
        }
    }

    /// Snap a horizontal coordinate measured from `bounds.left`.
    pub fn snap_x(&self, pos: f64, margin: f64) -> GridSnap {
        nearest_grid_line(
            pos,
            self.spacing_x,
            margin,
            self.config.grid_n,
            self.config.outer_pref,
        )
    }

    /// Snap a vertical coordinate measured from `bounds.top`.
    pub fn snap_y(&self, pos: f64, margin: f64) -> GridSnap {
        nearest_grid_line(
            pos,
            self.spacing_y,
            margin,
            self.config.grid_n,
            self.config.outer_pref,
        )
    }

    /// Absolute x of the `i`-th vertical line within `bounds`.
    pub fn line_x(&self, bounds: &Rect, i: u32) -> f64 {
        bounds.left + f64::from(i) * self.spacing_x
    }

    /// Absolute y of the `i`-th horizontal line within `bounds`.
    pub fn line_y(&self, bounds: &Rect, i: u32) -> f64 {
        bounds.top + f64::from(i) * self.spacing_y
    }
}

/// Whether a page of this size is a double-page spread (width ≈ 2 × height).
pub fn is_double_page(page: Size) -> bool {
    Float::abs(page.width / page.height - SPREAD_ASPECT) < SPREAD_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn spread_detection_tolerance() {
        assert!(is_double_page(Size::new(594.0, 297.0)));
        assert!(is_double_page(Size::new(2.19, 1.0)));
        assert!(is_double_page(Size::new(1.81, 1.0)));
        assert!(!is_double_page(Size::new(2.2, 1.0)));
        assert!(!is_double_page(Size::new(210.0, 297.0)));
        assert!(!is_double_page(Size::new(297.0, 210.0)));
    }

    #[test]
    fn single_page_spacing() {
        let grid = PageGrid::new(Size::new(210.0, 297.0), &GridConfig::DEFAULT);
        assert!((grid.spacing_x() - 200.0 / 6.0).abs() < EPS);
        assert!((grid.spacing_y() - 287.0 / 6.0).abs() < EPS);
    }

    #[test]
    fn spread_spacing_uses_half_width() {
        let grid = PageGrid::new(Size::new(594.0, 297.0), &GridConfig::DEFAULT);
        assert!(grid.is_double_page());
        assert!((grid.spacing_x() - 287.0 / 6.0).abs() < EPS);
        assert!((grid.spacing_y() - 287.0 / 6.0).abs() < EPS);
    }

    #[test]
    fn bounds_single_page() {
        let grid = PageGrid::new(Size::new(210.0, 297.0), &GridConfig::DEFAULT);
        assert_eq!(grid.bounds_for(190.0), Rect::new(5.0, 5.0, 205.0, 292.0));
    }

    #[test]
    fn bounds_spread_halves() {
        let grid = PageGrid::new(Size::new(594.0, 297.0), &GridConfig::DEFAULT);
        assert_eq!(grid.bounds_for(100.0), Rect::new(5.0, 5.0, 292.0, 292.0));
        assert_eq!(grid.bounds_for(297.0), Rect::new(5.0, 5.0, 292.0, 292.0));
        assert_eq!(grid.bounds_for(297.1), Rect::new(302.0, 5.0, 589.0, 292.0));
    }

    #[test]
    fn snap_start_edge_interior_line() {
        // Left edge 60mm into the grid, 33.3mm cells: line 2 at 66.7mm.
        let snap = nearest_grid_line(60.0, 200.0 / 6.0, -5.0, 6, 5.0);
        assert_eq!(snap.line, 2);
        assert!((snap.delta - (60.0 - 400.0 / 6.0)).abs() < EPS);
        assert!((snap.penalty - (400.0 / 6.0 - 60.0 + 5.0)).abs() < EPS);
    }

    #[test]
    fn snap_end_edge_interior_line() {
        let snap = nearest_grid_line(140.0, 200.0 / 6.0, 5.0, 6, 5.0);
        assert_eq!(snap.line, 4);
        assert!((snap.delta - (140.0 - 800.0 / 6.0)).abs() < EPS);
        assert!((snap.penalty - (snap.delta + 5.0)).abs() < EPS);
    }

    #[test]
    fn snap_already_aligned_edge_has_zero_penalty() {
        // A stored start edge sits spacing/2 past its line.
        let gs = 30.0;
        let snap = nearest_grid_line(2.0 * gs + 5.0, gs, -5.0, 6, 5.0);
        assert_eq!(snap.line, 2);
        assert!((snap.delta - 5.0).abs() < EPS);
        assert!(snap.penalty.abs() < EPS);

        let snap = nearest_grid_line(4.0 * gs - 5.0, gs, 5.0, 6, 5.0);
        assert_eq!(snap.line, 4);
        assert!((snap.delta + 5.0).abs() < EPS);
        assert!(snap.penalty.abs() < EPS);
    }

    #[test]
    fn outer_lines_get_bonus() {
        let first = nearest_grid_line(7.0, 30.0, -5.0, 6, 5.0);
        assert_eq!(first.line, 0);
        assert!((first.penalty - (2.0 - 5.0)).abs() < EPS);

        let last = nearest_grid_line(178.0, 30.0, 5.0, 6, 5.0);
        assert_eq!(last.line, 6);
        assert!((last.penalty - (3.0 - 5.0)).abs() < EPS);

        let no_bonus = nearest_grid_line(7.0, 30.0, -5.0, 6, 0.0);
        assert!((no_bonus.penalty - 2.0).abs() < EPS);
    }

    #[test]
    fn slightly_outside_grid_truncates_to_first_line() {
        // (-20 - 5)/30 + 0.5 = -0.33, truncated toward zero.
        let snap = nearest_grid_line(-20.0, 30.0, -5.0, 6, 5.0);
        assert_eq!(snap.line, 0);
        assert!((snap.delta + 20.0).abs() < EPS);
    }

    #[test]
    fn start_edges_prefer_half_gap_past_line() {
        // 1mm past line 2: cheap for a start edge, expensive for an end edge.
        let start = nearest_grid_line(61.0, 30.0, -5.0, 6, 0.0);
        let end = nearest_grid_line(61.0, 30.0, 5.0, 6, 0.0);
        assert_eq!(start.line, 2);
        assert_eq!(end.line, 2);
        assert!((start.penalty - 4.0).abs() < EPS);
        assert!((end.penalty - 6.0).abs() < EPS);
    }

    #[test]
    fn config_validation() {
        assert_eq!(GridConfig::DEFAULT.validate(), Ok(()));
        assert_eq!(
            GridConfig::DEFAULT.grid_lines(0).validate(),
            Err(ConfigError::ZeroGridLines)
        );
        assert_eq!(
            GridConfig::DEFAULT.spacing(-1.0).validate(),
            Err(ConfigError::NegativeSpacing)
        );
        assert_eq!(
            GridConfig::DEFAULT.page_margin(-0.5).validate(),
            Err(ConfigError::NegativeMargin)
        );
        assert_eq!(
            GridConfig::DEFAULT.outer_preference(f64::NAN).validate(),
            Err(ConfigError::NonFinite)
        );
        assert_eq!(GridConfig::default(), GridConfig::DEFAULT);
    }

    #[test]
    fn line_positions() {
        let grid = PageGrid::new(Size::new(210.0, 297.0), &GridConfig::DEFAULT);
        let bounds = grid.bounds_for(0.0);
        assert!((grid.line_x(&bounds, 0) - 5.0).abs() < EPS);
        assert!((grid.line_x(&bounds, 6) - 205.0).abs() < EPS);
        assert!((grid.line_y(&bounds, 6) - 292.0).abs() < EPS);
    }
}
