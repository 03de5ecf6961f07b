//! SVG rendering of a page's alignment grid and its picture frames.
//!
//! One panel per page: the page outline, the margin-inset bounds (one per
//! half on spreads), the grid lines, and for every picture its frame before
//! alignment (dashed), the snapped rectangle, and the stored frame.
//!
//! # Example
//!
//! ```
//! use bookalign::svg::{FrameChange, render_page_svg};
//! use bookalign::{GridConfig, PageGrid, Point, Rect, Size, align_picture};
//!
//! let page = Size::new(210.0, 297.0);
//! let before = Rect::from_center(Point::new(105.0, 100.0), Size::new(80.0, 60.0));
//! let aligned = align_picture(
//!     before.center(),
//!     before.size(),
//!     Size::new(800.0, 600.0),
//!     page,
//!     &GridConfig::DEFAULT,
//! );
//!
//! let grid = PageGrid::new(page, &GridConfig::DEFAULT);
//! let svg = render_page_svg(&grid, "Page 2", &[FrameChange::new("p1", before, &aligned)]);
//! assert!(svg.starts_with("<svg"));
//! ```

#[cfg(not(feature = "std"))]
use alloc::format;
#[cfg(not(feature = "std"))]
use alloc::string::String;

use crate::align::Alignment;
use crate::geometry::Rect;
use crate::grid::PageGrid;

/// Maximum pixel width of the page panel.
const MAX_PANEL_W: f64 = 600.0;
/// Maximum pixel height of the page panel.
const MAX_PANEL_H: f64 = 600.0;
/// Margin around the panel.
const MARGIN: f64 = 30.0;
/// Height of the title line above the panel.
const LABEL_H: f64 = 22.0;

/// One picture's frames for rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameChange {
    pub label: String,
    /// Frame before alignment.
    pub before: Rect,
    /// Grid-aligned rectangle, before the spacing is taken off.
    pub snapped: Rect,
    /// Stored frame after alignment.
    pub after: Rect,
}

impl FrameChange {
    pub fn new(label: impl Into<String>, before: Rect, alignment: &Alignment) -> Self {
        Self {
            label: label.into(),
            before,
            snapped: alignment.snapped,
            after: alignment.frame(),
        }
    }
}

#[cfg(feature = "document")]
impl From<&crate::document::PictureAlignment> for FrameChange {
    fn from(p: &crate::document::PictureAlignment) -> Self {
        let label = p
            .element
            .id
            .clone()
            .unwrap_or_else(|| format!("#{}", p.element.index));
        Self::new(label, p.before, &p.alignment)
    }
}

/// Render a complete SVG document for one page.
pub fn render_page_svg(grid: &PageGrid, title: &str, frames: &[FrameChange]) -> String {
    let page = grid.page();
    let scale = scale_to_fit(page.width, page.height);
    let panel_w = page.width * scale;
    let panel_h = page.height * scale;
    let total_w = panel_w + 2.0 * MARGIN;
    let total_h = panel_h + 2.0 * MARGIN + LABEL_H;
    let ox = MARGIN;
    let oy = MARGIN + LABEL_H;
    let px = |mm: f64| mm * scale;

    let mut svg = String::with_capacity(4096);

    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {:.1} {:.1}">"#,
        total_w as u32, total_h as u32, total_w, total_h
    ));
    svg.push('\n');

    // Style — light/dark mode via prefers-color-scheme
    svg.push_str(
        r##"<style>
  text { font-family: "Consolas", "DejaVu Sans Mono", "Courier New", monospace; }
  .label { font-size: 13px; font-weight: bold; fill: #333; }
  .annotation { font-size: 10px; fill: #2c6faa; }
  .page { fill: #fafafa; stroke: #999; stroke-width: 1; }
  .bounds { fill: none; stroke: #c66; stroke-width: 0.8; stroke-dasharray: 3,2; }
  .grid { stroke: #ccc; stroke-width: 0.6; }
  .before { fill: none; stroke: #999; stroke-width: 1; stroke-dasharray: 4,2; }
  .snapped { fill: none; stroke: #2c6faa; stroke-width: 0.8; }
  .after { fill: #6ba3d6; fill-opacity: 0.6; stroke: #2c6faa; stroke-width: 1.5; }
  @media (prefers-color-scheme: dark) {
    .label { fill: #e0e0e0; }
    .annotation { fill: #5a9fd4; }
    .page { fill: #2d2d2d; stroke: #555; }
    .grid { stroke: #444; }
    .before { stroke: #777; }
    .after { fill: #3a72a4; stroke: #5a9fd4; }
  }
</style>
"##,
    );

    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" class="label">{} ({}×{} mm{})</text>"#,
        ox,
        MARGIN + 14.0,
        escape_xml(title),
        page.width,
        page.height,
        if grid.is_double_page() { ", spread" } else { "" }
    ));
    svg.push('\n');

    svg.push_str(&format!(
        r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" class="page"/>"#,
        ox, oy, panel_w, panel_h
    ));
    svg.push('\n');

    // A spread has one grid per half; probe each half by its center.
    let halves: &[f64] = if grid.is_double_page() {
        &[0.25, 0.75]
    } else {
        &[0.5]
    };
    for &fraction in halves {
        let bounds = grid.bounds_for(page.width * fraction);
        push_rect(&mut svg, ox, oy, scale, &bounds, "bounds");
        for i in 0..=grid.config().grid_n {
            let x = ox + px(grid.line_x(&bounds, i));
            let y = oy + px(grid.line_y(&bounds, i));
            svg.push_str(&format!(
                r#"<line x1="{x:.1}" y1="{:.1}" x2="{x:.1}" y2="{:.1}" class="grid"/>"#,
                oy + px(bounds.top),
                oy + px(bounds.bottom)
            ));
            svg.push('\n');
            svg.push_str(&format!(
                r#"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" class="grid"/>"#,
                ox + px(bounds.left),
                ox + px(bounds.right)
            ));
            svg.push('\n');
        }
    }

    for frame in frames {
        push_rect(&mut svg, ox, oy, scale, &frame.before, "before");
        push_rect(&mut svg, ox, oy, scale, &frame.snapped, "snapped");
        push_rect(&mut svg, ox, oy, scale, &frame.after, "after");
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" class="annotation">{}</text>"#,
            ox + px(frame.after.left) + 3.0,
            oy + px(frame.after.top) + 12.0,
            escape_xml(&frame.label)
        ));
        svg.push('\n');
    }

    svg.push_str("</svg>\n");
    svg
}

/// Scale factor (px per mm) that fits the page into MAX_PANEL_W × MAX_PANEL_H.
fn scale_to_fit(w: f64, h: f64) -> f64 {
    if w <= 0.0 || h <= 0.0 || !w.is_finite() || !h.is_finite() {
        return 1.0;
    }
    (MAX_PANEL_W / w).min(MAX_PANEL_H / h)
}

fn push_rect(svg: &mut String, ox: f64, oy: f64, scale: f64, r: &Rect, class: &str) {
    svg.push_str(&format!(
        r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" class="{class}"/>"#,
        ox + r.left * scale,
        oy + r.top * scale,
        r.width() * scale,
        r.height() * scale
    ));
    svg.push('\n');
}

/// Escape special characters for XML text content.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
