//! Grid alignment for photo-book picture frames.
//!
//! Pure geometry in the core: no I/O, no allocations, `no_std` compatible.
//! The document layer and the command-line tool sit on top behind features.
//!
//! # Modules
//!
//! - [`geometry`] — Points, sizes and edge rectangles in millimetres
//! - [`grid`] — Grid configuration, page grids and grid-line snapping
//! - [`align`] — The per-picture alignment engine
//! - `document` — Project file model, traversal, load/save/backup (feature `document`)
//! - `svg` — Page previews with grid and before/after frames (feature `svg`)

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod align;
pub mod geometry;
pub mod grid;

#[cfg(feature = "document")]
pub mod document;
#[cfg(feature = "svg")]
pub mod svg;

pub use align::{Alignment, Axis, EdgeSnaps, Placement, align_picture};
pub use geometry::{Point, Rect, Size};
pub use grid::{ConfigError, GridConfig, GridSnap, PageGrid, is_double_page, nearest_grid_line};
