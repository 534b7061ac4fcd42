//! # Layout Engine
//!
//! Places report content into pages. The pieces, leaves first:
//!
//! - [`columns`] decides column widths once per table.
//! - [`row`] resolves the height of a row of cells.
//! - [`page_break`] owns the [`Cursor`] and starts new pages when an atomic
//!   element would cross the body bottom, re-running page decoration.
//! - [`table`] draws a bordered, banded table through all of the above.
//! - [`path`] emits rounded rectangles as Bezier paths.
//!
//! All positions are logical millimetres from the top-left page corner.

pub mod columns;
pub mod page_break;
pub mod path;
pub mod row;
pub mod table;

use crate::model::{Edges, PageSize};

/// Fixed page dimensions and the printable body inside them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margins: Edges,
}

impl PageGeometry {
    pub fn new(size: PageSize, margins: Edges) -> Self {
        let (width, height) = size.dimensions();
        Self {
            width,
            height,
            margins,
        }
    }

    /// Page width minus the left and right margins.
    pub fn printable_width(&self) -> f64 {
        (self.width - self.margins.horizontal()).max(0.0)
    }

    /// Lowest y an atomic element may reach.
    pub fn body_bottom(&self) -> f64 {
        self.height - self.margins.bottom
    }

    pub fn left(&self) -> f64 {
        self.margins.left
    }

    pub fn right(&self) -> f64 {
        self.width - self.margins.right
    }
}

impl Default for PageGeometry {
    /// A4 with 10mm side margins and a 30mm footer reserve.
    fn default() -> Self {
        Self::new(
            PageSize::A4,
            Edges {
                top: 10.0,
                right: 10.0,
                bottom: 30.0,
                left: 10.0,
            },
        )
    }
}

/// The current drawing position.
///
/// Only the page-break controller moves it, and only forward within a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
    /// 1-based; 0 before the first page is started.
    pub page: usize,
    pub body_bottom: f64,
}

impl Cursor {
    pub fn will_overflow(&self, height: f64) -> bool {
        self.y + height > self.body_bottom + 1e-9
    }
}
