//! Row height: the tallest cell in the row. A cell is as tall as its
//! estimated line count times the line height, and never shorter than the
//! lines actually drawn in it at the drawing pitch. Header rows go through
//! the same function so the two can never be sized differently.

use super::columns::ColumnWidths;
use crate::style::{FontSpec, TableStyle};
use crate::surface::CELL_MARGIN;
use crate::text::{LineEstimate, TextMetrics};

#[derive(Debug, Clone, Copy)]
pub struct RowHeightResolver {
    pub metrics: TextMetrics,
    pub font: FontSpec,
    pub estimate: LineEstimate,
    /// Height of one estimated line, in millimetres.
    pub line_height: f64,
    /// Vertical distance between drawn lines, in millimetres.
    pub line_pitch: f64,
    /// Horizontal inset of text on each side of a cell.
    pub cell_margin: f64,
}

impl RowHeightResolver {
    pub fn new(font: FontSpec, estimate: LineEstimate, line_height: f64) -> Self {
        Self {
            metrics: TextMetrics::new(),
            font,
            estimate,
            line_height,
            line_pitch: font.size_mm(),
            cell_margin: CELL_MARGIN,
        }
    }

    /// Resolver for cells of `style` drawn in `font` at `leading` times the
    /// font size.
    pub fn for_style(style: &TableStyle, font: FontSpec, leading: f64) -> Self {
        Self::new(font, style.line_estimate, style.line_height())
            .leading(leading)
            .margin(style.cell_margin)
    }

    pub fn leading(mut self, leading: f64) -> Self {
        self.line_pitch = self.font.size_mm() * leading;
        self
    }

    pub fn margin(mut self, margin: f64) -> Self {
        self.cell_margin = margin;
        self
    }

    /// Width left for text in a column `width` wide.
    pub fn text_width(&self, width: f64) -> f64 {
        width - 2.0 * self.cell_margin
    }

    /// Estimated lines of `cell` in a column `width` wide.
    pub fn cell_lines(&self, cell: &str, width: f64) -> usize {
        self.metrics
            .wrapped_line_count(cell, self.text_width(width), &self.font, self.estimate)
    }

    /// Lines `cell` is drawn on in a column `width` wide.
    pub fn drawn_lines(&self, cell: &str, width: f64) -> Vec<String> {
        self.metrics.wrap(cell, self.text_width(width), &self.font)
    }

    pub fn cell_height(&self, cell: &str, width: f64) -> f64 {
        let estimated = self.cell_lines(cell, width) as f64 * self.line_height;
        let drawn = self.drawn_lines(cell, width).len() as f64 * self.line_pitch;
        estimated.max(drawn)
    }

    pub fn row_height(&self, cells: &[String], widths: &ColumnWidths) -> f64 {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| self.cell_height(cell, widths.get(i)))
            .fold(self.line_height, f64::max)
    }
}
