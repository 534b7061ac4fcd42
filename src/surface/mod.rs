//! # Drawing Surface
//!
//! The primitive operations the layout engine draws through. The engine never
//! writes PDF operators itself: it positions cells, rules, rectangles, paths
//! and images on a [`DrawingSurface`], and the surface decides how they are
//! encoded.
//!
//! Two implementations ship with the crate: [`crate::pdf::PdfSurface`], the
//! document encoder, and [`recording::RecordingSurface`], which keeps the
//! calls in memory for inspection.
//!
//! Coordinates are logical millimetres with the origin at the top-left corner
//! of the page and y growing downward, except for [`PathSegment`]s, which are
//! already in the surface's physical space (see [`PageTransform`]).

pub mod recording;

use crate::image_loader::LoadedImage;
use crate::style::{Align, Color, FontSpec, Paint};
use crate::text::TextMetrics;

/// Default horizontal inset of cell text from the cell edge, in millimetres.
pub const CELL_MARGIN: f64 = 1.0;

/// A rectangular text cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub align: Align,
    /// Inset of left- and right-aligned text from the cell edge.
    pub margin: f64,
}

impl Cell {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w,
            h,
            align: Align::Left,
            margin: CELL_MARGIN,
        }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Left edge of text of `text_width` placed inside this cell.
    pub fn text_x(&self, text_width: f64) -> f64 {
        match self.align {
            Align::Left => self.x + self.margin,
            Align::Center => self.x + (self.w - text_width) / 2.0,
            Align::Right => self.x + self.w - self.margin - text_width,
        }
    }

    /// Baseline of text set in `font`, vertically centered in the cell.
    pub fn baseline(&self, font: &FontSpec) -> f64 {
        self.y + 0.5 * self.h + 0.3 * font.size_mm()
    }
}

/// One segment of a path, in physical surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    /// Cubic Bezier: two control points, then the end point.
    CurveTo(f64, f64, f64, f64, f64, f64),
}

/// Maps logical top-left millimetres to the surface's physical space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageTransform {
    /// Page height in logical units.
    pub page_height: f64,
    /// Physical units per logical unit.
    pub scale: f64,
}

impl PageTransform {
    pub fn point(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale, (self.page_height - y) * self.scale)
    }

    pub fn length(&self, v: f64) -> f64 {
        v * self.scale
    }
}

/// Handle to an image registered with a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef {
    pub index: usize,
    pub width_px: u32,
    pub height_px: u32,
}

impl ImageRef {
    /// Height that keeps the aspect ratio at the given width.
    pub fn height_for_width(&self, width: f64) -> f64 {
        if self.width_px == 0 {
            return width;
        }
        width * self.height_px as f64 / self.width_px as f64
    }
}

/// Primitive drawing operations used by the layout engine.
pub trait DrawingSurface {
    /// Start a new page. Pages are numbered from 1.
    fn new_page(&mut self);

    /// Number of the current page; 0 before the first page is started.
    fn page_number(&self) -> usize;

    fn set_font(&mut self, font: &FontSpec);

    fn font(&self) -> FontSpec;

    fn set_fill_color(&mut self, color: Color);

    fn set_text_color(&mut self, color: Color);

    fn set_draw_color(&mut self, color: Color);

    /// Stroke width in logical units.
    fn set_line_width(&mut self, width: f64);

    /// Width of `text` in the current font.
    fn measure_text(&self, text: &str) -> f64 {
        TextMetrics::new().measure(text, &self.font())
    }

    /// Draw a single line of text in a cell.
    fn text_cell(&mut self, cell: &Cell, text: &str);

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: Paint);

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);

    /// Append a segment to the current path.
    fn path_segment(&mut self, segment: PathSegment);

    /// Close the current path and paint it.
    fn close_path(&mut self, paint: Paint);

    fn register_image(&mut self, image: LoadedImage) -> ImageRef;

    fn draw_image(&mut self, image: ImageRef, x: f64, y: f64, w: f64, h: f64);

    fn transform(&self) -> PageTransform;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{FontFamily, FontStyle};

    #[test]
    fn transform_flips_y() {
        let t = PageTransform {
            page_height: 297.0,
            scale: 2.0,
        };
        assert_eq!(t.point(10.0, 0.0), (20.0, 594.0));
        assert_eq!(t.point(0.0, 297.0), (0.0, 0.0));
    }

    #[test]
    fn cell_text_alignment() {
        let cell = Cell::new(10.0, 0.0, 100.0, 10.0);
        assert_eq!(cell.text_x(20.0), 11.0);
        assert_eq!(cell.align(Align::Center).text_x(20.0), 50.0);
        assert_eq!(cell.align(Align::Right).text_x(20.0), 89.0);
    }

    #[test]
    fn cell_margin_insets_left_and_right_text() {
        let cell = Cell::new(10.0, 0.0, 100.0, 10.0).margin(4.0);
        assert_eq!(cell.text_x(20.0), 14.0);
        assert_eq!(cell.align(Align::Center).text_x(20.0), 50.0);
        assert_eq!(cell.align(Align::Right).text_x(20.0), 86.0);
    }

    #[test]
    fn baseline_sits_below_center() {
        let font = FontSpec::new(FontFamily::Helvetica, FontStyle::Regular, 10.0);
        let cell = Cell::new(0.0, 20.0, 50.0, 10.0);
        let baseline = cell.baseline(&font);
        assert!(baseline > 25.0 && baseline < 30.0);
    }

    #[test]
    fn image_aspect() {
        let img = ImageRef {
            index: 0,
            width_px: 200,
            height_px: 100,
        };
        assert_eq!(img.height_for_width(60.0), 30.0);
    }
}
