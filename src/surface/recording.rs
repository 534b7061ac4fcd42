//! An in-memory [`DrawingSurface`] that records every call.
//!
//! Used by the test suite to assert on layout decisions (where a row landed,
//! which page a card started on, what a header printed) without parsing PDF
//! content streams.

use super::{Cell, DrawingSurface, ImageRef, PageTransform, PathSegment};
use crate::image_loader::LoadedImage;
use crate::style::{Color, FontSpec, Paint};

/// A recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    NewPage,
    SetFont(FontSpec),
    FillColor(Color),
    TextColor(Color),
    DrawColor(Color),
    LineWidth(f64),
    Text { cell: Cell, text: String },
    Rect { x: f64, y: f64, w: f64, h: f64, paint: Paint },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    Path(PathSegment),
    ClosePath(Paint),
    Image { index: usize, x: f64, y: f64, w: f64, h: f64 },
}

/// A call and the page it was made on.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub page: usize,
    pub op: Op,
}

#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    page: usize,
    font: FontSpec,
    images: Vec<LoadedImage>,
    ops: Vec<Recorded>,
}

impl RecordingSurface {
    /// A surface with pages of the given size in millimetres.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            page: 0,
            font: FontSpec::new(Default::default(), Default::default(), 12.0),
            images: Vec::new(),
            ops: Vec::new(),
        }
    }

    pub fn a4() -> Self {
        Self::new(210.0, 297.0)
    }

    fn push(&mut self, op: Op) {
        self.ops.push(Recorded {
            page: self.page,
            op,
        });
    }

    pub fn ops(&self) -> &[Recorded] {
        &self.ops
    }

    pub fn page_count(&self) -> usize {
        self.page
    }

    pub fn images(&self) -> &[LoadedImage] {
        &self.images
    }

    /// Every text cell, in drawing order, with its page.
    pub fn texts(&self) -> Vec<(usize, &Cell, &str)> {
        self.ops
            .iter()
            .filter_map(|r| match &r.op {
                Op::Text { cell, text } => Some((r.page, cell, text.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Text cells whose content equals `text`.
    pub fn find_text(&self, text: &str) -> Vec<(usize, Cell)> {
        self.texts()
            .into_iter()
            .filter(|(_, _, t)| *t == text)
            .map(|(page, cell, _)| (page, *cell))
            .collect()
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.texts().iter().any(|(_, _, t)| t.contains(text))
    }

    pub fn ops_on(&self, page: usize) -> impl Iterator<Item = &Op> {
        self.ops.iter().filter(move |r| r.page == page).map(|r| &r.op)
    }
}

impl DrawingSurface for RecordingSurface {
    fn new_page(&mut self) {
        self.page += 1;
        self.push(Op::NewPage);
    }

    fn page_number(&self) -> usize {
        self.page
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.font = *font;
        self.push(Op::SetFont(*font));
    }

    fn font(&self) -> FontSpec {
        self.font
    }

    fn set_fill_color(&mut self, color: Color) {
        self.push(Op::FillColor(color));
    }

    fn set_text_color(&mut self, color: Color) {
        self.push(Op::TextColor(color));
    }

    fn set_draw_color(&mut self, color: Color) {
        self.push(Op::DrawColor(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.push(Op::LineWidth(width));
    }

    fn text_cell(&mut self, cell: &Cell, text: &str) {
        self.push(Op::Text {
            cell: *cell,
            text: text.to_string(),
        });
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: Paint) {
        self.push(Op::Rect { x, y, w, h, paint });
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.push(Op::Line { x1, y1, x2, y2 });
    }

    fn path_segment(&mut self, segment: PathSegment) {
        self.push(Op::Path(segment));
    }

    fn close_path(&mut self, paint: Paint) {
        self.push(Op::ClosePath(paint));
    }

    fn register_image(&mut self, image: LoadedImage) -> ImageRef {
        let handle = ImageRef {
            index: self.images.len(),
            width_px: image.width_px,
            height_px: image.height_px,
        };
        self.images.push(image);
        handle
    }

    fn draw_image(&mut self, image: ImageRef, x: f64, y: f64, w: f64, h: f64) {
        self.push(Op::Image {
            index: image.index,
            x,
            y,
            w,
            h,
        });
    }

    fn transform(&self) -> PageTransform {
        PageTransform {
            page_height: self.height,
            scale: 1.0,
        }
    }
}

impl RecordingSurface {
    pub fn page_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Align;

    #[test]
    fn records_page_of_each_call() {
        let mut s = RecordingSurface::a4();
        s.new_page();
        s.text_cell(&Cell::new(10.0, 10.0, 50.0, 8.0), "first");
        s.new_page();
        s.text_cell(&Cell::new(10.0, 10.0, 50.0, 8.0).align(Align::Right), "second");

        assert_eq!(s.page_count(), 2);
        assert_eq!(s.find_text("first")[0].0, 1);
        assert_eq!(s.find_text("second")[0].0, 2);
        assert_eq!(s.ops_on(2).count(), 2);
    }

    #[test]
    fn measure_uses_current_font() {
        let mut s = RecordingSurface::a4();
        let narrow = s.measure_text("Advice");
        s.set_font(&s.font().with_size(24.0));
        assert!((s.measure_text("Advice") - narrow * 2.0).abs() < 1e-9);
    }
}
