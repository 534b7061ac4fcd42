//! # PDF Encoder
//!
//! A [`DrawingSurface`] that writes a PDF 1.7 file.
//!
//! This is a from-scratch writer. Every drawing call appends operators to the
//! current page's content stream; [`PdfSurface::finish`] then lays out the
//! object table and serializes it. The subset needed for the clinical
//! templates is small: filled and stroked rectangles, lines, Bezier paths,
//! single-line text in the standard Type1 fonts, and image XObjects.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, images, pages, content streams)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! The output is a pure function of the drawing calls. No creation date or
//! document ID is written, fonts are numbered in first-use order and images
//! in registration order, so identical input yields identical bytes.

use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use crate::font::StandardFont;
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::model::{Metadata, PageSize, POINTS_PER_MM};
use crate::style::{Color, FontSpec, Paint};
use crate::surface::{Cell, DrawingSurface, ImageRef, PageTransform, PathSegment};
use miniz_oxide::deflate::compress_to_vec_zlib;

/// Content of one page while drawing is in progress.
#[derive(Debug, Default)]
struct PageContent {
    stream: String,
    /// Indices of the images drawn on this page.
    images: BTreeSet<usize>,
}

pub struct PdfSurface {
    width: f64,
    height: f64,
    compress: bool,
    pages: Vec<PageContent>,
    font: FontSpec,
    fill_color: Color,
    text_color: Color,
    draw_color: Color,
    line_width: f64,
    /// Segments of the path being built, already as operators.
    path: String,
    /// Fonts in first-use order; `/F{i}` is `fonts[i]`.
    fonts: Vec<StandardFont>,
    images: Vec<LoadedImage>,
}

/// Tracks allocated PDF objects during serialization. Object `i` lives at
/// `objects[i]`; index 0 is the free-list head and stays empty.
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(data);
        self.objects.len() - 1
    }
}

impl PdfSurface {
    pub fn new(page: PageSize) -> Self {
        let (width, height) = page.dimensions();
        Self {
            width,
            height,
            compress: true,
            pages: Vec::new(),
            font: FontSpec::new(Default::default(), Default::default(), 12.0),
            fill_color: Color::WHITE,
            text_color: Color::BLACK,
            draw_color: Color::BLACK,
            line_width: 0.2,
            path: String::new(),
            fonts: Vec::new(),
            images: Vec::new(),
        }
    }

    /// FlateDecode content streams (on by default).
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// The page being drawn on, starting one if none exists yet.
    fn page(&mut self) -> &mut PageContent {
        if self.pages.is_empty() {
            self.pages.push(PageContent::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn emit(&mut self, ops: &str) {
        self.page().stream.push_str(ops);
    }

    fn font_index(&mut self, font: StandardFont) -> usize {
        match self.fonts.iter().position(|f| *f == font) {
            Some(i) => i,
            None => {
                self.fonts.push(font);
                self.fonts.len() - 1
            }
        }
    }

    fn paint_state(&self) -> String {
        let (fr, fg, fb) = self.fill_color.unit();
        let (sr, sg, sb) = self.draw_color.unit();
        format!(
            "{:.3} {:.3} {:.3} rg\n{:.3} {:.3} {:.3} RG\n{:.2} w\n",
            fr,
            fg,
            fb,
            sr,
            sg,
            sb,
            self.line_width * POINTS_PER_MM
        )
    }

    fn paint_operator(paint: Paint) -> &'static str {
        match paint {
            Paint::Fill => "f",
            Paint::Stroke => "S",
            Paint::FillStroke => "B",
        }
    }

    /// Write every page, font and image and return the finished file.
    pub fn finish(mut self, metadata: &Metadata) -> Vec<u8> {
        if self.pages.is_empty() {
            self.pages.push(PageContent::default());
        }

        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        let mut builder = PdfBuilder {
            objects: vec![Vec::new(), Vec::new(), Vec::new()],
        };

        let font_ids: Vec<usize> = self
            .fonts
            .iter()
            .map(|font| {
                builder.push(
                    format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                        font.pdf_name()
                    )
                    .into_bytes(),
                )
            })
            .collect();
        let font_resources = font_ids
            .iter()
            .enumerate()
            .map(|(i, id)| format!("/F{} {} 0 R", i, id))
            .collect::<Vec<_>>()
            .join(" ");

        let image_ids: Vec<usize> = self
            .images
            .iter()
            .map(|image| Self::write_image_xobject(&mut builder, image))
            .collect();

        let media_w = self.width * POINTS_PER_MM;
        let media_h = self.height * POINTS_PER_MM;
        let mut page_obj_ids = Vec::with_capacity(self.pages.len());

        for page in &self.pages {
            let content_obj_id = builder.push(self.content_stream_object(&page.stream));

            let mut resources = format!("/Font << {} >>", font_resources);
            if !page.images.is_empty() {
                let xobjects = page
                    .images
                    .iter()
                    .map(|&i| format!("/Im{} {} 0 R", i, image_ids[i]))
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = write!(resources, " /XObject << {} >>", xobjects);
            }

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                media_w, media_h, content_obj_id, resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", encode_text(title));
        }
        if let Some(ref author) = metadata.author {
            let _ = write!(info, "/Author ({}) ", encode_text(author));
        }
        if let Some(ref subject) = metadata.subject {
            let _ = write!(info, "/Subject ({}) ", encode_text(subject));
        }
        info.push_str("/Producer (medrender) >>");
        let info_obj_id = builder.push(info.into_bytes());

        log::debug!(
            "serializing {} pages, {} fonts, {} images",
            page_obj_ids.len(),
            font_ids.len(),
            image_ids.len()
        );
        Self::serialize(&builder, info_obj_id)
    }

    fn content_stream_object(&self, stream: &str) -> Vec<u8> {
        let mut data: Vec<u8> = Vec::new();
        if self.compress {
            let compressed = compress_to_vec_zlib(stream.as_bytes(), 6);
            let _ = write!(
                data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            data.extend_from_slice(&compressed);
        } else {
            let _ = write!(data, "<< /Length {} >>\nstream\n", stream.len());
            data.extend_from_slice(stream.as_bytes());
        }
        data.extend_from_slice(b"\nendstream");
        data
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };
                let mut obj: Vec<u8> = Vec::new();
                let _ = write!(
                    obj,
                    "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    color_space,
                    data.len()
                );
                obj.extend_from_slice(data);
                obj.extend_from_slice(b"\nendstream");
                builder.push(obj)
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                // SMask first so the image can reference it
                let smask_id = alpha.as_ref().map(|alpha| {
                    let compressed = compress_to_vec_zlib(alpha, 6);
                    let mut obj: Vec<u8> = Vec::new();
                    let _ = write!(
                        obj,
                        "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                         /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode /Length {} >>\nstream\n",
                        image.width_px,
                        image.height_px,
                        compressed.len()
                    );
                    obj.extend_from_slice(&compressed);
                    obj.extend_from_slice(b"\nendstream");
                    builder.push(obj)
                });

                let compressed = compress_to_vec_zlib(rgb, 6);
                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();
                let mut obj: Vec<u8> = Vec::new();
                let _ = write!(
                    obj,
                    "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode /Length {}{} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    compressed.len(),
                    smask_ref
                );
                obj.extend_from_slice(&compressed);
                obj.extend_from_slice(b"\nendstream");
                builder.push(obj)
            }
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(obj);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

impl DrawingSurface for PdfSurface {
    fn new_page(&mut self) {
        self.pages.push(PageContent::default());
        self.path.clear();
    }

    fn page_number(&self) -> usize {
        self.pages.len()
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.font = *font;
    }

    fn font(&self) -> FontSpec {
        self.font
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
    }

    fn set_draw_color(&mut self, color: Color) {
        self.draw_color = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn text_cell(&mut self, cell: &Cell, text: &str) {
        if text.is_empty() {
            return;
        }

        let font = self.font;
        let index = self.font_index(StandardFont::for_spec(&font));
        let x = cell.text_x(self.measure_text(text));
        let (px, py) = self.transform().point(x, cell.baseline(&font));
        let (r, g, b) = self.text_color.unit();

        let mut ops = String::new();
        let _ = write!(
            ops,
            "q\nBT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\nQ\n",
            r,
            g,
            b,
            index,
            font.size,
            px,
            py,
            encode_text(text)
        );
        self.emit(&ops);
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: Paint) {
        let t = self.transform();
        let (px, py) = t.point(x, y + h);
        let ops = format!(
            "q\n{}{:.2} {:.2} {:.2} {:.2} re\n{}\nQ\n",
            self.paint_state(),
            px,
            py,
            t.length(w),
            t.length(h),
            Self::paint_operator(paint)
        );
        self.emit(&ops);
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let t = self.transform();
        let (ax, ay) = t.point(x1, y1);
        let (bx, by) = t.point(x2, y2);
        let ops = format!(
            "q\n{}{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
            self.paint_state(),
            ax,
            ay,
            bx,
            by
        );
        self.emit(&ops);
    }

    fn path_segment(&mut self, segment: PathSegment) {
        let _ = match segment {
            PathSegment::MoveTo(x, y) => writeln!(self.path, "{:.2} {:.2} m", x, y),
            PathSegment::LineTo(x, y) => writeln!(self.path, "{:.2} {:.2} l", x, y),
            PathSegment::CurveTo(x1, y1, x2, y2, x3, y3) => writeln!(
                self.path,
                "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
                x1, y1, x2, y2, x3, y3
            ),
        };
    }

    fn close_path(&mut self, paint: Paint) {
        let path = std::mem::take(&mut self.path);
        let ops = format!(
            "q\n{}{}h\n{}\nQ\n",
            self.paint_state(),
            path,
            Self::paint_operator(paint)
        );
        self.emit(&ops);
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
        let t = self.transform();
        let (px, py) = t.point(x, y + h);
        let ops = format!(
            "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
            t.length(w),
            t.length(h),
            px,
            py,
            image.index
        );
        let page = self.page();
        page.images.insert(image.index);
        page.stream.push_str(&ops);
    }

    fn transform(&self) -> PageTransform {
        PageTransform {
            page_height: self.height,
            scale: POINTS_PER_MM,
        }
    }
}

/// Encode text for a literal string in a WinAnsi font: map to single bytes,
/// escape delimiters, and octal-escape everything outside printable ASCII.
/// Unmappable characters become `?`.
fn encode_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        let b = unicode_to_winansi(ch).unwrap_or(b'?');
        match b {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            0x20..=0x7E => out.push(b as char),
            _ => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// WinAnsiEncoding is based on Windows-1252. Most codepoints in
/// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
/// contains special mappings for smart quotes, bullets, dashes, etc.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91), // Left single quotation mark
        0x2019 => Some(0x92), // Right single quotation mark
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}
