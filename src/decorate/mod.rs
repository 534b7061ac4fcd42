//! # Page Decoration
//!
//! The fixed regions of every page: header band, footer band and watermark.
//! Each report variant has its own [`PageDecorator`]. The page-break
//! controller calls it once per new page, before any content is drawn there,
//! so the watermark always sits beneath the page's content.
//!
//! Decoration is a pure function of the document, the theme, the page size
//! and the page number. Images are loaded and registered with the surface
//! once per render pass ([`DecorAssets::prepare`]) and only referenced here.

use crate::error::RenderWarning;
use crate::image_loader::{load_image, make_watermark};
use crate::layout::PageGeometry;
use crate::model::Document;
use crate::style::{Align, Color, FontStyle, Paint, RenderTheme};
use crate::surface::{Cell, DrawingSurface, ImageRef};
use qrcode::QrCode;

/// Height of the header band on both variants.
pub const HEADER_HEIGHT: f64 = 40.0;
/// Height of the main report's footer band.
pub const MAIN_FOOTER_HEIGHT: f64 = 25.0;
/// Height of the history report's footer bar.
pub const HISTORY_FOOTER_HEIGHT: f64 = 15.0;
/// Width of the watermark image.
pub const WATERMARK_WIDTH: f64 = 60.0;

/// Draws the fixed regions of a page.
pub trait PageDecorator {
    /// Draw the header, footer and watermark of page `page`.
    fn decorate(&self, surface: &mut dyn DrawingSurface, page: usize);

    /// Where body content starts on the first page.
    fn content_top(&self) -> f64;

    /// Where body content resumes after a page break.
    fn continuation_top(&self) -> f64;
}

/// Which report is being rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportVariant {
    #[default]
    Main,
    History,
}

/// Module grid of the footer QR code.
#[derive(Debug, Clone, PartialEq)]
pub struct QrMatrix {
    pub width: usize,
    /// Row-major, `true` for dark modules.
    pub dark: Vec<bool>,
}

impl QrMatrix {
    pub fn encode(payload: &str) -> Option<Self> {
        match QrCode::new(payload.as_bytes()) {
            Ok(code) => Some(Self {
                width: code.width(),
                dark: code
                    .to_colors()
                    .into_iter()
                    .map(|c| c == qrcode::Color::Dark)
                    .collect(),
            }),
            Err(e) => {
                log::warn!("footer QR payload not encodable: {}", e);
                None
            }
        }
    }

    /// Horizontal runs of dark modules as (row, first column, length).
    pub fn runs(&self) -> Vec<(usize, usize, usize)> {
        let mut runs = Vec::new();
        for row in 0..self.width {
            let mut col = 0;
            while col < self.width {
                if self.dark[row * self.width + col] {
                    let start = col;
                    while col < self.width && self.dark[row * self.width + col] {
                        col += 1;
                    }
                    runs.push((row, start, col - start));
                } else {
                    col += 1;
                }
            }
        }
        runs
    }
}

/// Images and codes shared by every page of one render pass.
#[derive(Debug, Clone, Default)]
pub struct DecorAssets {
    pub logo: Option<ImageRef>,
    pub watermark: Option<ImageRef>,
    pub qr: Option<QrMatrix>,
}

impl DecorAssets {
    /// Load and register the images `variant` needs. Images that fail to
    /// load are skipped with a warning.
    pub fn prepare(
        document: &Document,
        variant: ReportVariant,
        surface: &mut dyn DrawingSurface,
        warnings: &mut Vec<RenderWarning>,
    ) -> Self {
        let mut skipped = |role: &str, reason: String| {
            log::warn!("{} image skipped: {}", role, reason);
            warnings.push(RenderWarning::ImageSkipped {
                role: role.to_string(),
                reason,
            });
        };

        let logo = document.logo.as_deref().and_then(|src| match load_image(src) {
            Ok(image) => Some(surface.register_image(image)),
            Err(e) => {
                skipped("logo", e.to_string());
                None
            }
        });

        if variant == ReportVariant::History {
            return Self {
                logo,
                watermark: None,
                qr: None,
            };
        }

        let watermark = match document.watermark_logo.as_deref().or(document.logo.as_deref()) {
            None => None,
            Some(src) => match make_watermark(src) {
                Ok(image) => Some(surface.register_image(image)),
                Err(e) => {
                    // Fall back to the plain logo when one loaded.
                    skipped("watermark", e.to_string());
                    logo
                }
            },
        };

        let qr = document
            .hospital
            .footer
            .qr_payload
            .as_deref()
            .filter(|p| !p.is_empty())
            .and_then(QrMatrix::encode);

        Self { logo, watermark, qr }
    }
}

fn text(
    surface: &mut dyn DrawingSurface,
    theme: &RenderTheme,
    style: FontStyle,
    size: f64,
    color: Color,
    cell: Cell,
    value: &str,
) {
    surface.set_font(&theme.font(style, size));
    surface.set_text_color(color);
    surface.text_cell(&cell, value);
}

/// Header with doctor and hospital blocks, teal footer band with contact
/// lines, QR box and page number, and a centered watermark.
pub struct MainDecoration<'a> {
    pub document: &'a Document,
    pub theme: &'a RenderTheme,
    pub assets: &'a DecorAssets,
    pub geometry: PageGeometry,
}

impl MainDecoration<'_> {
    fn watermark(&self, surface: &mut dyn DrawingSurface) {
        if let Some(image) = self.assets.watermark {
            let (w, h) = (self.geometry.width, self.geometry.height);
            let height = image.height_for_width(WATERMARK_WIDTH);
            surface.draw_image(image, w / 2.0 - 30.0, h / 2.0 - 60.0, WATERMARK_WIDTH, height);
        }
    }

    fn header(&self, surface: &mut dyn DrawingSurface) {
        let theme = self.theme;
        let w = self.geometry.width;
        let doctor = &self.document.doctor;
        let hospital = &self.document.hospital;

        surface.set_fill_color(Color::WHITE);
        surface.rect(0.0, 0.0, w, HEADER_HEIGHT, Paint::Fill);

        let block = (w - 20.0) * 0.5;
        let mut y = 10.0;
        text(surface, theme, FontStyle::Bold, 16.0, theme.primary, Cell::new(10.0, y, block, 8.0), doctor.name());
        y += 8.0;
        for line in [doctor.degree(), doctor.speciality()] {
            text(surface, theme, FontStyle::Regular, 10.0, theme.secondary, Cell::new(10.0, y, block, 5.0), line);
            y += 5.0;
        }
        for line in [format!("Mobile: {}", doctor.mobile()), format!("PMC No. {}", doctor.pmc())] {
            text(surface, theme, FontStyle::Regular, 8.0, theme.muted, Cell::new(10.0, y, block, 4.0), &line);
            y += 4.0;
        }

        let x = w / 2.0;
        let mut y = 10.0;
        let right = |y: f64, h: f64| Cell::new(x, y, block, h).align(Align::Right);
        text(surface, theme, FontStyle::Bold, 16.0, theme.primary, right(y, 8.0), hospital.name());
        y += 8.0;
        for line in [
            hospital.address().to_string(),
            format!("Tel: {}", hospital.phone()),
            format!("Emergency: {}", hospital.emergency()),
        ] {
            text(surface, theme, FontStyle::Regular, 8.0, theme.muted, right(y, 4.0), &line);
            y += 4.0;
        }

        surface.set_draw_color(theme.primary);
        surface.set_line_width(theme.divider_width);
        surface.line(10.0, HEADER_HEIGHT, w - 10.0, HEADER_HEIGHT);
    }

    fn footer(&self, surface: &mut dyn DrawingSurface, page: usize) {
        let theme = self.theme;
        let (w, h) = (self.geometry.width, self.geometry.height);
        let top = h - MAIN_FOOTER_HEIGHT;
        let footer = &self.document.hospital.footer;

        surface.set_fill_color(theme.primary);
        surface.rect(0.0, top, w, MAIN_FOOTER_HEIGHT, Paint::Fill);
        surface.set_fill_color(Color::WHITE);
        surface.rect(10.0, top, 40.0, MAIN_FOOTER_HEIGHT, Paint::Fill);

        match &self.assets.qr {
            Some(qr) => self.qr_code(surface, qr, top),
            None => text(
                surface,
                theme,
                FontStyle::Bold,
                14.0,
                theme.primary,
                Cell::new(10.0, h - 20.0, 40.0, 10.0).align(Align::Center),
                "QR",
            ),
        }

        let contact_w = w - 110.0;
        text(
            surface,
            theme,
            FontStyle::Regular,
            8.0,
            Color::WHITE,
            Cell::new(60.0, h - 20.0, contact_w, 5.0),
            &format!("Address: {}", footer.address()),
        );
        text(
            surface,
            theme,
            FontStyle::Regular,
            8.0,
            Color::WHITE,
            Cell::new(60.0, h - 15.0, contact_w, 5.0),
            &format!("Tel: {}   |   Email: {}", footer.phone(), footer.email()),
        );
        text(
            surface,
            theme,
            FontStyle::Regular,
            8.0,
            Color::WHITE,
            Cell::new(w - 40.0, h - 15.0, 30.0, 5.0).align(Align::Right),
            &format!("Page {page}"),
        );
    }

    /// Dark modules as filled runs, centered in the white footer box.
    fn qr_code(&self, surface: &mut dyn DrawingSurface, qr: &QrMatrix, top: f64) {
        let side = MAIN_FOOTER_HEIGHT - 4.0;
        let module = side / qr.width.max(1) as f64;
        let x0 = 10.0 + (40.0 - side) / 2.0;
        let y0 = top + 2.0;
        surface.set_fill_color(self.theme.text);
        for (row, col, len) in qr.runs() {
            surface.rect(
                x0 + col as f64 * module,
                y0 + row as f64 * module,
                len as f64 * module,
                module,
                Paint::Fill,
            );
        }
    }
}

impl PageDecorator for MainDecoration<'_> {
    fn decorate(&self, surface: &mut dyn DrawingSurface, page: usize) {
        self.watermark(surface);
        self.header(surface);
        self.footer(surface, page);
    }

    fn content_top(&self) -> f64 {
        HEADER_HEIGHT + 5.0
    }

    fn continuation_top(&self) -> f64 {
        60.0
    }
}

/// Teal banner with a centered title and logo badge, grey footer bar with a
/// centered page number.
pub struct HistoryDecoration<'a> {
    pub theme: &'a RenderTheme,
    pub assets: &'a DecorAssets,
    pub geometry: PageGeometry,
}

impl PageDecorator for HistoryDecoration<'_> {
    fn decorate(&self, surface: &mut dyn DrawingSurface, page: usize) {
        let theme = self.theme;
        let (w, h) = (self.geometry.width, self.geometry.height);

        surface.set_fill_color(theme.primary);
        surface.rect(0.0, 0.0, w, HEADER_HEIGHT, Paint::Fill);
        text(
            surface,
            theme,
            FontStyle::Bold,
            18.0,
            Color::WHITE,
            Cell::new(0.0, 15.0, w, 10.0).align(Align::Center),
            "Previous Consultations",
        );

        if let Some(logo) = self.assets.logo {
            surface.set_fill_color(Color::WHITE);
            surface.rect(10.0, 10.0, 35.0, 35.0, Paint::Fill);
            surface.draw_image(logo, 12.5, 12.5, 30.0, 30.0);
        }

        surface.set_fill_color(theme.footer_bar);
        surface.rect(0.0, h - HISTORY_FOOTER_HEIGHT, w, HISTORY_FOOTER_HEIGHT, Paint::Fill);
        text(
            surface,
            theme,
            FontStyle::Italic,
            8.0,
            theme.text,
            Cell::new(0.0, h - 12.0, w, 10.0).align(Align::Center),
            &format!("Page {page}"),
        );
    }

    fn content_top(&self) -> f64 {
        55.0
    }

    fn continuation_top(&self) -> f64 {
        50.0
    }
}
