//! # Style System
//!
//! The visual vocabulary of a report: colors, font selections, cell
//! alignment, paint modes, the per-request [`RenderTheme`], and the named
//! [`TableStyle`] presets.
//!
//! Nothing in here is global. A theme is built (or deserialized) per render
//! request and handed to the engine by reference, so two requests rendering
//! concurrently can use different palettes without interfering.

use crate::text::LineEstimate;
use serde::{Deserialize, Serialize};

/// An sRGB color with 8-bit channels. Serializes as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0);
    pub const WHITE: Color = Color(255, 255, 255);

    /// Channels scaled to the 0.0-1.0 range PDF color operators expect.
    pub fn unit(&self) -> (f64, f64, f64) {
        (
            self.0 as f64 / 255.0,
            self.1 as f64 / 255.0,
            self.2 as f64 / 255.0,
        )
    }
}

/// The font families the engine has metrics for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Helvetica,
    Courier,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

/// A complete font selection: family, style and size in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: FontFamily,
    pub style: FontStyle,
    pub size: f64,
}

impl FontSpec {
    pub const fn new(family: FontFamily, style: FontStyle, size: f64) -> Self {
        Self { family, style, size }
    }

    pub fn with_style(self, style: FontStyle) -> Self {
        Self { style, ..self }
    }

    pub fn with_size(self, size: f64) -> Self {
        Self { size, ..self }
    }

    /// Font size converted to layout units (millimetres).
    pub fn size_mm(&self) -> f64 {
        self.size / crate::model::POINTS_PER_MM
    }
}

/// Horizontal alignment of text inside a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// How a closed shape is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Paint {
    Fill,
    Stroke,
    FillStroke,
}

/// Colors, fonts and stroke widths for one render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderTheme {
    /// Headings, table headers, the footer bar and the history banner.
    pub primary: Color,
    /// Field labels and card titles.
    pub secondary: Color,
    /// The rule closing each table.
    pub accent: Color,
    /// Banded rows, the patient band and consultation cards.
    pub light_accent: Color,
    /// Contact lines and other de-emphasized text.
    pub muted: Color,
    /// History footer bar.
    pub footer_bar: Color,
    pub text: Color,
    pub font_family: FontFamily,
    /// Hairline width for table borders, in millimetres.
    pub border_width: f64,
    /// Width of section divider rules, in millimetres.
    pub divider_width: f64,
}

impl Default for RenderTheme {
    fn default() -> Self {
        Self {
            primary: Color(0, 128, 128),
            secondary: Color(0, 150, 136),
            accent: Color(0, 77, 64),
            light_accent: Color(224, 242, 241),
            muted: Color(100, 100, 100),
            footer_bar: Color(192, 192, 192),
            text: Color::BLACK,
            font_family: FontFamily::Helvetica,
            border_width: 0.2,
            divider_width: 0.5,
        }
    }
}

impl RenderTheme {
    pub fn font(&self, style: FontStyle, size: f64) -> FontSpec {
        FontSpec::new(self.font_family, style, size)
    }
}

/// Sizing and drawing constants for data tables.
///
/// Two presets exist because the report service historically shipped two
/// diverging table routines. [`TableStyle::reference`] reproduces the one the
/// reports actually used; [`TableStyle::compact`] is the tighter variant that
/// sizes rows by measured text and repeats the header after a page break.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableStyle {
    /// Font size of cell text, in points.
    pub data_size: f64,
    /// Font size of the optional table title, in points.
    pub title_size: f64,
    pub align_header: Align,
    pub align_data: Align,
    /// One estimated text line is `data_size (mm) * line_factor` tall.
    pub line_factor: f64,
    /// Spacing between drawn lines inside a header cell, as a multiple of the
    /// font size.
    pub header_leading: f64,
    /// Spacing between drawn lines inside a data cell.
    pub data_leading: f64,
    pub line_estimate: LineEstimate,
    /// Horizontal inset of text from the cell border, in millimetres.
    pub cell_margin: f64,
    /// Subtracted from every `Even` column width.
    pub gutter: f64,
    /// Added to the widest content in each `ContentFit` column.
    pub content_padding: f64,
    /// Redraw the header row at the top of each continuation page.
    pub repeat_header: bool,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self::reference()
    }
}

impl TableStyle {
    pub fn reference() -> Self {
        Self {
            data_size: 10.0,
            title_size: 14.0,
            align_header: Align::Center,
            align_data: Align::Center,
            line_factor: 3.0,
            header_leading: 1.0,
            data_leading: 2.0,
            line_estimate: LineEstimate::CharLimit(30),
            cell_margin: 1.0,
            gutter: 1.0,
            content_padding: 4.0,
            repeat_header: false,
        }
    }

    pub fn compact() -> Self {
        Self {
            line_factor: 1.6,
            header_leading: 1.2,
            data_leading: 1.2,
            line_estimate: LineEstimate::Measured,
            repeat_header: true,
            ..Self::reference()
        }
    }

    /// Height of one estimated line of cell text, in millimetres.
    pub fn line_height(&self) -> f64 {
        self.data_size / crate::model::POINTS_PER_MM * self.line_factor
    }
}
