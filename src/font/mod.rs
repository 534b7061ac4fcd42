//! # Font Management
//!
//! Maps a [`FontSpec`] to one of the standard PDF fonts. Standard fonts need
//! no embedding, so the encoder only has to reference them by name, and their
//! widths are fixed tables, so measurement is a pure function.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use crate::style::{FontFamily, FontSpec, FontStyle};

/// The standard PDF fonts the engine can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    pub fn resolve(family: FontFamily, style: FontStyle) -> Self {
        match (family, style) {
            (FontFamily::Helvetica, FontStyle::Regular) => Self::Helvetica,
            (FontFamily::Helvetica, FontStyle::Bold) => Self::HelveticaBold,
            (FontFamily::Helvetica, FontStyle::Italic) => Self::HelveticaOblique,
            (FontFamily::Helvetica, FontStyle::BoldItalic) => Self::HelveticaBoldOblique,
            (FontFamily::Courier, FontStyle::Regular) => Self::Courier,
            (FontFamily::Courier, FontStyle::Bold) => Self::CourierBold,
            (FontFamily::Courier, FontStyle::Italic) => Self::CourierOblique,
            (FontFamily::Courier, FontStyle::BoldItalic) => Self::CourierBoldOblique,
        }
    }

    pub fn for_spec(spec: &FontSpec) -> Self {
        Self::resolve(spec.family, spec.style)
    }

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Obliques share the advance widths of their upright faces.
    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => StandardFontMetrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => StandardFontMetrics::HELVETICA_BOLD,
            Self::Courier | Self::CourierBold | Self::CourierOblique | Self::CourierBoldOblique => {
                StandardFontMetrics::COURIER
            }
        }
    }
}
