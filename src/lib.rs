//! # medrender
//!
//! A paginated renderer for clinical reports.
//!
//! A report is a fixed template (header band, footer band, watermark) around
//! content of unknown length: clinical findings, a medication table, extra
//! tables, prior consultations. The engine decides column widths once per
//! table, sizes every row and card before drawing it, and starts a new page
//! whenever the next atomic element would cross the body bottom. Rows and
//! cards flow *into* pages; nothing is sliced after the fact.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON)
//!       ↓
//!   [model]     typed records, table validation
//!       ↓
//!   [report]    body composers for the two variants
//!       ↓
//!   [layout]    widths, row heights, page breaks, tables, rounded paths
//!   [decorate]  header/footer/watermark on every new page
//!       ↓
//!   [surface]   drawing primitives: PdfSurface or RecordingSurface
//!       ↓
//!   [pdf]       PDF bytes
//! ```

pub mod decorate;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod report;
pub mod style;
pub mod surface;
pub mod text;

pub use decorate::ReportVariant;
pub use error::{ErrorKind, RenderError, RenderWarning};
pub use model::Document;
pub use report::{compose, ComposeSummary, RenderOptions};
pub use style::{RenderTheme, TableStyle};

use pdf::PdfSurface;

/// A finished render pass.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub pdf: Vec<u8>,
    pub page_count: usize,
    /// Recovered conditions: skipped images, width fallbacks, oversized
    /// elements.
    pub warnings: Vec<RenderWarning>,
}

/// Render `document` as `variant` to PDF bytes.
///
/// Output is a pure function of the inputs: the same request always produces
/// the same bytes.
pub fn render_report(
    document: &Document,
    theme: &RenderTheme,
    variant: ReportVariant,
    options: &RenderOptions,
) -> Result<RenderOutput, RenderError> {
    let mut surface = PdfSurface::new(options.page).with_compression(options.compress);
    let summary = compose(document, theme, variant, options, &mut surface)?;
    let pdf = surface.finish(&document.metadata);
    log::debug!("{:?} report encoded: {} bytes", variant, pdf.len());
    Ok(RenderOutput {
        pdf,
        page_count: summary.pages,
        warnings: summary.warnings,
    })
}

/// The main report with default options.
pub fn render_main_report(document: &Document, theme: &RenderTheme) -> Result<Vec<u8>, RenderError> {
    Ok(render_report(document, theme, ReportVariant::Main, &RenderOptions::default())?.pdf)
}

/// The prior-consultations report with default options.
pub fn render_history_report(document: &Document, theme: &RenderTheme) -> Result<Vec<u8>, RenderError> {
    Ok(render_report(document, theme, ReportVariant::History, &RenderOptions::default())?.pdf)
}

/// Render a request described as JSON with the default theme and options.
pub fn render_json(json: &str, variant: ReportVariant) -> Result<RenderOutput, RenderError> {
    let document = Document::from_json(json)?;
    render_report(&document, &RenderTheme::default(), variant, &RenderOptions::default())
}
