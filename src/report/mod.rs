//! # Report Composition
//!
//! Ties the engine together for one render pass: validate the document,
//! prepare the page assets, pick the decorator for the report variant, and
//! run the variant's body composer through a [`PageFlow`].
//!
//! The composers only ever talk to a [`DrawingSurface`], so the same pass can
//! produce PDF bytes or a recording for inspection.

mod history;
mod main_report;

use crate::decorate::{DecorAssets, HistoryDecoration, MainDecoration, PageDecorator, ReportVariant};
use crate::error::{RenderError, RenderWarning};
use crate::layout::columns::ColumnWidthStrategy;
use crate::layout::page_break::PageFlow;
use crate::layout::PageGeometry;
use crate::model::{Document, Edges, PageSize};
use crate::style::{RenderTheme, TableStyle};
use crate::surface::DrawingSurface;
use serde::{Deserialize, Serialize};

/// Per-request layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub page: PageSize,
    /// `bottom` is the footer reserve: the body never extends below
    /// `height - bottom`.
    pub margins: Edges,
    /// Fail with `LayoutOverflow` instead of placing an element taller than a
    /// page body.
    pub strict_overflow: bool,
    pub table: TableStyle,
    /// Column widths of the "Advice" table.
    pub advice_strategy: ColumnWidthStrategy,
    /// Column widths of the extra tables.
    pub extra_strategy: ColumnWidthStrategy,
    /// FlateDecode page content streams.
    pub compress: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page: PageSize::A4,
            margins: Edges {
                top: 10.0,
                right: 10.0,
                bottom: 30.0,
                left: 10.0,
            },
            strict_overflow: false,
            table: TableStyle::reference(),
            advice_strategy: ColumnWidthStrategy::Even,
            extra_strategy: ColumnWidthStrategy::ContentFit,
            compress: true,
        }
    }
}

impl RenderOptions {
    pub fn geometry(&self) -> PageGeometry {
        PageGeometry::new(self.page, self.margins)
    }
}

/// What a completed pass produced, besides the drawing itself.
#[derive(Debug, Clone, Default)]
pub struct ComposeSummary {
    pub pages: usize,
    pub warnings: Vec<RenderWarning>,
}

/// Lay out `document` as `variant` onto `surface`.
///
/// Tables are validated before the first drawing call, so a malformed table
/// leaves the surface untouched.
pub fn compose(
    document: &Document,
    theme: &RenderTheme,
    variant: ReportVariant,
    options: &RenderOptions,
    surface: &mut dyn DrawingSurface,
) -> Result<ComposeSummary, RenderError> {
    document.validate()?;

    let geometry = options.geometry();
    let mut warnings = Vec::new();
    let assets = DecorAssets::prepare(document, variant, surface, &mut warnings);

    let decorator: Box<dyn PageDecorator + '_> = match variant {
        ReportVariant::Main => Box::new(MainDecoration {
            document,
            theme,
            assets: &assets,
            geometry,
        }),
        ReportVariant::History => Box::new(HistoryDecoration {
            theme,
            assets: &assets,
            geometry,
        }),
    };

    let mut flow = PageFlow::new(surface, decorator.as_ref(), geometry).strict(options.strict_overflow);
    flow.begin();
    match variant {
        ReportVariant::Main => main_report::compose_body(&mut flow, document, theme, options)?,
        ReportVariant::History => history::compose_body(&mut flow, document, theme)?,
    }

    let (pages, flow_warnings) = flow.finish();
    warnings.extend(flow_warnings);
    log::info!("{:?} report composed: {} page(s), {} warning(s)", variant, pages, warnings.len());
    Ok(ComposeSummary { pages, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::RecordingSurface;

    #[test]
    fn options_default_from_empty_json() {
        let options: RenderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, RenderOptions::default());
        assert_eq!(options.geometry().body_bottom(), 267.0);
        assert_eq!(options.geometry().printable_width(), 190.0);
    }

    #[test]
    fn options_partial_override() {
        let options: RenderOptions = serde_json::from_str(
            r#"{ "strict_overflow": true, "advice_strategy": { "Fixed": 40.0 }, "table": { "repeat_header": true } }"#,
        )
        .unwrap();
        assert!(options.strict_overflow);
        assert_eq!(options.advice_strategy, ColumnWidthStrategy::Fixed(40.0));
        assert!(options.table.repeat_header);
        assert_eq!(options.table.data_size, 10.0);
    }

    #[test]
    fn malformed_table_draws_nothing() {
        let document = Document::from_json(
            r#"{ "extra_tables": [ { "title": "Labs", "header": ["a", "b"], "rows": [["1"]] } ] }"#,
        )
        .unwrap();
        let mut surface = RecordingSurface::a4();
        let err = compose(
            &document,
            &RenderTheme::default(),
            ReportVariant::Main,
            &RenderOptions::default(),
            &mut surface,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::MalformedTable { .. }));
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn empty_document_is_one_page_per_variant() {
        for variant in [ReportVariant::Main, ReportVariant::History] {
            let mut surface = RecordingSurface::a4();
            let summary = compose(
                &Document::default(),
                &RenderTheme::default(),
                variant,
                &RenderOptions::default(),
                &mut surface,
            )
            .unwrap();
            assert_eq!(summary.pages, 1);
            assert!(summary.warnings.is_empty());
        }
    }
}
