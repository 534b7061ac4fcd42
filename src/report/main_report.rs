//! Body of the main report: patient band, clinical findings in two columns,
//! the "Advice" table, then any extra tables.

use super::RenderOptions;
use crate::error::RenderError;
use crate::layout::page_break::PageFlow;
use crate::layout::table::TableRenderer;
use crate::model::Document;
use crate::style::{FontStyle, Paint, RenderTheme};
use crate::surface::{Cell, DrawingSurface, CELL_MARGIN};
use crate::text::TextMetrics;

const BAND_ROW: f64 = 10.0;
/// Height of one drawn line of a clinical finding.
const FIELD_LINE: f64 = 8.0;
/// Minimum distance between the tops of two clinical findings.
const FIELD_PITCH: f64 = 15.0;
const LABEL_PAD: f64 = 5.0;
const SECTION_GAP: f64 = 5.0;

pub(super) fn compose_body(
    flow: &mut PageFlow<'_>,
    document: &Document,
    theme: &RenderTheme,
    options: &RenderOptions,
) -> Result<(), RenderError> {
    patient_band(flow, document, theme);
    clinical_findings(flow, document, theme)?;

    flow.advance(SECTION_GAP);
    TableRenderer::new(theme, &options.table)
        .strategy(options.advice_strategy.clone())
        .title("Advice")
        .render(flow, &document.advice_table())?;

    for (i, extra) in document.extra_tables.iter().enumerate() {
        let table = extra.to_table()?;
        flow.advance(SECTION_GAP);
        let renderer = TableRenderer::new(theme, &options.table)
            .strategy(options.extra_strategy.clone())
            .name(format!("extra table {}", i + 1))
            .title(extra.title.as_str());
        renderer.render(flow, &table)?;
    }
    Ok(())
}

/// A bold label followed directly by its value on one band row.
/// Returns the x where the value cell ends.
fn labelled(
    surface: &mut dyn DrawingSurface,
    theme: &RenderTheme,
    x: f64,
    y: f64,
    label: &str,
    value: &str,
    value_width: f64,
) -> f64 {
    let label_font = theme.font(FontStyle::Bold, 10.0);
    surface.set_font(&label_font);
    surface.set_text_color(theme.primary);
    let label_width = surface.measure_text(label) + LABEL_PAD;
    surface.text_cell(&Cell::new(x, y, label_width, BAND_ROW), label);

    surface.set_font(&theme.font(FontStyle::Regular, 10.0));
    surface.set_text_color(theme.text);
    surface.text_cell(&Cell::new(x + label_width, y, value_width, BAND_ROW), value);
    x + label_width + value_width
}

fn patient_band(flow: &mut PageFlow<'_>, document: &Document, theme: &RenderTheme) {
    let top = flow.y();
    let left = flow.geometry().left();
    let right = flow.geometry().right();
    let patient = &document.patient;

    let surface = flow.surface();
    surface.set_fill_color(theme.light_accent);
    surface.rect(left, top, right - left, 2.0 * BAND_ROW, Paint::Fill);

    labelled(surface, theme, left, top, "Patient Name:", patient.name(), 80.0);
    let age_end = labelled(surface, theme, left, top + BAND_ROW, "Age:", patient.age(), 40.0);
    labelled(
        surface,
        theme,
        age_end.max(left + 50.0),
        top + BAND_ROW,
        "Date:",
        patient.date(),
        40.0,
    );

    surface.set_draw_color(theme.primary);
    surface.set_line_width(theme.divider_width);
    surface.line(left, top + 2.0 * BAND_ROW, right, top + 2.0 * BAND_ROW);

    flow.skip_to(top + 2.0 * BAND_ROW + SECTION_GAP);
}

/// Shorthand column on the left, a divider, and the findings on the right.
///
/// Each finding is one atomic element: its label and all of its wrapped
/// lines stay on one page.
fn clinical_findings(flow: &mut PageFlow<'_>, document: &Document, theme: &RenderTheme) -> Result<(), RenderError> {
    let top = flow.y();
    let left = flow.geometry().left();
    let label_x = left + 40.0;
    let value_x = left + 80.0;
    let value_width = flow.geometry().right() - value_x;
    let value_font = theme.font(FontStyle::Regular, 10.0);
    let metrics = TextMetrics::new();

    let fields: Vec<(&str, Vec<String>)> = document
        .patient
        .clinical_fields()
        .into_iter()
        .map(|(label, value)| (label, metrics.wrap(value, value_width - 2.0 * CELL_MARGIN, &value_font)))
        .collect();
    let pitch = |lines: usize| (lines as f64 * FIELD_LINE + 7.0).max(FIELD_PITCH);

    let surface = flow.surface();
    surface.set_font(&theme.font(FontStyle::Bold, 10.0));
    surface.set_text_color(theme.primary);
    for (label, y) in [("C/C", top), ("D/E", top + 20.0), ("BP=", top + 30.0)] {
        surface.text_cell(&Cell::new(left, y, 35.0, BAND_ROW), label);
    }

    let span: f64 = fields.iter().map(|(_, lines)| pitch(lines.len())).sum();
    let divider_end = (top + span).min(flow.geometry().body_bottom());
    let surface = flow.surface();
    surface.set_draw_color(theme.primary);
    surface.set_line_width(theme.divider_width);
    surface.line(left + 35.0, top, left + 35.0, divider_end);

    let last = fields.len().saturating_sub(1);
    for (i, (label, lines)) in fields.iter().enumerate() {
        let block = lines.len() as f64 * FIELD_LINE;
        flow.ensure_space(block, &format!("clinical field {}", label.trim_end_matches(':')))?;
        let y = flow.y();

        let surface = flow.surface();
        surface.set_font(&theme.font(FontStyle::Bold, 10.0));
        surface.set_text_color(theme.secondary);
        surface.text_cell(&Cell::new(label_x, y, 40.0, FIELD_LINE), label);

        surface.set_font(&value_font);
        surface.set_text_color(theme.text);
        for (n, line) in lines.iter().enumerate() {
            let cell = Cell::new(value_x, y + n as f64 * FIELD_LINE, value_width, FIELD_LINE);
            surface.text_cell(&cell, line);
        }

        flow.advance(if i == last { block } else { pitch(lines.len()) });
    }
    Ok(())
}
