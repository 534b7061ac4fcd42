//! Body of the history report: a patient strip, the "Previous Consultations"
//! heading, and one rounded card per prior report.

use crate::error::RenderError;
use crate::layout::page_break::PageFlow;
use crate::layout::path::rounded_rect;
use crate::model::{Document, PriorReport};
use crate::style::{FontStyle, Paint, RenderTheme};
use crate::surface::{Cell, CELL_MARGIN};
use crate::text::{LineEstimate, TextMetrics};

const STRIP_ROW: f64 = 10.0;
const CARD_TITLE: f64 = 10.0;
const CARD_LINE: f64 = 8.0;
const CARD_BOTTOM_PAD: f64 = 5.0;
const CARD_GAP: f64 = 5.0;
const CARD_RADIUS: f64 = 5.0;
/// Horizontal inset of card text from the page's left margin.
const CARD_INSET: f64 = 5.0;

pub(super) fn compose_body(flow: &mut PageFlow<'_>, document: &Document, theme: &RenderTheme) -> Result<(), RenderError> {
    patient_strip(flow, document, theme);

    let heading = Cell::new(flow.geometry().left(), flow.y(), flow.geometry().printable_width(), STRIP_ROW);
    let surface = flow.surface();
    surface.set_font(&theme.font(FontStyle::Bold, 14.0));
    surface.set_text_color(theme.primary);
    surface.text_cell(&heading, "Previous Consultations");
    flow.advance(STRIP_ROW);

    for (i, report) in document.previous_reports.iter().enumerate() {
        card(flow, theme, report, i + 1)?;
    }
    Ok(())
}

fn patient_strip(flow: &mut PageFlow<'_>, document: &Document, theme: &RenderTheme) {
    let top = flow.y();
    let left = flow.geometry().left();
    let right = flow.geometry().right();
    let patient = &document.patient;
    let columns = [
        ("Patient Name:", patient.name().to_string(), 80.0),
        ("UHID:", patient.uhid().to_string(), 60.0),
        ("Age/Sex:", patient.age_sex(), 40.0),
    ];

    let surface = flow.surface();
    surface.set_fill_color(theme.light_accent);
    surface.rect(left, top, right - left, STRIP_ROW, Paint::Fill);

    surface.set_font(&theme.font(FontStyle::Bold, 10.0));
    surface.set_text_color(theme.primary);
    let mut x = left;
    for (label, _, width) in &columns {
        surface.text_cell(&Cell::new(x, top, *width, STRIP_ROW), label);
        x += width;
    }

    surface.set_draw_color(theme.primary);
    surface.set_line_width(theme.divider_width);
    surface.line(left, top + STRIP_ROW, right, top + STRIP_ROW);

    surface.set_font(&theme.font(FontStyle::Regular, 10.0));
    surface.set_text_color(theme.text);
    let values_y = top + 1.5 * STRIP_ROW;
    let mut x = left;
    for (_, value, width) in &columns {
        surface.text_cell(&Cell::new(x, values_y, *width, STRIP_ROW), value);
        x += width;
    }

    flow.skip_to(values_y + 2.0 * STRIP_ROW);
}

/// Height of a card whose consultation text takes `text_height`.
pub(crate) fn card_height(text_height: f64) -> f64 {
    let minimum = if text_height < 10.0 { 20.0 } else { 30.0 };
    (CARD_TITLE + text_height + CARD_BOTTOM_PAD).max(minimum)
}

fn card(flow: &mut PageFlow<'_>, theme: &RenderTheme, report: &PriorReport, number: usize) -> Result<(), RenderError> {
    let left = flow.geometry().left();
    let card_width = flow.geometry().printable_width();
    let text_x = left + CARD_INSET;
    let text_width = card_width - 2.0 * CARD_INSET;
    let font = theme.font(FontStyle::Regular, 10.0);
    let metrics = TextMetrics::new();

    let consultation = report.consultation();
    let lines = if consultation.is_empty() {
        Vec::new()
    } else {
        metrics.wrap(consultation, text_width - 2.0 * CELL_MARGIN, &font)
    };
    // Size by the larger of the estimate and the drawn wrap so text never
    // spills out of the card.
    let line_count = if lines.is_empty() {
        0
    } else {
        metrics
            .wrapped_line_count(consultation, text_width, &font, LineEstimate::Measured)
            .max(lines.len())
    };
    let height = card_height(line_count as f64 * CARD_LINE);

    flow.ensure_space(height, &format!("consultation card {number}"))?;
    let y = flow.y();

    let surface = flow.surface();
    surface.set_fill_color(theme.light_accent);
    rounded_rect(surface, left, y, card_width, height, CARD_RADIUS, Paint::Fill);

    surface.set_font(&theme.font(FontStyle::Bold, 12.0));
    surface.set_text_color(theme.secondary);
    surface.text_cell(&Cell::new(text_x, y, text_width, CARD_TITLE), &report.title());

    surface.set_font(&font);
    surface.set_text_color(theme.text);
    for (n, line) in lines.iter().enumerate() {
        let line_y = y + CARD_TITLE + n as f64 * CARD_LINE;
        surface.text_cell(&Cell::new(text_x, line_y, text_width, CARD_LINE), line);
    }

    flow.advance(height + CARD_GAP);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorate::ReportVariant;
    use crate::report::{compose, RenderOptions};
    use crate::surface::recording::{Op, RecordingSurface};
    use crate::surface::PathSegment;

    fn render(json: &str) -> RecordingSurface {
        let document = Document::from_json(json).unwrap();
        let mut surface = RecordingSurface::a4();
        compose(
            &document,
            &RenderTheme::default(),
            ReportVariant::History,
            &RenderOptions::default(),
            &mut surface,
        )
        .unwrap();
        surface
    }

    #[test]
    fn card_height_minimums() {
        assert_eq!(card_height(0.0), 20.0);
        assert_eq!(card_height(8.0), 23.0);
        assert_eq!(card_height(16.0), 31.0);
        assert_eq!(card_height(10.0), 30.0);
    }

    #[test]
    fn strip_and_heading_positions() {
        let s = render(r#"{ "patient_data": { "name": "Jane Roe", "uhid": "U-1", "age": "42", "sex": "F" } }"#);
        let (_, uhid) = s.find_text("UHID:")[0];
        assert_eq!((uhid.x, uhid.y), (90.0, 55.0));
        let (_, age_sex) = s.find_text("42/F")[0];
        assert_eq!((age_sex.x, age_sex.y), (150.0, 70.0));
        assert!(s.ops().iter().any(|r| r.op == Op::Line { x1: 10.0, y1: 65.0, x2: 200.0, y2: 65.0 }));
        // Banner title and body heading share the text; the body one is the later draw.
        let headings = s.find_text("Previous Consultations");
        assert_eq!(headings.last().map(|(_, c)| c.y), Some(90.0));
    }

    #[test]
    fn cards_stack_with_gap() {
        let s = render(
            r#"{ "previous_reports": [
                { "date": "2024-01-02", "hospital": "City Hospital", "consultation": "Follow up in two weeks" },
                "Bare note"
            ] }"#,
        );
        let (_, first) = s.find_text("2024-01-02 - City Hospital")[0];
        assert_eq!((first.x, first.y), (15.0, 100.0));
        // One line: 10 + 8 + 5 = 23, then a 5 gap.
        let (_, second) = s.find_text(" - ")[0];
        assert_eq!(second.y, 128.0);
        assert!(s.contains_text("Bare note"));

        let starts: Vec<PathSegment> = s
            .ops()
            .iter()
            .filter_map(|r| match r.op {
                Op::Path(seg @ PathSegment::MoveTo(..)) => Some(seg),
                _ => None,
            })
            .collect();
        assert_eq!(starts.len(), 2);
    }

    #[test]
    fn empty_consultation_gets_minimum_card() {
        let s = render(r#"{ "previous_reports": [ { "date": "2023-05-06", "hospital": "Clinic" } ] }"#);
        let (_, title) = s.find_text("2023-05-06 - Clinic")[0];
        assert_eq!(title.y, 100.0);
        // Bottom edge of the card: its last line segment ends at y = 100 + 20.
        let bottom = 297.0 - 120.0;
        assert!(s
            .ops()
            .iter()
            .any(|r| matches!(r.op, Op::Path(PathSegment::LineTo(_, y)) if (y - bottom).abs() < 1e-9)));
    }

    #[test]
    fn card_that_does_not_fit_moves_to_next_page() {
        let reports: Vec<String> = (0..12)
            .map(|i| format!(r#"{{ "date": "d{i}", "hospital": "h", "consultation": "note" }}"#))
            .collect();
        let s = render(&format!(r#"{{ "previous_reports": [{}] }}"#, reports.join(",")));
        // Cards are 23 tall with a 5 gap: 100, 128, ..., 240 fit above 267.
        let (page, cell) = s.find_text("d6 - h")[0];
        assert_eq!((page, cell.y), (2, 50.0));
        assert_eq!(s.find_text("Page 2").len(), 1);
    }
}
