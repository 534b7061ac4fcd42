//! Integration tests for the medrender pipeline.
//!
//! These tests exercise the full path from a request to drawing calls and PDF
//! bytes. They verify:
//! - Column widths follow the chosen strategy
//! - Rows and cards are never split across pages
//! - Page decoration is redrawn on every new page
//! - Recoverable problems become warnings, fatal ones errors
//! - PDF output is structurally valid and deterministic

use medrender::layout::columns::{ColumnWidthAllocator, ColumnWidthStrategy};
use medrender::layout::path::rounded_rect;
use medrender::model::{Document, PageSize, Table};
use medrender::surface::recording::{Op, RecordingSurface};
use medrender::surface::{DrawingSurface, PathSegment};
use medrender::style::{FontStyle, Paint};
use medrender::*;

use base64::Engine;

// ─── Helpers ────────────────────────────────────────────────────

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn advice_table(rows: usize) -> Table {
    Table::new(
        strings(&["S.No.", "Medicine Name", "Dosage", "Details"]),
        (0..rows)
            .map(|i| strings(&[&(i + 1).to_string(), "Paracetamol", "500mg", "After meals"]))
            .collect(),
    )
    .unwrap()
}

fn compose_onto(
    document: &Document,
    variant: ReportVariant,
    options: &RenderOptions,
    surface: &mut RecordingSurface,
) -> ComposeSummary {
    compose(document, &RenderTheme::default(), variant, options, surface).unwrap()
}

fn history_with_cards(count: usize, consultation: &str) -> Document {
    let reports: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{ "date": "visit {}", "hospital": "City Hospital", "consultation": {} }}"#,
                i + 1,
                serde_json::to_string(consultation).unwrap()
            )
        })
        .collect();
    Document::from_json(&format!(r#"{{ "previous_reports": [{}] }}"#, reports.join(","))).unwrap()
}

fn png_data_uri() -> String {
    let img = image::RgbaImage::from_pixel(8, 4, image::Rgba([0, 128, 128, 200]));
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(encoder, img.as_raw(), 8, 4, image::ColorType::Rgba8).unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(buf)
    )
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(bytes.windows(5).any(|w| w == b"%%EOF"), "Missing %%EOF marker");
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(bytes.windows(7).any(|w| w == b"trailer"), "Missing trailer");
}

fn uncompressed() -> RenderOptions {
    RenderOptions {
        compress: false,
        ..RenderOptions::default()
    }
}

// ─── Column Width Tests ─────────────────────────────────────────

#[test]
fn test_even_widths_four_columns() {
    let style = TableStyle::reference();
    let font = RenderTheme::default().font(FontStyle::Regular, 10.0);
    let allocation = ColumnWidthAllocator::new(190.0, &style, font).allocate(
        "advice",
        &advice_table(3),
        &ColumnWidthStrategy::Even,
    );
    let widths = allocation.widths.to_vec();
    assert_eq!(widths, vec![190.0 / 4.0 - 1.0; 4]);
    assert!(widths.iter().sum::<f64>() <= 190.0);
    assert!(allocation.warnings.is_empty());
}

#[test]
fn test_explicit_width_count_mismatch_falls_back_to_even() {
    let style = TableStyle::reference();
    let font = RenderTheme::default().font(FontStyle::Regular, 10.0);
    let allocation = ColumnWidthAllocator::new(190.0, &style, font).allocate(
        "advice",
        &advice_table(3),
        &ColumnWidthStrategy::Explicit(vec![20.0, 60.0, 40.0]),
    );
    assert_eq!(allocation.widths.to_vec(), vec![46.5; 4]);
    assert!(matches!(
        allocation.warnings[0],
        RenderWarning::WidthFallback { supplied: 3, columns: 4, .. }
    ));
}

#[test]
fn test_content_fit_grows_with_content() {
    for style in [TableStyle::reference(), TableStyle::compact()] {
        let font = RenderTheme::default().font(FontStyle::Regular, 10.0);
        let allocator = ColumnWidthAllocator::new(190.0, &style, font);
        let mut previous = 0.0;
        for len in 1..=60 {
            let table = Table::new(strings(&["A", "B"]), vec![vec!["x".repeat(len), "y".into()]]).unwrap();
            let width = allocator
                .allocate("fit", &table, &ColumnWidthStrategy::ContentFit)
                .widths
                .get(0);
            assert!(width >= previous, "width shrank at {len} chars");
            previous = width;
        }
    }
}

#[test]
fn test_advice_strategy_from_options() {
    let document = Document::from_json(r#"{ "advice_data": [ { "name": "A" } ] }"#).unwrap();
    let options: RenderOptions =
        serde_json::from_str(r#"{ "advice_strategy": { "Explicit": [15, 80, 35, 60] } }"#).unwrap();
    let mut surface = RecordingSurface::a4();
    compose_onto(&document, ReportVariant::Main, &options, &mut surface);
    let (_, header) = surface.find_text("Medicine Name")[0];
    assert_eq!(header.x, 25.0);
    assert_eq!(header.w, 80.0);
}

// ─── Table Pagination Tests ─────────────────────────────────────

#[test]
fn test_header_only_table_no_break() {
    let document = Document::default();
    let mut surface = RecordingSurface::a4();
    let summary = compose_onto(&document, ReportVariant::Main, &RenderOptions::default(), &mut surface);
    assert_eq!(summary.pages, 1);
    assert_eq!(surface.find_text("S.No.").len(), 1);
}

#[test]
fn test_long_advice_table_rows_never_split() {
    let items: Vec<String> = (0..60)
        .map(|i| format!(r#"{{ "name": "Medicine {i}", "dosage": "1 tablet", "details": "After meals" }}"#))
        .collect();
    let document = Document::from_json(&format!(r#"{{ "advice_data": [{}] }}"#, items.join(","))).unwrap();
    let mut surface = RecordingSurface::a4();
    let summary = compose_onto(&document, ReportVariant::Main, &RenderOptions::default(), &mut surface);

    assert!(summary.pages > 1);
    for r in surface.ops() {
        if let Op::Rect { y, h, paint, .. } = r.op {
            // Cell borders are stroked; decoration bands are fill-only.
            if paint != Paint::Fill {
                assert!(y + h <= 267.0 + 1e-9, "row at {y} + {h} crosses the body bottom on page {}", r.page);
            }
        }
    }
    // Header band, footer and page number on every page.
    for page in 1..=summary.pages {
        assert_eq!(surface.find_text(&format!("Page {page}"))[0].0, page);
    }
    assert_eq!(surface.find_text("Medicine 59")[0].0, summary.pages);
}

#[test]
fn test_wrapped_advice_details_stay_inside_their_rows() {
    let details = "Three times a day after meals";
    let items: Vec<String> = (0..30)
        .map(|i| format!(r#"{{ "name": "Medicine {i}", "dosage": "1 tablet", "details": "{details}" }}"#))
        .collect();
    let document = Document::from_json(&format!(r#"{{ "advice_data": [{}] }}"#, items.join(","))).unwrap();
    let mut surface = RecordingSurface::a4();
    let summary = compose_onto(&document, ReportVariant::Main, &RenderOptions::default(), &mut surface);
    assert!(summary.pages > 1);

    let rows: Vec<(usize, f64, f64)> = surface
        .ops()
        .iter()
        .filter_map(|r| match r.op {
            Op::Rect { y, h, paint, .. } if paint != Paint::Fill => Some((r.page, y, h)),
            _ => None,
        })
        .collect();
    let lines: Vec<_> = surface
        .texts()
        .into_iter()
        .filter(|(_, _, text)| !text.is_empty() && details.contains(text))
        .collect();
    assert!(lines.len() >= 2 * 30, "details should wrap onto two lines");
    for (page, cell, text) in lines {
        let inside = rows
            .iter()
            .any(|&(p, y, h)| p == page && cell.y >= y - 1e-9 && cell.y + cell.h <= y + h + 1e-9);
        assert!(inside, "{text:?} at y={} on page {page} is outside every row", cell.y);
        assert!(cell.y + cell.h <= 267.0 + 1e-9);
    }
}

#[test]
fn test_repeat_header_option() {
    let items: Vec<String> = (0..60).map(|i| format!(r#"{{ "name": "Medicine {i}" }}"#)).collect();
    let document = Document::from_json(&format!(r#"{{ "advice_data": [{}] }}"#, items.join(","))).unwrap();
    let mut options = RenderOptions::default();
    options.table.repeat_header = true;
    let mut surface = RecordingSurface::a4();
    let summary = compose_onto(&document, ReportVariant::Main, &options, &mut surface);
    let headers = surface.find_text("Medicine Name");
    assert_eq!(headers.len(), summary.pages);
    assert!(headers.iter().skip(1).all(|(_, cell)| cell.y >= 60.0));
}

// ─── History Report Tests ───────────────────────────────────────

#[test]
fn test_fifty_cards_paginate_within_body() {
    // 280-tall page with a 30 reserve: a 250 body bottom.
    let options = RenderOptions {
        page: PageSize::Custom {
            width: 210.0,
            height: 280.0,
        },
        ..RenderOptions::default()
    };
    // Three lines of text: 10 + 24 + 5 = 39 per card.
    let document = history_with_cards(50, "line one\nline two\nline three");
    let mut surface = RecordingSurface::new(210.0, 280.0);
    let summary = compose_onto(&document, ReportVariant::History, &options, &mut surface);

    // Cards pitch 44: three fit from 100 on the first page, four from 50 after.
    assert_eq!(summary.pages, 13);
    for r in surface.ops() {
        if let Op::Path(PathSegment::LineTo(_, y) | PathSegment::MoveTo(_, y)) = r.op {
            // Flipped: 280 - 250 = 30.
            assert!(y >= 30.0 - 1e-9, "card edge below the body on page {}", r.page);
        }
    }
    let (page, cell) = surface.find_text("visit 4 - City Hospital")[0];
    assert_eq!((page, cell.y), (2, 50.0));
    for page in 1..=summary.pages {
        let banners = surface
            .find_text("Previous Consultations")
            .into_iter()
            .filter(|(p, _)| *p == page)
            .count();
        assert!(banners >= 1, "banner missing on page {page}");
        assert_eq!(surface.find_text(&format!("Page {page}"))[0].0, page);
    }
}

#[test]
fn test_oversized_card_warns_and_is_placed() {
    let text = vec!["a line of notes"; 40].join("\n");
    let document = history_with_cards(2, &text);
    let mut surface = RecordingSurface::a4();
    let summary = compose_onto(&document, ReportVariant::History, &RenderOptions::default(), &mut surface);
    assert!(summary
        .warnings
        .iter()
        .any(|w| matches!(w, RenderWarning::Overflow { element, .. } if element == "consultation card 1")));
    assert!(surface.contains_text("visit 2 - City Hospital"));
}

#[test]
fn test_oversized_card_strict_mode_errors() {
    let text = vec!["a line of notes"; 40].join("\n");
    let document = history_with_cards(1, &text);
    let options = RenderOptions {
        strict_overflow: true,
        ..RenderOptions::default()
    };
    let err = render_report(&document, &RenderTheme::default(), ReportVariant::History, &options).unwrap_err();
    assert!(matches!(err, RenderError::LayoutOverflow { .. }));
    assert_eq!(err.kind(), ErrorKind::Layout);
}

#[test]
fn test_rounded_rect_radius_clamped() {
    let mut surface = RecordingSurface::a4();
    surface.new_page();
    let r = rounded_rect(&mut surface, 10.0, 10.0, 40.0, 12.0, 20.0, Paint::Fill);
    assert_eq!(r, 6.0);
}

// ─── Error Handling Tests ───────────────────────────────────────

#[test]
fn test_malformed_table_rejected_before_drawing() {
    let document = Document::from_json(
        r#"{ "extra_tables": [ { "title": "Vitals", "header": ["BP", "Pulse"], "rows": [["120/80", "72"], ["118/76"]] } ] }"#,
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
    match err {
        RenderError::MalformedTable {
            table,
            row,
            expected,
            found,
        } => {
            assert_eq!((table.as_str(), row, expected, found), ("Vitals", 2, 2, 1));
        }
        other => panic!("expected MalformedTable, got {other:?}"),
    }
    assert!(surface.ops().is_empty());
}

#[test]
fn test_unloadable_logo_is_skipped() {
    let document = Document::from_json(r#"{ "logo_data": "./no/such/logo.png" }"#).unwrap();
    let output = render_report(&document, &RenderTheme::default(), ReportVariant::Main, &uncompressed()).unwrap();
    assert_valid_pdf(&output.pdf);
    assert!(output
        .warnings
        .iter()
        .any(|w| matches!(w, RenderWarning::ImageSkipped { role, .. } if role == "logo")));
}

#[test]
fn test_parse_error_carries_hint() {
    let err = render_json(r#"{ "patient_data": { "name": "x", } }"#, ReportVariant::Main).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(err.to_string().contains("trailing commas"));
}

// ─── PDF Output Tests ───────────────────────────────────────────

#[test]
fn test_render_main_report_is_valid_pdf() {
    let document = Document::from_json(r#"{ "patient_data": { "name": "Jane Roe" } }"#).unwrap();
    let bytes = render_main_report(&document, &RenderTheme::default()).unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn test_render_history_report_page_count() {
    let document = history_with_cards(30, "Follow up");
    let output = render_report(&document, &RenderTheme::default(), ReportVariant::History, &uncompressed()).unwrap();
    let text = String::from_utf8_lossy(&output.pdf);
    assert!(output.page_count > 1);
    assert!(text.contains(&format!("/Count {}", output.page_count)));
    assert_eq!(text.matches("/Type /Page ").count(), output.page_count);
}

#[test]
fn test_output_is_deterministic() {
    let document = history_with_cards(5, "Stable output");
    let theme = RenderTheme::default();
    let a = render_history_report(&document, &theme).unwrap();
    let b = render_history_report(&document, &theme).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_logo_and_watermark_embedded() {
    let document = Document::from_json(&format!(r#"{{ "logo_data": "{}" }}"#, png_data_uri())).unwrap();
    let output = render_report(&document, &RenderTheme::default(), ReportVariant::Main, &uncompressed()).unwrap();
    assert!(output.warnings.is_empty());
    let text = String::from_utf8_lossy(&output.pdf);
    assert!(text.contains("/Subtype /Image"));
    assert!(text.contains("/SMask"));
    assert!(text.contains("/Im1"));
}

#[test]
fn test_theme_from_json() {
    let theme: RenderTheme = serde_json::from_str(r#"{ "primary": [200, 30, 30] }"#).unwrap();
    assert_eq!(theme.primary, medrender::style::Color(200, 30, 30));
    let output = render_report(&Document::default(), &theme, ReportVariant::Main, &uncompressed()).unwrap();
    let text = String::from_utf8_lossy(&output.pdf);
    assert!(text.contains("0.784 0.118 0.118 rg"));
}
