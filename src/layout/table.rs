//! # Table Rendering
//!
//! Draws a bordered, banded table row by row through a [`PageFlow`].
//!
//! Widths are decided once. Each row is sized before it is drawn and asks the
//! flow for its full height, so a row always lands whole on one page. The
//! header row (and the title above it, if any) is placed as one unit so a
//! title is never stranded at the bottom of a page. Whether the header comes
//! back at the top of continuation pages is the style's `repeat_header`; a
//! row too tall to share a page with the header starts its page alone.

use super::columns::{ColumnWidthAllocator, ColumnWidthStrategy, ColumnWidths};
use super::page_break::PageFlow;
use super::row::RowHeightResolver;
use crate::error::RenderError;
use crate::model::Table;
use crate::style::{Align, Color, FontStyle, Paint, RenderTheme, TableStyle};
use crate::surface::Cell;

/// Height of the optional title line above the header.
pub const TITLE_HEIGHT: f64 = 10.0;

/// Where the table's left edge goes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Anchor {
    /// At the left margin.
    #[default]
    Margin,
    /// Centered in the printable width.
    Center,
    At(f64),
}

/// What a rendered table occupied.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub widths: Vec<f64>,
    pub x: f64,
    /// y of the first header row.
    pub top: f64,
    /// y of the closing rule.
    pub bottom: f64,
    pub first_page: usize,
    pub last_page: usize,
    pub header_height: f64,
    pub rows_drawn: usize,
}

pub struct TableRenderer<'a> {
    theme: &'a RenderTheme,
    style: &'a TableStyle,
    strategy: ColumnWidthStrategy,
    anchor: Anchor,
    title: Option<String>,
    name: String,
}

/// Resolved per-table drawing parameters.
struct Layout {
    x: f64,
    widths: ColumnWidths,
    header_rows: RowHeightResolver,
    data_rows: RowHeightResolver,
    header_height: f64,
}

impl<'a> TableRenderer<'a> {
    pub fn new(theme: &'a RenderTheme, style: &'a TableStyle) -> Self {
        Self {
            theme,
            style,
            strategy: ColumnWidthStrategy::Even,
            anchor: Anchor::Margin,
            title: None,
            name: "table".to_string(),
        }
    }

    pub fn strategy(mut self, strategy: ColumnWidthStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// A heading drawn above the header, kept on the same page as it.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        if !title.is_empty() {
            self.name = title.clone();
            self.title = Some(title);
        }
        self
    }

    /// Name used in log lines and warnings when the table has no title.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Draw `table` at the flow's cursor.
    ///
    /// A table without columns draws nothing and returns an empty summary.
    pub fn render(&self, flow: &mut PageFlow<'_>, table: &Table) -> Result<TableSummary, RenderError> {
        let data_font = self.theme.font(FontStyle::Regular, self.style.data_size);
        let header_font = self.theme.font(FontStyle::Bold, self.style.data_size);

        let printable = flow.geometry().printable_width();
        let allocation =
            ColumnWidthAllocator::new(printable, self.style, data_font).allocate(&self.name, table, &self.strategy);
        for warning in allocation.warnings {
            flow.warn(warning);
        }
        let widths = allocation.widths;

        if widths.is_empty() {
            log::debug!("table '{}' has no columns, skipped", self.name);
            return Ok(TableSummary {
                widths: Vec::new(),
                x: flow.geometry().left(),
                top: flow.y(),
                bottom: flow.y(),
                first_page: flow.page(),
                last_page: flow.page(),
                header_height: 0.0,
                rows_drawn: 0,
            });
        }

        let x = match self.anchor {
            Anchor::Margin => flow.geometry().left(),
            Anchor::Center => flow.geometry().left() + (printable - widths.total()).max(0.0) / 2.0,
            Anchor::At(x) => x,
        };
        let header_rows = RowHeightResolver::for_style(self.style, header_font, self.style.header_leading);
        let data_rows = RowHeightResolver::for_style(self.style, data_font, self.style.data_leading);
        let header_height = header_rows.row_height(table.header(), &widths);
        let layout = Layout {
            x,
            widths,
            header_rows,
            data_rows,
            header_height,
        };

        let title_height = if self.title.is_some() { TITLE_HEIGHT } else { 0.0 };
        flow.ensure_space(title_height + header_height, &format!("{} header", self.name))?;
        if let Some(title) = &self.title {
            self.draw_title(flow, x, title);
        }

        let top = flow.y();
        let first_page = flow.page();
        self.draw_header(flow, &layout, table);

        for (i, cells) in table.rows().iter().enumerate() {
            let height = layout.data_rows.row_height(cells, &layout.widths);
            let element = format!("{} row {}", self.name, i + 1);
            let with_header = header_height + height;

            if self.style.repeat_header
                && flow.cursor().will_overflow(height)
                && with_header <= flow.page_body() + 1e-9
            {
                if flow.ensure_space(with_header, &element)? {
                    self.draw_header(flow, &layout, table);
                }
            } else {
                flow.ensure_space(height, &element)?;
            }

            let fill = if i % 2 == 1 { Some(self.theme.light_accent) } else { None };
            self.draw_row(
                flow,
                &layout,
                cells,
                height,
                &layout.data_rows,
                self.style.align_data,
                fill,
            );
        }

        let bottom = flow.y();
        let surface = flow.surface();
        surface.set_draw_color(self.theme.accent);
        surface.set_line_width(self.theme.border_width);
        surface.line(x, bottom, x + layout.widths.total(), bottom);

        Ok(TableSummary {
            widths: layout.widths.to_vec(),
            x,
            top,
            bottom,
            first_page,
            last_page: flow.page(),
            header_height,
            rows_drawn: table.rows().len(),
        })
    }

    fn draw_title(&self, flow: &mut PageFlow<'_>, x: f64, title: &str) {
        let cell = Cell::new(x, flow.y(), flow.geometry().printable_width(), TITLE_HEIGHT);
        let surface = flow.surface();
        surface.set_font(&self.theme.font(FontStyle::Bold, self.style.title_size));
        surface.set_text_color(self.theme.primary);
        surface.text_cell(&cell, title);
        flow.advance(TITLE_HEIGHT);
    }

    fn draw_header(&self, flow: &mut PageFlow<'_>, layout: &Layout, table: &Table) {
        self.draw_row(
            flow,
            layout,
            table.header(),
            layout.header_height,
            &layout.header_rows,
            self.style.align_header,
            Some(self.theme.primary),
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_row(
        &self,
        flow: &mut PageFlow<'_>,
        layout: &Layout,
        cells: &[String],
        height: f64,
        rows: &RowHeightResolver,
        align: Align,
        fill: Option<Color>,
    ) {
        let y = flow.y();
        let surface = flow.surface();
        surface.set_font(&rows.font);
        surface.set_text_color(self.theme.text);
        surface.set_draw_color(self.theme.text);
        surface.set_line_width(self.theme.border_width);
        if let Some(color) = fill {
            surface.set_fill_color(color);
        }

        let line_pitch = rows.line_pitch;
        let mut cell_x = layout.x;

        for (i, text) in cells.iter().enumerate() {
            let width = layout.widths.get(i);
            let paint = if fill.is_some() { Paint::FillStroke } else { Paint::Stroke };
            surface.rect(cell_x, y, width, height, paint);

            let lines = rows.drawn_lines(text, width);
            let block = lines.len() as f64 * line_pitch;
            let mut line_y = y + ((height - block) / 2.0).max(0.0);
            for line in &lines {
                let cell = Cell::new(cell_x, line_y, width, line_pitch)
                    .align(align)
                    .margin(rows.cell_margin);
                surface.text_cell(&cell, line);
                line_y += line_pitch;
            }
            cell_x += width;
        }

        flow.advance(height);
    }
}
