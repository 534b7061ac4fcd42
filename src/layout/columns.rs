//! # Column Widths
//!
//! Decides the width of every column of a table, once, before the first row
//! is drawn. Whatever the strategy, the widths never sum past the printable
//! width: an over-wide result is scaled down proportionally and reported.

use crate::error::RenderWarning;
use crate::model::Table;
use crate::style::{FontSpec, TableStyle};
use crate::text::TextMetrics;
use serde::{Deserialize, Serialize};

/// How column widths are chosen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum ColumnWidthStrategy {
    /// Printable width split evenly, minus the gutter.
    #[default]
    Even,
    /// Widest unwrapped line in each column, capped at the printable width,
    /// plus padding.
    ContentFit,
    /// One width per column. A list of the wrong length falls back to `Even`.
    Explicit(Vec<f64>),
    /// The same width for every column.
    Fixed(f64),
}

/// Allocated widths. Callers index through [`ColumnWidths::get`] and never
/// need to care which shape they got.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnWidths {
    Uniform { width: f64, count: usize },
    PerColumn(Vec<f64>),
}

impl ColumnWidths {
    pub fn get(&self, index: usize) -> f64 {
        match self {
            ColumnWidths::Uniform { width, count } if index < *count => *width,
            ColumnWidths::Uniform { .. } => 0.0,
            ColumnWidths::PerColumn(widths) => widths.get(index).copied().unwrap_or(0.0),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnWidths::Uniform { count, .. } => *count,
            ColumnWidths::PerColumn(widths) => widths.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total(&self) -> f64 {
        match self {
            ColumnWidths::Uniform { width, count } => width * *count as f64,
            ColumnWidths::PerColumn(widths) => widths.iter().sum(),
        }
    }

    pub fn to_vec(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    fn scaled(&self, factor: f64) -> Self {
        match self {
            ColumnWidths::Uniform { width, count } => ColumnWidths::Uniform {
                width: width * factor,
                count: *count,
            },
            ColumnWidths::PerColumn(widths) => {
                ColumnWidths::PerColumn(widths.iter().map(|w| w * factor).collect())
            }
        }
    }
}

/// Widths plus whatever had to be corrected to produce them.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub widths: ColumnWidths,
    pub warnings: Vec<RenderWarning>,
}

pub struct ColumnWidthAllocator<'a> {
    pub printable_width: f64,
    pub style: &'a TableStyle,
    /// Font cell text is measured in.
    pub font: FontSpec,
    pub metrics: TextMetrics,
}

impl<'a> ColumnWidthAllocator<'a> {
    pub fn new(printable_width: f64, style: &'a TableStyle, font: FontSpec) -> Self {
        Self {
            printable_width,
            style,
            font,
            metrics: TextMetrics::new(),
        }
    }

    pub fn allocate(&self, name: &str, table: &Table, strategy: &ColumnWidthStrategy) -> Allocation {
        let count = table.column_count();
        let mut warnings = Vec::new();

        if count == 0 {
            return Allocation {
                widths: ColumnWidths::Uniform { width: 0.0, count: 0 },
                warnings,
            };
        }

        let widths = match strategy {
            ColumnWidthStrategy::Even => self.even(count),
            ColumnWidthStrategy::Fixed(width) if width.is_finite() && *width > 0.0 => {
                ColumnWidths::Uniform { width: *width, count }
            }
            ColumnWidthStrategy::Fixed(width) => {
                log::warn!("table '{}': unusable fixed width {}, using even widths", name, width);
                self.even(count)
            }
            ColumnWidthStrategy::Explicit(widths) => {
                let usable = widths.iter().all(|w| w.is_finite() && *w >= 0.0);
                if widths.len() == count && usable {
                    ColumnWidths::PerColumn(widths.clone())
                } else {
                    log::warn!(
                        "table '{}': {} explicit widths for {} columns, using even widths",
                        name,
                        widths.len(),
                        count
                    );
                    warnings.push(RenderWarning::WidthFallback {
                        table: name.to_string(),
                        supplied: widths.len(),
                        columns: count,
                    });
                    self.even(count)
                }
            }
            ColumnWidthStrategy::ContentFit => self.content_fit(table),
        };

        let total = widths.total();
        let widths = if total > self.printable_width + 1e-6 && total > 0.0 {
            log::warn!(
                "table '{}': column widths total {:.1}mm, scaling to {:.1}mm",
                name,
                total,
                self.printable_width
            );
            warnings.push(RenderWarning::WidthScaled {
                table: name.to_string(),
                total,
                available: self.printable_width,
            });
            widths.scaled(self.printable_width / total)
        } else {
            widths
        };

        log::debug!("table '{}': widths {:?}", name, widths.to_vec());
        Allocation { widths, warnings }
    }

    fn even(&self, count: usize) -> ColumnWidths {
        let width = (self.printable_width / count as f64 - self.style.gutter).max(0.0);
        ColumnWidths::Uniform { width, count }
    }

    fn content_fit(&self, table: &Table) -> ColumnWidths {
        let natural = |text: &str| self.metrics.natural_width(text, &self.font).min(self.printable_width);
        let widths = (0..table.column_count())
            .map(|col| {
                let header = natural(&table.header()[col]);
                let widest = table
                    .rows()
                    .iter()
                    .map(|row| natural(&row[col]))
                    .fold(header, f64::max);
                widest + self.style.content_padding
            })
            .collect();
        ColumnWidths::PerColumn(widths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{FontFamily, FontStyle};

    fn table(header: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            header.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    fn advice() -> Table {
        table(
            &["S.No.", "Medicine Name", "Dosage", "Details"],
            &[&["1", "Medicine A", "2", "Take with food"]],
        )
    }

    fn font() -> FontSpec {
        FontSpec::new(FontFamily::Helvetica, FontStyle::Regular, 10.0)
    }

    #[test]
    fn even_splits_printable_width_minus_gutter() {
        let style = TableStyle::reference();
        let alloc = ColumnWidthAllocator::new(190.0, &style, font());
        let result = alloc.allocate("advice", &advice(), &ColumnWidthStrategy::Even);
        assert_eq!(result.widths, ColumnWidths::Uniform { width: 46.5, count: 4 });
        assert!(result.widths.total() <= 190.0);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn explicit_with_wrong_count_falls_back_to_even() {
        let style = TableStyle::reference();
        let alloc = ColumnWidthAllocator::new(190.0, &style, font());
        let result = alloc.allocate(
            "advice",
            &advice(),
            &ColumnWidthStrategy::Explicit(vec![20.0, 60.0, 40.0]),
        );
        assert_eq!(result.widths, ColumnWidths::Uniform { width: 46.5, count: 4 });
        assert!(matches!(
            result.warnings[0],
            RenderWarning::WidthFallback { supplied: 3, columns: 4, .. }
        ));
    }

    #[test]
    fn explicit_is_verbatim() {
        let style = TableStyle::reference();
        let alloc = ColumnWidthAllocator::new(190.0, &style, font());
        let widths = vec![15.0, 70.0, 35.0, 70.0];
        let result = alloc.allocate("advice", &advice(), &ColumnWidthStrategy::Explicit(widths.clone()));
        assert_eq!(result.widths, ColumnWidths::PerColumn(widths));
    }

    #[test]
    fn over_wide_widths_are_scaled() {
        let style = TableStyle::reference();
        let alloc = ColumnWidthAllocator::new(190.0, &style, font());
        let result = alloc.allocate("advice", &advice(), &ColumnWidthStrategy::Fixed(95.0));
        assert!((result.widths.total() - 190.0).abs() < 1e-9);
        assert!((result.widths.get(0) - 47.5).abs() < 1e-9);
        assert!(matches!(result.warnings[0], RenderWarning::WidthScaled { .. }));
    }

    #[test]
    fn zero_columns_zero_width() {
        let style = TableStyle::reference();
        let alloc = ColumnWidthAllocator::new(190.0, &style, font());
        let empty = table(&[], &[]);
        let result = alloc.allocate("empty", &empty, &ColumnWidthStrategy::Even);
        assert!(result.widths.is_empty());
        assert_eq!(result.widths.total(), 0.0);
    }

    #[test]
    fn content_fit_adds_padding_to_widest() {
        let style = TableStyle::reference();
        let alloc = ColumnWidthAllocator::new(190.0, &style, font());
        let t = table(&["A", "B"], &[&["Paracetamol", "1"]]);
        let result = alloc.allocate("t", &t, &ColumnWidthStrategy::ContentFit);
        let m = TextMetrics::new();
        let expected = m.measure("Paracetamol", &font()) + style.content_padding;
        assert!((result.widths.get(0) - expected).abs() < 1e-9);
    }

    #[test]
    fn content_fit_grows_with_longest_unwrapped_cell() {
        let style = TableStyle::compact();
        let alloc = ColumnWidthAllocator::new(190.0, &style, font());
        let mut previous = 0.0;
        for len in [1, 5, 10, 20, 40, 80] {
            let cell = "m".repeat(len);
            let t = table(&["Medicine"], &[&[cell.as_str()]]);
            let width = alloc
                .allocate("t", &t, &ColumnWidthStrategy::ContentFit)
                .widths
                .get(0);
            assert!(width >= previous, "{len}: {width} < {previous}");
            previous = width;
        }
    }

    #[test]
    fn content_fit_is_monotonic_across_char_limit_boundaries() {
        let style = TableStyle::reference();
        let alloc = ColumnWidthAllocator::new(190.0, &style, font());
        let mut previous = 0.0;
        for len in 1..=60 {
            let cell = "Paracetamol 500mg twice daily after meals for five days"
                .chars()
                .cycle()
                .take(len)
                .collect::<String>();
            let t = table(&["Details"], &[&[cell.as_str()]]);
            let width = alloc
                .allocate("t", &t, &ColumnWidthStrategy::ContentFit)
                .widths
                .get(0);
            assert!(width >= previous - 1e-9, "{len}: {width} < {previous}");
            previous = width;
        }
    }

    #[test]
    fn content_fit_caps_a_column_at_the_printable_width() {
        let style = TableStyle::reference();
        let alloc = ColumnWidthAllocator::new(190.0, &style, font());
        let long = "word ".repeat(80);
        let t = table(&["Notes"], &[&[long.as_str()]]);
        let result = alloc.allocate("t", &t, &ColumnWidthStrategy::ContentFit);
        assert!((result.widths.get(0) - 190.0).abs() < 1e-9);
        assert!(matches!(result.warnings[0], RenderWarning::WidthScaled { .. }));
    }

    #[test]
    fn uniform_and_per_column_read_the_same() {
        let uniform = ColumnWidths::Uniform { width: 10.0, count: 3 };
        let per = ColumnWidths::PerColumn(vec![10.0, 10.0, 10.0]);
        assert_eq!(uniform.to_vec(), per.to_vec());
        assert_eq!(uniform.get(5), 0.0);
    }
}
