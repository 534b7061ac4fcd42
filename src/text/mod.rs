//! # Text Measurement
//!
//! Width measurement, wrapped-line estimation, and greedy word wrapping.
//!
//! Row and card heights come from [`TextMetrics::wrapped_line_count`], floored
//! by the line count of the greedy [`TextMetrics::wrap`] that draws the text,
//! so a box is never shorter than what is drawn in it. Column widths use
//! [`TextMetrics::natural_width`], which does not depend on wrapping.

use crate::font::StandardFont;
use crate::model::POINTS_PER_MM;
use crate::style::FontSpec;
use serde::{Deserialize, Serialize};

/// How many lines a paragraph is assumed to occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineEstimate {
    /// `ceil(measured width / available width)`.
    Measured,
    /// `chars / n + 1`, independent of the available width.
    CharLimit(usize),
}

/// Pure text measurement over the standard font tables.
///
/// All widths are in layout units (millimetres).
#[derive(Debug, Clone, Copy, Default)]
pub struct TextMetrics;

impl TextMetrics {
    pub fn new() -> Self {
        Self
    }

    /// Rendered width of `text` on a single line.
    pub fn measure(&self, text: &str, font: &FontSpec) -> f64 {
        StandardFont::for_spec(font)
            .metrics()
            .measure_string(text, font.size)
            / POINTS_PER_MM
    }

    /// Estimated number of lines `text` wraps to inside `available_width`.
    ///
    /// Explicit line breaks are honored first; every paragraph, including an
    /// empty one, counts for at least one line.
    pub fn wrapped_line_count(
        &self,
        text: &str,
        available_width: f64,
        font: &FontSpec,
        estimate: LineEstimate,
    ) -> usize {
        text.split('\n')
            .map(|paragraph| {
                let paragraph = paragraph.trim_end_matches('\r');
                self.paragraph_line_count(paragraph, available_width, font, estimate)
            })
            .sum::<usize>()
            .max(1)
    }

    fn paragraph_line_count(
        &self,
        paragraph: &str,
        available_width: f64,
        font: &FontSpec,
        estimate: LineEstimate,
    ) -> usize {
        match estimate {
            LineEstimate::CharLimit(0) => 1,
            LineEstimate::CharLimit(limit) => paragraph.chars().count() / limit + 1,
            LineEstimate::Measured => {
                if paragraph.trim().is_empty() || available_width <= 0.0 {
                    return 1;
                }
                let ratio = self.measure(paragraph, font) / available_width;
                // Tolerate float noise when the text fills an exact number of lines.
                ((ratio - 1e-9).ceil() as usize).max(1)
            }
        }
    }

    /// Width of the widest explicit line of `text`, unwrapped.
    pub fn natural_width(&self, text: &str, font: &FontSpec) -> f64 {
        text.split('\n')
            .map(|paragraph| self.measure(paragraph.trim_end_matches('\r'), font))
            .fold(0.0, f64::max)
    }

    /// Break `text` into drawn lines no wider than `width`.
    ///
    /// Words wider than `width` are split between characters. Always returns
    /// at least one (possibly empty) line.
    pub fn wrap(&self, text: &str, width: f64, font: &FontSpec) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let paragraph = paragraph.trim_end_matches('\r');
            self.wrap_paragraph(paragraph, width, font, &mut lines);
        }
        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }

    fn wrap_paragraph(&self, paragraph: &str, width: f64, font: &FontSpec, out: &mut Vec<String>) {
        let space = self.measure(" ", font);
        let mut line = String::new();
        let mut line_width = 0.0;

        for word in paragraph.split_whitespace() {
            let word_width = self.measure(word, font);

            if !line.is_empty() && line_width + space + word_width <= width {
                line.push(' ');
                line.push_str(word);
                line_width += space + word_width;
                continue;
            }

            if !line.is_empty() {
                out.push(std::mem::take(&mut line));
                line_width = 0.0;
            }

            if word_width <= width {
                line.push_str(word);
                line_width = word_width;
                continue;
            }

            // Hard-break an over-long word.
            for ch in word.chars() {
                let ch_width = self.measure(ch.encode_utf8(&mut [0; 4]), font);
                if !line.is_empty() && line_width + ch_width > width {
                    out.push(std::mem::take(&mut line));
                    line_width = 0.0;
                }
                line.push(ch);
                line_width += ch_width;
            }
        }

        out.push(line);
    }
}
