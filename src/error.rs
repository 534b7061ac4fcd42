//! Structured error and warning types for the report engine.
//!
//! Fatal conditions are [`RenderError`]s. Conditions the engine recovers from
//! (an image that would not load, a width strategy that had to fall back, an
//! element taller than a page) are collected as [`RenderWarning`]s and
//! returned alongside the PDF.

use std::fmt;
use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum RenderError {
    /// JSON input failed to parse as a report request.
    #[error("failed to parse request: {source}{}", fmt_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A table row does not have as many cells as the header.
    #[error("table '{table}' row {row} has {found} cells, expected {expected}")]
    MalformedTable {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// An atomic element is taller than a full page body (strict mode only).
    #[error("{element} is {height:.1}mm tall but a page body holds {available:.1}mm (page {page})")]
    LayoutOverflow {
        element: String,
        height: f64,
        available: f64,
        page: usize,
    },

    #[error("image error: {0}")]
    Image(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn fmt_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

/// Coarse error classification for callers mapping errors onto transport
/// responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is wrong; retrying will not help.
    InvalidInput,
    Layout,
    Image,
    Io,
}

impl RenderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::Parse { .. } | RenderError::MalformedTable { .. } => ErrorKind::InvalidInput,
            RenderError::LayoutOverflow { .. } => ErrorKind::Layout,
            RenderError::Image(_) => ErrorKind::Image,
            RenderError::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but does not match the report request shape. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => "Unexpected end of input. Is the JSON truncated?".to_string(),
            serde_json::error::Category::Io => String::new(),
        };
        RenderError::Parse { source: e, hint }
    }
}

/// A condition the engine recovered from while rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderWarning {
    /// An image source could not be loaded; its region was left empty.
    ImageSkipped { role: String, reason: String },
    /// An element taller than the page body was placed anyway.
    Overflow {
        element: String,
        height: f64,
        available: f64,
        page: usize,
    },
    /// An `Explicit` width list did not match the column count.
    WidthFallback {
        table: String,
        supplied: usize,
        columns: usize,
    },
    /// Column widths exceeded the printable width and were scaled down.
    WidthScaled { table: String, total: f64, available: f64 },
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderWarning::ImageSkipped { role, reason } => {
                write!(f, "{role} image skipped: {reason}")
            }
            RenderWarning::Overflow {
                element,
                height,
                available,
                page,
            } => write!(
                f,
                "{element} ({height:.1}mm) does not fit a {available:.1}mm page body; placed on page {page} anyway"
            ),
            RenderWarning::WidthFallback {
                table,
                supplied,
                columns,
            } => write!(
                f,
                "table '{table}': {supplied} explicit widths for {columns} columns, using even widths"
            ),
            RenderWarning::WidthScaled {
                table,
                total,
                available,
            } => write!(
                f,
                "table '{table}': column widths total {total:.1}mm, scaled to {available:.1}mm"
            ),
        }
    }
}
