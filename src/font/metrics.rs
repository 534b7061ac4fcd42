//! Advance widths for the standard PDF fonts the engine draws with.
//!
//! Widths are in 1/1000 em, taken from the Adobe AFM files for printable
//! ASCII (0x20-0x7E). Characters outside that range use the width of a digit,
//! which keeps measurement deterministic for Latin-1 text without shipping
//! the full WinAnsi tables.

/// Helvetica (and Helvetica-Oblique), 0x20..=0x7E.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold (and Helvetica-BoldOblique), 0x20..=0x7E.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

const FALLBACK_WIDTH: u16 = 556;
const COURIER_WIDTH: u16 = 600;

/// Width table for one standard face.
#[derive(Debug, Clone, Copy)]
pub enum StandardFontMetrics {
    Proportional(&'static [u16; 95]),
    Monospace(u16),
}

impl StandardFontMetrics {
    pub const HELVETICA: Self = Self::Proportional(&HELVETICA);
    pub const HELVETICA_BOLD: Self = Self::Proportional(&HELVETICA_BOLD);
    pub const COURIER: Self = Self::Monospace(COURIER_WIDTH);

    /// Advance width in 1/1000 em.
    pub fn advance(&self, ch: char) -> u16 {
        match self {
            Self::Monospace(w) => *w,
            Self::Proportional(table) => {
                let cp = ch as u32;
                if (0x20..=0x7E).contains(&cp) {
                    table[(cp - 0x20) as usize]
                } else {
                    FALLBACK_WIDTH
                }
            }
        }
    }

    /// Advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.advance(ch) as f64 * font_size / 1000.0
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        let units: u32 = text.chars().map(|ch| self.advance(ch) as u32).sum();
        units as f64 * font_size / 1000.0
    }
}
