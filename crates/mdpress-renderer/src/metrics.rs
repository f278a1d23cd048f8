//! Font metrics and text encoding for the built-in page fonts.
//!
//! Advance widths are the Adobe core-14 AFM values for Helvetica and
//! Helvetica-Bold (thousandths of an em, WinAnsi range). Keeping the tables
//! in the crate avoids shipping font files: the standard fonts are resolved
//! by every PDF viewer.

/// Built-in page font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Font {
    /// Helvetica.
    Regular,
    /// Helvetica-Bold.
    Bold,
}

/// Fallback advance width for characters outside the tables.
const DEFAULT_WIDTH: u16 = 556;

/// Helvetica advance widths for characters 32..=126.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, 556, 556, 556,
    556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, 1015, 667, 667, 722, 722,
    667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222,
    500, 222, 833, 556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334,
    584,
];

/// Helvetica-Bold advance widths for characters 32..=126.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, 556, 556, 556,
    556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, 975, 722, 722, 722, 722, 667,
    611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667,
    667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556,
    278, 889, 611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

impl Font {
    /// Advance width of `ch` in thousandths of an em.
    fn advance(self, ch: char) -> u16 {
        let table = match self {
            Self::Regular => &HELVETICA,
            Self::Bold => &HELVETICA_BOLD,
        };
        let code = ch as u32;
        if (32..=126).contains(&code) {
            table[(code - 32) as usize]
        } else {
            DEFAULT_WIDTH
        }
    }
}

/// Measured width of `text` at `size` points.
pub(crate) fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|ch| u32::from(font.advance(ch))).sum();
    #[allow(clippy::cast_precision_loss)]
    let units = units as f32;
    units / 1000.0 * size
}

/// Encode text as WinAnsi (CP1252) bytes for a content stream.
///
/// ASCII and Latin-1 pass through; the handful of CP1252 punctuation marks
/// common in prose map to their code points; everything else degrades to
/// `'?'` rather than failing the render.
pub(crate) fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars().map(winansi_byte).collect()
}

/// Map one character to its WinAnsi code point.
fn winansi_byte(ch: char) -> u8 {
    match ch {
        '\u{20}'..='\u{7e}' => ch as u8,
        '\u{a0}'..='\u{ff}' => ch as u8,
        '\u{20ac}' => 0x80, // euro sign
        '\u{2018}' => 0x91, // left single quote
        '\u{2019}' => 0x92, // right single quote
        '\u{201c}' => 0x93, // left double quote
        '\u{201d}' => 0x94, // right double quote
        '\u{2022}' => 0x95, // bullet
        '\u{2013}' => 0x96, // en dash
        '\u{2014}' => 0x97, // em dash
        '\u{2026}' => 0x85, // ellipsis
        _ => b'?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_width() {
        assert_eq!(Font::Regular.advance(' '), 278);
        assert_eq!(Font::Bold.advance(' '), 278);
    }

    #[test]
    fn test_bold_is_wider() {
        let regular = text_width("Heading", Font::Regular, 12.0);
        let bold = text_width("Heading", Font::Bold, 12.0);

        assert!(bold > regular);
    }

    #[test]
    fn test_width_scales_with_size() {
        let small = text_width("abc", Font::Regular, 12.0);
        let large = text_width("abc", Font::Regular, 24.0);

        assert!((large - small * 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_encode_ascii_passthrough() {
        assert_eq!(encode_winansi("Hello"), b"Hello");
    }

    #[test]
    fn test_encode_cp1252_punctuation() {
        assert_eq!(encode_winansi("\u{2019}"), vec![0x92]);
        assert_eq!(encode_winansi("\u{2014}"), vec![0x97]);
    }

    #[test]
    fn test_encode_unmappable_degrades() {
        assert_eq!(encode_winansi("\u{4e16}\u{754c}"), b"??");
    }
}
