//! Advance widths of the standard Helvetica faces, in 1/1000 em.

use crate::job::{FontSpec, FontWeight};

/// Widths for ASCII 0x20..=0x7E, Helvetica.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Widths for ASCII 0x20..=0x7E, Helvetica-Bold.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p..~
];

/// Used for characters outside printable ASCII.
const FALLBACK_WIDTH: u16 = 556;

fn advance(ch: char, weight: FontWeight) -> u16 {
    let table = match weight {
        FontWeight::Normal => &HELVETICA,
        FontWeight::Bold => &HELVETICA_BOLD,
    };
    match ch {
        ' '..='~' => table[ch as usize - 0x20],
        _ => FALLBACK_WIDTH,
    }
}

/// Rendered width of `text` in device pixels when set at `font.height_px` per em.
pub fn text_width_px(font: &FontSpec, text: &str) -> i32 {
    let units: u64 = text
        .chars()
        .map(|ch| u64::from(advance(ch, font.weight)))
        .sum();
    let height = u64::try_from(font.height_px.max(0)).unwrap_or(0);
    i32::try_from((units * height).div_ceil(1000)).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_follow_helvetica_metrics() {
        let regular = FontSpec::new("Arial", 20, FontWeight::Normal);
        // a b c d = 556 + 556 + 500 + 556 units.
        assert_eq!(text_width_px(&regular, "abcd"), 44);
        assert_eq!(text_width_px(&regular, ""), 0);
    }

    #[test]
    fn narrow_and_wide_glyphs_differ() {
        let font = FontSpec::new("Arial", 100, FontWeight::Normal);
        assert_eq!(text_width_px(&font, "iiii"), 89);
        assert_eq!(text_width_px(&font, "WWWW"), 378);
    }

    #[test]
    fn bold_is_wider_than_regular() {
        let regular = FontSpec::new("Arial", 44, FontWeight::Normal);
        let bold = FontSpec::new("Arial", 44, FontWeight::Bold);
        assert!(text_width_px(&bold, "Buy milk") > text_width_px(&regular, "Buy milk"));
    }

    #[test]
    fn non_ascii_uses_average_advance() {
        let font = FontSpec::new("Arial", 10, FontWeight::Normal);
        assert_eq!(text_width_px(&font, "é任"), 12);
    }
}
