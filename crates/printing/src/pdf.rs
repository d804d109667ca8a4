use std::fmt::Write as _;

use crate::display::PrintDisplayList;
use crate::job::{FontWeight, ReceiptGeometry};

/// Object numbers of the fixed single-page layout.
const REGULAR_FONT: usize = 1;
const BOLD_FONT: usize = 2;
const CONTENT: usize = 3;
const PAGE: usize = 4;
const PAGES: usize = 5;
const CATALOG: usize = 6;

/// Renders one recorded receipt page as a single-page PDF sized to the paper.
///
/// Device pixels are mapped to points through the geometry's resolution; the
/// page is as tall as the content plus one margin.
pub fn render_receipt_pdf(
    display_list: &PrintDisplayList,
    geometry: &ReceiptGeometry,
    width_px: i32,
) -> Vec<u8> {
    let height_px = display_list.content_bottom() + geometry.margin_px;
    let page_width = geometry.px_to_points(width_px.max(1) as f32);
    let page_height = geometry.px_to_points(height_px.max(1) as f32);
    let content = render_page_stream(display_list, geometry, page_height);

    let objects = [
        font_object("Helvetica"),
        font_object("Helvetica-Bold"),
        format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ),
        format!(
            "<< /Type /Page /Parent {PAGES} 0 R /MediaBox [0 0 {width} {height}] \
             /Resources << /Font << /F1 {REGULAR_FONT} 0 R /F2 {BOLD_FONT} 0 R >> >> \
             /Contents {CONTENT} 0 R >>",
            width = fmt_float(page_width),
            height = fmt_float(page_height),
        ),
        format!("<< /Type /Pages /Count 1 /Kids [{PAGE} 0 R] >>"),
        format!("<< /Type /Catalog /Pages {PAGES} 0 R >>"),
    ];
    write_document(&objects, CATALOG).into_bytes()
}

/// Standard Type 1 face with WinAnsi codes, matching [`encode_text`].
fn font_object(base_font: &str) -> String {
    format!("<< /Type /Font /Subtype /Type1 /BaseFont /{base_font} /Encoding /WinAnsiEncoding >>")
}

/// Numbers `objects` from 1 and appends the cross-reference table and trailer.
///
/// Everything written is ASCII, so string offsets are byte offsets.
fn write_document(objects: &[String], root: usize) -> String {
    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        let _ = write!(out, "{} 0 obj\n{body}\nendobj\n", index + 1);
    }

    let xref_start = out.len();
    let size = objects.len() + 1;
    let _ = write!(out, "xref\n0 {size}\n0000000000 65535 f \n");
    for offset in offsets {
        let _ = write!(out, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        out,
        "trailer\n<< /Size {size} /Root {root} 0 R >>\nstartxref\n{xref_start}\n%%EOF\n"
    );
    out
}

fn render_page_stream(
    display_list: &PrintDisplayList,
    geometry: &ReceiptGeometry,
    page_height: f32,
) -> String {
    let mut stream = String::new();
    for (font, position, text) in display_list.text_runs() {
        if text.trim().is_empty() {
            continue;
        }
        let (resource, height_px) = match font {
            Some(font) if font.weight == FontWeight::Bold => ("F2", font.height_px),
            Some(font) => ("F1", font.height_px),
            None => ("F1", geometry.timestamp_line_px),
        };
        let size = geometry.px_to_points(height_px as f32);
        let x = geometry.px_to_points(position.x as f32);
        let y = page_height - geometry.px_to_points(position.y as f32) - size;
        let _ = writeln!(
            stream,
            "BT\n/{resource} {size} Tf\n1 0 0 1 {x} {y} Tm\n({text}) Tj\nET",
            size = fmt_float(size),
            x = fmt_float(x),
            y = fmt_float(y),
            text = encode_text(text),
        );
    }
    stream
}

fn fmt_float(value: f32) -> String {
    format!("{:.3}", value)
}

/// WinAnsi code for characters outside ASCII and Latin-1 that the encoding carries.
fn win_ansi_extra(ch: char) -> Option<u8> {
    let code = match ch {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(code)
}

/// Encodes `input` as a WinAnsi PDF string literal body.
///
/// Bytes above ASCII are written as octal escapes; characters WinAnsi cannot
/// represent become `?`.
fn encode_text(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '(' | ')' | '\\' => {
                output.push('\\');
                output.push(ch);
            }
            ' '..='~' => output.push(ch),
            '\u{A0}'..='\u{FF}' => {
                let _ = write!(output, "\\{:03o}", ch as u32);
            }
            _ => match win_ansi_extra(ch) {
                Some(code) => {
                    let _ = write!(output, "\\{:03o}", code);
                }
                None => output.push('?'),
            },
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayCommand, Point};
    use crate::job::ReceiptFonts;

    fn receipt() -> PrintDisplayList {
        let fonts = ReceiptFonts::default();
        let mut list = PrintDisplayList::default();
        list.push(DisplayCommand::SelectFont(fonts.task.clone()));
        list.push(DisplayCommand::Text {
            position: Point::new(200, 40),
            text: "Buy (oat) milk".into(),
        });
        list.push(DisplayCommand::SelectFont(fonts.timestamp.clone()));
        list.push(DisplayCommand::Text {
            position: Point::new(20, 124),
            text: "2024-05-01 09:00".into(),
        });
        list.push(DisplayCommand::Text {
            position: Point::new(20, 264),
            text: " ".into(),
        });
        list
    }

    #[test]
    fn pdf_contains_both_lines_in_their_fonts() {
        let geometry = ReceiptGeometry::thermal_80mm();
        let pdf = render_receipt_pdf(&receipt(), &geometry, 639);
        let text = String::from_utf8_lossy(&pdf);
        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(text.contains("/Type /Catalog"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("/F2 "));
        assert!(text.contains("(Buy \\(oat\\) milk) Tj"));
        assert!(text.contains("(2024-05-01 09:00) Tj"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn page_is_sized_to_paper_width() {
        let geometry = ReceiptGeometry::thermal_80mm();
        let pdf = render_receipt_pdf(&receipt(), &geometry, 639);
        let text = String::from_utf8_lossy(&pdf);
        // 639 px at 203 dpi is 226.64 pt; height covers the feed mark plus margin.
        let expected_height = geometry.px_to_points((264 + 20 + 20) as f32);
        let media_box = format!("/MediaBox [0 0 226.640 {:.3}]", expected_height);
        assert!(text.contains(&media_box), "missing {media_box}");
    }

    #[test]
    fn encoding_handles_latin1_win_ansi_and_wide_characters() {
        assert_eq!(encode_text("a\\b"), "a\\\\b");
        assert_eq!(encode_text("café"), "caf\\351");
        assert_eq!(encode_text("5\u{20AC} \u{2013} ok"), "5\\200 \\226 ok");
        assert_eq!(encode_text("任務"), "??");
    }

    #[test]
    fn accented_task_is_written_in_a_win_ansi_font() {
        let fonts = ReceiptFonts::default();
        let mut list = PrintDisplayList::default();
        list.push(DisplayCommand::SelectFont(fonts.task.clone()));
        list.push(DisplayCommand::Text {
            position: Point::new(200, 40),
            text: "Café".into(),
        });
        let pdf = render_receipt_pdf(&list, &ReceiptGeometry::thermal_80mm(), 639);
        let text = String::from_utf8(pdf).unwrap();

        assert!(text.contains(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
        ));
        assert!(text.contains(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
        ));
        assert!(text.contains("/F2 "));
        assert!(text.contains("(Caf\\351) Tj"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let pdf = render_receipt_pdf(&receipt(), &ReceiptGeometry::thermal_80mm(), 639);
        let text = String::from_utf8(pdf).unwrap();
        let xref = text.find("xref\n").unwrap();
        let entries: Vec<usize> = text[xref..]
            .lines()
            .skip(3)
            .take(6)
            .map(|line| line[..10].parse().unwrap())
            .collect();
        assert_eq!(entries.len(), 6);
        for (index, offset) in entries.into_iter().enumerate() {
            assert!(
                text[offset..].starts_with(&format!("{} 0 obj\n", index + 1)),
                "object {} misplaced",
                index + 1
            );
        }
        let start: usize = text
            .lines()
            .skip_while(|line| *line != "startxref")
            .nth(1)
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(start, xref);
    }
}
