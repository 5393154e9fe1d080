//! Property tests for line breaking and string escaping.

use pdf_slate::writer::{break_lines, escape_literal, string_width, Align, BreakKind, Cell};
use pdf_slate::{Document, DocumentConfig, Unit};
use proptest::prelude::*;

/// Undo literal string escaping.
fn unescape(escaped: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(escaped.len());
    let mut bytes = escaped.iter();
    while let Some(&b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match bytes.next() {
            Some(b'n') => out.push(b'\n'),
            Some(b'r') => out.push(b'\r'),
            Some(b't') => out.push(b'\t'),
            Some(&other) => out.push(other),
            None => panic!("dangling escape"),
        }
    }
    out
}

/// Whether every `(` and `)` in an escaped string is preceded by a backslash.
fn parens_escaped(escaped: &[u8]) -> bool {
    let mut i = 0;
    while i < escaped.len() {
        match escaped[i] {
            b'\\' => i += 2,
            b'(' | b')' => return false,
            _ => i += 1,
        }
    }
    true
}

proptest! {
    #[test]
    fn escaping_is_invertible(data in proptest::collection::vec(any::<u8>(), 0..200)) {
        let escaped = escape_literal(&data);
        prop_assert!(parens_escaped(&escaped));
        prop_assert_eq!(unescape(&escaped), data);
    }

    #[test]
    fn lines_reassemble_input(text in "[a-z \n]{0,120}", width in 1.0f64..80.0) {
        let lines = break_lines(&text, width, 10.0);
        let rebuilt: String = lines
            .iter()
            .map(|line| format!("{}{}", line.text(&text), line.kind.separator()))
            .collect();
        prop_assert_eq!(rebuilt, text);
        prop_assert_eq!(lines.last().map(|l| l.kind), Some(BreakKind::End));
    }

    #[test]
    fn lines_fit_unless_forced(text in "[a-zA-Z0-9 .,\n]{1,200}", width in 1.0f64..120.0) {
        let font_size = 12.0;
        for line in break_lines(&text, width, font_size) {
            let line_text = line.text(&text);
            let forced = line.kind == BreakKind::Hard && line_text.chars().count() == 1;
            prop_assert!(forced || line.width <= width + 1e-9, "{:?} exceeds {}", line_text, width);
            prop_assert!((line.width - string_width(line_text, font_size)).abs() < 1e-9);
            prop_assert!(!line_text.contains('\n'));
        }
    }

    #[test]
    fn multi_cell_never_panics(text in "\\PC{0,300}", width in 0.0f64..200.0) {
        let mut doc = Document::new(DocumentConfig::new().with_unit(Unit::Point)).unwrap();
        doc.add_page().unwrap();
        doc.multi_cell(Cell::new(width, 12.0, text).border(1).align(Align::Justify)).unwrap();
        prop_assert!(doc.output_bytes().unwrap().ends_with(b"%%EOF"));
    }
}

#[test]
fn test_justified_long_sentence() {
    let sentence = "The quick brown fox jumps over the lazy dog while the booking \
                    engine prints a confirmation that is far too long for one line";
    let width = 60.0;
    let lines = break_lines(sentence, width, 4.0);
    assert!(lines.len() >= 2);
    for line in &lines {
        assert!(line.width <= width);
    }
    let first = &lines[0];
    assert_eq!(first.kind, BreakKind::Space);
    assert!(first.justify_spacing(width) >= 0.0);
    let stretched = first.width + first.justify_spacing(width) * first.spaces as f64;
    assert!((stretched - width).abs() < 1e-9);

    let mut doc = Document::new(DocumentConfig::new()).unwrap();
    doc.add_page().unwrap();
    doc.set_font("times", "", 11.0).unwrap();
    doc.multi_cell(Cell::new(60.0, 5.0, sentence).align(Align::Justify)).unwrap();
    let text = String::from_utf8_lossy(&doc.output_bytes().unwrap()).to_string();
    let tw: Vec<&str> = text.lines().filter(|l| l.ends_with(" Tw")).collect();
    assert!(tw.len() >= 2);
    assert_eq!(tw.last(), Some(&"0.000 Tw"));
}

#[test]
fn test_trailing_newline_prints_empty_line() {
    let lines = break_lines("Total due\n", 100.0, 10.0);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].start, lines[1].end);
}
