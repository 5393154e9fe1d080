//! Single-line cells and word-wrapped text blocks.
//!
//! [`Document::cell`] prints one line of text inside an optionally bordered
//! and filled box. [`Document::multi_cell`] breaks text into lines with
//! [`break_lines`] and prints each line as a cell.

use super::content_stream::ContentStreamOp;
use super::document::{Document, PaintStyle};
use super::font_manager::{char_width, string_width};
use crate::error::{Error, Result};

/// Horizontal alignment of text inside a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    /// Left, after the cell margin
    #[default]
    Left,
    /// Centered
    Center,
    /// Right, before the cell margin
    Right,
    /// Justified (word-wrapped blocks only; single cells place it like `Left`)
    Justify,
}

/// Where the cursor goes after a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineFlow {
    /// To the right of the cell
    #[default]
    Right,
    /// To the start of the next line
    NextLine,
    /// Below the cell, same abscissa
    Below,
}

impl From<u8> for LineFlow {
    fn from(ln: u8) -> Self {
        match ln {
            0 => LineFlow::Right,
            1 => LineFlow::NextLine,
            _ => LineFlow::Below,
        }
    }
}

/// Cell border.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Border {
    /// No border
    #[default]
    None,
    /// A closed box
    Full,
    /// Individual sides, each drawn as its own segment
    Sides {
        /// Left side
        left: bool,
        /// Top side
        top: bool,
        /// Right side
        right: bool,
        /// Bottom side
        bottom: bool,
    },
}

impl Border {
    fn sides(self) -> (bool, bool, bool, bool) {
        match self {
            Border::None => (false, false, false, false),
            Border::Full => (true, true, true, true),
            Border::Sides { left, top, right, bottom } => (left, top, right, bottom),
        }
    }

    fn is_none(self) -> bool {
        self.sides() == (false, false, false, false)
    }
}

impl From<&str> for Border {
    /// `"0"` or `""` is no border, `"1"` a full box, otherwise any
    /// combination of `L`, `T`, `R` and `B`.
    fn from(value: &str) -> Self {
        match value {
            "" | "0" => Border::None,
            "1" => Border::Full,
            _ => {
                let upper = value.to_ascii_uppercase();
                Border::Sides {
                    left: upper.contains('L'),
                    top: upper.contains('T'),
                    right: upper.contains('R'),
                    bottom: upper.contains('B'),
                }
            },
        }
    }
}

impl From<u8> for Border {
    fn from(border: u8) -> Self {
        if border == 0 {
            Border::None
        } else {
            Border::Full
        }
    }
}

/// A cell to print: its box, its text and how it is laid out.
///
/// ```
/// use pdf_slate::writer::{Align, Cell, LineFlow};
///
/// let cell = Cell::new(0.0, 8.0, "Total").border("B").align(Align::Right).ln(LineFlow::NextLine);
/// assert_eq!(cell.align, Align::Right);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Width in user units; 0 extends to the right margin
    pub width: f64,
    /// Height in user units (line height for blocks)
    pub height: f64,
    /// Text
    pub text: String,
    /// Border
    pub border: Border,
    /// Cursor movement afterwards (ignored by blocks)
    pub ln: LineFlow,
    /// Text alignment
    pub align: Align,
    /// Paint the background with the fill color
    pub fill: bool,
    /// URI opened when the text is clicked
    pub link: Option<String>,
}

impl Cell {
    /// A borderless, unfilled, left-aligned cell.
    pub fn new(width: f64, height: f64, text: impl Into<String>) -> Self {
        Self {
            width,
            height,
            text: text.into(),
            border: Border::None,
            ln: LineFlow::Right,
            align: Align::Left,
            fill: false,
            link: None,
        }
    }

    /// Set the border.
    pub fn border(mut self, border: impl Into<Border>) -> Self {
        self.border = border.into();
        self
    }

    /// Set where the cursor goes afterwards.
    pub fn ln(mut self, ln: impl Into<LineFlow>) -> Self {
        self.ln = ln.into();
        self
    }

    /// Set the alignment.
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Paint the background.
    pub fn fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    /// Make the text a link to `uri`.
    pub fn link(mut self, uri: impl Into<String>) -> Self {
        self.link = Some(uri.into());
        self
    }
}

/// Why a line ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    /// At an explicit newline, which is consumed
    Newline,
    /// At a space, which is consumed
    Space,
    /// Inside a word that does not fit
    Hard,
    /// At the end of the text
    End,
}

impl BreakKind {
    /// The input consumed by the break.
    pub fn separator(self) -> &'static str {
        match self {
            BreakKind::Newline => "\n",
            BreakKind::Space => " ",
            BreakKind::Hard | BreakKind::End => "",
        }
    }
}

/// One line of a word-wrapped block.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSegment {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character (separator excluded)
    pub end: usize,
    /// How the line ended
    pub kind: BreakKind,
    /// Width of the line's text in user units
    pub width: f64,
    /// Spaces inside the line's text
    pub spaces: usize,
}

impl LineSegment {
    /// The line's text.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Word spacing that stretches the line to `max_width` (0 with fewer
    /// than two words).
    pub fn justify_spacing(&self, max_width: f64) -> f64 {
        if self.spaces > 0 {
            (max_width - self.width) / self.spaces as f64
        } else {
            0.0
        }
    }
}

/// Greedy line breaking.
///
/// Lines end at newlines, at the last space before the text overflows
/// `max_width`, or, for a word longer than the line, right before the
/// overflowing character (a line always takes at least one character). The
/// text after the last break is always returned, even when empty.
pub fn break_lines(text: &str, max_width: f64, font_size: f64) -> Vec<LineSegment> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let byte_at = |i: usize| chars.get(i).map_or(text.len(), |&(pos, _)| pos);
    // Widths are compared in thousandths of the font size.
    let wmax = if font_size > 0.0 {
        max_width * 1000.0 / font_size
    } else {
        f64::INFINITY
    };

    let mut lines = Vec::new();
    let mut push = |start: usize, end: usize, kind: BreakKind| {
        let (start, end) = (byte_at(start), byte_at(end));
        let line = &text[start..end];
        lines.push(LineSegment {
            start,
            end,
            kind,
            width: string_width(line, font_size),
            spaces: line.matches(' ').count(),
        });
    };

    let mut sep: Option<usize> = None;
    let (mut i, mut j) = (0, 0);
    let mut l = 0.0;

    while i < chars.len() {
        let c = chars[i].1;
        if c == '\n' {
            push(j, i, BreakKind::Newline);
            i += 1;
            sep = None;
            j = i;
            l = 0.0;
            continue;
        }
        if c == ' ' {
            sep = Some(i);
        }
        l += char_width(c);
        if l > wmax {
            match sep {
                None => {
                    if i == j {
                        i += 1;
                    }
                    push(j, i, BreakKind::Hard);
                },
                Some(space) => {
                    push(j, space, BreakKind::Space);
                    i = space + 1;
                },
            }
            sep = None;
            j = i;
            l = 0.0;
        } else {
            i += 1;
        }
    }
    push(j, i, BreakKind::End);
    lines
}

impl Document {
    /// Print a single-line cell at the cursor.
    ///
    /// Breaks the page first when the cell would cross the page-break
    /// trigger (never from inside a header or footer).
    pub fn cell(&mut self, cell: Cell) -> Result<()> {
        self.ensure_drawable()?;
        let k = self.gs.k;
        let h = cell.height;

        if self.needs_page_break(h) {
            let x = self.gs.x;
            let ws = self.gs.word_spacing;
            if ws > 0.0 {
                self.gs.word_spacing = 0.0;
                self.op(ContentStreamOp::SetWordSpacing(0.0));
            }
            self.add_page_with_orientation(self.current_orientation())?;
            self.gs.x = x;
            if ws > 0.0 {
                self.gs.word_spacing = ws;
                self.op(ContentStreamOp::SetWordSpacing(ws * k));
            }
        }

        let w = if cell.width == 0.0 {
            self.page_w - self.r_margin - self.gs.x
        } else {
            cell.width
        };
        let (x, y) = (self.gs.x, self.gs.y);
        let page_h = self.page_h;

        if cell.fill || cell.border == Border::Full {
            let style = match (cell.fill, cell.border == Border::Full) {
                (true, true) => PaintStyle::FillStroke,
                (true, false) => PaintStyle::Fill,
                _ => PaintStyle::Stroke,
            };
            if let Some(canvas) = self.canvas() {
                style.paint(canvas.rect(x * k, (page_h - y) * k, w * k, -h * k));
            }
        }
        if let Border::Sides { left, top, right, bottom } = cell.border {
            let (x0, x1) = (x * k, (x + w) * k);
            let (top_y, bottom_y) = ((page_h - y) * k, (page_h - (y + h)) * k);
            let sides = [
                (left, (x0, top_y), (x0, bottom_y)),
                (top, (x0, top_y), (x1, top_y)),
                (right, (x1, top_y), (x1, bottom_y)),
                (bottom, (x0, bottom_y), (x1, bottom_y)),
            ];
            if let Some(canvas) = self.canvas() {
                for (_, from, to) in sides.into_iter().filter(|side| side.0) {
                    canvas.move_to(from.0, from.1).line_to(to.0, to.1).stroke();
                }
            }
        }

        if !cell.text.is_empty() {
            let font_size = self.gs.font_size();
            let text_width = self.string_width(&cell.text);
            let dx = match cell.align {
                Align::Right => w - self.c_margin - text_width,
                Align::Center => (w - text_width) / 2.0,
                Align::Left | Align::Justify => self.c_margin,
            };
            let baseline = y + 0.5 * h + 0.3 * font_size;

            let colored = self.gs.text_color_differs();
            if colored {
                self.op(ContentStreamOp::SaveState);
                self.op(self.gs.text_color.fill_op());
            }
            if let Some(canvas) = self.canvas() {
                canvas.text(&cell.text, (x + dx) * k, (page_h - baseline) * k);
            }
            if self.gs.underline {
                self.underline(x + dx, baseline, &cell.text);
            }
            if colored {
                self.op(ContentStreamOp::RestoreState);
            }

            if let Some(uri) = &cell.link {
                let top = y + 0.5 * h - 0.5 * font_size;
                let page_h_pt = self.page_height_pt();
                let rect = [
                    (x + dx) * k,
                    page_h_pt - top * k,
                    (x + dx + text_width) * k,
                    page_h_pt - (top + font_size) * k,
                ];
                self.add_link(rect, uri);
            }
        }

        self.gs.last_height = h;
        match cell.ln {
            LineFlow::Right => self.gs.x += w,
            LineFlow::NextLine => {
                self.gs.y += h;
                self.gs.x = self.l_margin;
            },
            LineFlow::Below => self.gs.y += h,
        }
        Ok(())
    }

    /// Filled bar under text whose baseline is at `y`.
    fn underline(&mut self, x: f64, y: f64, text: &str) {
        // Base-14 underline position and thickness, in thousandths of the size.
        const POSITION: f64 = -100.0;
        const THICKNESS: f64 = 50.0;

        let k = self.gs.k;
        let font_size = self.gs.font_size();
        let spaces = text.matches(' ').count() as f64;
        let width = self.string_width(text) + self.gs.word_spacing * spaces;
        let bar_y = (self.page_h - (y - POSITION / 1000.0 * font_size)) * k;
        let thickness = -THICKNESS / 1000.0 * self.gs.font.size_pt;
        if let Some(canvas) = self.canvas() {
            canvas.rect(x * k, bar_y, width * k, thickness).fill();
        }
    }

    /// Print `cell.text` as a word-wrapped block of lines of `cell.height`.
    ///
    /// Justified lines are stretched with word spacing, except the last line
    /// of each paragraph. The cursor ends below the block at the left margin.
    pub fn multi_cell(&mut self, cell: Cell) -> Result<()> {
        self.ensure_drawable()?;
        let k = self.gs.k;
        let w = if cell.width == 0.0 {
            self.page_w - self.r_margin - self.gs.x
        } else {
            cell.width
        };
        let wmax = w - 2.0 * self.c_margin;
        let text = cell.text.replace('\r', "");
        let lines = break_lines(&text, wmax, self.gs.font_size());

        let (left, top, right, bottom) = cell.border.sides();
        let middle = Border::Sides { left, top: false, right, bottom: false };
        let first = Border::Sides { left, top, right, bottom: false };
        log::trace!("multi_cell: {} lines in {:.2} units", lines.len(), wmax);

        let last = lines.len().saturating_sub(1);
        for (n, line) in lines.iter().enumerate() {
            let justified = cell.align == Align::Justify && line.kind == BreakKind::Space;
            if justified {
                let ws = line.justify_spacing(wmax);
                self.gs.word_spacing = ws;
                self.op(ContentStreamOp::SetWordSpacing(ws * k));
            } else if self.gs.word_spacing > 0.0 {
                self.gs.word_spacing = 0.0;
                self.op(ContentStreamOp::SetWordSpacing(0.0));
            }

            let mut border = if n == 0 { first } else { middle };
            if n == last && bottom {
                if let Border::Sides { bottom, .. } = &mut border {
                    *bottom = true;
                }
            }
            if cell.border.is_none() {
                border = Border::None;
            }

            self.cell(Cell {
                width: w,
                height: cell.height,
                text: line.text(&text).to_string(),
                border,
                ln: LineFlow::Below,
                align: cell.align,
                fill: cell.fill,
                link: None,
            })?;
        }
        self.gs.x = self.l_margin;
        Ok(())
    }

    fn ensure_drawable(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::DocumentClosed);
        }
        if self.page_no() == 0 {
            return Err(Error::Configuration("no page has been added yet".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DocumentConfig, Unit};
    use crate::writer::graphics_state::Color;

    fn reassemble(text: &str, lines: &[LineSegment]) -> String {
        lines
            .iter()
            .map(|line| format!("{}{}", line.text(text), line.kind.separator()))
            .collect()
    }

    fn point_doc() -> Document {
        let mut doc = Document::new(DocumentConfig::new().with_unit(Unit::Point)).unwrap();
        doc.add_page().unwrap();
        doc
    }

    fn canvas(doc: &Document) -> String {
        let bytes = doc.pages.last().unwrap().canvas.build().unwrap();
        String::from_utf8_lossy(&bytes).to_string()
    }

    #[test]
    fn test_break_at_spaces() {
        // 6 points per glyph at size 12: 5 glyphs fit in 30 points.
        let text = "aa bb cc";
        let lines = break_lines(text, 30.0, 12.0);
        let texts: Vec<&str> = lines.iter().map(|l| l.text(text)).collect();
        assert_eq!(texts, vec!["aa bb", "cc"]);
        assert_eq!(lines[0].kind, BreakKind::Space);
        assert_eq!(lines[1].kind, BreakKind::End);
        assert_eq!(lines[0].spaces, 1);
        assert_eq!(lines[0].width, 30.0);
    }

    #[test]
    fn test_newlines_and_trailing_segment() {
        let text = "one\n\ntwo\n";
        let lines = break_lines(text, 100.0, 10.0);
        let texts: Vec<&str> = lines.iter().map(|l| l.text(text)).collect();
        assert_eq!(texts, vec!["one", "", "two", ""]);
        assert_eq!(reassemble(text, &lines), text);
    }

    #[test]
    fn test_hard_break_makes_progress() {
        let text = "abcdef";
        let lines = break_lines(text, 1.0, 10.0);
        assert_eq!(lines.len(), 7);
        assert!(lines[..6].iter().all(|l| l.kind == BreakKind::Hard && l.end - l.start == 1));
        assert_eq!(reassemble(text, &lines), text);
    }

    #[test]
    fn test_hard_break_keeps_overflowing_char() {
        let text = "abcdefgh";
        let lines = break_lines(text, 15.0, 10.0);
        let texts: Vec<&str> = lines.iter().map(|l| l.text(text)).collect();
        assert_eq!(texts, vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_justify_spacing() {
        let text = "aa bb cc dd";
        let lines = break_lines(text, 50.0, 10.0);
        assert_eq!(lines[0].text(text), "aa bb cc");
        assert_eq!(lines[0].justify_spacing(50.0), 5.0);
        assert_eq!(lines[1].justify_spacing(50.0), 0.0);
    }

    #[test]
    fn test_border_parsing() {
        assert_eq!(Border::from("0"), Border::None);
        assert_eq!(Border::from("1"), Border::Full);
        assert_eq!(Border::from(1u8), Border::Full);
        assert_eq!(
            Border::from("lb"),
            Border::Sides { left: true, top: false, right: false, bottom: true }
        );
        assert_eq!(LineFlow::from(2u8), LineFlow::Below);
    }

    #[test]
    fn test_cell_output() {
        let mut doc = point_doc();
        doc.cell(Cell::new(100.0, 20.0, "Hi").border(1).align(Align::Center)).unwrap();
        let content = canvas(&doc);
        assert!(content.contains("28.35 813.54 100.00 -20.00 re\nS\n"));
        // dx = (100 - 12) / 2, baseline 28.35 + 10 + 3.6
        assert!(content.contains("BT\n72.35 799.94 Td\n(Hi) Tj\nET\n"));
        assert!((doc.x() - 128.35).abs() < 1e-9);
        assert_eq!(doc.y(), 28.35);
    }

    #[test]
    fn test_cell_side_borders_and_cursor() {
        let mut doc = point_doc();
        doc.cell(Cell::new(50.0, 10.0, "").border("B").ln(LineFlow::NextLine)).unwrap();
        let content = canvas(&doc);
        assert!(content.contains("28.35 803.54 m\n78.35 803.54 l\nS\n"));
        assert!(!content.contains(" re\n"));
        assert!(!content.contains("Tj"));
        assert_eq!(doc.x(), 28.35);
        assert!((doc.y() - 38.35).abs() < 1e-9);
    }

    #[test]
    fn test_fill_and_text_color() {
        let mut doc = point_doc();
        doc.set_fill_color(Color::gray(200));
        doc.set_text_color(Color::rgb(255, 0, 0));
        doc.cell(Cell::new(40.0, 10.0, "Red").fill(true)).unwrap();
        let content = canvas(&doc);
        assert!(content.contains(" re\nf\nq\n1.000 0.000 0.000 rg\nBT\n"));
        assert!(content.contains("ET\nQ\n"));
    }

    #[test]
    fn test_zero_width_extends_to_margin() {
        let mut doc = point_doc();
        doc.cell(Cell::new(0.0, 10.0, "").border(1)).unwrap();
        let expected = format!("{:.2} -10.00 re", 595.28 - 2.0 * 28.35);
        assert!(canvas(&doc).contains(&expected));
    }

    #[test]
    fn test_underline_and_link() {
        let mut doc = point_doc();
        doc.set_font("helvetica", "U", 10.0).unwrap();
        let cell = Cell::new(60.0, 10.0, "site").align(Align::Center).link("https://example.com");
        doc.cell(cell).unwrap();
        let content = canvas(&doc);
        // baseline 28.35 + 5 + 3 = 36.35; bar one tenth of the size lower
        assert!(content.contains("48.35 804.54 20.00 -0.50 re\nf\n"));
        let link = &doc.pages[0].links[0];
        assert_eq!(link.uri, "https://example.com");
        assert!((link.rect[2] - link.rect[0] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_cell_breaks_page() {
        let mut doc = point_doc();
        doc.set_y(800.0);
        doc.set_x(100.0);
        doc.cell(Cell::new(10.0, 20.0, "x")).unwrap();
        assert_eq!(doc.page_no(), 2);
        assert_eq!(doc.y(), 28.35);
        assert_eq!(doc.x(), 110.0);
    }

    #[test]
    fn test_cell_needs_page() {
        let mut doc = Document::new(DocumentConfig::new()).unwrap();
        assert!(matches!(doc.cell(Cell::new(10.0, 10.0, "x")), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_multi_cell_borders() {
        let mut doc = point_doc();
        // usable width 40 - 2 * 2.835, 6 points per glyph: five glyphs a line
        doc.multi_cell(Cell::new(40.0, 10.0, "aaaa bbbb cccc").border(1)).unwrap();
        let content = canvas(&doc);
        assert_eq!(content.matches(" l\nS\n").count(), 3 + 2 + 3);
        assert_eq!(content.matches("(aaaa) Tj").count(), 1);
        assert_eq!(doc.x(), 28.35);
        assert!((doc.y() - 58.35).abs() < 1e-9);
    }

    #[test]
    fn test_multi_cell_justified_resets_spacing() {
        let mut doc = point_doc();
        doc.multi_cell(Cell::new(100.0, 10.0, "aa bb cc dd ee ff gg").align(Align::Justify))
            .unwrap();
        let content = canvas(&doc);
        let tw: Vec<&str> = content.lines().filter(|l| l.ends_with(" Tw")).collect();
        assert!(tw.len() >= 2);
        assert_ne!(tw[0], "0.000 Tw");
        assert_eq!(*tw.last().unwrap(), "0.000 Tw");
        assert_eq!(doc.gs.word_spacing, 0.0);
    }

    #[test]
    fn test_justified_spacing_survives_page_break() {
        let mut doc = point_doc();
        doc.set_y(790.0);
        doc.multi_cell(
            Cell::new(100.0, 20.0, "aa bb cc dd ee ff gg hh ii jj kk").align(Align::Justify),
        )
        .unwrap();
        assert_eq!(doc.page_no(), 2);

        let first = String::from_utf8_lossy(&doc.pages[0].canvas.build().unwrap()).to_string();
        assert!(first.ends_with(" Tw\n0.000 Tw\n"));
        assert!(!first.contains(" Tj"));

        let second = canvas(&doc);
        let first_tj = second.find(" Tj").unwrap();
        let spacing = second[..first_tj]
            .lines()
            .filter_map(|l| l.strip_suffix(" Tw"))
            .last()
            .unwrap();
        assert!(spacing.parse::<f64>().unwrap() > 0.0);
        assert!(second.contains("(aa bb cc dd ee) Tj"));
    }
}
