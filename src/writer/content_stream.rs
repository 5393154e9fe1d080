//! PDF content stream builder.
//!
//! The page canvas: an append-only log of graphics and text operators
//! (PDF specification ISO 32000-1:2008 Sections 8-9) serialized once, when
//! the document is finalized.

use super::font_manager::encode_win_ansi;
use super::object_serializer::escape_literal;
use crate::error::Result;
use std::io::Write;

/// Operations that can be added to a content stream.
///
/// Coordinates are already in output space (points, bottom-left origin).
#[derive(Debug, Clone, PartialEq)]
pub enum ContentStreamOp {
    /// Save graphics state (q)
    SaveState,
    /// Restore graphics state (Q)
    RestoreState,
    /// Begin text object (BT)
    BeginText,
    /// End text object (ET)
    EndText,
    /// Set font resource and size (Tf)
    SetFont(String, f64),
    /// Move text position (Td)
    MoveText(f64, f64),
    /// Show text (Tj) - literal string, WinAnsi-encoded when written
    ShowText(String),
    /// Set word spacing (Tw)
    SetWordSpacing(f64),
    /// Set fill color RGB (rg)
    SetFillColorRGB(f64, f64, f64),
    /// Set stroke color RGB (RG)
    SetStrokeColorRGB(f64, f64, f64),
    /// Set fill color gray (g)
    SetFillColorGray(f64),
    /// Set stroke color gray (G)
    SetStrokeColorGray(f64),
    /// Set line width (w)
    SetLineWidth(f64),
    /// Projecting square line cap (2 J)
    SquareLineCap,
    /// Move to (m)
    MoveTo(f64, f64),
    /// Line to (l)
    LineTo(f64, f64),
    /// Rectangle (re)
    Rectangle(f64, f64, f64, f64),
    /// Stroke (S)
    Stroke,
    /// Fill (f)
    Fill,
    /// Fill and stroke (B)
    FillStroke,
}

/// Builder for PDF content streams.
///
/// One per page. Drawing calls append operations; nothing is serialized
/// until [`build`](Self::build).
#[derive(Debug, Default, Clone)]
pub struct ContentStreamBuilder {
    /// Operations in the stream
    operations: Vec<ContentStreamOp>,
}

impl ContentStreamBuilder {
    /// Create a new content stream builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation to the stream.
    pub fn op(&mut self, op: ContentStreamOp) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Move to a point (start a new subpath).
    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.op(ContentStreamOp::MoveTo(x, y))
    }

    /// Draw a line to a point.
    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.op(ContentStreamOp::LineTo(x, y))
    }

    /// Append a rectangle path.
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.op(ContentStreamOp::Rectangle(x, y, width, height))
    }

    /// Stroke the current path.
    pub fn stroke(&mut self) -> &mut Self {
        self.op(ContentStreamOp::Stroke)
    }

    /// Fill the current path.
    pub fn fill(&mut self) -> &mut Self {
        self.op(ContentStreamOp::Fill)
    }

    /// Fill and stroke the current path.
    pub fn fill_stroke(&mut self) -> &mut Self {
        self.op(ContentStreamOp::FillStroke)
    }

    /// A complete text object showing `text` with its baseline at `(x, y)`.
    pub fn text(&mut self, text: &str, x: f64, y: f64) -> &mut Self {
        self.op(ContentStreamOp::BeginText)
            .op(ContentStreamOp::MoveText(x, y))
            .op(ContentStreamOp::ShowText(text.to_string()))
            .op(ContentStreamOp::EndText)
    }

    /// Replace `alias` in every shown string. Returns the number of strings changed.
    pub fn replace_text(&mut self, alias: &str, value: &str) -> usize {
        let mut changed = 0;
        for op in &mut self.operations {
            if let ContentStreamOp::ShowText(text) = op {
                if text.contains(alias) {
                    *text = text.replace(alias, value);
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Build the content stream to bytes.
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();

        for op in &self.operations {
            self.write_op(&mut buf, op)?;
            writeln!(buf)?;
        }

        Ok(buf)
    }

    /// Write a single operation to the buffer.
    fn write_op<W: Write>(&self, w: &mut W, op: &ContentStreamOp) -> std::io::Result<()> {
        match op {
            ContentStreamOp::SaveState => write!(w, "q"),
            ContentStreamOp::RestoreState => write!(w, "Q"),
            ContentStreamOp::BeginText => write!(w, "BT"),
            ContentStreamOp::EndText => write!(w, "ET"),
            ContentStreamOp::SetFont(name, size) => write!(w, "/{} {:.2} Tf", name, size),
            ContentStreamOp::MoveText(tx, ty) => write!(w, "{:.2} {:.2} Td", tx, ty),
            ContentStreamOp::ShowText(text) => {
                write!(w, "(")?;
                w.write_all(&escape_literal(&encode_win_ansi(text)))?;
                write!(w, ") Tj")
            },
            ContentStreamOp::SetWordSpacing(spacing) => write!(w, "{:.3} Tw", spacing),
            ContentStreamOp::SetFillColorRGB(r, g, b) => write!(w, "{:.3} {:.3} {:.3} rg", r, g, b),
            ContentStreamOp::SetStrokeColorRGB(r, g, b) => {
                write!(w, "{:.3} {:.3} {:.3} RG", r, g, b)
            },
            ContentStreamOp::SetFillColorGray(g) => write!(w, "{:.3} g", g),
            ContentStreamOp::SetStrokeColorGray(g) => write!(w, "{:.3} G", g),
            ContentStreamOp::SetLineWidth(width) => write!(w, "{:.2} w", width),
            ContentStreamOp::SquareLineCap => write!(w, "2 J"),
            ContentStreamOp::MoveTo(x, y) => write!(w, "{:.2} {:.2} m", x, y),
            ContentStreamOp::LineTo(x, y) => write!(w, "{:.2} {:.2} l", x, y),
            ContentStreamOp::Rectangle(x, y, w_val, h) => {
                write!(w, "{:.2} {:.2} {:.2} {:.2} re", x, y, w_val, h)
            },
            ContentStreamOp::Stroke => write!(w, "S"),
            ContentStreamOp::Fill => write!(w, "f"),
            ContentStreamOp::FillStroke => write!(w, "B"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(builder: &ContentStreamBuilder) -> String {
        String::from_utf8_lossy(&builder.build().unwrap()).to_string()
    }

    #[test]
    fn test_simple_text() {
        let mut builder = ContentStreamBuilder::new();
        builder
            .op(ContentStreamOp::SetFont("F1".to_string(), 12.0))
            .text("Hello, World!", 72.0, 720.0);

        assert_eq!(
            render(&builder),
            "/F1 12.00 Tf\nBT\n72.00 720.00 Td\n(Hello, World!) Tj\nET\n"
        );
    }

    #[test]
    fn test_path_operations() {
        let mut builder = ContentStreamBuilder::new();
        builder
            .op(ContentStreamOp::SetStrokeColorGray(0.0))
            .op(ContentStreamOp::SetLineWidth(0.567))
            .move_to(0.0, 0.0)
            .line_to(100.0, 100.0)
            .stroke();

        let content = render(&builder);
        assert!(content.contains("0.000 G\n"));
        assert!(content.contains("0.57 w\n"));
        assert!(content.contains("0.00 0.00 m\n100.00 100.00 l\nS\n"));
    }

    #[test]
    fn test_rectangle_paints() {
        let mut builder = ContentStreamBuilder::new();
        builder.rect(10.0, 20.0, 30.0, -40.0).fill();
        builder.rect(0.0, 0.0, 1.0, 1.0).fill_stroke();
        assert_eq!(
            render(&builder),
            "10.00 20.00 30.00 -40.00 re\nf\n0.00 0.00 1.00 1.00 re\nB\n"
        );
    }

    #[test]
    fn test_escaped_text() {
        let mut builder = ContentStreamBuilder::new();
        builder.text(r"Total (net) \ gross", 0.0, 0.0);
        assert!(render(&builder).contains(r"(Total \(net\) \\ gross) Tj"));
    }

    #[test]
    fn test_win_ansi_text() {
        let mut builder = ContentStreamBuilder::new();
        builder.text("12 €", 0.0, 0.0);
        let bytes = builder.build().unwrap();
        assert!(bytes.windows(5).any(|w| w == b"(12 \x80"));
    }

    #[test]
    fn test_colors_and_spacing() {
        let mut builder = ContentStreamBuilder::new();
        builder
            .op(ContentStreamOp::SetFillColorRGB(1.0, 0.5, 0.0))
            .op(ContentStreamOp::SetWordSpacing(1.23456))
            .op(ContentStreamOp::SquareLineCap);
        assert_eq!(render(&builder), "1.000 0.500 0.000 rg\n1.235 Tw\n2 J\n");
    }

    #[test]
    fn test_replace_text() {
        let mut builder = ContentStreamBuilder::new();
        builder.text("Page 1/{nb}", 0.0, 0.0).text("no alias", 0.0, 0.0);
        assert_eq!(builder.replace_text("{nb}", "3"), 1);
        assert!(render(&builder).contains("(Page 1/3) Tj"));
    }
}
