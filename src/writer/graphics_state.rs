//! Graphics state carried between drawing calls.
//!
//! Pure data: the document mutates it on every call and consults it when it
//! emits operators.

use super::content_stream::ContentStreamOp;

/// A device color given in 0-255 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// DeviceGray level
    Gray(u8),
    /// DeviceRGB triple
    Rgb(u8, u8, u8),
}

impl Color {
    /// Black.
    pub const BLACK: Color = Color::Gray(0);
    /// White.
    pub const WHITE: Color = Color::Gray(255);

    /// Gray level.
    pub fn gray(level: u8) -> Self {
        Color::Gray(level)
    }

    /// RGB triple; collapses to gray when all components match.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        if r == g && g == b {
            Color::Gray(r)
        } else {
            Color::Rgb(r, g, b)
        }
    }

    /// Operator selecting this color for stroking.
    pub fn stroke_op(self) -> ContentStreamOp {
        match self {
            Color::Gray(g) => ContentStreamOp::SetStrokeColorGray(unit(g)),
            Color::Rgb(r, g, b) => ContentStreamOp::SetStrokeColorRGB(unit(r), unit(g), unit(b)),
        }
    }

    /// Operator selecting this color for filling and glyphs.
    pub fn fill_op(self) -> ContentStreamOp {
        match self {
            Color::Gray(g) => ContentStreamOp::SetFillColorGray(unit(g)),
            Color::Rgb(r, g, b) => ContentStreamOp::SetFillColorRGB(unit(r), unit(g), unit(b)),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl From<u8> for Color {
    fn from(level: u8) -> Self {
        Color::gray(level)
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Color::rgb(r, g, b)
    }
}

fn unit(component: u8) -> f64 {
    f64::from(component) / 255.0
}

/// Current font selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSelection {
    /// Lowercase family name (`helvetica`, `times`, ...)
    pub family: String,
    /// Bold/italic part of the style, normalized to `""`, `"B"`, `"I"` or `"BI"`
    pub style: String,
    /// Size in points
    pub size_pt: f64,
}

impl Default for FontSelection {
    fn default() -> Self {
        Self {
            family: "helvetica".to_string(),
            style: String::new(),
            size_pt: 12.0,
        }
    }
}

/// The mutable drawing state of a document.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    /// Scale factor: points per user unit
    pub k: f64,
    /// Selected font
    pub font: FontSelection,
    /// Resource name of the selected font once registered (`F1`, ...)
    pub font_resource: Option<String>,
    /// Underline text drawn by cells
    pub underline: bool,
    /// Stroking color
    pub draw_color: Color,
    /// Fill color
    pub fill_color: Color,
    /// Text color
    pub text_color: Color,
    /// Line width in user units
    pub line_width: f64,
    /// Cursor x in user units
    pub x: f64,
    /// Cursor y in user units (top-left origin)
    pub y: f64,
    /// Height of the last printed cell
    pub last_height: f64,
    /// Word spacing in user units, non-zero only while a justified line is drawn
    pub word_spacing: f64,
}

impl GraphicsState {
    /// Initial state for the given scale factor.
    pub fn new(k: f64) -> Self {
        Self {
            k,
            font: FontSelection::default(),
            font_resource: None,
            underline: false,
            draw_color: Color::BLACK,
            fill_color: Color::BLACK,
            text_color: Color::BLACK,
            line_width: 0.567 / k,
            x: 0.0,
            y: 0.0,
            last_height: 0.0,
            word_spacing: 0.0,
        }
    }

    /// Font size in user units.
    pub fn font_size(&self) -> f64 {
        self.font.size_pt / self.k
    }

    /// Whether glyphs need their own color because fills use another one.
    pub fn text_color_differs(&self) -> bool {
        self.text_color != self.fill_color
    }
}
