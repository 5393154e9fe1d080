//! Font management for PDF generation.
//!
//! Only the PDF Base-14 fonts are supported. They are referenced, never
//! embedded, so no glyph metrics are available: string widths use a fixed
//! per-glyph approximation.

use crate::error::{Error, Result};
use indexmap::IndexMap;

/// Width of every glyph, in thousandths of the font size.
///
/// Not a real metric. Output depends on it byte-for-byte, so changing it is a
/// behavior change rather than a fix.
pub const GLYPH_WIDTH: f64 = 500.0;

/// Font families of the Base-14 set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFamily {
    /// Courier (monospace)
    Courier,
    /// Helvetica (sans-serif, also selected by `arial`)
    Helvetica,
    /// Times (serif)
    Times,
    /// Symbol
    Symbol,
    /// ZapfDingbats
    ZapfDingbats,
}

impl FontFamily {
    /// Resolve a family name, case-insensitively.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "courier" => Ok(FontFamily::Courier),
            "helvetica" | "arial" => Ok(FontFamily::Helvetica),
            "times" => Ok(FontFamily::Times),
            "symbol" => Ok(FontFamily::Symbol),
            "zapfdingbats" => Ok(FontFamily::ZapfDingbats),
            other => Err(Error::Configuration(format!("undefined font: '{}'", other))),
        }
    }

    /// Lowercase canonical name.
    pub fn name(self) -> &'static str {
        match self {
            FontFamily::Courier => "courier",
            FontFamily::Helvetica => "helvetica",
            FontFamily::Times => "times",
            FontFamily::Symbol => "symbol",
            FontFamily::ZapfDingbats => "zapfdingbats",
        }
    }

    fn is_symbolic(self) -> bool {
        matches!(self, FontFamily::Symbol | FontFamily::ZapfDingbats)
    }
}

/// Parsed font style: bold and italic select the face, underline is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FontStyle {
    /// Bold face
    pub bold: bool,
    /// Italic/oblique face
    pub italic: bool,
    /// Underlined text
    pub underline: bool,
}

impl FontStyle {
    /// Parse a style string made of `B`, `I` and `U` in any order and case.
    pub fn parse(style: &str) -> Result<Self> {
        let mut parsed = FontStyle::default();
        for c in style.chars() {
            match c.to_ascii_uppercase() {
                'B' => parsed.bold = true,
                'I' => parsed.italic = true,
                'U' => parsed.underline = true,
                _ => {
                    return Err(Error::Configuration(format!("incorrect font style: '{}'", style)))
                },
            }
        }
        Ok(parsed)
    }

    /// Face part of the style, normalized (`""`, `"B"`, `"I"`, `"BI"`).
    pub fn face_key(self) -> &'static str {
        match (self.bold, self.italic) {
            (false, false) => "",
            (true, false) => "B",
            (false, true) => "I",
            (true, true) => "BI",
        }
    }
}

/// A concrete Base-14 face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StandardFont {
    /// Family
    pub family: FontFamily,
    /// Bold face
    pub bold: bool,
    /// Italic face
    pub italic: bool,
}

impl StandardFont {
    /// Select the face for a family and style. Symbol fonts have a single face.
    pub fn new(family: FontFamily, style: FontStyle) -> Self {
        let symbolic = family.is_symbolic();
        Self {
            family,
            bold: style.bold && !symbolic,
            italic: style.italic && !symbolic,
        }
    }

    /// PostScript name used as `/BaseFont`.
    pub fn base_font(&self) -> &'static str {
        match (self.family, self.bold, self.italic) {
            (FontFamily::Courier, false, false) => "Courier",
            (FontFamily::Courier, true, false) => "Courier-Bold",
            (FontFamily::Courier, false, true) => "Courier-Oblique",
            (FontFamily::Courier, true, true) => "Courier-BoldOblique",
            (FontFamily::Helvetica, false, false) => "Helvetica",
            (FontFamily::Helvetica, true, false) => "Helvetica-Bold",
            (FontFamily::Helvetica, false, true) => "Helvetica-Oblique",
            (FontFamily::Helvetica, true, true) => "Helvetica-BoldOblique",
            (FontFamily::Times, false, false) => "Times-Roman",
            (FontFamily::Times, true, false) => "Times-Bold",
            (FontFamily::Times, false, true) => "Times-Italic",
            (FontFamily::Times, true, true) => "Times-BoldItalic",
            (FontFamily::Symbol, _, _) => "Symbol",
            (FontFamily::ZapfDingbats, _, _) => "ZapfDingbats",
        }
    }

    /// Whether the font dictionary carries `/Encoding /WinAnsiEncoding`.
    pub fn uses_win_ansi(&self) -> bool {
        !self.family.is_symbolic()
    }
}

/// Fonts used by a document, in first-use order, with their resource names.
#[derive(Debug, Clone, Default)]
pub struct FontManager {
    fonts: IndexMap<StandardFont, String>,
}

impl FontManager {
    /// Create an empty font manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resource name for a font (`F1`, `F2`, ...), registering it on first use.
    pub fn resource_name(&mut self, font: StandardFont) -> String {
        let next = self.fonts.len() + 1;
        self.fonts
            .entry(font)
            .or_insert_with(|| {
                log::debug!("Registering font {} as F{}", font.base_font(), next);
                format!("F{}", next)
            })
            .clone()
    }

    /// Registered fonts with their resource names, in registration order.
    pub fn fonts(&self) -> impl Iterator<Item = (&StandardFont, &str)> {
        self.fonts.iter().map(|(font, name)| (font, name.as_str()))
    }

    /// Number of registered fonts.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Whether no font has been registered.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// Width of a single character in thousandths of the font size.
pub fn char_width(_ch: char) -> f64 {
    GLYPH_WIDTH
}

/// Width of `text` for a font size expressed in any unit; the result is in
/// that same unit.
pub fn string_width(text: &str, font_size: f64) -> f64 {
    text.chars().map(char_width).sum::<f64>() * font_size / 1000.0
}

/// Encode text for a simple font with WinAnsiEncoding.
///
/// Characters with no WinAnsi code are written as `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{0000}'..='\u{007F}' | '\u{00A0}'..='\u{00FF}' => c as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_lookup() {
        assert_eq!(FontFamily::from_name("Arial").unwrap(), FontFamily::Helvetica);
        assert_eq!(FontFamily::from_name("TIMES").unwrap(), FontFamily::Times);
        assert!(matches!(FontFamily::from_name("Comic Sans"), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_style_parsing() {
        let style = FontStyle::parse("ub").unwrap();
        assert!(style.bold && style.underline && !style.italic);
        assert_eq!(style.face_key(), "B");
        assert_eq!(FontStyle::parse("IB").unwrap().face_key(), "BI");
        assert!(FontStyle::parse("X").is_err());
    }

    #[test]
    fn test_base_font_names() {
        let bold = FontStyle::parse("B").unwrap();
        let bold_italic = FontStyle::parse("BI").unwrap();
        let roman = StandardFont::new(FontFamily::Times, FontStyle::default());
        assert_eq!(roman.base_font(), "Times-Roman");
        assert_eq!(StandardFont::new(FontFamily::Helvetica, bold).base_font(), "Helvetica-Bold");
        assert_eq!(
            StandardFont::new(FontFamily::Courier, bold_italic).base_font(),
            "Courier-BoldOblique"
        );
        let symbol = StandardFont::new(FontFamily::Symbol, bold);
        assert_eq!(symbol.base_font(), "Symbol");
        assert!(!symbol.uses_win_ansi());
    }

    #[test]
    fn test_resource_names_are_stable() {
        let mut fonts = FontManager::new();
        let regular = StandardFont::new(FontFamily::Helvetica, FontStyle::default());
        let bold = StandardFont::new(FontFamily::Helvetica, FontStyle::parse("B").unwrap());
        assert_eq!(fonts.resource_name(regular), "F1");
        assert_eq!(fonts.resource_name(bold), "F2");
        assert_eq!(fonts.resource_name(regular), "F1");
        assert_eq!(fonts.len(), 2);
    }

    #[test]
    fn test_string_width_is_fixed_per_glyph() {
        assert_eq!(string_width("Hello", 12.0), 30.0);
        assert_eq!(string_width("", 12.0), 0.0);
        // Multi-byte characters count once.
        assert_eq!(string_width("€uro", 10.0), 20.0);
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Café €5 – ok"), b"Caf\xE9 \x805 \x96 ok".to_vec());
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
    }
}
