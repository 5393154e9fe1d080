//! Document configuration: orientation, unit, page format, display mode.
//!
//! A [`DocumentConfig`] can be built in code with the `with_*` methods or
//! loaded from JSON shipped by the collaborator that requests the document:
//!
//! ```
//! use pdf_slate::config::{DocumentConfig, Orientation, Unit};
//!
//! let json = r#"{"orientation": "L", "unit": "mm", "format": "A5"}"#;
//! let config = DocumentConfig::from_json(json)?;
//! assert_eq!(config.orientation, Orientation::Landscape);
//! assert_eq!(config.unit, Unit::Millimeter);
//! # Ok::<(), pdf_slate::error::Error>(())
//! ```

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Orientation {
    /// Portrait (default)
    #[default]
    Portrait,
    /// Landscape: width and height are swapped
    Landscape,
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "p" | "portrait" => Ok(Orientation::Portrait),
            "l" | "landscape" => Ok(Orientation::Landscape),
            other => Err(Error::Configuration(format!("incorrect orientation: '{}'", other))),
        }
    }
}

impl TryFrom<String> for Orientation {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// User unit. Every coordinate passed to the drawing API is in this unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Unit {
    /// PostScript point (1/72 inch)
    Point,
    /// Millimeter (default)
    #[default]
    Millimeter,
    /// Centimeter
    Centimeter,
    /// Inch
    Inch,
}

impl Unit {
    /// Scale factor `k`: points per user unit.
    pub fn scale_factor(self) -> f64 {
        match self {
            Unit::Point => 1.0,
            Unit::Millimeter => 72.0 / 25.4,
            Unit::Centimeter => 72.0 / 2.54,
            Unit::Inch => 72.0,
        }
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pt" => Ok(Unit::Point),
            "mm" => Ok(Unit::Millimeter),
            "cm" => Ok(Unit::Centimeter),
            "in" => Ok(Unit::Inch),
            other => Err(Error::Configuration(format!("incorrect unit: '{}'", other))),
        }
    }
}

impl TryFrom<String> for Unit {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Base page size, in portrait orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(try_from = "PageFormatRepr")]
pub enum PageFormat {
    /// A3 (297mm x 420mm)
    A3,
    /// A4 (210mm x 297mm)
    #[default]
    A4,
    /// A5 (148mm x 210mm)
    A5,
    /// US Letter (8.5" x 11")
    Letter,
    /// US Legal (8.5" x 14")
    Legal,
    /// Custom width x height in user units
    Custom(f64, f64),
}

impl PageFormat {
    /// Size in points for the named formats, or converts a custom size with `k`.
    pub fn size_in_points(self, k: f64) -> (f64, f64) {
        match self {
            PageFormat::A3 => (841.89, 1190.55),
            PageFormat::A4 => (595.28, 841.89),
            PageFormat::A5 => (420.94, 595.28),
            PageFormat::Letter => (612.0, 792.0),
            PageFormat::Legal => (612.0, 1008.0),
            PageFormat::Custom(w, h) => (w * k, h * k),
        }
    }

    fn validate(self) -> Result<()> {
        if let PageFormat::Custom(w, h) = self {
            if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
                return Err(Error::Configuration(format!("invalid page size: {} x {}", w, h)));
            }
        }
        Ok(())
    }
}

impl FromStr for PageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a3" => Ok(PageFormat::A3),
            "a4" => Ok(PageFormat::A4),
            "a5" => Ok(PageFormat::A5),
            "letter" => Ok(PageFormat::Letter),
            "legal" => Ok(PageFormat::Legal),
            other => Err(Error::Configuration(format!("unknown page size: '{}'", other))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageFormatRepr {
    Named(String),
    Dimensions(f64, f64),
}

impl TryFrom<PageFormatRepr> for PageFormat {
    type Error = Error;

    fn try_from(repr: PageFormatRepr) -> Result<Self> {
        let format = match repr {
            PageFormatRepr::Named(name) => name.parse()?,
            PageFormatRepr::Dimensions(w, h) => PageFormat::Custom(w, h),
        };
        format.validate()?;
        Ok(format)
    }
}

/// Initial zoom of the viewer (catalog `/OpenAction`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomMode {
    /// Leave it to the viewer
    #[default]
    Default,
    /// Whole page visible
    FullPage,
    /// Page width fits the window
    FullWidth,
    /// Actual size
    Real,
    /// Explicit zoom percentage
    Percent(f64),
}

impl ZoomMode {
    /// Reject percentages that are not positive and finite.
    pub fn validate(self) -> Result<()> {
        if let ZoomMode::Percent(percent) = self {
            if !(percent.is_finite() && percent > 0.0) {
                return Err(Error::Configuration(format!("invalid zoom: {}%", percent)));
            }
        }
        Ok(())
    }
}

/// Page layout of the viewer (catalog `/PageLayout`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Leave it to the viewer
    #[default]
    Default,
    /// One page at a time
    Single,
    /// Continuous scrolling
    Continuous,
    /// Two columns of pages
    Two,
}

impl LayoutMode {
    /// The `/PageLayout` name, if the mode sets one.
    pub fn as_pdf_name(self) -> Option<&'static str> {
        match self {
            LayoutMode::Default => None,
            LayoutMode::Single => Some("SinglePage"),
            LayoutMode::Continuous => Some("OneColumn"),
            LayoutMode::Two => Some("TwoColumnLeft"),
        }
    }
}

/// Configuration for a new [`Document`](crate::writer::Document).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Default orientation of pages
    pub orientation: Orientation,
    /// User unit
    pub unit: Unit,
    /// Default page size
    pub format: PageFormat,
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Document keywords
    pub keywords: Option<String>,
    /// Creator application
    pub creator: Option<String>,
    /// Initial viewer zoom
    pub zoom: ZoomMode,
    /// Initial viewer page layout
    pub layout: LayoutMode,
    /// Fixed creation date; `None` uses the time of finalization
    #[serde(skip)]
    pub creation_date: Option<DateTime<Utc>>,
}

impl DocumentConfig {
    /// Create a config with the defaults (portrait, mm, A4).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DocumentConfig = serde_json::from_str(json)
            .map_err(|e| Error::Configuration(format!("invalid document config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that cannot be enforced by the types alone.
    pub fn validate(&self) -> Result<()> {
        self.format.validate()?;
        self.zoom.validate()
    }

    /// Set page orientation.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set user unit.
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Set page format.
    pub fn with_format(mut self, format: PageFormat) -> Self {
        self.format = format;
        self
    }

    /// Set document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set document author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Pin the creation date, making output byte-for-byte reproducible.
    pub fn with_creation_date(mut self, date: DateTime<Utc>) -> Self {
        self.creation_date = Some(date);
        self
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::Point => "pt",
            Unit::Millimeter => "mm",
            Unit::Centimeter => "cm",
            Unit::Inch => "in",
        };
        f.write_str(s)
    }
}
