//! Page templates for headers, footers, and page numbers.
//!
//! A [`PageDecorator`] is called by the document whenever a page starts
//! (header) and before it is left (footer). [`PageTemplate`] is the stock
//! decorator: one [`HeaderFooter`] band at the top and one at the bottom,
//! with placeholder support.
//!
//! # Example
//!
//! ```
//! use pdf_slate::config::DocumentConfig;
//! use pdf_slate::writer::{Document, HeaderFooter, PageTemplate};
//!
//! let template = PageTemplate::new()
//!     .header(HeaderFooter::center("My Document"))
//!     .footer(HeaderFooter::right("{page} of {pages}"));
//! let mut doc = Document::with_decorator(DocumentConfig::new(), template)?;
//! doc.add_page()?;
//! # Ok::<(), pdf_slate::error::Error>(())
//! ```

use super::document::{Document, DEFAULT_NB_ALIAS};
use super::graphics_state::Color;
use super::text_layout::{Align, Cell};
use crate::error::Result;

/// Hooks run by [`Document`] around every page.
///
/// Drawing done from a hook never triggers an automatic page break, and
/// graphics state changed by the header is restored once it returns.
pub trait PageDecorator {
    /// Draw the header of the page that was just opened.
    fn header(&mut self, _doc: &mut Document) -> Result<()> {
        Ok(())
    }

    /// Draw the footer of the page about to be left.
    fn footer(&mut self, _doc: &mut Document) -> Result<()> {
        Ok(())
    }
}

/// Placeholder tokens that can be used in headers and footers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Current page number (1-indexed)
    PageNumber,
    /// Total number of pages, known once the document is closed
    TotalPages,
    /// Document title (from metadata)
    Title,
}

impl Placeholder {
    /// Get the placeholder token string.
    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::PageNumber => "{page}",
            Placeholder::TotalPages => "{pages}",
            Placeholder::Title => "{title}",
        }
    }
}

/// Values substituted for the placeholders on one page.
#[derive(Debug, Clone)]
pub struct PlaceholderContext {
    /// Current page number (1-indexed)
    pub page_number: usize,
    /// Text standing for the page count (the document's alias)
    pub total_pages: String,
    /// Document title
    pub title: String,
}

impl PlaceholderContext {
    /// Context for the current page of `doc`.
    ///
    /// Enables the page-count alias on the document if it is not set yet.
    pub fn for_document(doc: &mut Document) -> Self {
        if doc.nb_alias().is_none() {
            doc.alias_nb_pages(DEFAULT_NB_ALIAS);
        }
        Self {
            page_number: doc.page_no(),
            total_pages: doc.nb_alias().unwrap_or(DEFAULT_NB_ALIAS).to_string(),
            title: doc.title().unwrap_or_default().to_string(),
        }
    }
}

/// Style configuration for header/footer text.
#[derive(Debug, Clone)]
pub struct HFStyle {
    /// Font family
    pub family: String,
    /// Font style (`B`, `I`, `U`)
    pub style: String,
    /// Font size in points
    pub font_size: f64,
    /// Text color
    pub color: Color,
    /// Whether to draw a separator line between the band and the body
    pub separator_line: bool,
}

impl Default for HFStyle {
    fn default() -> Self {
        Self {
            family: "helvetica".to_string(),
            style: String::new(),
            font_size: 10.0,
            color: Color::BLACK,
            separator_line: false,
        }
    }
}

impl HFStyle {
    /// Create a new default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font.
    pub fn font(mut self, family: impl Into<String>, size: f64) -> Self {
        self.family = family.into();
        self.font_size = size;
        self
    }

    /// Set bold weight.
    pub fn bold(mut self) -> Self {
        self.style.push('B');
        self
    }

    /// Set italic style.
    pub fn italic(mut self) -> Self {
        self.style.push('I');
        self
    }

    /// Set text color.
    pub fn color(mut self, color: impl Into<Color>) -> Self {
        self.color = color.into();
        self
    }

    /// Enable separator line.
    pub fn with_separator(mut self) -> Self {
        self.separator_line = true;
        self
    }
}

/// A single positioned text element in a header or footer.
#[derive(Debug, Clone)]
pub struct HFElement {
    /// The text content (may include placeholders)
    pub text: String,
    /// Horizontal alignment between the margins
    pub alignment: Align,
}

impl HFElement {
    /// Create an element with the given alignment.
    pub fn new(text: impl Into<String>, alignment: Align) -> Self {
        Self {
            text: text.into(),
            alignment,
        }
    }

    /// Resolve placeholders in the text.
    pub fn resolve(&self, context: &PlaceholderContext) -> String {
        self.text
            .replace(Placeholder::PageNumber.token(), &context.page_number.to_string())
            .replace(Placeholder::TotalPages.token(), &context.total_pages)
            .replace(Placeholder::Title.token(), &context.title)
    }
}

/// A header or footer band: up to three elements sharing one line.
#[derive(Debug, Clone)]
pub struct HeaderFooter {
    /// Left-aligned element
    pub left: Option<HFElement>,
    /// Center-aligned element
    pub center: Option<HFElement>,
    /// Right-aligned element
    pub right: Option<HFElement>,
    /// Style for all elements
    pub style: HFStyle,
    /// Distance of a footer from the bottom edge (points)
    pub offset: f64,
}

impl Default for HeaderFooter {
    fn default() -> Self {
        Self {
            left: None,
            center: None,
            right: None,
            style: HFStyle::default(),
            offset: 36.0, // Half inch from edge
        }
    }
}

impl HeaderFooter {
    /// Create a new empty header/footer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a single left-aligned element.
    pub fn left(text: impl Into<String>) -> Self {
        Self::new().with_left(text)
    }

    /// Create with a single centered element.
    pub fn center(text: impl Into<String>) -> Self {
        Self::new().with_center(text)
    }

    /// Create with a single right-aligned element.
    pub fn right(text: impl Into<String>) -> Self {
        Self::new().with_right(text)
    }

    /// Set the left element.
    pub fn with_left(mut self, text: impl Into<String>) -> Self {
        self.left = Some(HFElement::new(text, Align::Left));
        self
    }

    /// Set the center element.
    pub fn with_center(mut self, text: impl Into<String>) -> Self {
        self.center = Some(HFElement::new(text, Align::Center));
        self
    }

    /// Set the right element.
    pub fn with_right(mut self, text: impl Into<String>) -> Self {
        self.right = Some(HFElement::new(text, Align::Right));
        self
    }

    /// Set the style.
    pub fn with_style(mut self, style: HFStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the distance from the bottom edge, for footers.
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Check if this header/footer has any content.
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.center.is_none() && self.right.is_none()
    }

    /// Get all elements as positioned items.
    pub fn elements(&self) -> Vec<&HFElement> {
        [&self.left, &self.center, &self.right]
            .into_iter()
            .filter_map(Option::as_ref)
            .collect()
    }

    /// Height of the band's line in user units.
    fn line_height(&self, doc: &Document) -> f64 {
        self.style.font_size * 1.5 / doc.scale_factor()
    }

    /// Print the elements on one line starting at the cursor's ordinate.
    fn draw_line(&self, doc: &mut Document) -> Result<()> {
        let context = PlaceholderContext::for_document(doc);
        doc.set_font(&self.style.family, &self.style.style, self.style.font_size)?;
        doc.set_text_color(self.style.color);

        let h = self.line_height(doc);
        let y = doc.y();
        for element in self.elements() {
            doc.set_y(y);
            doc.cell(Cell::new(0.0, h, element.resolve(&context)).align(element.alignment))?;
        }
        doc.set_y(y + h);
        Ok(())
    }

    fn separator(doc: &mut Document) {
        let y = doc.y();
        doc.line(doc.left_margin(), y, doc.page_width() - doc.right_margin(), y);
    }

    /// Draw as a header at the top margin, leaving the cursor below it.
    pub fn draw_header(&self, doc: &mut Document) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        self.draw_line(doc)?;
        if self.style.separator_line {
            Self::separator(doc);
        }
        let gap = self.line_height(doc) / 2.0;
        doc.ln(Some(gap));
        Ok(())
    }

    /// Draw as a footer `offset` points above the bottom edge.
    pub fn draw_footer(&self, doc: &mut Document) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        doc.set_y(-self.offset / doc.scale_factor());
        if self.style.separator_line {
            Self::separator(doc);
        }
        self.draw_line(doc)
    }
}

/// A complete page template with header and footer.
#[derive(Debug, Clone, Default)]
pub struct PageTemplate {
    /// Header definition
    pub header: Option<HeaderFooter>,
    /// Footer definition
    pub footer: Option<HeaderFooter>,
    /// Whether to skip header/footer on first page
    pub skip_first_page: bool,
}

impl PageTemplate {
    /// Create a new empty page template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header.
    pub fn header(mut self, header: HeaderFooter) -> Self {
        self.header = Some(header);
        self
    }

    /// Set the footer.
    pub fn footer(mut self, footer: HeaderFooter) -> Self {
        self.footer = Some(footer);
        self
    }

    /// Set to skip header/footer on first page.
    pub fn skip_first_page(mut self) -> Self {
        self.skip_first_page = true;
        self
    }

    /// Get the header for a specific page.
    pub fn get_header(&self, page_number: usize) -> Option<&HeaderFooter> {
        if page_number == 1 && self.skip_first_page {
            return None;
        }
        self.header.as_ref()
    }

    /// Get the footer for a specific page.
    pub fn get_footer(&self, page_number: usize) -> Option<&HeaderFooter> {
        if page_number == 1 && self.skip_first_page {
            return None;
        }
        self.footer.as_ref()
    }

    /// Check if the template has any content.
    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.footer.is_none()
    }
}

impl PageDecorator for PageTemplate {
    fn header(&mut self, doc: &mut Document) -> Result<()> {
        match self.get_header(doc.page_no()) {
            Some(header) => header.draw_header(doc),
            None => Ok(()),
        }
    }

    fn footer(&mut self, doc: &mut Document) -> Result<()> {
        match self.get_footer(doc.page_no()) {
            Some(footer) => footer.draw_footer(doc),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentConfig;

    #[test]
    fn test_placeholder_tokens() {
        assert_eq!(Placeholder::PageNumber.token(), "{page}");
        assert_eq!(Placeholder::TotalPages.token(), "{pages}");
        assert_eq!(Placeholder::Title.token(), "{title}");
    }

    #[test]
    fn test_hf_element_resolve() {
        let element = HFElement::new("{title}: page {page} of {pages}", Align::Center);
        let context = PlaceholderContext {
            page_number: 5,
            total_pages: "10".to_string(),
            title: "Booking".to_string(),
        };
        assert_eq!(element.resolve(&context), "Booking: page 5 of 10");
    }

    #[test]
    fn test_header_footer_creation() {
        let hf = HeaderFooter::new().with_left("Document Title").with_right("{page}");

        assert!(hf.left.is_some());
        assert!(hf.center.is_none());
        assert_eq!(hf.elements().len(), 2);
        assert_eq!(hf.elements()[1].alignment, Align::Right);
    }

    #[test]
    fn test_skip_first_page() {
        let template = PageTemplate::new()
            .header(HeaderFooter::center("Header"))
            .skip_first_page();

        assert!(template.get_header(1).is_none());
        assert!(template.get_header(2).is_some());
        assert!(template.get_footer(2).is_none());
    }

    #[test]
    fn test_hf_style() {
        let style = HFStyle::new()
            .font("times", 12.0)
            .bold()
            .color(Color::gray(128))
            .with_separator();

        assert_eq!(style.family, "times");
        assert_eq!(style.style, "B");
        assert_eq!(style.color, Color::Gray(128));
        assert!(style.separator_line);
    }

    #[test]
    fn test_template_draws_on_every_page() {
        let template = PageTemplate::new()
            .header(HeaderFooter::left("{title}").with_style(HFStyle::new().with_separator()))
            .footer(HeaderFooter::center("Page {page} of {pages}"));
        let mut doc = Document::with_decorator(DocumentConfig::new(), template).unwrap();
        doc.set_title("Confirmation");
        doc.add_page().unwrap();
        // Header text, separator and gap push the cursor below the top margin.
        assert!(doc.y() > 28.35 / doc.scale_factor() + 5.0);
        doc.add_page().unwrap();

        let bytes = doc.output_bytes().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches("(Confirmation) Tj").count(), 2);
        assert!(text.contains("(Page 1 of 2) Tj"));
        assert!(text.contains("(Page 2 of 2) Tj"));
        assert!(!text.contains("{nb}"));
    }
}
