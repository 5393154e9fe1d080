//! The document: page lifecycle, drawing primitives and finalization.
//!
//! A [`Document`] moves through three states. It starts with no page, draws
//! into the most recently added page while open, and is closed for good by
//! the first call to [`output`](Document::output). Closing serializes every
//! page and the shared resources through an [`ObjectWriter`] with ids 1
//! (page tree root) and 2 (resources) reserved, so pages start at id 3.
//!
//! # Example
//!
//! ```
//! use pdf_slate::config::DocumentConfig;
//! use pdf_slate::writer::{Cell, Document, LineFlow};
//!
//! let mut doc = Document::new(DocumentConfig::new())?;
//! doc.add_page()?;
//! doc.set_font("Helvetica", "B", 16.0)?;
//! doc.cell(Cell::new(40.0, 10.0, "Hello World!").ln(LineFlow::NextLine))?;
//! let bytes = doc.output_bytes()?;
//! assert!(bytes.starts_with(b"%PDF-"));
//! # Ok::<(), pdf_slate::error::Error>(())
//! ```

use super::content_stream::{ContentStreamBuilder, ContentStreamOp};
use super::font_manager::{self, FontFamily, FontManager, FontStyle, StandardFont};
use super::graphics_state::{Color, FontSelection, GraphicsState};
use super::object_serializer::ObjectSerializer;
use super::page_template::PageDecorator;
use super::pdf_writer::ObjectWriter;
use crate::config::{DocumentConfig, LayoutMode, Orientation, ZoomMode};
use crate::error::{Error, Result};
use crate::object::{Dictionary, Object, ObjectRef};
use chrono::Utc;

/// Alias replaced by the page count when none is given to
/// [`Document::alias_nb_pages`].
pub const DEFAULT_NB_ALIAS: &str = "{nb}";

/// Id of the page tree root.
const PAGES_ID: u32 = 1;
/// Id of the resource dictionary shared by every page.
const RESOURCES_ID: u32 = 2;

/// How a filled or stroked rectangle is painted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaintStyle {
    /// Outline only (`S`)
    #[default]
    Stroke,
    /// Interior only (`f`)
    Fill,
    /// Interior and outline (`B`)
    FillStroke,
}

impl PaintStyle {
    /// Paint the current path on `canvas`.
    pub(super) fn paint(self, canvas: &mut ContentStreamBuilder) {
        match self {
            PaintStyle::Stroke => canvas.stroke(),
            PaintStyle::Fill => canvas.fill(),
            PaintStyle::FillStroke => canvas.fill_stroke(),
        };
    }
}

impl From<&str> for PaintStyle {
    /// `"F"` fills, `"FD"` or `"DF"` fills and strokes, anything else strokes.
    fn from(style: &str) -> Self {
        match style.to_ascii_uppercase().as_str() {
            "F" => PaintStyle::Fill,
            "FD" | "DF" => PaintStyle::FillStroke,
            _ => PaintStyle::Stroke,
        }
    }
}

/// A clickable area that opens a URI.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LinkArea {
    /// `[llx, lly, urx, ury]` in points
    pub rect: [f64; 4],
    pub uri: String,
}

/// One page: its operator log, its size and its links.
#[derive(Debug, Clone)]
pub(crate) struct Page {
    pub canvas: ContentStreamBuilder,
    pub width_pt: f64,
    pub height_pt: f64,
    pub links: Vec<LinkArea>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DocState {
    NoPage,
    PageOpen,
    Closed,
}

/// Graphics state captured before the footer of the previous page runs,
/// re-applied to the next page.
struct SavedState {
    font: FontSelection,
    underline: bool,
    line_width: f64,
    draw_color: Color,
    fill_color: Color,
    text_color: Color,
}

/// An in-memory PDF document.
pub struct Document {
    pub(super) gs: GraphicsState,
    pub(super) pages: Vec<Page>,
    pub(super) state: DocState,
    fonts: FontManager,

    /// Default page size in points, for the default orientation
    default_size_pt: (f64, f64),
    /// Portrait page size in points
    base_size_pt: (f64, f64),
    default_orientation: Orientation,
    current_orientation: Orientation,
    /// Current page size in user units
    pub(super) page_w: f64,
    pub(super) page_h: f64,

    pub(super) l_margin: f64,
    pub(super) t_margin: f64,
    pub(super) r_margin: f64,
    pub(super) b_margin: f64,
    /// Padding inside cells
    pub(super) c_margin: f64,
    auto_page_break: bool,
    pub(super) page_break_trigger: f64,

    pub(super) in_header: bool,
    pub(super) in_footer: bool,
    decorator: Option<Box<dyn PageDecorator + Send>>,
    alias_nb: Option<String>,

    config: DocumentConfig,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("state", &self.state)
            .field("pages", &self.pages.len())
            .field("fonts", &self.fonts.len())
            .field("x", &self.gs.x)
            .field("y", &self.gs.y)
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Create an empty document.
    pub fn new(config: DocumentConfig) -> Result<Self> {
        config.validate()?;
        let k = config.unit.scale_factor();
        let base_size_pt = config.format.size_in_points(k);
        let default_size_pt = oriented(base_size_pt, config.orientation);

        let margin = 28.35 / k;
        let mut doc = Self {
            gs: GraphicsState::new(k),
            pages: Vec::new(),
            state: DocState::NoPage,
            fonts: FontManager::new(),
            default_size_pt,
            base_size_pt,
            default_orientation: config.orientation,
            current_orientation: config.orientation,
            page_w: default_size_pt.0 / k,
            page_h: default_size_pt.1 / k,
            l_margin: margin,
            t_margin: margin,
            r_margin: margin,
            b_margin: 0.0,
            c_margin: margin / 10.0,
            auto_page_break: true,
            page_break_trigger: 0.0,
            in_header: false,
            in_footer: false,
            decorator: None,
            alias_nb: None,
            config,
        };
        doc.set_auto_page_break(true, 2.0 * margin);
        log::debug!(
            "New document: {} x {} pt, unit {}, k = {:.4}",
            default_size_pt.0,
            default_size_pt.1,
            doc.config.unit,
            k
        );
        Ok(doc)
    }

    /// Create a document whose pages get a header and footer drawn by `decorator`.
    pub fn with_decorator(
        config: DocumentConfig,
        decorator: impl PageDecorator + Send + 'static,
    ) -> Result<Self> {
        let mut doc = Self::new(config)?;
        doc.decorator = Some(Box::new(decorator));
        Ok(doc)
    }

    /// Scale factor: points per user unit.
    pub fn scale_factor(&self) -> f64 {
        self.gs.k
    }

    // ==========================================================================
    // Margins and page breaking
    // ==========================================================================

    /// Set left, top and right margins. The right margin defaults to the left one.
    pub fn set_margins(&mut self, left: f64, top: f64, right: Option<f64>) {
        self.l_margin = left;
        self.t_margin = top;
        self.r_margin = right.unwrap_or(left);
    }

    /// Set the left margin, moving the cursor if it now lies inside it.
    pub fn set_left_margin(&mut self, margin: f64) {
        self.l_margin = margin;
        if self.state == DocState::PageOpen && self.gs.x < margin {
            self.gs.x = margin;
        }
    }

    /// Set the top margin.
    pub fn set_top_margin(&mut self, margin: f64) {
        self.t_margin = margin;
    }

    /// Set the right margin.
    pub fn set_right_margin(&mut self, margin: f64) {
        self.r_margin = margin;
    }

    /// Enable or disable automatic page breaks, `margin` above the page bottom.
    pub fn set_auto_page_break(&mut self, enabled: bool, margin: f64) {
        self.auto_page_break = enabled;
        self.b_margin = margin;
        self.page_break_trigger = self.page_h - margin;
    }

    /// Whether a cell of height `h` at the cursor must move to a new page first.
    pub(super) fn needs_page_break(&self, h: f64) -> bool {
        self.auto_page_break
            && !self.in_header
            && !self.in_footer
            && self.gs.y + h > self.page_break_trigger
    }

    // ==========================================================================
    // Metadata and viewer preferences
    // ==========================================================================

    /// Initial zoom and page layout shown by the viewer.
    ///
    /// A zoom percentage must be positive and finite.
    pub fn set_display_mode(&mut self, zoom: ZoomMode, layout: LayoutMode) -> Result<()> {
        zoom.validate()?;
        self.config.zoom = zoom;
        self.config.layout = layout;
        Ok(())
    }

    /// Set the document title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.config.title = Some(title.into());
    }

    /// Document title, if set.
    pub fn title(&self) -> Option<&str> {
        self.config.title.as_deref()
    }

    /// Set the document author.
    pub fn set_author(&mut self, author: impl Into<String>) {
        self.config.author = Some(author.into());
    }

    /// Set the document subject.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.config.subject = Some(subject.into());
    }

    /// Set the document keywords.
    pub fn set_keywords(&mut self, keywords: impl Into<String>) {
        self.config.keywords = Some(keywords.into());
    }

    /// Set the creator application.
    pub fn set_creator(&mut self, creator: impl Into<String>) {
        self.config.creator = Some(creator.into());
    }

    /// Replace `alias` in all text with the total page count when the document is closed.
    pub fn alias_nb_pages(&mut self, alias: impl Into<String>) {
        self.alias_nb = Some(alias.into());
    }

    /// The page-count alias, if enabled.
    pub fn nb_alias(&self) -> Option<&str> {
        self.alias_nb.as_deref()
    }

    // ==========================================================================
    // Pages
    // ==========================================================================

    /// Start a new page in the default orientation.
    pub fn add_page(&mut self) -> Result<()> {
        self.add_page_with_orientation(self.default_orientation)
    }

    /// Start a new page in the given orientation.
    ///
    /// Runs the footer on the previous page, opens the new page, re-applies
    /// the graphics state and runs the header. State changed by the header is
    /// restored afterwards.
    pub fn add_page_with_orientation(&mut self, orientation: Orientation) -> Result<()> {
        if self.state == DocState::Closed {
            return Err(Error::DocumentClosed);
        }
        let saved = self.save_state();

        if self.state == DocState::PageOpen {
            self.run_footer()?;
        }

        self.begin_page(orientation);
        self.op(ContentStreamOp::SquareLineCap);
        self.gs.line_width = saved.line_width;
        self.op(ContentStreamOp::SetLineWidth(saved.line_width * self.gs.k));

        self.gs.font = saved.font.clone();
        self.gs.underline = saved.underline;
        self.emit_font();

        self.gs.draw_color = saved.draw_color;
        if saved.draw_color != Color::BLACK {
            self.op(saved.draw_color.stroke_op());
        }
        self.gs.fill_color = saved.fill_color;
        if saved.fill_color != Color::BLACK {
            self.op(saved.fill_color.fill_op());
        }
        self.gs.text_color = saved.text_color;

        self.run_header()?;
        self.restore_state(&saved);
        Ok(())
    }

    fn begin_page(&mut self, orientation: Orientation) {
        let k = self.gs.k;
        let (width_pt, height_pt) = oriented(self.base_size_pt, orientation);
        self.pages.push(Page {
            canvas: ContentStreamBuilder::new(),
            width_pt,
            height_pt,
            links: Vec::new(),
        });
        self.state = DocState::PageOpen;
        self.current_orientation = orientation;
        self.page_w = width_pt / k;
        self.page_h = height_pt / k;
        self.page_break_trigger = self.page_h - self.b_margin;
        self.gs.x = self.l_margin;
        self.gs.y = self.t_margin;
        self.gs.font_resource = None;
        log::debug!("Page {} opened ({:.2} x {:.2} pt)", self.pages.len(), width_pt, height_pt);
    }

    /// Current orientation, the one used for pages added by automatic breaks.
    pub(super) fn current_orientation(&self) -> Orientation {
        self.current_orientation
    }

    fn save_state(&self) -> SavedState {
        SavedState {
            font: self.gs.font.clone(),
            underline: self.gs.underline,
            line_width: self.gs.line_width,
            draw_color: self.gs.draw_color,
            fill_color: self.gs.fill_color,
            text_color: self.gs.text_color,
        }
    }

    fn restore_state(&mut self, saved: &SavedState) {
        if self.gs.line_width != saved.line_width {
            self.gs.line_width = saved.line_width;
            self.op(ContentStreamOp::SetLineWidth(saved.line_width * self.gs.k));
        }
        if self.gs.font != saved.font {
            self.gs.font = saved.font.clone();
            self.emit_font();
        }
        self.gs.underline = saved.underline;
        if self.gs.draw_color != saved.draw_color {
            self.gs.draw_color = saved.draw_color;
            self.op(saved.draw_color.stroke_op());
        }
        if self.gs.fill_color != saved.fill_color {
            self.gs.fill_color = saved.fill_color;
            self.op(saved.fill_color.fill_op());
        }
        self.gs.text_color = saved.text_color;
    }

    fn run_header(&mut self) -> Result<()> {
        // The decorator is out of its slot while it runs, so a page it adds
        // does not run it again.
        let Some(mut decorator) = self.decorator.take() else {
            return Ok(());
        };
        self.in_header = true;
        let result = decorator.header(self);
        self.in_header = false;
        self.decorator = Some(decorator);
        result
    }

    fn run_footer(&mut self) -> Result<()> {
        let Some(mut decorator) = self.decorator.take() else {
            return Ok(());
        };
        self.in_footer = true;
        let result = decorator.footer(self);
        self.in_footer = false;
        self.decorator = Some(decorator);
        result
    }

    /// Number of the current page (0 before the first page).
    pub fn page_no(&self) -> usize {
        self.pages.len()
    }

    /// Width of the current page in user units.
    pub fn page_width(&self) -> f64 {
        self.page_w
    }

    /// Height of the current page in user units.
    pub fn page_height(&self) -> f64 {
        self.page_h
    }

    /// Left margin in user units.
    pub fn left_margin(&self) -> f64 {
        self.l_margin
    }

    /// Right margin in user units.
    pub fn right_margin(&self) -> f64 {
        self.r_margin
    }

    /// Whether the document has been finalized.
    pub fn is_closed(&self) -> bool {
        self.state == DocState::Closed
    }

    // ==========================================================================
    // Graphics state
    // ==========================================================================

    /// Canvas of the open page, if any.
    pub(super) fn canvas(&mut self) -> Option<&mut ContentStreamBuilder> {
        match self.state {
            DocState::PageOpen => self.pages.last_mut().map(|page| &mut page.canvas),
            _ => None,
        }
    }

    /// Append an operator to the current page; dropped when no page is open.
    pub(super) fn op(&mut self, op: ContentStreamOp) {
        if let Some(canvas) = self.canvas() {
            canvas.op(op);
        }
    }

    /// Record a link area on the current page.
    pub(super) fn add_link(&mut self, rect: [f64; 4], uri: &str) {
        if let Some(page) = self.pages.last_mut() {
            page.links.push(LinkArea {
                rect,
                uri: uri.to_string(),
            });
        }
    }

    /// Height of the current page in points.
    pub(super) fn page_height_pt(&self) -> f64 {
        self.page_h * self.gs.k
    }

    fn closed_noop(&self, what: &str) -> bool {
        if self.state == DocState::Closed {
            log::warn!("{} ignored: document already finalized", what);
            true
        } else {
            false
        }
    }

    /// Set the stroking color for lines and borders.
    pub fn set_draw_color(&mut self, color: impl Into<Color>) {
        if self.closed_noop("set_draw_color") {
            return;
        }
        self.gs.draw_color = color.into();
        self.op(self.gs.draw_color.stroke_op());
    }

    /// Set the color used for filled cells and rectangles.
    pub fn set_fill_color(&mut self, color: impl Into<Color>) {
        if self.closed_noop("set_fill_color") {
            return;
        }
        self.gs.fill_color = color.into();
        self.op(self.gs.fill_color.fill_op());
    }

    /// Set the text color. Applied when text is drawn.
    pub fn set_text_color(&mut self, color: impl Into<Color>) {
        if self.closed_noop("set_text_color") {
            return;
        }
        self.gs.text_color = color.into();
    }

    /// Set the line width in user units.
    pub fn set_line_width(&mut self, width: f64) {
        if self.closed_noop("set_line_width") {
            return;
        }
        self.gs.line_width = width;
        self.op(ContentStreamOp::SetLineWidth(width * self.gs.k));
    }

    /// Select a standard font.
    ///
    /// `style` is any combination of `B` (bold), `I` (italic) and `U`
    /// (underline). A `size` of 0 keeps the current size.
    pub fn set_font(&mut self, family: &str, style: &str, size: f64) -> Result<()> {
        if self.state == DocState::Closed {
            return Err(Error::DocumentClosed);
        }
        let family = FontFamily::from_name(family)?;
        let style = FontStyle::parse(style)?;
        let size_pt = if size > 0.0 { size } else { self.gs.font.size_pt };
        let font = StandardFont::new(family, style);

        self.gs.underline = style.underline;
        let selection = FontSelection {
            family: family.name().to_string(),
            style: style.face_key().to_string(),
            size_pt,
        };
        if selection == self.gs.font && self.gs.font_resource.is_some() {
            return Ok(());
        }
        self.gs.font = selection;
        let resource = self.fonts.resource_name(font);
        self.gs.font_resource = Some(resource);
        if self.state == DocState::PageOpen {
            self.emit_font_op();
        }
        Ok(())
    }

    /// Change the font size (in points), keeping family and style.
    pub fn set_font_size(&mut self, size: f64) {
        if self.closed_noop("set_font_size") {
            return;
        }
        if !(size.is_finite() && size > 0.0) {
            log::warn!("Ignoring invalid font size {}", size);
            return;
        }
        if self.gs.font.size_pt == size {
            return;
        }
        self.gs.font.size_pt = size;
        self.emit_font();
    }

    /// Register the selected font and select it on the current page.
    fn emit_font(&mut self) {
        let family = FontFamily::from_name(&self.gs.font.family).unwrap_or(FontFamily::Helvetica);
        let style = FontStyle {
            bold: self.gs.font.style.contains('B'),
            italic: self.gs.font.style.contains('I'),
            underline: false,
        };
        let resource = self.fonts.resource_name(StandardFont::new(family, style));
        self.gs.font_resource = Some(resource);
        self.emit_font_op();
    }

    fn emit_font_op(&mut self) {
        if let Some(resource) = self.gs.font_resource.clone() {
            let size = self.gs.font.size_pt;
            self.op(ContentStreamOp::BeginText);
            self.op(ContentStreamOp::SetFont(resource, size));
            self.op(ContentStreamOp::EndText);
        }
    }

    /// Width of `text` in the current font, in user units.
    pub fn string_width(&self, text: &str) -> f64 {
        font_manager::string_width(text, self.gs.font_size())
    }

    // ==========================================================================
    // Drawing primitives
    // ==========================================================================

    /// Draw a line between two points.
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        if self.closed_noop("line") {
            return;
        }
        let k = self.gs.k;
        let h = self.page_h;
        if let Some(canvas) = self.canvas() {
            canvas.move_to(x1 * k, (h - y1) * k).line_to(x2 * k, (h - y2) * k).stroke();
        }
    }

    /// Draw a rectangle with its upper-left corner at `(x, y)`.
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: impl Into<PaintStyle>) {
        if self.closed_noop("rect") {
            return;
        }
        let k = self.gs.k;
        let page_h = self.page_h;
        let style = style.into();
        if let Some(canvas) = self.canvas() {
            style.paint(canvas.rect(x * k, (page_h - y) * k, w * k, -h * k));
        }
    }

    // ==========================================================================
    // Cursor
    // ==========================================================================

    /// Cursor abscissa.
    pub fn x(&self) -> f64 {
        self.gs.x
    }

    /// Cursor ordinate, measured from the top of the page.
    pub fn y(&self) -> f64 {
        self.gs.y
    }

    /// Set the abscissa. Negative values are relative to the right edge.
    pub fn set_x(&mut self, x: f64) {
        self.gs.x = if x >= 0.0 { x } else { self.page_w + x };
    }

    /// Set the ordinate and move x back to the left margin. Negative values
    /// are relative to the bottom edge.
    pub fn set_y(&mut self, y: f64) {
        self.gs.x = self.l_margin;
        self.gs.y = if y >= 0.0 { y } else { self.page_h + y };
    }

    /// Set both coordinates.
    pub fn set_xy(&mut self, x: f64, y: f64) {
        self.set_y(y);
        self.set_x(x);
    }

    /// Line break: x back to the left margin, y down by `h` or the height of
    /// the last cell.
    pub fn ln(&mut self, h: Option<f64>) {
        self.gs.x = self.l_margin;
        self.gs.y += h.unwrap_or(self.gs.last_height);
    }

    // ==========================================================================
    // Finalization
    // ==========================================================================

    /// Close the document and serialize it.
    ///
    /// Adds a page if there is none, runs the last footer, replaces the page
    /// count alias, then writes every object and the cross-reference table.
    pub(crate) fn finalize(&mut self) -> Result<Vec<u8>> {
        if self.state == DocState::Closed {
            return Err(Error::DocumentClosed);
        }
        if self.state == DocState::NoPage {
            self.add_page()?;
        }
        self.run_footer()?;
        self.state = DocState::Closed;

        if let Some(alias) = self.alias_nb.clone() {
            let count = self.pages.len().to_string();
            let replaced: usize = self
                .pages
                .iter_mut()
                .map(|page| page.canvas.replace_text(&alias, &count))
                .sum();
            log::debug!("Replaced page count alias in {} strings", replaced);
        }

        let mut writer = ObjectWriter::new(RESOURCES_ID);
        let kids = self.write_pages(&mut writer)?;
        let kid_count = kids.len();
        let first_page = kids
            .first()
            .cloned()
            .ok_or_else(|| Error::InternalConsistency("page tree is empty".to_string()))?;

        let (w_pt, h_pt) = self.default_size_pt;
        let pages = ObjectSerializer::dict(vec![
            ("Type", ObjectSerializer::name("Pages")),
            ("Kids", Object::Array(kids)),
            ("Count", ObjectSerializer::integer(kid_count as i64)),
            ("MediaBox", ObjectSerializer::rect(0.0, 0.0, w_pt, h_pt)),
        ]);
        writer.write_reserved(PAGES_ID, &pages)?;

        let mut font_dict = Dictionary::new();
        for (font, name) in self.fonts.fonts() {
            let mut entries = vec![
                ("Type", ObjectSerializer::name("Font")),
                ("BaseFont", ObjectSerializer::name(font.base_font())),
                ("Subtype", ObjectSerializer::name("Type1")),
            ];
            if font.uses_win_ansi() {
                entries.push(("Encoding", ObjectSerializer::name("WinAnsiEncoding")));
            }
            let font_ref = writer.write_new(&ObjectSerializer::dict(entries));
            font_dict.insert(name.to_string(), Object::Reference(font_ref));
        }

        let resources = ObjectSerializer::dict(vec![
            (
                "ProcSet",
                ObjectSerializer::array(vec![
                    ObjectSerializer::name("PDF"),
                    ObjectSerializer::name("Text"),
                ]),
            ),
            ("Font", Object::Dictionary(font_dict)),
        ]);
        writer.write_reserved(RESOURCES_ID, &resources)?;

        let info = writer.write_new(&self.info_dict());
        let catalog = writer.write_new(&self.catalog_dict(first_page));

        let bytes = writer.finish(catalog, info)?;
        log::debug!("Document finalized: {} pages, {} bytes", kid_count, bytes.len());
        Ok(bytes)
    }

    fn write_pages(&self, writer: &mut ObjectWriter) -> Result<Vec<Object>> {
        let mut kids = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let page_id = writer.peek_next_id();
            let contents = ObjectRef::new(page_id + 1, 0);

            let mut entries = vec![
                ("Type", ObjectSerializer::name("Page")),
                ("Parent", ObjectSerializer::reference(PAGES_ID, 0)),
            ];
            if (page.width_pt, page.height_pt) != self.default_size_pt {
                entries.push((
                    "MediaBox",
                    ObjectSerializer::rect(0.0, 0.0, page.width_pt, page.height_pt),
                ));
            }
            entries.push(("Resources", ObjectSerializer::reference(RESOURCES_ID, 0)));
            if !page.links.is_empty() {
                let annots = page.links.iter().map(link_annotation).collect();
                entries.push(("Annots", Object::Array(annots)));
            }
            entries.push(("Contents", Object::Reference(contents)));

            let page_ref = writer.write_new(&ObjectSerializer::dict(entries));
            let data = page.canvas.build()?;
            let stream_ref = writer.write_new(&Object::Stream {
                dict: Dictionary::new(),
                data: bytes::Bytes::from(data),
            });
            if stream_ref != contents {
                return Err(Error::InternalConsistency(format!(
                    "contents of page {} written as {} instead of {}",
                    page_ref, stream_ref, contents
                )));
            }
            kids.push(Object::Reference(page_ref));
        }
        Ok(kids)
    }

    fn info_dict(&self) -> Object {
        let producer = format!("pdf_slate {}", crate::VERSION);
        let mut entries = vec![("Producer", text_string(&producer))];
        let optional = [
            ("Title", &self.config.title),
            ("Author", &self.config.author),
            ("Subject", &self.config.subject),
            ("Keywords", &self.config.keywords),
            ("Creator", &self.config.creator),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                entries.push((key, text_string(value)));
            }
        }
        let created = self.config.creation_date.unwrap_or_else(Utc::now);
        let date = created.format("D:%Y%m%d%H%M%SZ").to_string();
        entries.push(("CreationDate", ObjectSerializer::string(&date)));
        ObjectSerializer::dict(entries)
    }

    fn catalog_dict(&self, first_page: Object) -> Object {
        let mut entries = vec![
            ("Type", ObjectSerializer::name("Catalog")),
            ("Pages", ObjectSerializer::reference(PAGES_ID, 0)),
        ];
        let open_action = match self.config.zoom {
            ZoomMode::Default => None,
            ZoomMode::FullPage => Some(vec![first_page, ObjectSerializer::name("Fit")]),
            ZoomMode::FullWidth => {
                Some(vec![first_page, ObjectSerializer::name("FitH"), Object::Null])
            },
            ZoomMode::Real => Some(xyz(first_page, 1.0)),
            ZoomMode::Percent(pct) => Some(xyz(first_page, pct / 100.0)),
        };
        if let Some(action) = open_action {
            entries.push(("OpenAction", Object::Array(action)));
        }
        if let Some(layout) = self.config.layout.as_pdf_name() {
            entries.push(("PageLayout", ObjectSerializer::name(layout)));
        }
        ObjectSerializer::dict(entries)
    }
}

fn oriented((w, h): (f64, f64), orientation: Orientation) -> (f64, f64) {
    match orientation {
        Orientation::Portrait => (w, h),
        Orientation::Landscape => (h, w),
    }
}

fn xyz(page: Object, zoom: f64) -> Vec<Object> {
    vec![
        page,
        ObjectSerializer::name("XYZ"),
        Object::Null,
        Object::Null,
        ObjectSerializer::real(zoom),
    ]
}

fn link_annotation(link: &LinkArea) -> Object {
    let [llx, lly, urx, ury] = link.rect;
    ObjectSerializer::dict(vec![
        ("Type", ObjectSerializer::name("Annot")),
        ("Subtype", ObjectSerializer::name("Link")),
        ("Rect", ObjectSerializer::rect(llx, lly, urx, ury)),
        (
            "Border",
            ObjectSerializer::array(vec![
                ObjectSerializer::integer(0),
                ObjectSerializer::integer(0),
                ObjectSerializer::integer(0),
            ]),
        ),
        (
            "A",
            ObjectSerializer::dict(vec![
                ("S", ObjectSerializer::name("URI")),
                ("URI", ObjectSerializer::string(&link.uri)),
            ]),
        ),
    ])
}

/// Text string for the info dictionary: ASCII as is, anything else as
/// UTF-16BE with a byte order mark.
fn text_string(s: &str) -> Object {
    if s.is_ascii() {
        ObjectSerializer::string(s)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in s.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Unit;
    use chrono::TimeZone;

    fn fixed_config() -> DocumentConfig {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        DocumentConfig::new().with_creation_date(created)
    }

    fn canvas(doc: &Document) -> String {
        let bytes = doc.pages.last().unwrap().canvas.build().unwrap();
        String::from_utf8_lossy(&bytes).to_string()
    }

    #[test]
    fn test_defaults() {
        let doc = Document::new(DocumentConfig::new()).unwrap();
        let k = 72.0 / 25.4;
        assert!((doc.l_margin - 28.35 / k).abs() < 1e-9);
        assert!((doc.c_margin - doc.l_margin / 10.0).abs() < 1e-9);
        assert!((doc.b_margin - 2.0 * doc.l_margin).abs() < 1e-9);
        assert!((doc.page_height() - 841.89 / k).abs() < 1e-9);
        assert_eq!(doc.page_no(), 0);
    }

    #[test]
    fn test_add_page_emits_state() {
        let mut doc = Document::new(DocumentConfig::new().with_unit(Unit::Point)).unwrap();
        doc.set_fill_color(Color::rgb(200, 220, 255));
        doc.add_page().unwrap();
        let content = canvas(&doc);
        assert!(content.starts_with("2 J\n0.57 w\nBT\n/F1 12.00 Tf\nET\n"));
        assert!(content.contains("0.784 0.863 1.000 rg\n"));
        assert!(!content.contains(" RG\n"));
        assert_eq!((doc.x(), doc.y()), (28.35, 28.35));
    }

    #[test]
    fn test_setters_emit_only_with_open_page() {
        let mut doc = Document::new(DocumentConfig::new()).unwrap();
        doc.set_draw_color(Color::gray(255));
        doc.set_line_width(1.0);
        assert!(doc.pages.is_empty());
        doc.add_page().unwrap();
        doc.set_draw_color(Color::rgb(255, 0, 0));
        let content = canvas(&doc);
        assert!(content.contains("1.000 G\n"));
        assert!(content.contains("1.000 0.000 0.000 RG\n"));
        assert!(content.contains("2.83 w\n"));
    }

    #[test]
    fn test_set_font_is_idempotent() {
        let mut doc = Document::new(DocumentConfig::new()).unwrap();
        doc.add_page().unwrap();
        doc.set_font("Arial", "B", 14.0).unwrap();
        doc.set_font("Arial", "B", 14.0).unwrap();
        let content = canvas(&doc);
        assert_eq!(content.matches("/F2 14.00 Tf").count(), 1);
        assert!(matches!(doc.set_font("Wingdings", "", 12.0), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_line_and_rect_transform() {
        let mut doc = Document::new(DocumentConfig::new()).unwrap();
        doc.line(0.0, 0.0, 5.0, 5.0);
        assert!(doc.pages.is_empty());

        doc.add_page().unwrap();
        doc.line(10.0, 10.0, 20.0, 10.0);
        doc.rect(10.0, 10.0, 50.0, 30.0, "F");
        doc.rect(0.0, 0.0, 10.0, 10.0, "DF");
        let content = canvas(&doc);
        assert!(content.contains("28.35 813.54 m\n56.69 813.54 l\nS\n"));
        assert!(content.contains("28.35 813.54 141.73 -85.04 re\nf\n"));
        assert!(content.ends_with("0.00 841.89 28.35 -28.35 re\nB\n"));
    }

    #[test]
    fn test_cursor_helpers() {
        let mut doc = Document::new(DocumentConfig::new()).unwrap();
        doc.add_page().unwrap();
        doc.set_xy(50.0, -20.0);
        assert_eq!(doc.x(), 50.0);
        assert!((doc.y() - (doc.page_height() - 20.0)).abs() < 1e-9);
        doc.set_x(-30.0);
        assert!((doc.x() - (doc.page_width() - 30.0)).abs() < 1e-9);
        doc.ln(Some(5.0));
        assert_eq!(doc.x(), doc.left_margin());
    }

    #[test]
    fn test_landscape_page_gets_own_media_box() {
        let mut doc = Document::new(fixed_config()).unwrap();
        doc.add_page().unwrap();
        doc.add_page_with_orientation(Orientation::Landscape).unwrap();
        assert!(doc.page_width() > doc.page_height());
        let bytes = doc.finalize().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches("/MediaBox [0 0 841.89 595.28]").count(), 1);
        assert!(text.contains("/MediaBox [0 0 595.28 841.89]"));
    }

    #[test]
    fn test_finalize_structure() {
        let mut doc = Document::new(fixed_config()).unwrap();
        doc.set_title("Réservation");
        doc.set_display_mode(ZoomMode::FullPage, LayoutMode::Continuous).unwrap();
        doc.add_page().unwrap();
        let bytes = doc.finalize().unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.contains(
            "3 0 obj\n<</Type /Page /Parent 1 0 R /Resources 2 0 R /Contents 4 0 R>>"
        ));
        assert!(text.contains("1 0 obj\n<</Type /Pages /Kids [3 0 R] /Count 1"));
        assert!(text.contains(
            "5 0 obj\n<</Type /Font /BaseFont /Helvetica /Subtype /Type1 \
             /Encoding /WinAnsiEncoding>>"
        ));
        assert!(text.contains("2 0 obj\n<</ProcSet [/PDF /Text] /Font <</F1 5 0 R>>>>"));
        assert!(text.contains("/CreationDate (D:20240301123000Z)"));
        assert!(text.contains("/Title <FEFF"));
        assert!(text.contains("/OpenAction [3 0 R /Fit] /PageLayout /OneColumn"));
        assert!(text.contains("/Root 7 0 R /Info 6 0 R"));
    }

    #[test]
    fn test_empty_document_gets_a_page() {
        let mut doc = Document::new(fixed_config()).unwrap();
        let bytes = doc.finalize().unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("/Count 1"));
        assert!(matches!(doc.finalize(), Err(Error::DocumentClosed)));
    }

    #[test]
    fn test_closed_document_rejects_drawing() {
        let mut doc = Document::new(fixed_config()).unwrap();
        doc.add_page().unwrap();
        doc.finalize().unwrap();
        assert!(matches!(doc.add_page(), Err(Error::DocumentClosed)));
        assert!(matches!(doc.set_font("times", "", 10.0), Err(Error::DocumentClosed)));
        doc.rect(0.0, 0.0, 1.0, 1.0, "");
        doc.set_fill_color(Color::gray(0));
        assert!(doc.is_closed());
    }

    #[test]
    fn test_paint_style_from_str() {
        assert_eq!(PaintStyle::from(""), PaintStyle::Stroke);
        assert_eq!(PaintStyle::from("F"), PaintStyle::Fill);
        assert_eq!(PaintStyle::from("df"), PaintStyle::FillStroke);
    }

    #[test]
    fn test_open_action_targets_first_kid() {
        let mut doc = Document::new(fixed_config()).unwrap();
        doc.set_display_mode(ZoomMode::Percent(150.0), LayoutMode::Default).unwrap();
        doc.add_page().unwrap();
        doc.add_page().unwrap();
        let bytes = doc.finalize().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Kids [3 0 R 5 0 R]"));
        assert!(text.contains("/OpenAction [3 0 R /XYZ null null 1.5]"));
    }

    #[test]
    fn test_display_mode_rejects_bad_zoom() {
        let mut doc = Document::new(fixed_config()).unwrap();
        let result = doc.set_display_mode(ZoomMode::Percent(f64::NAN), LayoutMode::Single);
        assert!(matches!(result, Err(Error::Configuration(_))));
        assert!(matches!(
            doc.set_display_mode(ZoomMode::Percent(-20.0), LayoutMode::Default),
            Err(Error::Configuration(_))
        ));
        assert_eq!(doc.config.zoom, ZoomMode::Default);
    }
}
