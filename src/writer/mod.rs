//! PDF writing module for generating PDF files.
//!
//! This module provides the components behind [`Document`], from the
//! drawing API down to the bytes of the file.
//!
//! ## Architecture
//!
//! ```text
//! drawing calls (cell, multi_cell, line, rect, ...)
//!     ↓
//! [Document] + [GraphicsState] (cursor, font, colors, page breaks)
//!     ↓
//! [ContentStreamBuilder] (one operator log per page)
//!     ↓
//! [ObjectWriter] (page tree, fonts, info, catalog; offsets and xref)
//!     ↓
//! [ObjectSerializer] (serializes PDF objects)
//!     ↓
//! [Destination] (response, file or bytes)
//! ```
//!
//! ## Example
//!
//! ```
//! use pdf_slate::config::DocumentConfig;
//! use pdf_slate::writer::{Align, Cell, Document, LineFlow};
//!
//! let mut doc = Document::new(DocumentConfig::new())?;
//! doc.add_page()?;
//! doc.set_font("Times", "", 12.0)?;
//! let paragraph = "A paragraph that wraps at the right margin.";
//! doc.multi_cell(Cell::new(0.0, 5.0, paragraph).align(Align::Justify))?;
//! doc.cell(Cell::new(0.0, 10.0, "Thank you").align(Align::Center).ln(LineFlow::NextLine))?;
//! let bytes = doc.output_bytes()?;
//! assert!(bytes.ends_with(b"%%EOF"));
//! # Ok::<(), pdf_slate::error::Error>(())
//! ```

mod content_stream;
mod document;
mod font_manager;
mod graphics_state;
mod object_serializer;
mod output;
mod page_template;
mod pdf_writer;
mod text_layout;

pub use content_stream::{ContentStreamBuilder, ContentStreamOp};
pub use document::{Document, PaintStyle, DEFAULT_NB_ALIAS};
pub use font_manager::{
    encode_win_ansi, string_width, FontFamily, FontManager, FontStyle, StandardFont, GLYPH_WIDTH,
};
pub use graphics_state::{Color, FontSelection, GraphicsState};
pub use object_serializer::{escape_literal, ObjectSerializer};
pub use output::{
    content_disposition, Destination, MemoryResponse, ResponseChannel, WriterResponse,
    DEFAULT_FILE_NAME,
};
pub use page_template::{
    HFElement, HFStyle, HeaderFooter, PageDecorator, PageTemplate, Placeholder,
    PlaceholderContext,
};
pub use pdf_writer::{ObjectWriter, PDF_VERSION};
pub use text_layout::{break_lines, Align, Border, BreakKind, Cell, LineFlow, LineSegment};
