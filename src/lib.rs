// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]

//! # pdf_slate
//!
//! A small, dependency-light PDF generator for transactional documents:
//! booking confirmations, receipts, tickets.
//!
//! ## Features
//!
//! - **Page model**: portrait/landscape pages in A3, A4, A5, Letter, Legal or
//!   custom sizes, with points, millimeters, centimeters or inches as the user unit
//! - **Text layout**: single-line cells with borders, fills, alignment and
//!   links; word-wrapped, optionally justified paragraphs
//! - **Drawing**: lines and rectangles in any color
//! - **Standard fonts**: the Base-14 fonts, WinAnsi encoded
//! - **Headers and footers**: a pluggable [`PageDecorator`](writer::PageDecorator)
//!   with a stock template supporting page numbers and page counts
//! - **Output**: inline or attachment responses, files, or bytes
//!
//! Every object offset in the cross-reference table is checked against the
//! written bytes before the file is returned.
//!
//! ## Quick Start
//!
//! ```
//! use pdf_slate::{Cell, Document, DocumentConfig, LineFlow};
//!
//! # fn main() -> pdf_slate::Result<()> {
//! let mut doc = Document::new(DocumentConfig::new().with_title("Booking"))?;
//! doc.add_page()?;
//! doc.set_font("Arial", "B", 16.0)?;
//! doc.cell(Cell::new(40.0, 10.0, "Hello World!").ln(LineFlow::NextLine))?;
//! let pdf = doc.output_bytes()?;
//! assert!(pdf.starts_with(b"%PDF-1.3"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade; install any logger (for
//! example `env_logger`) to see page and object bookkeeping at `debug` level.
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 (<http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license (<http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Error handling
pub mod error;

// Configuration
pub mod config;

// PDF object model
pub mod object;

// PDF writing/creation
pub mod writer;

// Re-exports
pub use config::{DocumentConfig, LayoutMode, Orientation, PageFormat, Unit, ZoomMode};
pub use error::{Error, Result};
pub use writer::{Align, Border, Cell, Color, Destination, Document, LineFlow, PaintStyle};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
