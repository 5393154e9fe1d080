//! Error types for the PDF engine.
//!
//! Every error aborts generation; there is no partial-document recovery.

/// Result type alias for PDF generation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building or emitting a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid orientation, unit, page size or font selection
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A header-based destination was requested after bytes were already flushed
    #[error("Output already started: {0}")]
    OutputAlreadyStarted(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Offset or length bookkeeping mismatch detected while writing the trailer
    #[error("Internal consistency error: {0}")]
    InternalConsistency(String),

    /// The document was already finalized
    #[error("Document is closed: it has already been finalized")]
    DocumentClosed,
}
