//! Error types for pdfblocks.

use std::io;
use thiserror::Error;

/// Result type alias for pdfblocks operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting layout from a PDF.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// The PDF structure is corrupted or malformed.
    #[error("Corrupted PDF structure: {0}")]
    Corrupted(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// The layout pipeline rejected a page record.
    #[error("Layout error on page {page}: {message}")]
    Layout {
        /// Page number (1-indexed)
        page: u32,
        /// What went wrong
        message: String,
    },

    /// Error during serialization (HTML, text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Extraction was cancelled between pages.
    #[error("Extraction cancelled before page {0}")]
    Cancelled(u32),

    /// The wall-clock budget was exhausted between pages.
    #[error("Extraction timed out after {elapsed_ms} ms (before page {page})")]
    Timeout {
        /// Page that would have been processed next
        page: u32,
        /// Elapsed time in milliseconds
        elapsed_ms: u128,
    },

    /// Both the structured pipeline and the plain-text fallback failed.
    #[error("Could not extract content from the document: {structured}; plain-text fallback also failed: {fallback}")]
    ExtractionFailed {
        /// Error raised by the structured pipeline
        structured: Box<Error>,
        /// Error raised by the plain-text fallback
        fallback: Box<Error>,
    },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error ends an extraction without trying the fallback.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Error::Cancelled(_) | Error::Timeout { .. })
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_extraction_failed_mentions_both_causes() {
        let err = Error::ExtractionFailed {
            structured: Box::new(Error::PdfParse("bad xref".into())),
            fallback: Box::new(Error::UnknownFormat),
        };
        let msg = err.to_string();
        assert!(msg.contains("bad xref"));
        assert!(msg.contains("not a valid PDF"));
    }

    #[test]
    fn test_terminal_errors() {
        assert!(Error::Cancelled(3).is_terminal());
        assert!(Error::Timeout {
            page: 2,
            elapsed_ms: 10
        }
        .is_terminal());
        assert!(!Error::UnknownFormat.is_terminal());
    }
}
