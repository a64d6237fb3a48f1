//! Error types for unocr library.

use std::io;
use thiserror::Error;

/// Result type alias for unocr operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting OCR markup.
///
/// Defects inside a page (a line without a baseline, a word whose text is
/// empty after correction) are never reported here; those elements are
/// dropped and conversion continues.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading markup files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The markup is not hOCR, ABBYY XML or mupdf stext.
    #[error("Unknown OCR format: expected hOCR, ABBYY XML or stext")]
    UnknownFormat,

    /// Page dimensions were neither supplied nor present in the markup.
    #[error("Page dimensions missing for page {0}")]
    MissingPageDimensions(usize),

    /// ABBYY page without any `<charParams>` element.
    #[error("No character-level data in ABBYY page {0}")]
    NoCharacterData(usize),

    /// Page index is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// Error during rendering (JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this is the ABBYY "no character data" condition.
    ///
    /// Callers converting whole documents usually treat this as an expected
    /// input class and branch on it rather than failing.
    pub fn is_char_error(&self) -> bool {
        matches!(self, Error::NoCharacterData(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NoCharacterData(2);
        assert_eq!(err.to_string(), "No character-level data in ABBYY page 2");

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
    fn test_is_char_error() {
        assert!(Error::NoCharacterData(0).is_char_error());
        assert!(!Error::UnknownFormat.is_char_error());
    }
}
