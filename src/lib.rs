//! # unocr
//!
//! OCR markup normalization library for Rust.
//!
//! This library reads the layout output of OCR engines and converts it into
//! one normalized page/line/word model, together with per-font glyph metrics
//! and table column boxes.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unocr::{convert_file, render, ConvertOptions};
//!
//! fn main() -> unocr::Result<()> {
//!     // Convert a multi-page hOCR, ABBYY or stext file
//!     let doc = convert_file("scan.hocr", &ConvertOptions::default())?;
//!
//!     // Serialize the normalized model
//!     let json = render::to_json(&doc, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Three input formats**: Tesseract hOCR, ABBYY FineReader XML, mupdf stext
//! - **Glyph-level correction**: small caps, footnote superscripts, dashes, quotes
//! - **Font metrics**: glyph sizes normalized by x-height, merged across pages
//! - **Table columns**: column boxes from ABBYY table blocks
//! - **Parallel processing**: Uses Rayon for multi-page documents

pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use convert::{AbbyyConverter, ConverterRegistry, HocrConverter, PageConverter, StextConverter};
pub use detect::{detect_format, detect_format_from_path, is_ocr_markup, split_pages, OcrFormat};
pub use error::{Error, Result};
pub use model::{
    BBox, Baseline, ConvertedPage, Dims, Document, FontClass, FontMetricsAccumulator, LayoutBox,
    LayoutBoxType, LayoutBoxes, Line, Page, RawFontMetrics, Warnings, Word, WordStyle,
};
pub use parser::{ConvertOptions, ErrorMode, HocrOptions};
pub use render::JsonFormat;

use rayon::prelude::*;
use std::fs;
use std::path::Path;

/// Convert one page of Tesseract hOCR.
///
/// # Arguments
///
/// * `markup` - hOCR for a single page
/// * `page_index` - Page number (0-indexed), used in errors and word ids
/// * `dims` - Page size; read from the `ocr_page` bbox when `None`
/// * `angle` - Degrees the image was rotated by before recognition
/// * `engine` - Engine name; only `"Tesseract Legacy"` italics are trusted
///
/// # Example
///
/// ```no_run
/// use unocr::convert_hocr;
///
/// let markup = std::fs::read_to_string("page.hocr").unwrap();
/// let result = convert_hocr(&markup, 0, None, 0.0, None).unwrap();
/// println!("{} lines", result.page.lines.len());
/// ```
pub fn convert_hocr(
    markup: &str,
    page_index: usize,
    dims: Option<Dims>,
    angle: f64,
    engine: Option<&str>,
) -> Result<ConvertedPage> {
    let options = HocrOptions {
        page_dims: dims,
        rotate_angle: angle,
        engine: engine.map(str::to_string),
    };
    parser::hocr::convert_page(markup, page_index, &options)
}

/// Convert one page of ABBYY FineReader XML.
///
/// Returns [`Error::NoCharacterData`] when the page has no `<charParams>`;
/// check it with [`Error::is_char_error`].
///
/// # Example
///
/// ```no_run
/// use unocr::convert_abbyy;
///
/// let markup = std::fs::read_to_string("page.xml").unwrap();
/// match convert_abbyy(&markup, 0) {
///     Ok(result) => println!("{} tables", result.table_boxes.len()),
///     Err(e) if e.is_char_error() => println!("no character data"),
///     Err(e) => return Err(e),
/// }
/// # Ok::<(), unocr::Error>(())
/// ```
pub fn convert_abbyy(markup: &str, page_index: usize) -> Result<ConvertedPage> {
    parser::abbyy::convert_page(markup, page_index)
}

/// Convert one page of mupdf structured text.
pub fn convert_stext(markup: &str, page_index: usize) -> Result<ConvertedPage> {
    parser::stext::convert_page(markup, page_index)
}

/// Convert a multi-page OCR document held in memory.
///
/// The format is detected, the markup is split into pages and each page is
/// converted. Font metrics are merged once every page has completed.
///
/// # Example
///
/// ```no_run
/// use unocr::{convert_str, ConvertOptions};
///
/// let markup = std::fs::read_to_string("book.xml").unwrap();
/// let doc = convert_str(&markup, &ConvertOptions::new().lenient()).unwrap();
/// println!("Pages: {}, skipped: {:?}", doc.page_count(), doc.skipped_pages);
/// ```
pub fn convert_str(markup: &str, options: &ConvertOptions) -> Result<Document> {
    let format = detect_format(markup)?;
    let pages = split_pages(markup, format);
    let registry = ConverterRegistry::with_defaults();

    log::debug!("Converting {} {} pages", pages.len(), format);

    let convert = |(index, page): (usize, &String)| registry.convert(format, page, index, options);
    let results: Vec<Result<ConvertedPage>> = if options.parallel {
        pages.par_iter().enumerate().map(convert).collect()
    } else {
        pages.iter().enumerate().map(convert).collect()
    };

    let mut converted = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(page) => converted.push(page),
            Err(e) if options.error_mode == ErrorMode::Lenient => {
                log::warn!("Skipping page {}: {}", index, e);
                skipped.push(index);
            }
            Err(e) => return Err(e),
        }
    }

    let mut doc = Document::from_pages(format, converted);
    doc.skipped_pages = skipped;
    Ok(doc)
}

/// Convert a multi-page OCR markup file.
///
/// # Example
///
/// ```no_run
/// use unocr::{convert_file, ConvertOptions};
///
/// let doc = convert_file("scan.hocr", &ConvertOptions::default()).unwrap();
/// println!("{}", doc.plain_text());
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<Document> {
    let markup = fs::read_to_string(path)?;
    convert_str(&markup, options)
}

/// Extract plain text from an OCR markup file.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = convert_file(path, &ConvertOptions::default())?;
    Ok(doc.plain_text())
}

/// Convert an OCR markup file to JSON.
///
/// # Example
///
/// ```no_run
/// use unocr::{to_json, JsonFormat};
///
/// let json = to_json("scan.hocr", JsonFormat::Pretty).unwrap();
/// std::fs::write("scan.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = convert_file(path, &ConvertOptions::default())?;
    render::to_json(&doc, format)
}

/// Builder for converting OCR documents.
///
/// # Example
///
/// ```no_run
/// use unocr::{JsonFormat, Unocr};
///
/// let json = Unocr::new()
///     .lenient()
///     .with_engine("Tesseract Legacy")
///     .convert_file("scan.hocr")?
///     .to_json(JsonFormat::Compact)?;
/// # Ok::<(), unocr::Error>(())
/// ```
pub struct Unocr {
    options: ConvertOptions,
}

impl Unocr {
    /// Create a new Unocr builder.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
        }
    }

    /// Skip pages that fail to convert.
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Set the hOCR page size used when pages carry no bbox.
    pub fn with_page_dims(mut self, dims: Dims) -> Self {
        self.options.hocr = self.options.hocr.with_page_dims(dims);
        self
    }

    /// Set the angle hOCR images were rotated by before recognition.
    pub fn with_rotate_angle(mut self, degrees: f64) -> Self {
        self.options.hocr = self.options.hocr.with_rotate_angle(degrees);
        self
    }

    /// Set the engine that produced hOCR input.
    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.options.hocr = self.options.hocr.with_engine(engine);
        self
    }

    /// Get the options this builder converts with.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert markup held in memory.
    pub fn convert_str(self, markup: &str) -> Result<UnocrResult> {
        let document = convert_str(markup, &self.options)?;
        Ok(UnocrResult { document })
    }

    /// Convert a markup file.
    pub fn convert_file<P: AsRef<Path>>(self, path: P) -> Result<UnocrResult> {
        let document = convert_file(path, &self.options)?;
        Ok(UnocrResult { document })
    }
}

impl Default for Unocr {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of converting an OCR document.
pub struct UnocrResult {
    /// The converted document
    pub document: Document,
}

impl UnocrResult {
    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Get plain text, one line per text line.
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Take the document.
    pub fn into_document(self) -> Document {
        self.document
    }
}
