//! Page converter module providing a plugin architecture for OCR formats.
//!
//! Each supported markup format has a [`PageConverter`]. The
//! [`ConverterRegistry`] maps formats to converters and dispatches
//! single-page conversions; document-level helpers in the crate root use it
//! for every page.
//!
//! # Example
//!
//! ```no_run
//! use unocr::convert::ConverterRegistry;
//! use unocr::{detect_format, ConvertOptions};
//!
//! fn main() -> unocr::Result<()> {
//!     let markup = std::fs::read_to_string("page.hocr")?;
//!     let registry = ConverterRegistry::with_defaults();
//!
//!     let format = detect_format(&markup)?;
//!     let result = registry.convert(format, &markup, 0, &ConvertOptions::default())?;
//!     println!("{}", result.page.plain_text());
//!     Ok(())
//! }
//! ```

use crate::detect::OcrFormat;
use crate::error::{Error, Result};
use crate::model::ConvertedPage;
use crate::parser::{abbyy, hocr, stext, ConvertOptions};
use std::collections::HashMap;
use std::sync::Arc;

/// Trait for single-page OCR markup converters.
///
/// Implement this trait to add support for a new markup format.
pub trait PageConverter: Send + Sync {
    /// Get the format handled by this converter.
    fn format(&self) -> OcrFormat;

    /// Get the name of this converter.
    fn name(&self) -> &str {
        self.format().name()
    }

    /// Convert the markup of one page.
    fn convert(
        &self,
        markup: &str,
        page_index: usize,
        options: &ConvertOptions,
    ) -> Result<ConvertedPage>;
}

/// Converter for Tesseract hOCR.
#[derive(Debug, Clone, Copy, Default)]
pub struct HocrConverter;

impl HocrConverter {
    /// Create a new hOCR converter.
    pub fn new() -> Self {
        Self
    }
}

impl PageConverter for HocrConverter {
    fn format(&self) -> OcrFormat {
        OcrFormat::Hocr
    }

    fn convert(
        &self,
        markup: &str,
        page_index: usize,
        options: &ConvertOptions,
    ) -> Result<ConvertedPage> {
        hocr::convert_page(markup, page_index, &options.hocr)
    }
}

/// Converter for ABBYY FineReader XML.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbbyyConverter;

impl AbbyyConverter {
    /// Create a new ABBYY converter.
    pub fn new() -> Self {
        Self
    }
}

impl PageConverter for AbbyyConverter {
    fn format(&self) -> OcrFormat {
        OcrFormat::Abbyy
    }

    fn convert(
        &self,
        markup: &str,
        page_index: usize,
        _options: &ConvertOptions,
    ) -> Result<ConvertedPage> {
        abbyy::convert_page(markup, page_index)
    }
}

/// Converter for mupdf structured text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StextConverter;

impl StextConverter {
    /// Create a new stext converter.
    pub fn new() -> Self {
        Self
    }
}

impl PageConverter for StextConverter {
    fn format(&self) -> OcrFormat {
        OcrFormat::Stext
    }

    fn convert(
        &self,
        markup: &str,
        page_index: usize,
        _options: &ConvertOptions,
    ) -> Result<ConvertedPage> {
        stext::convert_page(markup, page_index)
    }
}

/// Registry for page converters.
pub struct ConverterRegistry {
    converters: HashMap<OcrFormat, Arc<dyn PageConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Create a registry with the hOCR, ABBYY and stext converters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(HocrConverter::new()));
        registry.register(Arc::new(AbbyyConverter::new()));
        registry.register(Arc::new(StextConverter::new()));
        registry
    }

    /// Register a converter, replacing any converter for the same format.
    pub fn register(&mut self, converter: Arc<dyn PageConverter>) {
        self.converters.insert(converter.format(), converter);
    }

    /// Get the converter for a format.
    pub fn get(&self, format: OcrFormat) -> Option<Arc<dyn PageConverter>> {
        self.converters.get(&format).cloned()
    }

    /// Check if a format is supported.
    pub fn supports(&self, format: OcrFormat) -> bool {
        self.converters.contains_key(&format)
    }

    /// Convert one page with the converter registered for `format`.
    pub fn convert(
        &self,
        format: OcrFormat,
        markup: &str,
        page_index: usize,
        options: &ConvertOptions,
    ) -> Result<ConvertedPage> {
        let converter = self
            .get(format)
            .ok_or_else(|| Error::Other(format!("No converter for format: {}", format)))?;

        converter.convert(markup, page_index, options)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_with_defaults() {
        let registry = ConverterRegistry::with_defaults();
        assert!(registry.supports(OcrFormat::Hocr));
        assert!(registry.supports(OcrFormat::Abbyy));
        assert!(registry.supports(OcrFormat::Stext));
        assert!(!ConverterRegistry::new().supports(OcrFormat::Hocr));
    }

    #[test]
    fn test_registry_get() {
        let registry = ConverterRegistry::with_defaults();
        let converter = registry.get(OcrFormat::Abbyy);
        assert!(converter.is_some());
        assert_eq!(converter.unwrap().name(), "abbyy");
    }

    #[test]
    fn test_convert_without_converter() {
        let registry = ConverterRegistry::new();
        let result = registry.convert(OcrFormat::Stext, "", 0, &ConvertOptions::default());
        assert!(matches!(result, Err(Error::Other(_))));
    }

    #[test]
    fn test_convert_dispatches_by_format() {
        let registry = ConverterRegistry::with_defaults();
        let markup = r#"<page width="100" height="100"><block><line><formatting>x</formatting></line></block></page>"#;
        let result = registry.convert(OcrFormat::Abbyy, markup, 2, &ConvertOptions::default());
        assert!(matches!(result, Err(Error::NoCharacterData(2))));
    }
}
