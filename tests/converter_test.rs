//! Integration tests for the converter module.

use std::sync::Arc;
use unocr::convert::{
    AbbyyConverter, ConverterRegistry, HocrConverter, PageConverter, StextConverter,
};
use unocr::error::Result;
use unocr::{ConvertOptions, ConvertedPage, Dims, FontMetricsAccumulator, OcrFormat, Page};

/// Mock converter for testing.
struct MockConverter {
    format: OcrFormat,
}

impl PageConverter for MockConverter {
    fn format(&self) -> OcrFormat {
        self.format
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn convert(
        &self,
        _markup: &str,
        page_index: usize,
        _options: &ConvertOptions,
    ) -> Result<ConvertedPage> {
        Ok(ConvertedPage::new(
            Page::new(page_index, Dims::new(1, 1)),
            FontMetricsAccumulator::new(),
            false,
        ))
    }
}

#[test]
fn test_converter_registry_new() {
    let registry = ConverterRegistry::new();
    assert!(!registry.supports(OcrFormat::Hocr));
    assert!(registry.get(OcrFormat::Hocr).is_none());
}

#[test]
fn test_default_converters() {
    assert_eq!(HocrConverter::new().format(), OcrFormat::Hocr);
    assert_eq!(AbbyyConverter::new().name(), "abbyy");
    assert_eq!(StextConverter::new().name(), "stext");

    let registry = ConverterRegistry::default();
    for format in [OcrFormat::Hocr, OcrFormat::Abbyy, OcrFormat::Stext] {
        assert_eq!(registry.get(format).map(|c| c.format()), Some(format));
    }
}

#[test]
fn test_register_replaces_converter() {
    let mut registry = ConverterRegistry::with_defaults();
    registry.register(Arc::new(MockConverter {
        format: OcrFormat::Stext,
    }));

    assert_eq!(registry.get(OcrFormat::Stext).unwrap().name(), "mock");
    let result = registry
        .convert(OcrFormat::Stext, "anything", 4, &ConvertOptions::default())
        .unwrap();
    assert_eq!(result.page.index, 4);
    assert!(!result.warnings.char_level);
}

#[test]
fn test_hocr_converter_uses_options() {
    let markup = "<div class='ocr_page' title='image'></div>";
    let options = ConvertOptions::new().with_hocr(unocr::HocrOptions::new().with_page_dims(Dims::new(50, 60)));

    let result = HocrConverter::new().convert(markup, 0, &options).unwrap();
    assert_eq!(result.page.dims, Dims::new(50, 60));
    assert!(HocrConverter::new()
        .convert(markup, 0, &ConvertOptions::default())
        .is_err());
}
