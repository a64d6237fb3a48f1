//! JSON rendering for converted OCR documents.

use crate::error::{Error, Result};
use crate::model::{ConvertedPage, Document};
use serde::Serialize;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

fn serialize<T: Serialize>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Convert a document to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    serialize(doc, format)
}

/// Convert a single page result to JSON.
pub fn page_to_json(page: &ConvertedPage, format: JsonFormat) -> Result<String> {
    serialize(page, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::OcrFormat;
    use crate::model::{BBox, Baseline, Dims, FontMetricsAccumulator, Line, Page, Word, WordStyle};

    fn document() -> Document {
        let mut page = Page::new(0, Dims::new(1000, 1400));
        let mut line = Line::new(BBox::new(10, 10, 60, 30), Baseline::new(0.0, -4.0), 14.0, None);
        line.words.push(
            Word::new("Hello", BBox::new(10, 10, 60, 30), "word_1_1_1").with_style(WordStyle::SmallCaps),
        );
        page.lines.push(line);
        Document::from_pages(
            OcrFormat::Stext,
            vec![ConvertedPage::new(page, FontMetricsAccumulator::new(), true)],
        )
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&document(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"format\": \"stext\""));
        assert!(json.contains("\"small-caps\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&document(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"text\":\"Hello\""));
    }

    #[test]
    fn test_page_round_trip() {
        let doc = document();
        let page = ConvertedPage::new(doc.pages[0].clone(), FontMetricsAccumulator::new(), false);
        let json = page_to_json(&page, JsonFormat::Compact).unwrap();
        let back: ConvertedPage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.page, doc.pages[0]);
        assert!(!back.warnings.char_level);
    }
}
