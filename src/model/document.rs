//! Document-level types.

use super::{ConvertedPage, FontMetricsAccumulator, LayoutBoxes, Page};
use crate::detect::OcrFormat;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A converted multi-page OCR document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Source markup format
    pub format: OcrFormat,

    /// Converted pages in document order
    pub pages: Vec<Page>,

    /// Font metrics merged over all pages
    pub font_metrics: FontMetricsAccumulator,

    /// Table boxes, one map per entry in `pages`
    pub table_boxes: Vec<LayoutBoxes>,

    /// Every page carried character-level data
    pub char_level: bool,

    /// Indices of pages skipped in lenient mode
    pub skipped_pages: Vec<usize>,
}

impl Document {
    /// Create a new empty document.
    pub fn new(format: OcrFormat) -> Self {
        Self {
            format,
            pages: Vec::new(),
            font_metrics: FontMetricsAccumulator::new(),
            table_boxes: Vec::new(),
            char_level: true,
            skipped_pages: Vec::new(),
        }
    }

    /// Assemble a document from per-page results.
    ///
    /// Font metrics are merged only here, after every page has completed.
    pub fn from_pages(format: OcrFormat, converted: Vec<ConvertedPage>) -> Self {
        let mut doc = Self::new(format);
        let mut metrics = Vec::with_capacity(converted.len());

        for result in converted {
            doc.char_level &= result.warnings.char_level;
            doc.pages.push(result.page);
            doc.table_boxes.push(result.table_boxes);
            metrics.push(result.font_metrics);
        }

        doc.font_metrics = FontMetricsAccumulator::merge_all(metrics);
        doc
    }

    /// Get the number of converted pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get a converted page by position.
    pub fn page(&self, position: usize) -> Result<&Page> {
        self.pages
            .get(position)
            .ok_or(Error::PageOutOfRange(position, self.pages.len()))
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
