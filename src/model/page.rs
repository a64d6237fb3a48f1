//! Page-level types.

use super::{Dims, FontMetricsAccumulator, LayoutBoxes, Line, Word};
use serde::{Deserialize, Serialize};

/// One recognized page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (0-indexed)
    pub index: usize,

    /// Pixel dimensions
    pub dims: Dims,

    /// Estimated skew in degrees, 0 when unknown
    pub angle: f64,

    /// Estimated left text margin, `None` with too few long lines
    pub left_margin: Option<f64>,

    /// Slope-corrected margin minus `left_margin`
    pub left_margin_adjusted: Option<f64>,

    /// Lines in markup order
    pub lines: Vec<Line>,
}

impl Page {
    /// Create a new empty page.
    pub fn new(index: usize, dims: Dims) -> Self {
        Self {
            index,
            dims,
            angle: 0.0,
            left_margin: None,
            left_margin_adjusted: None,
            lines: Vec::new(),
        }
    }

    /// Iterate over all words with the index of their owning line.
    pub fn words(&self) -> impl Iterator<Item = (usize, &Word)> {
        self.lines
            .iter()
            .enumerate()
            .flat_map(|(i, line)| line.words.iter().map(move |w| (i, w)))
    }

    /// Find a word by id.
    pub fn find_word(&self, id: &str) -> Option<&Word> {
        self.words().map(|(_, w)| w).find(|w| w.id == id)
    }

    /// Total number of words.
    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|l| l.words.len()).sum()
    }

    /// Plain text, one line per text line.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if the page has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Signals about conversion quality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warnings {
    /// Character-level data was available
    pub char_level: bool,
}

/// Result of converting one page of OCR markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedPage {
    /// The normalized page
    pub page: Page,

    /// Font metric observations from this page
    pub font_metrics: FontMetricsAccumulator,

    /// Table column boxes (ABBYY only)
    pub table_boxes: LayoutBoxes,

    pub warnings: Warnings,
}

impl ConvertedPage {
    /// Wrap a page with its metrics.
    pub fn new(page: Page, font_metrics: FontMetricsAccumulator, char_level: bool) -> Self {
        Self {
            page,
            font_metrics,
            table_boxes: LayoutBoxes::new(),
            warnings: Warnings { char_level },
        }
    }

    /// Attach table boxes.
    pub fn with_table_boxes(mut self, table_boxes: LayoutBoxes) -> Self {
        self.table_boxes = table_boxes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Baseline};

    fn page() -> Page {
        let mut page = Page::new(0, Dims::new(1000, 1400));
        let mut line = Line::new(BBox::new(0, 0, 100, 20), Baseline::default(), 10.0, None);
        line.words.push(Word::new("a", BBox::new(0, 0, 10, 20), "w1"));
        line.words.push(Word::new("b", BBox::new(20, 0, 30, 20), "w2"));
        page.lines.push(line);
        let mut line = Line::new(BBox::new(0, 30, 100, 50), Baseline::default(), 10.0, None);
        line.words.push(Word::new("c", BBox::new(0, 30, 10, 50), "w3"));
        page.lines.push(line);
        page
    }

    #[test]
    fn test_words_carry_line_index() {
        let page = page();
        let owners: Vec<usize> = page.words().map(|(i, _)| i).collect();
        assert_eq!(owners, vec![0, 0, 1]);
        assert_eq!(page.word_count(), 3);
    }

    #[test]
    fn test_find_word() {
        let page = page();
        assert_eq!(page.find_word("w3").map(|w| w.text.as_str()), Some("c"));
        assert!(page.find_word("missing").is_none());
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(page().plain_text(), "a b\nc");
    }
}
