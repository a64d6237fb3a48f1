//! OCR markup format detection and page splitting.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Supported OCR markup formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrFormat {
    /// Tesseract hOCR (XHTML)
    Hocr,
    /// ABBYY FineReader XML
    Abbyy,
    /// mupdf structured text XML
    Stext,
}

impl OcrFormat {
    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            OcrFormat::Hocr => "hocr",
            OcrFormat::Abbyy => "abbyy",
            OcrFormat::Stext => "stext",
        }
    }

    /// Parse a short name as returned by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "hocr" => Some(OcrFormat::Hocr),
            "abbyy" => Some(OcrFormat::Abbyy),
            "stext" => Some(OcrFormat::Stext),
            _ => None,
        }
    }
}

impl std::fmt::Display for OcrFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

static SECOND_NODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r">([^>]+)").expect("second node regex is valid"));

static ABBYY_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)abbyy").expect("abbyy marker regex is valid"));

static HOCR_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"class=['"](?:ocr_page|ocr_line|ocrx_word)['"]"#)
        .expect("hocr marker regex is valid")
});

static XML_PAGE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<page[\s>]").expect("page start regex is valid"));

static HOCR_PAGE_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<div class=['"]ocr_page['"]"#).expect("hocr page start regex is valid")
});

static BODY_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<body[^>]*>").expect("body open regex is valid"));

/// Detect the format of OCR markup.
///
/// The second markup node is inspected for an ABBYY namespace or a mupdf
/// `<document name` element; anything carrying hOCR classes is hOCR.
///
/// # Returns
/// * `Ok(OcrFormat)` if the markup is recognized
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_format(markup: &str) -> Result<OcrFormat> {
    if let Some(node) = SECOND_NODE.captures(markup).and_then(|c| c.get(1)) {
        let node = node.as_str();
        if ABBYY_MARKER.is_match(node) {
            return Ok(OcrFormat::Abbyy);
        }
        if node.contains("<document name") {
            return Ok(OcrFormat::Stext);
        }
    }

    if HOCR_MARKER.is_match(markup) {
        return Ok(OcrFormat::Hocr);
    }

    Err(Error::UnknownFormat)
}

/// Detect the format of an OCR markup file.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<OcrFormat> {
    let markup = fs::read_to_string(path)?;
    detect_format(&markup)
}

/// Check if a string looks like supported OCR markup.
pub fn is_ocr_markup(markup: &str) -> bool {
    detect_format(markup).is_ok()
}

/// Split a multi-page document into single-page markup strings.
///
/// ABBYY and stext are cut before each `<page` element and the prologue is
/// dropped. hOCR pages are cut before each `ocr_page` div and re-wrapped in
/// the document's head and closing tags so each chunk stands alone.
pub fn split_pages(markup: &str, format: OcrFormat) -> Vec<String> {
    match format {
        OcrFormat::Abbyy | OcrFormat::Stext => {
            let starts: Vec<usize> = XML_PAGE_START.find_iter(markup).map(|m| m.start()).collect();
            slices(markup, &starts)
                .into_iter()
                .map(str::to_string)
                .collect()
        }
        OcrFormat::Hocr => split_hocr_pages(markup),
    }
}

fn split_hocr_pages(markup: &str) -> Vec<String> {
    let (prologue, body) = match BODY_OPEN.find(markup) {
        Some(m) => markup.split_at(m.end()),
        None => ("", markup),
    };
    let (body, epilogue) = match body.rfind("</body>") {
        Some(pos) => body.split_at(pos),
        None => (body, ""),
    };
    let body = body.trim();

    let starts: Vec<usize> = HOCR_PAGE_START.find_iter(body).map(|m| m.start()).collect();
    let pages = if starts.is_empty() {
        vec![body]
    } else {
        slices(body, &starts)
    };

    pages
        .into_iter()
        .map(|page| format!("{}{}{}", prologue, page, epilogue))
        .collect()
}

/// Cut `text` at each start offset; text before the first offset is dropped.
fn slices<'a>(text: &'a str, starts: &[usize]) -> Vec<&'a str> {
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            &text[start..end]
        })
        .collect()
}
