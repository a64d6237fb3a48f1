//! Font-name classification.
//!
//! OCR engines report font names in many spellings ("Times New Roman",
//! "TimesNewRomanPS-ItalicMT", "Arial_Bold"). Only the sans/serif class is
//! kept.

use crate::model::FontClass;
use once_cell::sync::Lazy;
use regex::Regex;

const SERIF_FONTS: &[&str] = &[
    "SerifDefault",
    "Baskerville",
    "Book",
    "C059",
    "Cambria",
    "Century",
    "Courier",
    "Garamond",
    "Georgia",
    "LucidaBright",
    "Minion",
    "P052",
    "Palatino",
    "Times",
];

const SANS_FONTS: &[&str] = &[
    "SansDefault",
    "Arial",
    "Calibri",
    "Candara",
    "Carlito",
    "Comic",
    "Franklin",
    "Helvetica",
    "Impact",
    "Interstate",
    "Myriad",
    "Tahoma",
    "Trebuchet",
    "UniversNext",
    "Verdana",
];

/// Names that carry no font information.
const PLACEHOLDER_FONTS: &[&str] = &["Default", "GlyphLessFont", "HiddenHorzOCR"];

static SANS_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(^|\W|_)sans($|\W|_)").expect("sans word regex is valid"));

static SERIF_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(^|\W|_)serif($|\W|_)").expect("serif word regex is valid"));

static SERIF_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("(?i){}", SERIF_FONTS.join("|"))).expect("serif list regex is valid")
});

static SANS_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("(?i){}", SANS_FONTS.join("|"))).expect("sans list regex is valid")
});

static SERIF_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)serif|rom").expect("serif hint regex is valid"));

static SANS_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)san").expect("sans hint regex is valid"));

/// Classify a raw font name.
///
/// Underscores and whitespace are removed before matching. Explicit
/// "sans"/"serif" words win over the lists of known families, which win
/// over loose substring hints. Anything else is [`FontClass::Default`].
pub fn classify_font(name: Option<&str>) -> FontClass {
    let Some(name) = name else {
        return FontClass::Default;
    };
    let name: String = name
        .chars()
        .filter(|c| *c != '_' && !c.is_whitespace())
        .collect();

    if name.is_empty() || PLACEHOLDER_FONTS.contains(&name.as_str()) {
        return FontClass::Default;
    }

    if SANS_WORD.is_match(&name) {
        FontClass::SansDefault
    } else if SERIF_WORD.is_match(&name) || SERIF_LIST.is_match(&name) {
        FontClass::SerifDefault
    } else if SANS_LIST.is_match(&name) {
        FontClass::SansDefault
    } else if name == "DefaultMetricsFont" {
        FontClass::Default
    } else if SERIF_HINT.is_match(&name) && !name.to_ascii_lowercase().contains("sans") {
        FontClass::SerifDefault
    } else if SANS_HINT.is_match(&name) {
        FontClass::SansDefault
    } else {
        log::debug!("Unidentified font: {}", name);
        FontClass::Default
    }
}
