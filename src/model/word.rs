//! Word-level types.

use super::BBox;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Typographic style of a word.
///
/// A word carries at most one style. When an engine flags a word as both
/// italic and small caps, italic wins.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum WordStyle {
    #[default]
    Normal,
    Italic,
    Bold,
    SmallCaps,
}

impl WordStyle {
    /// Name as used in serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            WordStyle::Normal => "normal",
            WordStyle::Italic => "italic",
            WordStyle::Bold => "bold",
            WordStyle::SmallCaps => "small-caps",
        }
    }
}

impl fmt::Display for WordStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse font family class.
///
/// Raw font names reported by OCR engines are never preserved; they are
/// classified into one of these buckets.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum FontClass {
    /// Use the page or document default
    #[default]
    Default,
    SansDefault,
    SerifDefault,
}

impl FontClass {
    /// Name as used in serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            FontClass::Default => "Default",
            FontClass::SansDefault => "SansDefault",
            FontClass::SerifDefault => "SerifDefault",
        }
    }

    /// The value stored on a [`Word`]: `None` for the default class.
    pub fn for_word(self) -> Option<FontClass> {
        match self {
            FontClass::Default => None,
            other => Some(other),
        }
    }
}

impl fmt::Display for FontClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recognized token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Unescaped, corrected text
    pub text: String,

    /// Pixel bounding box
    pub bbox: BBox,

    /// Identifier, unique within the page
    pub id: String,

    /// Typographic style
    pub style: WordStyle,

    /// Font class, `None` for the page default
    pub font: Option<FontClass>,

    /// Recognition confidence (0-100)
    pub conf: u8,

    /// Superscript flag
    pub sup: bool,

    /// Drop-cap flag
    pub dropcap: bool,
}

impl Word {
    /// Create a new normal-style word.
    pub fn new(text: impl Into<String>, bbox: BBox, id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bbox,
            id: id.into(),
            style: WordStyle::Normal,
            font: None,
            conf: 0,
            sup: false,
            dropcap: false,
        }
    }

    /// Set the style.
    pub fn with_style(mut self, style: WordStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the font class.
    pub fn with_font(mut self, font: FontClass) -> Self {
        self.font = font.for_word();
        self
    }

    /// Set the confidence, clamped to 0-100.
    pub fn with_conf(mut self, conf: i64) -> Self {
        self.conf = conf.clamp(0, 100) as u8;
        self
    }

    /// Mark as superscript.
    pub fn superscript(mut self) -> Self {
        self.sup = true;
        self
    }

    /// Mark as drop cap.
    pub fn drop_cap(mut self) -> Self {
        self.dropcap = true;
        self
    }

    /// Default id for a synthesized word (all indices zero-based).
    pub fn default_id(page: usize, line: usize, index: usize) -> String {
        format!("word_{}_{}_{}", page + 1, line + 1, index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_builder() {
        let word = Word::new("Hello", BBox::new(0, 0, 50, 20), "w1")
            .with_style(WordStyle::Italic)
            .with_font(FontClass::SerifDefault)
            .with_conf(140);

        assert_eq!(word.style, WordStyle::Italic);
        assert_eq!(word.font, Some(FontClass::SerifDefault));
        assert_eq!(word.conf, 100);
        assert!(!word.sup);
    }

    #[test]
    fn test_default_font_is_none() {
        let word = Word::new("a", BBox::default(), "w").with_font(FontClass::Default);
        assert_eq!(word.font, None);
    }

    #[test]
    fn test_style_serialization() {
        let json = serde_json::to_string(&WordStyle::SmallCaps).unwrap();
        assert_eq!(json, "\"small-caps\"");
        assert_eq!(WordStyle::SmallCaps.to_string(), "small-caps");
    }

    #[test]
    fn test_default_id() {
        assert_eq!(Word::default_id(0, 2, 4), "word_1_3_5");
    }
}
