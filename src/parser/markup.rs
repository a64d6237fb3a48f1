//! Tag-level scanner shared by the format lexers.
//!
//! OCR markup is often not well-formed XML (unclosed `<meta>` tags in
//! hOCR heads, stray entities), so it is scanned as a flat sequence of
//! start tags, end tags and text runs. Comments, doctypes and processing
//! instructions are skipped. Each format lexer keeps its own element stack
//! on top of this.

use crate::model::{BBox, Dims};
use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<[!?][^>]*>|<(/?)([A-Za-z][\w:.-]*)((?:[^>\x22']|\x22[^\x22]*\x22|'[^']*')*?)(/?)>")
        .expect("tag regex is valid")
});

static ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([\w:.-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("attribute regex is valid")
});

/// One start tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    pub name: &'a str,
    attrs: &'a str,
    pub self_closing: bool,
}

fn parse_f64(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

fn parse_i32(value: &str) -> Option<i32> {
    parse_f64(value)
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i32)
}

fn is_set(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true"))
}

impl<'a> Tag<'a> {
    /// Raw attribute value, not unescaped.
    ///
    /// Each call scans the attribute text; use [`Tag::attrs`] when reading
    /// several keys of the same tag.
    pub fn attr(&self, key: &str) -> Option<&'a str> {
        ATTR.captures_iter(self.attrs)
            .find(|c| &c[1] == key)
            .and_then(|c| c.get(2).or_else(|| c.get(3)))
            .map(|m| m.as_str())
    }

    /// Every attribute, parsed in one pass.
    pub fn attrs(&self) -> Attrs<'a> {
        let pairs = ATTR
            .captures_iter(self.attrs)
            .filter_map(|c| {
                let key = c.get(1)?.as_str();
                let value = c.get(2).or_else(|| c.get(3))?.as_str();
                Some((key, value))
            })
            .collect();
        Attrs(pairs)
    }

    /// Attribute parsed as a number.
    pub fn attr_f64(&self, key: &str) -> Option<f64> {
        parse_f64(self.attr(key)?)
    }

    /// Attribute parsed as a number and truncated to an integer.
    pub fn attr_i32(&self, key: &str) -> Option<i32> {
        parse_i32(self.attr(key)?)
    }

    /// Attribute is present and set to `1` or `true`.
    pub fn attr_flag(&self, key: &str) -> bool {
        is_set(self.attr(key))
    }

    /// The whitespace-separated class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|v| v.split_whitespace().any(|c| c == class))
    }

    /// Box from separate `l`, `t`, `r` and `b` attributes.
    pub fn ltrb(&self) -> Option<BBox> {
        self.attrs().ltrb()
    }

    /// Dimensions from `width` and `height` attributes.
    pub fn dims(&self) -> Option<Dims> {
        let attrs = self.attrs();
        let width = attrs.f64("width").filter(|w| w.is_finite() && *w > 0.0)?;
        let height = attrs.f64("height").filter(|h| h.is_finite() && *h > 0.0)?;
        Some(Dims::new(width as u32, height as u32))
    }

    /// All raw attribute text, for loose pattern matching.
    pub fn raw_attrs(&self) -> &'a str {
        self.attrs
    }
}

/// Attributes of one tag, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs<'a>(Vec<(&'a str, &'a str)>);

impl<'a> Attrs<'a> {
    /// Raw value of the first attribute named `key`.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    pub fn f64(&self, key: &str) -> Option<f64> {
        parse_f64(self.get(key)?)
    }

    pub fn i32(&self, key: &str) -> Option<i32> {
        parse_i32(self.get(key)?)
    }

    pub fn flag(&self, key: &str) -> bool {
        is_set(self.get(key))
    }

    /// Box from separate `l`, `t`, `r` and `b` attributes.
    pub fn ltrb(&self) -> Option<BBox> {
        Some(BBox::new(
            self.i32("l")?,
            self.i32("t")?,
            self.i32("r")?,
            self.i32("b")?,
        ))
    }
}

/// One scanned node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node<'a> {
    /// A start tag (possibly self-closing)
    Open(Tag<'a>),
    /// An end tag
    Close(&'a str),
    /// Text between tags, not unescaped
    Text(&'a str),
}

/// Scan `markup` into nodes.
pub fn scan(markup: &str) -> impl Iterator<Item = Node<'_>> {
    Scanner {
        markup,
        pos: 0,
        pending: None,
    }
}

struct Scanner<'a> {
    markup: &'a str,
    pos: usize,
    pending: Option<Node<'a>>,
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Node<'a>> {
        if let Some(node) = self.pending.take() {
            return Some(node);
        }

        while self.pos < self.markup.len() {
            let Some(caps) = TAG.captures_at(self.markup, self.pos) else {
                let text = &self.markup[self.pos..];
                self.pos = self.markup.len();
                return Some(Node::Text(text));
            };
            let whole = caps.get(0)?;
            let text = &self.markup[self.pos..whole.start()];
            self.pos = whole.end();

            let node = caps.get(2).map(|name| {
                let name = name.as_str();
                if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
                    Node::Close(name)
                } else {
                    Node::Open(Tag {
                        name,
                        attrs: caps.get(3).map_or("", |m| m.as_str()),
                        self_closing: caps.get(4).is_some_and(|m| !m.as_str().is_empty()),
                    })
                }
            });

            match (text.is_empty(), node) {
                (true, Some(node)) => return Some(node),
                (false, node) => {
                    self.pending = node;
                    return Some(Node::Text(text));
                }
                // comment or declaration with nothing before it
                (true, None) => continue,
            }
        }
        None
    }
}
