//! Text-level helpers: entity unescaping, glyph classes, and correction of
//! dashes and quotes that OCR engines commonly get wrong.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:(amp|quot|apos|lt|gt)|#([0-9]+)|#[xX]([0-9a-fA-F]+));")
        .expect("entity regex is valid")
});

/// Replace XML character entities in a single pass.
///
/// Named entities (`&amp;`, `&quot;`, `&apos;`, `&lt;`, `&gt;`) and numeric
/// references are decoded; unknown or invalid references are left as is.
pub fn unescape_xml(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    ENTITY.replace_all(text, |caps: &Captures| {
        if let Some(name) = caps.get(1) {
            return match name.as_str() {
                "amp" => "&",
                "quot" => "\"",
                "apos" => "'",
                "lt" => "<",
                _ => ">",
            }
            .to_string();
        }
        let code = match (caps.get(2), caps.get(3)) {
            (Some(dec), _) => dec.as_str().parse::<u32>().ok(),
            (_, Some(hex)) => u32::from_str_radix(hex.as_str(), 16).ok(),
            _ => None,
        };
        match code.and_then(char::from_u32) {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// Glyphs whose height is the ascender height.
pub fn is_ascender_glyph(glyph: &str) -> bool {
    let mut chars = glyph.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            (c.is_ascii_uppercase() && c != 'J' && c != 'Q')
                || matches!(c, 'b' | 'd' | 'h' | 'k' | 'l' | 't')
                || c.is_ascii_digit()
        }
        _ => false,
    }
}

/// Glyphs whose height is the x-height.
pub fn is_x_height_glyph(glyph: &str) -> bool {
    matches!(
        glyph,
        "a" | "c" | "e" | "m" | "n" | "o" | "r" | "s" | "u" | "v" | "w" | "x" | "z"
    )
}

/// Only printable, non-space glyphs are recorded as metrics.
pub fn is_metric_glyph(glyph: &str) -> bool {
    !glyph.is_empty() && glyph.chars().all(|c| c as u32 >= 33)
}

fn last_char(glyph: Option<&str>) -> Option<char> {
    glyph.and_then(|g| g.chars().last())
}

fn first_char(glyph: Option<&str>) -> Option<char> {
    glyph.and_then(|g| g.chars().next())
}

fn is_alnum(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_ascii_alphanumeric())
}

fn is_letter(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_ascii_alphabetic())
}

fn is_digit(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_ascii_digit())
}

/// Correct an em or en dash that is too narrow to be one.
///
/// `prev` and `next` are the neighbouring glyphs within the word; `next` is
/// `None` for the last glyph. Returns the replacement, if any.
pub fn correct_dash(
    glyph: &str,
    width: f64,
    x_height: f64,
    prev: Option<&str>,
    next: Option<&str>,
) -> Option<&'static str> {
    let narrow = match glyph {
        "—" => width < x_height,
        "–" => width < x_height * 0.85,
        _ => false,
    };
    if !narrow {
        return None;
    }

    let (before, after) = (last_char(prev), first_char(next));
    if is_letter(before) && is_letter(after) {
        Some("-")
    } else if next.is_none() {
        Some("-")
    } else if glyph == "—" && is_digit(before) && is_digit(after) {
        if width > x_height * 0.8 {
            Some("–")
        } else {
            Some("-")
        }
    } else {
        None
    }
}

/// Infer the direction of a quote mark from its neighbours.
///
/// A quote starting a word before a letter or digit opens; a single quote
/// between letters or digits is an apostrophe; a quote ending a word after
/// a letter, digit or comma closes. Returns the replacement, if any.
pub fn correct_quote(glyph: &str, prev: Option<&str>, next: Option<&str>) -> Option<&'static str> {
    let (before, after) = (last_char(prev), first_char(next));

    if prev.is_none() && is_alnum(after) {
        return match glyph {
            "’" | "'" => Some("‘"),
            "”" | "\"" => Some("“"),
            _ => None,
        };
    }

    if prev.is_some() && is_alnum(before) && is_alnum(after) {
        return match glyph {
            "‘" | "'" => Some("’"),
            _ => None,
        };
    }

    if next.is_none() && (is_alnum(before) || before == Some(',')) {
        return match glyph {
            "‘" | "'" => Some("’"),
            "“" | "\"" => Some("”"),
            _ => None,
        };
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_named_and_numeric() {
        assert_eq!(unescape_xml("a &amp; b"), "a & b");
        assert_eq!(unescape_xml("&lt;tag&gt;"), "<tag>");
        assert_eq!(unescape_xml("&quot;x&quot; &apos;y&apos;"), "\"x\" 'y'");
        assert_eq!(unescape_xml("&#39;&#34;"), "'\"");
        assert_eq!(unescape_xml("&#x2014;"), "—");
        assert_eq!(unescape_xml("&#X201C;"), "“");
    }

    #[test]
    fn test_unescape_single_pass() {
        assert_eq!(unescape_xml("&amp;lt;"), "&lt;");
        assert_eq!(unescape_xml("&bogus; &#xD800;"), "&bogus; &#xD800;");
    }

    #[test]
    fn test_unescape_idempotent_without_entities() {
        for s in ["plain", "a & b", "x < y > z", "‘quoted’", ""] {
            let once = unescape_xml(s).into_owned();
            assert_eq!(unescape_xml(&once), once);
        }
    }

    #[test]
    fn test_glyph_classes() {
        assert!(is_ascender_glyph("A"));
        assert!(!is_ascender_glyph("J"));
        assert!(!is_ascender_glyph("Q"));
        assert!(is_ascender_glyph("h"));
        assert!(is_ascender_glyph("7"));
        assert!(!is_ascender_glyph("a"));
        assert!(is_x_height_glyph("x"));
        assert!(!is_x_height_glyph("i"));
        assert!(is_metric_glyph("!"));
        assert!(!is_metric_glyph(" "));
    }

    #[test]
    fn test_dash_between_letters() {
        assert_eq!(correct_dash("—", 8.0, 10.0, Some("a"), Some("b")), Some("-"));
        assert_eq!(correct_dash("—", 12.0, 10.0, Some("a"), Some("b")), None);
        assert_eq!(correct_dash("–", 8.0, 10.0, Some("a"), None), Some("-"));
    }

    #[test]
    fn test_dash_between_digits() {
        assert_eq!(correct_dash("—", 9.0, 10.0, Some("1"), Some("2")), Some("–"));
        assert_eq!(correct_dash("—", 5.0, 10.0, Some("1"), Some("2")), Some("-"));
        assert_eq!(correct_dash("—", 5.0, 10.0, Some("("), Some("2")), None);
    }

    #[test]
    fn test_quotes() {
        assert_eq!(correct_quote("’", None, Some("T")), Some("‘"));
        assert_eq!(correct_quote("”", None, Some("a")), Some("“"));
        assert_eq!(correct_quote("‘", Some("n"), Some("t")), Some("’"));
        assert_eq!(correct_quote("“", Some("s"), None), Some("”"));
        assert_eq!(correct_quote("‘", Some(","), None), Some("’"));
        assert_eq!(correct_quote("’", Some("s"), None), None);
        assert_eq!(correct_quote("“", None, Some("A")), None);
    }
}
