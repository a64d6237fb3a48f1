//! Tesseract hOCR page conversion.
//!
//! hOCR comes in two shapes. When `ocrx_cinfo` spans are present every
//! glyph has its own box, so words are rebuilt glyph by glyph: capitals that
//! are really small caps and footnote markers fused onto a word are detected
//! from glyph geometry, narrow dashes and quote directions are corrected, and
//! font metrics are recorded. Without them the engine's words are taken as
//! reported and no metrics are recorded for the page.

use super::font::classify_font;
use super::line_stats::{GlyphHeights, LineMetrics, PageStats};
use super::markup::{scan, Node, Tag};
use super::options::HocrOptions;
use super::stats::median;
use super::text::{correct_dash, correct_quote, unescape_xml};
use crate::error::{Error, Result};
use crate::model::{
    BBox, Baseline, ConvertedPage, Dims, FontClass, FontMetricsAccumulator, Line, Page, Rotation,
    Word, WordStyle,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// Classes treated as text lines.
const LINE_CLASSES: [&str; 4] = ["ocr_line", "ocr_caption", "ocr_textfloat", "ocr_header"];

/// HTML elements without end tags.
const VOID_ELEMENTS: [&str; 6] = ["meta", "link", "br", "img", "hr", "input"];

/// Pre-applied rotations up to this many degrees are left alone.
const MIN_ROTATION: f64 = 0.05;

/// Engine line height when the title has no `x_size`.
const DEFAULT_X_SIZE: f64 = 15.0;

static SMALL_CAPS_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z].?[A-Z]").expect("small caps regex is valid"));

static ITALIC_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)italic").expect("italic regex is valid"));

static SMALL_CAPS_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)small-caps").expect("small caps style regex is valid"));

/// Properties of an hOCR `title` attribute, e.g. `bbox 0 0 10 10; x_wconf 95`.
#[derive(Debug, Clone, Copy)]
struct Title<'a>(&'a str);

impl<'a> Title<'a> {
    fn of(tag: &Tag<'a>) -> Self {
        Title(tag.attr("title").unwrap_or(""))
    }

    fn value(&self, key: &str) -> Option<&'a str> {
        self.0.split(';').find_map(|prop| {
            let rest = prop.trim().strip_prefix(key)?;
            (rest.is_empty() || rest.starts_with(char::is_whitespace)).then(|| rest.trim())
        })
    }

    fn numbers(&self, key: &str) -> Vec<f64> {
        self.value(key)
            .map(|v| v.split_whitespace().filter_map(|n| n.parse().ok()).collect())
            .unwrap_or_default()
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.numbers(key).first().copied().filter(|v| v.is_finite())
    }

    /// `bbox`, or the `x_bboxes` property used on character spans.
    fn bbox(&self) -> Option<BBox> {
        let values = match self.numbers("bbox") {
            v if v.len() >= 4 => v,
            _ => self.numbers("x_bboxes"),
        };
        match values.as_slice() {
            [l, t, r, b, ..] => Some(BBox::new(*l as i32, *t as i32, *r as i32, *b as i32)),
            _ => None,
        }
    }

    fn font(&self) -> FontClass {
        let name = self
            .value("x_font")
            .map(|v| unescape_xml(v).trim_matches(|c| c == '"' || c == '\'').to_string());
        classify_font(name.as_deref())
    }
}

#[derive(Debug)]
struct RawChar {
    bbox: BBox,
    text: String,
}

#[derive(Debug, Default)]
struct RawWord {
    id: Option<String>,
    bbox: Option<BBox>,
    conf: i64,
    font: FontClass,
    style: WordStyle,
    italic: bool,
    sup: bool,
    text: String,
    chars: Vec<RawChar>,
}

impl RawWord {
    fn from_tag(tag: &Tag, italic: bool) -> Self {
        let title = Title::of(tag);
        let style = match tag.attr("style") {
            Some(s) if ITALIC_STYLE.is_match(s) => WordStyle::Italic,
            Some(s) if SMALL_CAPS_STYLE.is_match(s) => WordStyle::SmallCaps,
            _ => WordStyle::Normal,
        };
        Self {
            id: tag.attr("id").map(|id| unescape_xml(id).into_owned()),
            bbox: title.bbox(),
            conf: title.number("x_wconf").map_or(0, |c| c as i64),
            font: title.font(),
            style,
            italic,
            ..Self::default()
        }
    }
}

#[derive(Debug)]
struct RawLine {
    ordinal: usize,
    bbox: Option<BBox>,
    baseline: Option<(f64, f64)>,
    x_size: f64,
    x_ascenders: f64,
    x_descenders: f64,
    words: Vec<RawWord>,
}

impl RawLine {
    fn from_tag(tag: &Tag, ordinal: usize) -> Self {
        let title = Title::of(tag);
        let baseline = match title.numbers("baseline").as_slice() {
            [slope, intercept, ..] if slope.is_finite() && intercept.is_finite() => {
                Some((*slope, *intercept))
            }
            _ => None,
        };
        Self {
            ordinal,
            bbox: title.bbox(),
            baseline,
            x_size: title.number("x_size").unwrap_or(DEFAULT_X_SIZE),
            x_ascenders: title.number("x_ascenders").unwrap_or(0.0),
            x_descenders: title.number("x_descenders").unwrap_or(0.0),
            words: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Line,
    Word,
    Char,
    Em,
    Other,
}

/// Element-stack scanner collecting lines, words and characters.
#[derive(Debug, Default)]
struct PageScanner<'a> {
    keep_italic: bool,
    dims: Option<Dims>,
    lines: Vec<RawLine>,
    stack: Vec<(&'a str, Role)>,
    line: Option<RawLine>,
    word: Option<RawWord>,
    glyph: Option<(Option<BBox>, String)>,
    ordinal: usize,
    em_depth: usize,
}

impl<'a> PageScanner<'a> {
    fn open(&mut self, tag: Tag<'a>) {
        let role = if LINE_CLASSES.iter().any(|c| tag.has_class(c)) {
            self.close_line();
            self.line = Some(RawLine::from_tag(&tag, self.ordinal));
            self.ordinal += 1;
            Role::Line
        } else if tag.has_class("ocrx_word") {
            if self.line.is_some() {
                self.close_word();
                self.word = Some(RawWord::from_tag(&tag, self.em_depth > 0));
            }
            Role::Word
        } else if tag.has_class("ocrx_cinfo") {
            self.glyph = Some((Title::of(&tag).bbox(), String::new()));
            Role::Char
        } else if tag.has_class("ocr_page") {
            if self.dims.is_none() {
                self.dims = Title::of(&tag)
                    .bbox()
                    .map(|b| Dims::new(b.right.max(0) as u32, b.bottom.max(0) as u32));
            }
            Role::Other
        } else if tag.name == "em" {
            if self.keep_italic {
                self.em_depth += 1;
                if let Some(word) = self.word.as_mut() {
                    word.italic = true;
                }
            }
            Role::Em
        } else {
            if tag.name == "sup" {
                if let Some(word) = self.word.as_mut() {
                    word.sup = true;
                }
            }
            Role::Other
        };

        if tag.self_closing || VOID_ELEMENTS.contains(&tag.name) {
            self.close(role);
        } else {
            self.stack.push((tag.name, role));
        }
    }

    fn close_tag(&mut self, name: &str) {
        let Some(pos) = self.stack.iter().rposition(|(n, _)| *n == name) else {
            return;
        };
        let roles: Vec<Role> = self.stack.drain(pos..).map(|(_, r)| r).rev().collect();
        for role in roles {
            self.close(role);
        }
    }

    fn text(&mut self, text: &str) {
        if let Some((_, glyph_text)) = self.glyph.as_mut() {
            glyph_text.push_str(text);
        } else if let Some(word) = self.word.as_mut() {
            word.text.push_str(text);
        }
    }

    fn close(&mut self, role: Role) {
        match role {
            Role::Char => self.close_char(),
            Role::Word => self.close_word(),
            Role::Line => self.close_line(),
            Role::Em if self.keep_italic => self.em_depth = self.em_depth.saturating_sub(1),
            _ => {}
        }
    }

    fn close_char(&mut self) {
        match (self.glyph.take(), self.word.as_mut()) {
            (Some((Some(bbox), text)), Some(word)) => word.chars.push(RawChar { bbox, text }),
            (Some((None, text)), _) => log::debug!("Dropping hOCR character {:?} without box", text),
            _ => {}
        }
    }

    fn close_word(&mut self) {
        self.close_char();
        if let (Some(word), Some(line)) = (self.word.take(), self.line.as_mut()) {
            line.words.push(word);
        }
    }

    fn close_line(&mut self) {
        self.close_word();
        if let Some(line) = self.line.take() {
            self.lines.push(line);
        }
    }

    fn finish(mut self) -> (Option<Dims>, Vec<RawLine>) {
        while let Some((_, role)) = self.stack.pop() {
            self.close(role);
        }
        self.close_line();
        (self.dims, self.lines)
    }
}

fn scan_page(markup: &str, keep_italic: bool) -> (Option<Dims>, Vec<RawLine>) {
    let mut scanner = PageScanner {
        keep_italic,
        ..PageScanner::default()
    };
    for node in scan(markup) {
        match node {
            Node::Open(tag) => scanner.open(tag),
            Node::Close(name) => scanner.close_tag(name),
            Node::Text(text) => scanner.text(text),
        }
    }
    scanner.finish()
}

/// Line geometry shared by the words of one char-level line.
#[derive(Debug)]
struct LineFrame {
    left: f64,
    /// Line top, moved to the left edge for descending lines
    top: f64,
    /// Line bottom, moved to the left edge for ascending lines
    bottom: f64,
    slope: f64,
    intercept: f64,
    x_height: f64,
    small_caps_heights: Vec<f64>,
}

impl LineFrame {
    fn new(bbox: &BBox, slope: f64, intercept: f64, x_height: f64) -> Self {
        let run = bbox.width() as f64 * slope;
        let (mut top, mut bottom) = (bbox.top as f64, bbox.bottom as f64);
        if slope < 0.0 {
            top -= run;
        } else {
            bottom -= run;
        }
        Self {
            left: bbox.left as f64,
            top,
            bottom,
            slope,
            intercept,
            x_height,
            small_caps_heights: Vec::new(),
        }
    }

    /// Expected baseline y at `x`.
    fn baseline_at(&self, x: f64) -> f64 {
        (x - self.left) * self.slope + self.intercept + self.bottom
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct SmallCaps {
    on: bool,
    title: bool,
    first_letter: usize,
}

fn is_letter(glyph: &str) -> bool {
    glyph.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Detect small caps reported as capitals.
///
/// Title case: every letter after the first starts well below its top.
/// Otherwise the word is small caps when no letter is taller than the
/// line's small-caps height seen so far.
fn detect_small_caps(chars: &[RawChar], frame: &mut LineFrame) -> SmallCaps {
    let text: String = chars.iter().map(|c| c.text.as_str()).collect();
    if text.chars().any(|c| c.is_ascii_lowercase()) || !SMALL_CAPS_SHAPE.is_match(&text) {
        return SmallCaps::default();
    }

    let letters: Vec<(usize, &BBox)> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| is_letter(&c.text))
        .map(|(i, c)| (i, &c.bbox))
        .collect();
    let Some((&(first_letter, first), rest)) = letters.split_first() else {
        return SmallCaps::default();
    };

    let cap_line = first.top as f64 + 0.1 * first.height() as f64;
    if !rest.is_empty() && rest.iter().all(|(_, b)| b.top as f64 > cap_line) {
        frame
            .small_caps_heights
            .extend(rest.iter().map(|(_, b)| b.height() as f64));
        return SmallCaps {
            on: true,
            title: true,
            first_letter,
        };
    }

    let on = median(&frame.small_caps_heights)
        .filter(|m| *m != 0.0)
        .is_some_and(|m| letters.iter().all(|(_, b)| b.height() as f64 <= m * 1.1));
    SmallCaps {
        on,
        title: false,
        first_letter,
    }
}

/// Number of trailing digits raised above the baseline.
fn superscript_len(chars: &[RawChar], frame: &LineFrame) -> usize {
    let digits = chars
        .iter()
        .rev()
        .take_while(|c| !c.text.is_empty() && c.text.chars().all(|ch| ch.is_ascii_digit()))
        .count();
    let (Some(first), Some(last)) = (chars.first(), chars.last()) else {
        return 0;
    };
    if digits == 0 {
        return 0;
    }

    let mid = first.bbox.left as f64 + (last.bbox.right - first.bbox.left) as f64 / 2.0;
    let expected = frame.baseline_at(mid);
    let asc = expected - frame.top;
    let raised = chars
        .iter()
        .rev()
        .take_while(|c| (c.bbox.bottom as f64) < expected - asc / 4.0)
        .count();
    digits.min(raised)
}

/// Rebuild one word from its character spans.
///
/// Yields the word itself and, when trailing digits are raised, a separate
/// superscript word with the same id plus `a`.
fn convert_char_word(
    raw: &RawWord,
    id: String,
    frame: &mut LineFrame,
    heights: &mut GlyphHeights,
    metrics: &mut LineMetrics,
) -> Vec<Word> {
    let small_caps = detect_small_caps(&raw.chars, frame);
    let split = raw.chars.len() - superscript_len(&raw.chars, frame);
    let (core, sup) = raw.chars.split_at(split);

    let style = if raw.italic {
        WordStyle::Italic
    } else if small_caps.on {
        WordStyle::SmallCaps
    } else {
        WordStyle::Normal
    };
    let min_caps_ratio = if small_caps.on { 1.1 } else { 1.2 };

    let sources: Vec<String> = core.iter().map(|c| unescape_xml(&c.text).into_owned()).collect();
    let glyphs: Vec<String> = core
        .iter()
        .enumerate()
        .map(|(j, c)| {
            let mut glyph = sources[j].clone();
            if small_caps.on && (!small_caps.title || j > small_caps.first_letter) {
                glyph = glyph.to_lowercase();
            }
            let prev = j.checked_sub(1).map(|k| sources[k].as_str());
            let next = sources.get(j + 1).map(String::as_str);
            let width = c.bbox.width() as f64;
            match correct_dash(&glyph, width, frame.x_height, prev, next)
                .or_else(|| correct_quote(&glyph, prev, next))
            {
                Some(fixed) => fixed.to_string(),
                None => glyph,
            }
        })
        .collect();

    let mut text = String::new();
    for (j, (c, glyph)) in core.iter().zip(&glyphs).enumerate() {
        let bbox = c.bbox;
        let expected = frame.baseline_at(bbox.left as f64);

        // glyphs hanging below the baseline are engine artefacts
        if bbox.top as f64 > expected && glyph.chars().any(|ch| ch.is_ascii_alphanumeric()) {
            continue;
        }

        let width = bbox.width() as f64;
        let height = bbox.height() as f64;
        let tall_enough = height / frame.x_height >= min_caps_ratio;
        if !glyph.chars().any(|ch| ch.is_ascii_uppercase()) || tall_enough {
            metrics.record_glyph(
                raw.font,
                style,
                glyph,
                width,
                height,
                Some(bbox.bottom as f64 - expected),
            );
            heights.observe_class(glyph, height);
            if j > 0 {
                let gap = (bbox.left - core[j - 1].bbox.right) as f64;
                if gap + width > 0.0 {
                    metrics.record_gap(raw.font, style, &glyphs[j - 1], glyph, gap);
                }
            }
        }
        text.push_str(glyph);
    }

    let mut words = Vec::new();
    let text = text.trim();
    if let Some(bbox) = BBox::union_all(core.iter().map(|c| &c.bbox)).filter(|_| !text.is_empty()) {
        words.push(
            Word::new(text, bbox, id.clone())
                .with_style(style)
                .with_font(raw.font)
                .with_conf(raw.conf),
        );
    }
    if let Some(bbox) = BBox::union_all(sup.iter().map(|c| &c.bbox)) {
        let text: String = sup.iter().map(|c| unescape_xml(&c.text)).collect();
        words.push(
            Word::new(text, bbox, format!("{}a", id))
                .with_conf(raw.conf)
                .superscript(),
        );
    }
    words
}

/// Take an engine-reported word as is.
fn convert_word(raw: &RawWord, id: String) -> Option<Word> {
    let text = unescape_xml(raw.text.trim()).trim().to_string();
    if text.is_empty() {
        return None;
    }
    let Some(bbox) = raw.bbox else {
        log::debug!("Dropping hOCR word {} without bbox", id);
        return None;
    };

    let style = if raw.italic {
        WordStyle::Italic
    } else {
        raw.style
    };
    let word = Word::new(text, bbox, id)
        .with_style(style)
        .with_font(raw.font)
        .with_conf(raw.conf);
    Some(if raw.sup { word.superscript() } else { word })
}

fn convert_line(
    raw: RawLine,
    page_index: usize,
    char_mode: bool,
    stats: &mut PageStats,
    font_metrics: &mut FontMetricsAccumulator,
) -> Option<Line> {
    let (Some(bbox), Some((slope, intercept))) = (raw.bbox, raw.baseline) else {
        log::debug!("Dropping hOCR line {} without bbox or baseline", raw.ordinal);
        return None;
    };
    let asc_engine = raw.x_size - raw.x_descenders;
    let x_height_engine = raw.x_size - raw.x_descenders - raw.x_ascenders;

    let mut heights = GlyphHeights::new();
    let mut metrics = LineMetrics::new();
    let mut words = Vec::new();
    let mut frame = LineFrame::new(&bbox, slope, intercept, x_height_engine);

    for (i, word) in raw.words.iter().enumerate() {
        let id = word
            .id
            .clone()
            .unwrap_or_else(|| Word::default_id(page_index, raw.ordinal, i));
        if char_mode {
            words.extend(convert_char_word(word, id, &mut frame, &mut heights, &mut metrics));
        } else {
            words.extend(convert_word(word, id));
        }
    }

    let x_height_measured = heights.x_height().filter(|x| *x != 0.0);
    let (asc, x_height) = match heights.ascender(0.5).filter(|a| *a != 0.0) {
        Some(asc) => (asc, x_height_measured),
        None => (asc_engine, Some(x_height_engine).filter(|x| *x > 0.0)),
    };
    let x_height_metrics = match x_height_measured {
        Some(measured) if (x_height_engine - measured).abs() > 2.0 => measured,
        _ => x_height_engine,
    };
    metrics.flush_into(font_metrics, Some(x_height_metrics));

    let mut line = Line::new(bbox, Baseline::new(slope, intercept), asc, x_height);
    line.words = words;
    if !line.refit_bbox() {
        log::debug!("Dropping hOCR line {} without words", raw.ordinal);
        return None;
    }

    if stats.push_margin_sample(&bbox) {
        stats.push_slope(slope);
    }
    Some(line)
}

/// Convert one page of hOCR.
///
/// # Errors
/// * [`Error::MissingPageDimensions`] when `options.page_dims` is unset and
///   the `ocr_page` element has no bbox
pub fn convert_page(markup: &str, page_index: usize, options: &HocrOptions) -> Result<ConvertedPage> {
    let char_mode = markup.contains("ocrx_cinfo");
    let (found_dims, lines) = scan_page(markup, options.keep_italic());
    let dims = options
        .page_dims
        .or(found_dims)
        .ok_or(Error::MissingPageDimensions(page_index))?;

    let mut page = Page::new(page_index, dims);
    let mut font_metrics = FontMetricsAccumulator::new();
    let mut stats = PageStats::new();

    for raw in lines {
        if let Some(line) = convert_line(raw, page_index, char_mode, &mut stats, &mut font_metrics) {
            page.lines.push(line);
        }
    }

    let angle = options.rotate_angle;
    let rotated = angle.abs() > MIN_ROTATION;
    page.angle = if rotated { angle } else { stats.skew_degrees() };
    (page.left_margin, page.left_margin_adjusted) =
        stats.margins(Rotation::shift_x_for(angle, dims));

    if rotated {
        let rotation = Rotation::new(angle, dims);
        for line in &mut page.lines {
            line.rotate(&rotation);
        }
    }

    log::debug!(
        "hOCR page {}: {} lines, char level: {}",
        page_index,
        page.lines.len(),
        char_mode
    );

    Ok(ConvertedPage::new(page, font_metrics, char_mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE_TITLE: &str =
        "bbox 100 100 1000 140; baseline 0 -10; x_size 30; x_descenders 6; x_ascenders 8";

    fn hocr(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><meta name='ocr-system' content='tesseract 5.3.0'></head>
<body><div class='ocr_page' id='page_1' title='image "scan.png"; bbox 0 0 2000 3000; ppageno 0'>
{body}
</div></body></html>"#
        )
    }

    fn line(title: &str, words: &str) -> String {
        format!("<span class='ocr_line' id='line_1_1' title='{title}'>{words}</span>")
    }

    fn word(id: &str, bbox: (i32, i32, i32, i32), conf: i32, inner: &str) -> String {
        let (l, t, r, b) = bbox;
        format!(
            "<span class='ocrx_word' id='{id}' title='bbox {l} {t} {r} {b}; x_wconf {conf}'>{inner}</span>"
        )
    }

    fn char_word(id: &str, chars: &[(&str, i32, i32, i32, i32)]) -> String {
        let inner: String = chars
            .iter()
            .map(|(c, l, t, r, b)| {
                format!("<span class='ocrx_cinfo' title='x_bboxes {l} {t} {r} {b}; x_conf 99'>{c}</span>")
            })
            .collect();
        word(id, (0, 0, 0, 0), 91, &inner)
    }

    #[test]
    fn test_word_level_page() {
        let markup = hocr(&format!(
            "{}\n{}",
            line(
                "bbox 100 100 400 140; baseline 0.01 -8; x_size 30; x_descenders 6; x_ascenders 8",
                &format!(
                    "{} {}",
                    word("word_1_1", (100, 105, 200, 140), 96, "Hello"),
                    word("word_1_2", (220, 100, 300, 132), 88, "<strong>w&amp;rld</strong>"),
                )
            ),
            line("bbox 100 200 400 240", &word("word_1_3", (100, 200, 150, 240), 90, "lost")),
        ));

        let result = convert_page(&markup, 0, &HocrOptions::new()).unwrap();
        assert!(!result.warnings.char_level);
        assert!(result.font_metrics.is_empty());
        assert_eq!(result.page.dims, Dims::new(2000, 3000));

        let lines = &result.page.lines;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "Hello w&rld");
        assert_eq!(lines[0].bbox, BBox::new(100, 100, 300, 140));
        assert_eq!(lines[0].baseline.slope, 0.01);
        assert_eq!(lines[0].asc_height, 24.0);
        assert_eq!(lines[0].x_height, Some(16.0));

        let words = &lines[0].words;
        assert_eq!(words[0].id, "word_1_1");
        assert_eq!(words[0].conf, 96);
        assert_eq!(words[1].bbox, BBox::new(220, 100, 300, 132));
    }

    #[test]
    fn test_word_level_attributes() {
        let words = format!(
            "{}{}{}",
            word("w1", (100, 100, 200, 130), 90, "<sup>1</sup>"),
            "<span class='ocrx_word' id='w2' title='bbox 210 100 300 130; x_wconf 80; x_font Arial_Bold' style='font-variant:small-caps'>Caps</span>",
            "<span class='ocrx_word' id='w3' title='bbox 310 100 400 130; x_wconf 80' style='font-style:italic'>it</span>",
        );
        let markup = hocr(&line(LINE_TITLE, &words));
        let page = convert_page(&markup, 0, &HocrOptions::new()).unwrap().page;
        let words = &page.lines[0].words;

        assert!(words[0].sup);
        assert_eq!(words[1].style, WordStyle::SmallCaps);
        assert_eq!(words[1].font, Some(FontClass::SansDefault));
        assert_eq!(words[2].style, WordStyle::Italic);
    }

    #[test]
    fn test_em_only_trusted_for_legacy_engine() {
        let markup = hocr(&line(LINE_TITLE, &word("w1", (100, 100, 200, 130), 90, "<em>Hello</em>")));

        let page = convert_page(&markup, 0, &HocrOptions::new()).unwrap().page;
        assert_eq!(page.lines[0].words[0].style, WordStyle::Normal);

        let options = HocrOptions::new().with_engine("Tesseract Legacy");
        let page = convert_page(&markup, 0, &options).unwrap().page;
        assert_eq!(page.lines[0].words[0].style, WordStyle::Italic);
    }

    #[test]
    fn test_missing_dims() {
        let markup = "<div class='ocr_page' title='image \"x.png\"'></div>";
        let err = convert_page(markup, 3, &HocrOptions::new()).unwrap_err();
        assert!(matches!(err, Error::MissingPageDimensions(3)));

        let options = HocrOptions::new().with_page_dims(Dims::new(100, 200));
        let result = convert_page(markup, 3, &options).unwrap();
        assert_eq!(result.page.dims, Dims::new(100, 200));
        assert!(result.page.is_empty());
    }

    #[test]
    fn test_title_case_small_caps() {
        let markup = hocr(&line(
            LINE_TITLE,
            &format!(
                "{} {}",
                char_word("word_1_1", &[("T", 100, 110, 112, 130), ("H", 114, 118, 124, 130), ("E", 126, 118, 134, 130)]),
                char_word("word_1_2", &[("c", 150, 118, 160, 130), ("a", 162, 118, 172, 130), ("t", 174, 112, 180, 130)]),
            ),
        ));
        let result = convert_page(&markup, 0, &HocrOptions::new()).unwrap();
        assert!(result.warnings.char_level);

        let words = &result.page.lines[0].words;
        assert_eq!(words[0].text, "The");
        assert_eq!(words[0].style, WordStyle::SmallCaps);
        assert_eq!(words[0].bbox, BBox::new(100, 110, 134, 130));
        assert_eq!(words[1].text, "cat");
        assert_eq!(words[1].style, WordStyle::Normal);
    }

    #[test]
    fn test_all_caps_small_caps_after_title_case() {
        let markup = hocr(&line(
            LINE_TITLE,
            &[
                char_word("word_1_1", &[("T", 100, 110, 112, 130), ("H", 114, 118, 124, 130), ("E", 126, 118, 134, 130)]),
                char_word("word_1_2", &[("W", 150, 118, 162, 130), ("A", 164, 118, 174, 130), ("Y", 176, 118, 186, 130)]),
                char_word("word_1_3", &[("B", 200, 110, 212, 130), ("I", 214, 110, 218, 130), ("G", 220, 110, 234, 130)]),
            ]
            .join(" "),
        ));
        let page = convert_page(&markup, 0, &HocrOptions::new()).unwrap().page;
        let words: Vec<(&str, WordStyle)> = page.lines[0]
            .words
            .iter()
            .map(|w| (w.text.as_str(), w.style))
            .collect();

        assert_eq!(
            words,
            vec![
                ("The", WordStyle::SmallCaps),
                ("way", WordStyle::SmallCaps),
                ("BIG", WordStyle::Normal),
            ]
        );
    }

    #[test]
    fn test_superscript_split() {
        let markup = hocr(&line(
            LINE_TITLE,
            &char_word(
                "word_1_1",
                &[
                    ("w", 100, 118, 110, 130),
                    ("o", 112, 118, 122, 130),
                    ("r", 124, 118, 132, 130),
                    ("d", 134, 110, 146, 130),
                    ("1", 150, 100, 155, 115),
                    ("2", 156, 100, 161, 115),
                ],
            ),
        ));
        let page = convert_page(&markup, 0, &HocrOptions::new()).unwrap().page;
        let words = &page.lines[0].words;

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "word");
        assert!(!words[0].sup);
        assert_eq!(words[0].bbox, BBox::new(100, 110, 146, 130));
        assert_eq!(words[1].text, "12");
        assert_eq!(words[1].id, "word_1_1a");
        assert!(words[1].sup);
        assert_eq!(words[1].conf, 91);
        assert_eq!(words[1].bbox, BBox::new(150, 100, 161, 115));
        assert_eq!(page.lines[0].bbox, BBox::new(100, 100, 161, 130));
    }

    #[test]
    fn test_narrow_dash_and_quotes() {
        let markup = hocr(&line(
            LINE_TITLE,
            &format!(
                "{} {}",
                char_word(
                    "word_1_1",
                    &[
                        ("a", 100, 118, 110, 130),
                        ("&#8212;", 111, 123, 119, 125),
                        ("b", 120, 110, 130, 130),
                    ],
                ),
                char_word(
                    "word_1_2",
                    &[("&#8221;", 150, 110, 154, 116), ("o", 156, 118, 166, 130), ("k", 168, 110, 178, 130)],
                ),
            ),
        ));
        let page = convert_page(&markup, 0, &HocrOptions::new()).unwrap().page;
        assert_eq!(page.lines[0].text(), "a-b “ok");
    }

    #[test]
    fn test_char_metrics_normalized_by_x_height() {
        let markup = hocr(&line(
            LINE_TITLE,
            &char_word("word_1_1", &[("a", 100, 114, 110, 130), ("b", 112, 106, 122, 130)]),
        ));
        let result = convert_page(&markup, 0, &HocrOptions::new()).unwrap();
        let line = &result.page.lines[0];
        assert_eq!(line.asc_height, 24.0);
        assert_eq!(line.x_height, Some(16.0));

        let metrics = result
            .font_metrics
            .get(FontClass::Default, WordStyle::Normal)
            .unwrap();
        assert_eq!(metrics.width["a"], vec![0.625]);
        assert_eq!(metrics.height["b"], vec![1.5]);
        assert_eq!(metrics.kerning["ab"], vec![0.125]);
        assert_eq!(metrics.obs, 2);
    }

    #[test]
    fn test_rotation_and_margins() {
        let lines: String = (0..5)
            .map(|k| {
                let top = 100 + 50 * k;
                line(
                    &format!("bbox 100 {top} 500 {}; baseline 0 -5", top + 30),
                    &word(&format!("w{k}"), (100, top, 500, top + 30), 90, "text"),
                )
            })
            .collect();
        let markup = hocr(&lines);

        let page = convert_page(&markup, 0, &HocrOptions::new()).unwrap().page;
        assert_eq!(page.angle, 0.0);
        assert_eq!(page.left_margin, Some(100.0));

        let options = HocrOptions::new().with_rotate_angle(2.0);
        let page = convert_page(&markup, 0, &options).unwrap().page;
        assert_eq!(page.angle, 2.0);
        for line in &page.lines {
            let union = BBox::union_all(line.words.iter().map(|w| &w.bbox)).unwrap();
            assert_eq!(line.bbox, union);
        }
    }
}
