//! mupdf structured text (stext) page conversion.
//!
//! Like ABBYY, stext has lines and characters but no words, so words are
//! split at spaces and font changes. Character boxes come from the font's
//! em box rather than the glyph outline, so glyph heights say little about
//! the font size; line ascender height is taken from the declared font size
//! instead. stext carries no confidence, drop-cap or superscript signals.

use super::font::classify_font;
use super::line_stats::{round6, BaselineFit, GlyphHeights, LineMetrics, PageStats};
use super::markup::{scan, Node, Tag};
use super::text::{correct_quote, unescape_xml};
use crate::error::{Error, Result};
use crate::model::{
    round_half_up, BBox, Baseline, ConvertedPage, Dims, FontClass, FontMetricsAccumulator, Line,
    Page, Word, WordStyle,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// Ascender height as a share of the declared font size.
const ASCENDER_RATIO: f64 = 0.6;

static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)italic").expect("italic regex is valid"));

static SMALL_CAPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)small\W?cap").expect("small caps regex is valid"));

fn numbers(value: &str) -> Vec<f64> {
    value
        .split_whitespace()
        .filter_map(|n| n.parse::<f64>().ok())
        .collect()
}

fn font_style(tag: &Tag) -> WordStyle {
    let attrs = tag.raw_attrs();
    if ITALIC.is_match(attrs) {
        WordStyle::Italic
    } else if SMALL_CAPS.is_match(attrs) {
        WordStyle::SmallCaps
    } else {
        WordStyle::Normal
    }
}

/// Line box from `bbox="x0 y0 x1 y1"`, clamped to the page.
fn line_bbox(tag: &Tag) -> Option<BBox> {
    match numbers(tag.attr("bbox")?).as_slice() {
        [l, t, r, b, ..] => {
            let c = |v: f64| v.max(0.0).trunc() as i32;
            Some(BBox::new(c(*l), c(*t), c(*r), c(*b)))
        }
        _ => None,
    }
}

#[derive(Debug)]
struct Glyph {
    bbox: BBox,
    baseline_y: f64,
    text: String,
}

impl Glyph {
    /// Glyph from a `<char>` element; whitespace yields `None`.
    ///
    /// The box is the upper-left and lower-right corners of `quad`, or the
    /// older `bbox` attribute.
    fn from_tag(tag: &Tag) -> Option<Self> {
        let attrs = tag.attrs();
        let text = unescape_xml(attrs.get("c")?);
        if text.trim().is_empty() {
            return None;
        }
        let r = |v: f64| round_half_up(v) as i32;
        let bbox = match (attrs.get("quad").map(numbers), attrs.get("bbox").map(numbers)) {
            (Some(q), _) if q.len() >= 8 => BBox::new(r(q[0]), r(q[1]), r(q[6]), r(q[7])),
            (_, Some(b)) if b.len() >= 4 => BBox::new(r(b[0]), r(b[1]), r(b[2]), r(b[3])),
            _ => return None,
        };
        let baseline_y = attrs.f64("y").map_or(bbox.bottom as f64, round_half_up);
        Some(Self {
            bbox,
            baseline_y,
            text: text.into_owned(),
        })
    }
}

#[derive(Debug)]
struct Group {
    style: WordStyle,
    glyphs: Vec<Glyph>,
}

#[derive(Debug)]
struct RawLine {
    ordinal: usize,
    bbox: Option<BBox>,
    family: Option<FontClass>,
    font_size: Option<f64>,
    style: WordStyle,
    groups: Vec<Group>,
    group_open: bool,
}

impl RawLine {
    fn new(ordinal: usize, bbox: Option<BBox>) -> Self {
        Self {
            ordinal,
            bbox,
            family: None,
            font_size: None,
            style: WordStyle::Normal,
            groups: Vec::new(),
            group_open: false,
        }
    }

    fn set_font(&mut self, tag: &Tag) {
        if self.family.is_none() {
            self.family = Some(classify_font(tag.attr("name")));
            self.font_size = tag.attr_f64("size").filter(|s| s.is_finite() && *s > 0.0);
        }
        self.style = font_style(tag);
        self.group_open = false;
    }

    fn push(&mut self, glyph: Option<Glyph>) {
        let Some(glyph) = glyph else {
            self.group_open = false;
            return;
        };
        match self.groups.last_mut() {
            Some(group) if self.group_open => group.glyphs.push(glyph),
            _ => {
                self.groups.push(Group {
                    style: self.style,
                    glyphs: vec![glyph],
                });
                self.group_open = true;
            }
        }
    }
}

fn scan_page(markup: &str) -> (Option<Dims>, Vec<RawLine>) {
    let mut dims = None;
    let mut lines = Vec::new();
    let mut current: Option<RawLine> = None;
    let mut ordinal = 0;

    for node in scan(markup) {
        match node {
            Node::Open(tag) => match tag.name {
                "page" if dims.is_none() => dims = tag.dims(),
                "line" => {
                    if let Some(line) = current.take() {
                        lines.push(line);
                    }
                    current = Some(RawLine::new(ordinal, line_bbox(&tag)));
                    ordinal += 1;
                }
                "font" => {
                    if let Some(line) = current.as_mut() {
                        line.set_font(&tag);
                    }
                }
                "char" => {
                    if let Some(line) = current.as_mut() {
                        line.push(Glyph::from_tag(&tag));
                    }
                }
                _ => {}
            },
            Node::Close("line") => {
                if let Some(line) = current.take() {
                    lines.push(line);
                }
            }
            _ => {}
        }
    }
    if let Some(line) = current {
        lines.push(line);
    }
    (dims, lines)
}

fn convert_line(
    raw: RawLine,
    page_index: usize,
    stats: &mut PageStats,
    font_metrics: &mut FontMetricsAccumulator,
) -> Option<Line> {
    let family = raw.family.unwrap_or_default();
    let last_group = raw.groups.len().saturating_sub(1);

    let mut heights = GlyphHeights::new();
    let mut fit = BaselineFit::new();
    let mut metrics = LineMetrics::new();
    let mut words = Vec::new();

    for (i, group) in raw.groups.iter().enumerate() {
        let mut text = String::new();
        let mut prev: Option<(&str, BBox)> = None;

        for (j, glyph) in group.glyphs.iter().enumerate() {
            let before = j.checked_sub(1).map(|k| group.glyphs[k].text.as_str());
            let after = group.glyphs.get(j + 1).map(|g| g.text.as_str());
            let mut ch = glyph.text.as_str();
            if ch == "¬" && i == last_group && after.is_none() && i > 2 {
                ch = "-";
            } else if let Some(quote) = correct_quote(ch, before, after) {
                ch = quote;
            }
            text.push_str(ch);

            let bbox = glyph.bbox;
            let height = bbox.height() as f64;
            heights.observe_any(height);
            heights.observe_class(ch, height);
            fit.observe(bbox.left as f64, glyph.baseline_y);

            metrics.record_glyph(family, group.style, ch, bbox.width() as f64, height, None);
            if let Some((p, p_bbox)) = prev.filter(|(_, b)| b.right != 0 && bbox.left != 0) {
                metrics.record_gap(family, group.style, p, ch, (bbox.left - p_bbox.right) as f64);
            }
            prev = Some((ch, bbox));
        }

        let Some(bbox) = BBox::union_all(group.glyphs.iter().map(|g| &g.bbox)) else {
            continue;
        };
        if text.trim().is_empty() {
            continue;
        }
        words.push(
            Word::new(text, bbox, Word::default_id(page_index, raw.ordinal, i))
                .with_style(group.style)
                .with_font(family)
                .with_conf(100),
        );
    }

    let Some(bbox) = BBox::union_all(words.iter().map(|w| &w.bbox)) else {
        log::debug!("Dropping stext line {} without words", raw.ordinal);
        return None;
    };

    metrics.flush_into(font_metrics, heights.x_height());

    let slope = fit.slope();
    let baseline = Baseline::new(round6(slope), fit.intercept(&bbox, slope));
    let asc = raw
        .font_size
        .map(|size| size * ASCENDER_RATIO)
        .or_else(|| heights.tallest())
        .unwrap_or_default();

    stats.push_slope(slope);
    if let Some(engine_bbox) = raw.bbox {
        stats.push_margin_sample(&engine_bbox);
    }

    let mut line = Line::new(bbox, baseline, asc, None);
    line.words = words;
    Some(line)
}

/// Convert one page of mupdf stext XML.
///
/// Every word gets confidence 100.
///
/// # Errors
/// * [`Error::MissingPageDimensions`] when `<page>` lacks width or height
pub fn convert_page(markup: &str, page_index: usize) -> Result<ConvertedPage> {
    let (dims, lines) = scan_page(markup);
    let dims = dims.ok_or(Error::MissingPageDimensions(page_index))?;

    let mut page = Page::new(page_index, dims);
    let mut font_metrics = FontMetricsAccumulator::new();
    let mut stats = PageStats::new();

    for raw in lines {
        if let Some(line) = convert_line(raw, page_index, &mut stats, &mut font_metrics) {
            page.lines.push(line);
        }
    }

    page.angle = stats.skew_degrees();
    (page.left_margin, page.left_margin_adjusted) = stats.margins(0.0);

    log::debug!("stext page {}: {} lines", page_index, page.lines.len());

    Ok(ConvertedPage::new(page, font_metrics, true))
}
