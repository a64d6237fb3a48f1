//! ABBYY FineReader XML page conversion.
//!
//! ABBYY reports lines and characters but no words. Words are synthesized by
//! splitting the character stream of a line at spaces, tabs and every
//! `<formatting>` boundary. The engine's own baseline attribute is ignored;
//! baselines and font sizes are measured from the character boxes.

use super::font::classify_font;
use super::line_stats::{round6, BaselineFit, GlyphHeights, LineMetrics, PageStats};
use super::markup::{scan, Node, Tag};
use super::table::convert_table_layout;
use super::text::{correct_quote, is_ascender_glyph, is_x_height_glyph, unescape_xml};
use crate::error::{Error, Result};
use crate::model::{
    BBox, Baseline, ConvertedPage, Dims, FontClass, FontMetricsAccumulator, Line, Page, Word,
    WordStyle,
};
use once_cell::sync::Lazy;
use regex::Regex;

static CHAR_PARAMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<charParams").expect("charParams regex is valid"));

/// Active `<formatting>` attributes.
#[derive(Debug, Clone, Default)]
struct Formatting {
    font: Option<String>,
    italic: bool,
    small_caps: bool,
    superscript: bool,
}

impl Formatting {
    fn from_tag(tag: &Tag) -> Self {
        let attrs = tag.attrs();
        Self {
            font: attrs.get("ff").map(|f| unescape_xml(f).into_owned()),
            italic: attrs.flag("italic"),
            small_caps: attrs.flag("smallcaps"),
            superscript: attrs.flag("superscript"),
        }
    }
}

#[derive(Debug)]
struct Glyph {
    bbox: BBox,
    suspicious: bool,
    text: String,
}

impl Glyph {
    /// ABBYY occasionally places glyphs at x = 0; those are ignored.
    fn placed(&self) -> bool {
        self.bbox.left != 0
    }
}

#[derive(Debug)]
struct Group {
    format: Formatting,
    glyphs: Vec<Glyph>,
}

impl Group {
    fn is_lone_period(&self) -> bool {
        matches!(self.glyphs.as_slice(), [g] if g.text == ".")
    }
}

/// A `<line>` element as scanned, before words are built.
#[derive(Debug)]
struct RawLine {
    ordinal: usize,
    bbox: Option<BBox>,
    dropcap: bool,
    family: Option<FontClass>,
    format: Formatting,
    groups: Vec<Group>,
    group_open: bool,
}

impl RawLine {
    fn new(ordinal: usize, bbox: Option<BBox>, dropcap: bool) -> Self {
        Self {
            ordinal,
            bbox,
            dropcap,
            family: None,
            format: Formatting::default(),
            groups: Vec::new(),
            group_open: false,
        }
    }

    fn set_format(&mut self, format: Formatting) {
        // the line's first formatting decides its font family
        if self.family.is_none() {
            self.family = Some(classify_font(format.font.as_deref()));
        }
        self.format = format;
        self.group_open = false;
    }

    fn push_char(&mut self, pending: PendingChar) {
        let text = unescape_xml(&pending.text);
        if pending.tab || text.trim().is_empty() {
            self.group_open = false;
            return;
        }
        let glyph = Glyph {
            bbox: pending.bbox,
            suspicious: pending.suspicious,
            text: text.into_owned(),
        };
        match self.groups.last_mut() {
            Some(group) if self.group_open => group.glyphs.push(glyph),
            _ => {
                self.groups.push(Group {
                    format: self.format.clone(),
                    glyphs: vec![glyph],
                });
                self.group_open = true;
            }
        }
    }

    /// Fold a period that got its own formatting span into the previous
    /// word, unless that word is a superscript.
    fn merged_groups(self) -> Vec<Group> {
        let mut groups: Vec<Group> = Vec::with_capacity(self.groups.len());
        for group in self.groups {
            if group.is_lone_period() {
                if let Some(prev) = groups.last_mut().filter(|g| !g.format.superscript) {
                    prev.glyphs.extend(group.glyphs);
                    continue;
                }
            }
            groups.push(group);
        }
        groups
    }
}

#[derive(Debug)]
struct PendingChar {
    bbox: BBox,
    suspicious: bool,
    tab: bool,
    text: String,
}

impl PendingChar {
    fn from_tag(tag: &Tag) -> Self {
        let attrs = tag.attrs();
        let coord = |key| attrs.i32(key).unwrap_or(0);
        Self {
            bbox: BBox::new(coord("l"), coord("t"), coord("r"), coord("b")),
            suspicious: attrs.flag("suspicious"),
            tab: attrs.flag("isTab"),
            text: String::new(),
        }
    }
}

#[derive(Debug, Default)]
struct ScannedPage {
    dims: Option<Dims>,
    lines: Vec<RawLine>,
}

fn scan_page(markup: &str) -> ScannedPage {
    let mut page = ScannedPage::default();
    let mut current: Option<RawLine> = None;
    let mut pending: Option<PendingChar> = None;
    let mut dropcap = false;
    let mut ordinal = 0;

    for node in scan(markup) {
        match node {
            Node::Open(tag) => match tag.name {
                "page" if page.dims.is_none() => page.dims = tag.dims(),
                "par" => dropcap = tag.attr_i32("dropCapCharsCount").is_some_and(|n| n > 0),
                "line" => {
                    if let Some(line) = current.take() {
                        page.lines.push(line);
                    }
                    current = Some(RawLine::new(ordinal, tag.ltrb(), std::mem::take(&mut dropcap)));
                    ordinal += 1;
                }
                "formatting" => {
                    if let Some(line) = current.as_mut() {
                        line.set_format(Formatting::from_tag(&tag));
                    }
                }
                "charParams" => {
                    let glyph = PendingChar::from_tag(&tag);
                    if tag.self_closing {
                        if let Some(line) = current.as_mut() {
                            line.push_char(glyph);
                        }
                    } else {
                        pending = Some(glyph);
                    }
                }
                _ => {}
            },
            Node::Text(text) => {
                if let Some(glyph) = pending.as_mut() {
                    glyph.text.push_str(text);
                }
            }
            Node::Close("charParams") => {
                if let (Some(glyph), Some(line)) = (pending.take(), current.as_mut()) {
                    line.push_char(glyph);
                }
            }
            Node::Close("line") => {
                if let Some(line) = current.take() {
                    page.lines.push(line);
                }
            }
            Node::Close(_) => {}
        }
    }
    if let Some(line) = current {
        page.lines.push(line);
    }
    page
}

/// What a synthesized word is, before it becomes a [`Word`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    DropCap,
    Superscript,
    Text(WordStyle),
}

fn role_for(index: usize, group: &Group, dropcap: bool) -> Role {
    let f = &group.format;
    if dropcap && index == 0 {
        Role::DropCap
    } else if f.superscript {
        Role::Superscript
    } else if f.italic {
        Role::Text(WordStyle::Italic)
    } else if f.small_caps {
        Role::Text(WordStyle::SmallCaps)
    } else {
        Role::Text(WordStyle::Normal)
    }
}

/// Box of a word from the positive coordinates of its glyphs.
fn word_bbox(boxes: &[BBox]) -> Option<BBox> {
    let left = boxes.iter().map(|b| b.left).filter(|v| *v > 0).min()?;
    let top = boxes.iter().map(|b| b.top).filter(|v| *v > 0).min()?;
    let right = boxes.iter().map(|b| b.right).filter(|v| *v > 0).max()?;
    let bottom = boxes.iter().map(|b| b.bottom).filter(|v| *v > 0).max()?;
    Some(BBox::new(left, top, right, bottom))
}

fn convert_line(
    raw: RawLine,
    page_index: usize,
    stats: &mut PageStats,
    font_metrics: &mut FontMetricsAccumulator,
) -> Option<Line> {
    let Some(engine_bbox) = raw.bbox else {
        log::debug!("Dropping ABBYY line {} without coordinates", raw.ordinal);
        return None;
    };
    let (ordinal, dropcap) = (raw.ordinal, raw.dropcap);
    let family = raw.family.unwrap_or_default();
    let groups = raw.merged_groups();

    let mut roles: Vec<Role> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| role_for(i, g, dropcap))
        .collect();

    // capitals right after a drop cap are often flagged as small caps
    // because they are small relative to the drop cap
    let dropcap_fix = dropcap && roles.get(1) == Some(&Role::Text(WordStyle::SmallCaps));
    if dropcap_fix {
        roles[1] = Role::Text(WordStyle::Normal);
    }
    let small_caps = roles.contains(&Role::Text(WordStyle::SmallCaps));

    let mut heights = GlyphHeights::new();
    let mut fit = BaselineFit::new();
    let mut metrics = LineMetrics::new();
    let mut words = Vec::new();
    let last_group = groups.len().saturating_sub(1);

    for (i, (group, role)) in groups.iter().zip(roles.iter().copied()).enumerate() {
        let fixed = dropcap_fix && i == 1;
        let texts: Vec<String> = group
            .glyphs
            .iter()
            .map(|g| if fixed { g.text.to_uppercase() } else { g.text.clone() })
            .collect();

        let mut text = String::new();
        let mut boxes = Vec::with_capacity(texts.len());
        let mut suspicious = false;
        let mut prev: Option<(&str, BBox)> = None;

        for (j, glyph) in group.glyphs.iter().enumerate() {
            if !glyph.placed() {
                prev = None;
                continue;
            }
            suspicious |= glyph.suspicious;

            let before = j.checked_sub(1).map(|k| texts[k].as_str());
            let after = texts.get(j + 1).map(String::as_str);
            let mut ch = texts[j].as_str();
            // `¬` ends hyphenated lines in some exports; the position is
            // taken among word groups after lone periods are merged
            if ch == "¬" && i == last_group && after.is_none() && i > 2 {
                ch = "-";
            } else if let Some(quote) = correct_quote(ch, before, after) {
                ch = quote;
            }

            text.push_str(ch);
            let bbox = glyph.bbox;
            boxes.push(bbox);

            let height = bbox.height() as f64;
            heights.observe_any(height);
            if role != Role::Superscript {
                heights.observe_class(ch, height);
            }

            if (is_ascender_glyph(ch) || is_x_height_glyph(ch))
                && !glyph.suspicious
                && !fixed
                && matches!(role, Role::Text(_))
            {
                fit.observe(bbox.left as f64, bbox.bottom as f64);
            }

            let Role::Text(style) = role else {
                continue;
            };
            if glyph.suspicious {
                prev = None;
                continue;
            }
            metrics.record_glyph(family, style, ch, bbox.width() as f64, height, None);
            if let Some((p, p_bbox)) = prev {
                metrics.record_gap(family, style, p, ch, (bbox.left - p_bbox.right) as f64);
            }
            prev = Some((ch, bbox));
        }

        if text.trim().is_empty() {
            continue;
        }
        let Some(bbox) = word_bbox(&boxes) else {
            continue;
        };

        let word = Word::new(text, bbox, Word::default_id(page_index, ordinal, i))
            .with_font(family)
            .with_conf(if suspicious { 0 } else { 100 });
        words.push(match role {
            Role::DropCap => word.drop_cap(),
            Role::Superscript => word.superscript(),
            Role::Text(style) => word.with_style(style),
        });
    }

    let Some(bbox) = BBox::union_all(words.iter().map(|w| &w.bbox)) else {
        log::debug!("Dropping ABBYY line {} without words", ordinal);
        return None;
    };

    let asc = heights.ascender(0.75).filter(|v| *v != 0.0);
    let x_height = heights.x_height().filter(|v| *v != 0.0);
    let tallest = stats.settle_line_height(heights.tallest(), asc.is_some() || x_height.is_some());

    metrics.flush_into(font_metrics, x_height);

    let slope = fit.slope();
    let baseline = Baseline::new(round6(slope), fit.intercept(&bbox, slope));
    let asc = stats
        .settle_ascender(asc, x_height, small_caps)
        .filter(|v| *v != 0.0)
        .unwrap_or(tallest);

    stats.push_slope(slope);
    stats.push_margin_sample(&engine_bbox);

    let mut line = Line::new(bbox, baseline, asc, x_height);
    line.words = words;
    Some(line)
}

/// Convert one page of ABBYY XML.
///
/// # Errors
/// * [`Error::NoCharacterData`] when the page has no `<charParams>` at all
/// * [`Error::MissingPageDimensions`] when `<page>` lacks width or height
pub fn convert_page(markup: &str, page_index: usize) -> Result<ConvertedPage> {
    if !CHAR_PARAMS.is_match(markup) {
        return Err(Error::NoCharacterData(page_index));
    }
    let scanned = scan_page(markup);
    let dims = scanned
        .dims
        .ok_or(Error::MissingPageDimensions(page_index))?;

    let table_boxes = convert_table_layout(markup);

    let mut page = Page::new(page_index, dims);
    let mut font_metrics = FontMetricsAccumulator::new();
    let mut stats = PageStats::new();

    for raw in scanned.lines {
        if let Some(line) = convert_line(raw, page_index, &mut stats, &mut font_metrics) {
            page.lines.push(line);
        }
    }

    page.angle = stats.skew_degrees();
    (page.left_margin, page.left_margin_adjusted) = stats.margins(0.0);

    log::debug!(
        "ABBYY page {}: {} lines, {} table boxes",
        page_index,
        page.lines.len(),
        table_boxes.len()
    );

    Ok(ConvertedPage::new(page, font_metrics, true).with_table_boxes(table_boxes))
}
