//! Line and page statistics shared by all format converters.
//!
//! Engines report baselines, x-heights and ascender heights that are often
//! wrong, so converters measure glyphs as they go and derive these values
//! here. Percentile choices: 0.5 for x-height, 0.75 for ascender height
//! (ABBYY and stext), 0.2 for margins.

use super::stats::{mean50, median, quantile};
use super::text::{is_ascender_glyph, is_metric_glyph, is_x_height_glyph};
use crate::model::{round_half_up, BBox, FontClass, FontMetricsAccumulator, RawFontMetrics, WordStyle};
use std::collections::BTreeMap;

/// Lines narrower than this do not feed page statistics.
pub const MIN_STAT_LINE_WIDTH: i32 = 200;

/// Fewer long lines than this leave the margin unknown.
pub const MIN_MARGIN_LINES: usize = 5;

/// Round to six decimal places.
pub fn round6(value: f64) -> f64 {
    round_half_up(value * 1e6) / 1e6
}

/// Raw pixel metrics for one line, staged until its x-height is known.
#[derive(Debug, Default)]
pub struct LineMetrics {
    staged: BTreeMap<(FontClass, WordStyle), RawFontMetrics>,
}

impl LineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record size observations for one glyph.
    pub fn record_glyph(
        &mut self,
        family: FontClass,
        style: WordStyle,
        glyph: &str,
        width: f64,
        height: f64,
        desc: Option<f64>,
    ) {
        if !is_metric_glyph(glyph) {
            return;
        }
        let m = self.staged.entry((family, style)).or_default();
        m.width.entry(glyph.to_string()).or_default().push(width);
        m.height.entry(glyph.to_string()).or_default().push(height);
        if let Some(desc) = desc {
            m.desc.entry(glyph.to_string()).or_default().push(desc);
        }
        m.obs += 1;
    }

    /// Record the gap between `prev` and `glyph`.
    pub fn record_gap(
        &mut self,
        family: FontClass,
        style: WordStyle,
        prev: &str,
        glyph: &str,
        gap: f64,
    ) {
        if !is_metric_glyph(prev) || !is_metric_glyph(glyph) {
            return;
        }
        let m = self.staged.entry((family, style)).or_default();
        m.advance.entry(glyph.to_string()).or_default().push(gap);
        m.kerning
            .entry(format!("{}{}", prev, glyph))
            .or_default()
            .push(gap);
    }

    /// Normalize by `x_height` and append to `target`.
    ///
    /// Nothing is recorded when the x-height is missing or not positive.
    /// Zero-valued observations are dropped.
    pub fn flush_into(self, target: &mut FontMetricsAccumulator, x_height: Option<f64>) {
        let Some(x_height) = x_height.filter(|x| x.is_finite() && *x > 0.0) else {
            return;
        };

        for ((family, style), raw) in self.staged {
            if raw.width.is_empty() {
                continue;
            }
            let normalized = RawFontMetrics {
                width: normalize(raw.width, x_height),
                height: normalize(raw.height, x_height),
                desc: normalize(raw.desc, x_height),
                advance: normalize(raw.advance, x_height),
                kerning: normalize(raw.kerning, x_height),
                obs: raw.obs,
            };
            target.entry(family, style).merge(normalized);
        }
    }
}

fn normalize(
    observations: BTreeMap<String, Vec<f64>>,
    x_height: f64,
) -> BTreeMap<String, Vec<f64>> {
    observations
        .into_iter()
        .map(|(key, values)| {
            let values = values
                .into_iter()
                .map(|v| v / x_height)
                .filter(|v| v.is_finite() && *v != 0.0)
                .collect();
            (key, values)
        })
        .collect()
}

/// Glyph heights on one line, bucketed by glyph class.
#[derive(Debug, Default)]
pub struct GlyphHeights {
    asc: Vec<f64>,
    x: Vec<f64>,
    all: Vec<f64>,
}

impl GlyphHeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a glyph that counts towards the overall line height only.
    pub fn observe_any(&mut self, height: f64) {
        self.all.push(height);
    }

    /// Record a glyph into its ascender or x-height bucket, if any.
    pub fn observe_class(&mut self, glyph: &str, height: f64) {
        if is_ascender_glyph(glyph) {
            self.asc.push(height);
        } else if is_x_height_glyph(glyph) {
            self.x.push(height);
        }
    }

    /// Ascender height at the given percentile.
    pub fn ascender(&self, p: f64) -> Option<f64> {
        quantile(&self.asc, p)
    }

    /// Median x-height.
    pub fn x_height(&self) -> Option<f64> {
        median(&self.x)
    }

    /// Tallest glyph on the line.
    pub fn tallest(&self) -> Option<f64> {
        self.all.iter().copied().reduce(f64::max)
    }
}

/// Baseline slope estimate from glyph bottoms.
///
/// Each point is compared to the first one; the slope is the median of
/// the pairwise slopes.
#[derive(Debug, Default)]
pub struct BaselineFit {
    first: Option<(f64, f64)>,
    slopes: Vec<f64>,
}

impl BaselineFit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a point sitting on the baseline.
    pub fn observe(&mut self, x: f64, y: f64) {
        match self.first {
            None => self.first = Some((x, y)),
            Some((x0, y0)) => {
                let slope = (y - y0) / (x - x0);
                if slope.is_finite() {
                    self.slopes.push(slope);
                }
            }
        }
    }

    /// Median slope, 0 without data.
    pub fn slope(&self) -> f64 {
        median(&self.slopes).unwrap_or(0.0)
    }

    /// Baseline offset from the bottom of `bbox` at its left edge.
    pub fn intercept(&self, bbox: &BBox, slope: f64) -> f64 {
        let Some((x0, y0)) = self.first else {
            return 0.0;
        };
        let mut offset = y0 - bbox.bottom as f64;
        if slope < 0.0 {
            offset -= slope * (x0 - bbox.left as f64);
        }
        if offset.is_finite() {
            round_half_up(offset)
        } else {
            0.0
        }
    }
}

/// Page-level accumulators fed by each kept line.
#[derive(Debug, Default)]
pub struct PageStats {
    slopes: Vec<f64>,
    lefts: Vec<f64>,
    tops: Vec<f64>,
    line_heights: Vec<f64>,
    asc_ratios: Vec<f64>,
}

impl PageStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line slope to the skew estimate.
    pub fn push_slope(&mut self, slope: f64) {
        if slope.is_finite() {
            self.slopes.push(slope);
        }
    }

    /// Add a line box to the margin estimate if it is long enough.
    ///
    /// Returns whether the line was counted.
    pub fn push_margin_sample(&mut self, bbox: &BBox) -> bool {
        if bbox.width() < MIN_STAT_LINE_WIDTH {
            return false;
        }
        self.lefts.push(bbox.left as f64);
        self.tops.push(bbox.top as f64);
        true
    }

    /// Trimmed mean of the line slopes, 0 without data.
    pub fn mean_slope(&self) -> f64 {
        mean50(&self.slopes).unwrap_or(0.0)
    }

    /// Skew angle in degrees implied by the line slopes.
    pub fn skew_degrees(&self) -> f64 {
        self.mean_slope().clamp(-1.0, 1.0).asin().to_degrees()
    }

    /// Left margin and slope-adjusted margin delta.
    pub fn margins(&self, shift_x: f64) -> (Option<f64>, Option<f64>) {
        if self.lefts.len() < MIN_MARGIN_LINES {
            return (None, None);
        }
        let slope = self.mean_slope();
        let adjusted: Vec<f64> = self
            .lefts
            .iter()
            .zip(&self.tops)
            .map(|(left, top)| left + slope * top)
            .collect();

        let left = quantile(&self.lefts, 0.2).map(|l| l - shift_x);
        let left_adjusted = match (quantile(&adjusted, 0.2), left) {
            (Some(adj), Some(left)) => Some(adj - shift_x - left),
            _ => None,
        };
        (left, left_adjusted)
    }

    /// Line height used when a line has no ascender or x-height glyphs.
    ///
    /// Short or missing heights are replaced by the page median so far, or
    /// 10 on the first such line. Trustworthy heights feed the median.
    pub fn settle_line_height(&mut self, tallest: Option<f64>, sized: bool) -> f64 {
        match tallest {
            Some(h) if h >= 10.0 || sized => {
                self.line_heights.push(h);
                h
            }
            _ => match median(&self.line_heights) {
                Some(m) => tallest.map_or(m, |h| h.max(m)),
                None => 10.0,
            },
        }
    }

    /// Ascender height, falling back on the page's ascender/x-height ratio.
    ///
    /// A measured ascender is kept when it is plausible (1.1 to 2 times the
    /// x-height, or any value on a small-caps line) and then feeds the
    /// ratio. Otherwise it is estimated from the median ratio once three
    /// lines have contributed, else as 1.5 times the x-height.
    pub fn settle_ascender(
        &mut self,
        ascender: Option<f64>,
        x_height: Option<f64>,
        small_caps: bool,
    ) -> Option<f64> {
        let Some(x_height) = x_height.filter(|x| *x != 0.0) else {
            return ascender;
        };
        match ascender {
            Some(asc) if small_caps || (asc > x_height * 1.1 && asc < x_height * 2.0) => {
                self.asc_ratios.push(asc / x_height);
                Some(asc)
            }
            _ if self.asc_ratios.len() >= 3 => {
                median(&self.asc_ratios).map(|ratio| x_height * ratio)
            }
            _ => Some(round_half_up(x_height * 1.5)),
        }
    }
}
