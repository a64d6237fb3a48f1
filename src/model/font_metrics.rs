//! Per-glyph font metric observations.
//!
//! Every observation is a pixel measurement divided by the x-height of the
//! line it came from, so values from differently sized text on the same
//! page are comparable. Accumulators from separate pages are combined with
//! [`FontMetricsAccumulator::merge`], which concatenates observation lists
//! and is therefore associative.

use super::{FontClass, WordStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Observations keyed by glyph (or glyph pair for kerning).
pub type Observations = BTreeMap<String, Vec<f64>>;

/// Raw metric observations for one font class and style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFontMetrics {
    /// Glyph widths
    pub width: Observations,

    /// Glyph heights
    pub height: Observations,

    /// Glyph bottom relative to the expected baseline
    pub desc: Observations,

    /// Gap to the previous glyph
    pub advance: Observations,

    /// Gap between the previous glyph and this one, keyed by the pair
    pub kerning: Observations,

    /// Number of width observations
    pub obs: u64,
}

impl RawFontMetrics {
    /// Check if nothing has been observed.
    pub fn is_empty(&self) -> bool {
        self.obs == 0
            && self.width.is_empty()
            && self.height.is_empty()
            && self.desc.is_empty()
            && self.advance.is_empty()
            && self.kerning.is_empty()
    }

    /// Append all observations from `other`.
    pub fn merge(&mut self, other: RawFontMetrics) {
        extend(&mut self.width, other.width);
        extend(&mut self.height, other.height);
        extend(&mut self.desc, other.desc);
        extend(&mut self.advance, other.advance);
        extend(&mut self.kerning, other.kerning);
        self.obs += other.obs;
    }
}

fn extend(target: &mut Observations, source: Observations) {
    for (key, values) in source {
        target.entry(key).or_default().extend(values);
    }
}

/// Font metric observations for a page or document, keyed by font class
/// and style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontMetricsAccumulator {
    families: BTreeMap<FontClass, BTreeMap<WordStyle, RawFontMetrics>>,
}

impl FontMetricsAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Observations for one font class and style.
    pub fn get(&self, family: FontClass, style: WordStyle) -> Option<&RawFontMetrics> {
        self.families.get(&family)?.get(&style)
    }

    /// Mutable observations for one font class and style, created on demand.
    pub(crate) fn entry(&mut self, family: FontClass, style: WordStyle) -> &mut RawFontMetrics {
        self.families
            .entry(family)
            .or_default()
            .entry(style)
            .or_default()
    }

    /// Iterate over `(family, style, metrics)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (FontClass, WordStyle, &RawFontMetrics)> {
        self.families.iter().flat_map(|(family, styles)| {
            styles
                .iter()
                .map(move |(style, metrics)| (*family, *style, metrics))
        })
    }

    /// Check if nothing has been observed.
    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, _, m)| m.is_empty())
    }

    /// Total number of width observations.
    pub fn total_obs(&self) -> u64 {
        self.iter().map(|(_, _, m)| m.obs).sum()
    }

    /// Append all observations from `other`.
    pub fn merge(&mut self, other: FontMetricsAccumulator) {
        for (family, styles) in other.families {
            let target = self.families.entry(family).or_default();
            for (style, metrics) in styles {
                target.entry(style).or_default().merge(metrics);
            }
        }
    }

    /// Consuming variant of [`merge`](Self::merge).
    pub fn merged(mut self, other: FontMetricsAccumulator) -> Self {
        self.merge(other);
        self
    }

    /// Merge many accumulators in parallel.
    ///
    /// Observation lists keep the order of `accumulators`.
    pub fn merge_all<I>(accumulators: I) -> Self
    where
        I: IntoParallelIterator<Item = FontMetricsAccumulator>,
    {
        accumulators
            .into_par_iter()
            .reduce(FontMetricsAccumulator::new, FontMetricsAccumulator::merged)
    }
}
