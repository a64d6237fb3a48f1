//! Line-level types.

use super::{BBox, Rotation, Word};
use serde::{Deserialize, Serialize};

/// Text baseline of a line.
///
/// `intercept` is the vertical offset of the baseline from `bbox.bottom`
/// at the left edge of the line box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Rise over run
    pub slope: f64,

    /// Offset from the bottom edge, in pixels
    pub intercept: f64,
}

impl Baseline {
    /// Create a new baseline.
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }
}

/// One detected text line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Union of the word boxes
    pub bbox: BBox,

    /// Baseline relative to `bbox`
    pub baseline: Baseline,

    /// Ascender height in pixels
    pub asc_height: f64,

    /// x-height in pixels
    pub x_height: Option<f64>,

    /// Words in reading order
    pub words: Vec<Word>,
}

impl Line {
    /// Create a new line without words.
    pub fn new(bbox: BBox, baseline: Baseline, asc_height: f64, x_height: Option<f64>) -> Self {
        Self {
            bbox,
            baseline,
            asc_height,
            x_height,
            words: Vec::new(),
        }
    }

    /// Absolute y coordinate of the baseline at `x`.
    pub fn baseline_y_at(&self, x: f64) -> f64 {
        self.bbox.bottom as f64
            + self.baseline.intercept
            + self.baseline.slope * (x - self.bbox.left as f64)
    }

    /// Recompute `bbox` as the union of the word boxes.
    ///
    /// The baseline intercept is shifted so the absolute baseline does not
    /// move. Returns `false` when the line has no words.
    pub fn refit_bbox(&mut self) -> bool {
        let Some(union) = BBox::union_all(self.words.iter().map(|w| &w.bbox)) else {
            return false;
        };

        if union != self.bbox {
            let y = self.baseline_y_at(union.left as f64);
            self.baseline.intercept = y - union.bottom as f64;
            self.bbox = union;
        }
        true
    }

    /// Map words, box and baseline from a rotated image back to the page.
    pub fn rotate(&mut self, rotation: &Rotation) {
        let slope = (self.baseline.slope.atan() + rotation.degrees.to_radians()).tan();

        for word in &mut self.words {
            word.bbox = word.bbox.rotate(rotation);
        }

        let rotated = self.bbox.rotate(rotation);
        self.bbox = BBox::union_all(self.words.iter().map(|w| &w.bbox)).unwrap_or(rotated);

        self.baseline.slope = slope;
        self.baseline.intercept += (rotated.bottom - self.bbox.bottom) as f64;
    }

    /// Words joined by single spaces.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Check if the line has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
