//! Normalized OCR page model.
//!
//! Every supported markup format is converted into the same tree: a
//! [`Page`] owns its [`Line`]s, which own their [`Word`]s. Font metric
//! observations and table layout boxes are returned alongside the page.

mod document;
mod font_metrics;
mod geometry;
mod layout;
mod line;
mod page;
mod word;

pub use document::Document;
pub use font_metrics::{FontMetricsAccumulator, Observations, RawFontMetrics};
pub use geometry::{round_half_up, BBox, Dims, Rotation};
pub use layout::{InclusionLevel, InclusionRule, LayoutBox, LayoutBoxType, LayoutBoxes};
pub use line::{Baseline, Line};
pub use page::{ConvertedPage, Page, Warnings};
pub use word::{FontClass, Word, WordStyle};
