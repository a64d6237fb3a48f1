//! OCR markup parsing.
//!
//! One converter per format (`hocr`, `abbyy`, `stext`) on top of a shared
//! tag scanner and shared line statistics.

pub mod abbyy;
mod font;
pub mod hocr;
mod line_stats;
mod markup;
mod options;
mod stats;
pub mod stext;
mod table;
mod text;

pub use font::classify_font;
pub use options::{ConvertOptions, ErrorMode, HocrOptions, TESSERACT_LEGACY};
pub use stats::{mean50, median, quantile};
pub use table::convert_table_layout;
pub use text::{correct_dash, correct_quote, unescape_xml};
