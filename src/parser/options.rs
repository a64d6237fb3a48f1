//! Conversion options and configuration.

use crate::model::Dims;

/// Engine whose italic markup is trusted.
pub const TESSERACT_LEGACY: &str = "Tesseract Legacy";

/// Options for converting one hOCR page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HocrOptions {
    /// Page size; read from the `ocr_page` bbox when `None`
    pub page_dims: Option<Dims>,

    /// Angle in degrees the image was rotated by before recognition
    pub rotate_angle: f64,

    /// Name of the engine that produced the markup
    pub engine: Option<String>,
}

impl HocrOptions {
    /// Create new hOCR options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page dimensions.
    pub fn with_page_dims(mut self, dims: Dims) -> Self {
        self.page_dims = Some(dims);
        self
    }

    /// Set the pre-applied rotation angle.
    pub fn with_rotate_angle(mut self, degrees: f64) -> Self {
        self.rotate_angle = degrees;
        self
    }

    /// Set the engine name.
    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Whether `<em>` markup marks italic words.
    ///
    /// Only the legacy Tesseract engine reports italics reliably.
    pub fn keep_italic(&self) -> bool {
        self.engine.as_deref() == Some(TESSERACT_LEGACY)
    }
}

/// Options for converting whole documents.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether to convert pages in parallel
    pub parallel: bool,

    /// Options applied to every hOCR page
    pub hocr: HocrOptions,
}

impl ConvertOptions {
    /// Create new convert options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip pages that fail to convert).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set hOCR page options.
    pub fn with_hocr(mut self, hocr: HocrOptions) -> Self {
        self.hocr = hocr;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            parallel: true,
            hocr: HocrOptions::default(),
        }
    }
}

/// Error handling mode for document conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on the first page error
    #[default]
    Strict,
    /// Skip failed pages and continue
    Lenient,
}
