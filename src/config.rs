//! Configuration types for batch PDF-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The same config is shared by every
//! file in a batch.

use crate::error::OcrMdError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for converting one or more PDFs.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use ocrmd::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .output_dir("out")
///     .max_pages(3)
///     .force_ocr(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_pages, Some(3));
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Flat destination directory for every `.md` file. Default: None.
    ///
    /// When unset, each output lands in a `markdown/` directory next to its PDF.
    pub output_dir: Option<PathBuf>,

    /// Maximum number of pages run through OCR per document. Default: None (all).
    ///
    /// Only the OCR fallback honours the cap; markdown extraction always reads
    /// the whole document.
    pub max_pages: Option<usize>,

    /// Skip markdown extraction and always OCR. Default: false.
    pub force_ocr: bool,

    /// Treat an existing output file as success without reprocessing. Default: true.
    pub skip_existing: bool,

    /// Linear zoom applied when rasterising a page for OCR. Range: 0.5–8.0. Default: 2.0.
    ///
    /// 2x linear scale is 4x the pixel area of the page at 72 DPI, which is
    /// roughly 144 DPI and enough for the recognition model on body text.
    pub ocr_scale: f32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 8000.
    ///
    /// Caps memory for oversized pages (posters, engineering drawings) where
    /// `ocr_scale` alone would produce a huge bitmap.
    pub max_rendered_pixels: u32,

    /// Page separator used by markdown extraction. Default: horizontal rule.
    pub page_separator: PageSeparator,

    /// Include YAML front-matter with document metadata. Default: false.
    pub include_metadata: bool,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Directory holding `text-detection.rten` and `text-recognition.rten`.
    /// If None, uses `<cache dir>/ocrs`.
    pub ocr_model_dir: Option<PathBuf>,

    /// Explicit path to the pdfium shared library. If None, looks at
    /// `PDFIUM_LIB_PATH`, then the working directory, then system paths.
    pub pdfium_library: Option<PathBuf>,

    /// Log OCR progress every N pages (and always on the last page). Default: 5.
    pub progress_every: usize,

    /// Receives per-file and per-page events. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            max_pages: None,
            force_ocr: false,
            skip_existing: true,
            ocr_scale: 2.0,
            max_rendered_pixels: 8000,
            page_separator: PageSeparator::default(),
            include_metadata: false,
            password: None,
            ocr_model_dir: None,
            pdfium_library: None,
            progress_every: 5,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("output_dir", &self.output_dir)
            .field("max_pages", &self.max_pages)
            .field("force_ocr", &self.force_ocr)
            .field("skip_existing", &self.skip_existing)
            .field("ocr_scale", &self.ocr_scale)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("page_separator", &self.page_separator)
            .field("include_metadata", &self.include_metadata)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("ocr_model_dir", &self.ocr_model_dir)
            .field("pdfium_library", &self.pdfium_library)
            .field("progress_every", &self.progress_every)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Number of pages the OCR fallback processes for a document of `total_pages`.
    pub fn effective_page_limit(&self, total_pages: usize) -> usize {
        match self.max_pages {
            Some(cap) => cap.min(total_pages),
            None => total_pages,
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = Some(n);
        self
    }

    pub fn force_ocr(mut self, v: bool) -> Self {
        self.config.force_ocr = v;
        self
    }

    pub fn skip_existing(mut self, v: bool) -> Self {
        self.config.skip_existing = v;
        self
    }

    pub fn ocr_scale(mut self, scale: f32) -> Self {
        self.config.ocr_scale = scale.clamp(0.5, 8.0);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn page_separator(mut self, sep: PageSeparator) -> Self {
        self.config.page_separator = sep;
        self
    }

    pub fn include_metadata(mut self, v: bool) -> Self {
        self.config.include_metadata = v;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn ocr_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.ocr_model_dir = Some(dir.into());
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn progress_every(mut self, n: usize) -> Self {
        self.config.progress_every = n.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, OcrMdError> {
        let c = &self.config;
        if c.max_pages == Some(0) {
            return Err(OcrMdError::InvalidConfig(
                "max_pages must be ≥ 1 when set".into(),
            ));
        }
        if !c.ocr_scale.is_finite() {
            return Err(OcrMdError::InvalidConfig(format!(
                "OCR scale must be a finite number, got {}",
                c.ocr_scale
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How to separate pages in markdown-extraction output.
///
/// OCR output always uses `# Page N` headings instead.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSeparator {
    /// No separator; pages joined with "\n\n".
    None,
    /// Horizontal rule: "\n\n---\n\n" (default)
    #[default]
    HorizontalRule,
    /// HTML comment with page number: "<!-- page N -->"
    Comment,
    /// Custom string inserted between pages.
    Custom(String),
}

impl PageSeparator {
    /// Render the separator string placed before the given page (1-indexed).
    pub fn render(&self, page_num: usize) -> String {
        match self {
            PageSeparator::None => "\n\n".to_string(),
            PageSeparator::HorizontalRule => "\n\n---\n\n".to_string(),
            PageSeparator::Comment => format!("\n\n<!-- page {} -->\n\n", page_num),
            PageSeparator::Custom(s) => format!("\n\n{}\n\n", s),
        }
    }
}
