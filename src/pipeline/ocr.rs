//! OCR fallback: rasterise pages and recognise their text.
//!
//! Recognition goes through the [`TextRecognizer`] trait. The production
//! implementation is [`LazyOcrsRecognizer`], which wraps the pure-Rust
//! `ocrs` engine and only loads its models the first time a page actually
//! needs OCR, so batches of born-digital PDFs never touch the model files.
//!
//! # Model Setup
//!
//! `ocrs` needs two model files in one directory:
//!
//! - `text-detection.rten` locates text regions.
//! - `text-recognition.rten` decodes characters from each region.
//!
//! They are published at <https://github.com/robertknight/ocrs-models>, and
//! `ocrs-cli` downloads them to `~/.cache/ocrs` on first use. That cache is
//! the default model directory here too.

use crate::config::ConversionConfig;
use crate::error::OcrMdError;
use crate::pipeline::document::PdfDocumentHandle;
use crate::pipeline::postprocess;
use crate::pipeline::render::RenderOptions;
use image::RgbImage;
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use once_cell::unsync::OnceCell;
use rten::Model;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Turns a page image into plain text.
pub trait TextRecognizer {
    fn recognize(&self, image: &RgbImage) -> Result<String, OcrMdError>;
}

/// Text produced by [`ocr_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrText {
    /// `# Page N` sections, one per processed page.
    pub markdown: String,
    /// Number of pages that went through OCR.
    pub pages: usize,
}

/// OCR the first `config.effective_page_limit(..)` pages of `doc`.
///
/// Each page is rendered at `config.ocr_scale`, recognised, and appended under
/// a `# Page N` heading. Progress is logged every `config.progress_every`
/// pages and on the last page.
pub fn ocr_document(
    doc: &dyn PdfDocumentHandle,
    recognizer: &dyn TextRecognizer,
    config: &ConversionConfig,
) -> Result<OcrText, OcrMdError> {
    let limit = config.effective_page_limit(doc.page_count());
    let options = RenderOptions::from_config(config);
    let every = config.progress_every.max(1);
    info!("Processing {} pages with OCR...", limit);

    if let Some(ref cb) = config.progress_callback {
        cb.on_ocr_start(limit);
    }

    let mut out = String::new();
    for index in 0..limit {
        let image = doc.render_page(index, &options)?;
        let text = recognizer.recognize(&image)?;
        debug!("Page {}: {} chars recognised", index + 1, text.len());

        out.push_str(&format!("# Page {}\n\n{}\n\n", index + 1, text.trim()));

        if index % every == 0 || index + 1 == limit {
            info!("Processed page {}/{}", index + 1, limit);
        }
        if let Some(ref cb) = config.progress_callback {
            cb.on_ocr_page(index + 1, limit);
        }
    }

    Ok(OcrText {
        markdown: postprocess::clean_markdown(&out),
        pages: limit,
    })
}

// ── ocrs ─────────────────────────────────────────────────────────────────

/// Locations of the two `ocrs` model files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrModelPaths {
    pub detection: PathBuf,
    pub recognition: PathBuf,
}

impl Default for OcrModelPaths {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrModelPaths {
    /// Expect `text-detection.rten` and `text-recognition.rten` inside `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection: dir.join(DETECTION_MODEL_FILENAME),
            recognition: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    pub fn from_config(config: &ConversionConfig) -> Self {
        match config.ocr_model_dir {
            Some(ref dir) => Self::from_dir(dir),
            None => Self::default(),
        }
    }

    /// Verify both model files exist.
    pub fn validate(&self) -> Result<(), OcrMdError> {
        for path in [&self.detection, &self.recognition] {
            if !path.exists() {
                return Err(OcrMdError::OcrModelMissing { path: path.clone() });
            }
        }
        Ok(())
    }
}

/// `<platform cache dir>/ocrs`, shared with `ocrs-cli`.
pub fn default_model_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("ocrs"))
        .unwrap_or_else(|| PathBuf::from("ocrs-models"))
}

/// [`TextRecognizer`] backed by a loaded `ocrs` engine.
pub struct OcrsRecognizer {
    engine: OcrsEngine,
}

impl OcrsRecognizer {
    /// Load both models. This is the expensive step; reuse the recognizer.
    #[instrument(skip_all, fields(detection = %paths.detection.display()))]
    pub fn load(paths: &OcrModelPaths) -> Result<Self, OcrMdError> {
        paths.validate()?;

        info!("Loading OCR models");
        let detection_model = Model::load_file(&paths.detection).map_err(|err| {
            OcrMdError::OcrFailed(format!(
                "failed to load detection model from {}: {}",
                paths.detection.display(),
                err
            ))
        })?;
        let recognition_model = Model::load_file(&paths.recognition).map_err(|err| {
            OcrMdError::OcrFailed(format!(
                "failed to load recognition model from {}: {}",
                paths.recognition.display(),
                err
            ))
        })?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| OcrMdError::OcrFailed(format!("failed to initialise OCR engine: {}", err)))?;

        Ok(Self { engine })
    }
}

impl TextRecognizer for OcrsRecognizer {
    fn recognize(&self, image: &RgbImage) -> Result<String, OcrMdError> {
        let (width, height) = image.dimensions();
        let source = ImageSource::from_bytes(image.as_raw(), (width, height)).map_err(|err| {
            OcrMdError::OcrFailed(format!(
                "failed to create image source ({}x{}): {}",
                width, height, err
            ))
        })?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| OcrMdError::OcrFailed(format!("preprocessing failed: {}", err)))?;

        self.engine
            .get_text(&input)
            .map_err(|err| OcrMdError::OcrFailed(format!("text recognition failed: {}", err)))
    }
}

/// Loads an [`OcrsRecognizer`] on first use and keeps it for the batch.
pub struct LazyOcrsRecognizer {
    paths: OcrModelPaths,
    engine: OnceCell<OcrsRecognizer>,
}

impl LazyOcrsRecognizer {
    pub fn new(paths: OcrModelPaths) -> Self {
        Self {
            paths,
            engine: OnceCell::new(),
        }
    }

    pub fn from_config(config: &ConversionConfig) -> Self {
        Self::new(OcrModelPaths::from_config(config))
    }

    pub fn is_loaded(&self) -> bool {
        self.engine.get().is_some()
    }
}

impl TextRecognizer for LazyOcrsRecognizer {
    fn recognize(&self, image: &RgbImage) -> Result<String, OcrMdError> {
        self.engine
            .get_or_try_init(|| OcrsRecognizer::load(&self.paths))?
            .recognize(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::DocumentMetadata;
    use std::cell::{Cell, RefCell};

    struct BlankDoc {
        pages: usize,
        rendered: RefCell<Vec<usize>>,
    }

    impl PdfDocumentHandle for BlankDoc {
        fn page_count(&self) -> usize {
            self.pages
        }

        fn metadata(&self) -> DocumentMetadata {
            DocumentMetadata::default()
        }

        fn page_text(&self, _index: usize) -> Result<String, OcrMdError> {
            Ok(String::new())
        }

        fn render_page(&self, index: usize, options: &RenderOptions) -> Result<RgbImage, OcrMdError> {
            self.rendered.borrow_mut().push(index);
            let (w, h) = options.target_size(10.0, 20.0);
            Ok(RgbImage::new(w, h))
        }
    }

    /// Reports the image size it was given, so the test can see the scale.
    struct SizeRecognizer {
        calls: Cell<usize>,
    }

    impl TextRecognizer for SizeRecognizer {
        fn recognize(&self, image: &RgbImage) -> Result<String, OcrMdError> {
            self.calls.set(self.calls.get() + 1);
            Ok(format!("{}x{}", image.width(), image.height()))
        }
    }

    fn doc(pages: usize) -> BlankDoc {
        BlankDoc {
            pages,
            rendered: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn one_section_per_page_in_order() {
        let d = doc(3);
        let r = SizeRecognizer { calls: Cell::new(0) };
        let out = ocr_document(&d, &r, &ConversionConfig::default()).unwrap();
        assert_eq!(out.pages, 3);
        assert_eq!(
            out.markdown,
            "# Page 1\n\n20x40\n\n# Page 2\n\n20x40\n\n# Page 3\n\n20x40\n"
        );
        assert_eq!(*d.rendered.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn page_cap_limits_rendering() {
        let d = doc(10);
        let r = SizeRecognizer { calls: Cell::new(0) };
        let config = ConversionConfig::builder().max_pages(3).build().unwrap();
        let out = ocr_document(&d, &r, &config).unwrap();
        assert_eq!(out.pages, 3);
        assert_eq!(r.calls.get(), 3);
        assert!(out.markdown.contains("# Page 3"));
        assert!(!out.markdown.contains("# Page 4"));
    }

    #[test]
    fn scale_reaches_renderer() {
        let d = doc(1);
        let r = SizeRecognizer { calls: Cell::new(0) };
        let config = ConversionConfig::builder().ocr_scale(4.0).build().unwrap();
        let out = ocr_document(&d, &r, &config).unwrap();
        assert!(out.markdown.contains("40x80"), "got: {}", out.markdown);
    }

    #[test]
    fn empty_document_yields_empty_text() {
        let d = doc(0);
        let r = SizeRecognizer { calls: Cell::new(0) };
        let out = ocr_document(&d, &r, &ConversionConfig::default()).unwrap();
        assert_eq!(out.pages, 0);
        assert!(out.markdown.is_empty());
    }

    #[test]
    fn model_paths_from_dir() {
        let paths = OcrModelPaths::from_dir("/tmp/models");
        assert_eq!(paths.detection, PathBuf::from("/tmp/models/text-detection.rten"));
        assert_eq!(
            paths.recognition,
            PathBuf::from("/tmp/models/text-recognition.rten")
        );
    }

    #[test]
    fn default_paths_end_with_model_names() {
        let paths = OcrModelPaths::default();
        assert!(paths.detection.ends_with(DETECTION_MODEL_FILENAME));
        assert!(paths.recognition.ends_with(RECOGNITION_MODEL_FILENAME));
    }

    #[test]
    fn missing_models_fail_validation() {
        let paths = OcrModelPaths::from_dir("/nonexistent/ocr-models");
        assert!(matches!(
            paths.validate(),
            Err(OcrMdError::OcrModelMissing { .. })
        ));
    }

    #[test]
    fn lazy_recognizer_reports_missing_models_on_first_use() {
        let lazy = LazyOcrsRecognizer::new(OcrModelPaths::from_dir("/nonexistent/ocr-models"));
        assert!(!lazy.is_loaded());
        let err = lazy.recognize(&RgbImage::new(4, 4)).unwrap_err();
        assert!(matches!(err, OcrMdError::OcrModelMissing { .. }));
        assert!(!lazy.is_loaded());
    }
}
