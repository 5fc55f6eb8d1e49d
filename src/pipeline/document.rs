//! PDF access: the backend seam and its pdfium implementation.
//!
//! The converter talks to PDFs only through [`PdfBackend`] and
//! [`PdfDocumentHandle`]. Production code uses [`PdfiumBackend`]; tests swap
//! in an in-memory backend so the fallback policy can be checked without a
//! pdfium library on the machine.
//!
//! A handle borrows its backend and is released when dropped, so every exit
//! path out of a conversion closes the document.

use crate::config::ConversionConfig;
use crate::error::OcrMdError;
use crate::output::DocumentMetadata;
use crate::pipeline::render::{self, RenderOptions};
use image::RgbImage;
use once_cell::unsync::OnceCell;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an existing pdfium library (file or directory).
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// A piece of text with the font size it is drawn at.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Effective size in points, after the text matrix is applied.
    pub font_size: f32,
}

impl TextRun {
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
        }
    }
}

/// An open PDF document. Page indices are 0-based.
pub trait PdfDocumentHandle {
    fn page_count(&self) -> usize;

    fn metadata(&self) -> DocumentMetadata;

    /// Plain text of one page in reading order, lines separated by newlines.
    fn page_text(&self, index: usize) -> Result<String, OcrMdError>;

    /// Text runs with font sizes, used for heading detection.
    fn text_runs(&self, index: usize) -> Result<Vec<TextRun>, OcrMdError> {
        let _ = index;
        Ok(Vec::new())
    }

    /// Rasterise one page to RGB.
    fn render_page(&self, index: usize, options: &RenderOptions) -> Result<RgbImage, OcrMdError>;
}

/// Opens PDF files.
pub trait PdfBackend {
    fn open<'a>(
        &'a self,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<Box<dyn PdfDocumentHandle + 'a>, OcrMdError>;
}

// ── pdfium ───────────────────────────────────────────────────────────────

/// [`PdfBackend`] backed by the pdfium C library.
///
/// The library is bound on the first [`open`](PdfBackend::open), so a batch
/// that never opens a PDF (all inputs missing or already converted) works on
/// machines without pdfium.
pub struct PdfiumBackend {
    library_path: Option<PathBuf>,
    pdfium: OnceCell<Pdfium>,
}

impl PdfiumBackend {
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self {
            library_path,
            pdfium: OnceCell::new(),
        }
    }

    pub fn from_config(config: &ConversionConfig) -> Self {
        Self::new(config.pdfium_library.clone())
    }

    fn pdfium(&self) -> Result<&Pdfium, OcrMdError> {
        self.pdfium
            .get_or_try_init(|| bind_pdfium(self.library_path.as_deref()))
    }
}

impl PdfBackend for PdfiumBackend {
    fn open<'a>(
        &'a self,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<Box<dyn PdfDocumentHandle + 'a>, OcrMdError> {
        let pdfium = self.pdfium()?;

        let document = pdfium.load_pdf_from_file(path, password).map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                if password.is_some() {
                    OcrMdError::WrongPassword {
                        path: path.to_path_buf(),
                    }
                } else {
                    OcrMdError::PasswordRequired {
                        path: path.to_path_buf(),
                    }
                }
            } else {
                OcrMdError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail: err_str,
                }
            }
        })?;

        Ok(Box::new(PdfiumDocument { document }))
    }
}

/// Bind to a pdfium shared library.
///
/// Search order: `explicit`, then `PDFIUM_LIB_PATH`, then the working
/// directory, then the system library path. Each of the first two may name
/// the library file itself or the directory containing it.
pub fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, OcrMdError> {
    let env_path = std::env::var_os(PDFIUM_LIB_PATH_ENV).map(PathBuf::from);

    let mut candidates: Vec<PathBuf> = Vec::new();
    for configured in explicit.map(Path::to_path_buf).into_iter().chain(env_path) {
        if configured.is_dir() {
            candidates.push(Pdfium::pdfium_platform_library_name_at_path(&configured));
        } else {
            candidates.push(configured);
        }
    }
    candidates.push(Pdfium::pdfium_platform_library_name_at_path("./"));

    let mut last_error = String::from("no candidate library paths");
    for candidate in &candidates {
        match Pdfium::bind_to_library(candidate) {
            Ok(bindings) => {
                info!("Bound pdfium from {}", candidate.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => {
                debug!("pdfium not usable at {}: {:?}", candidate.display(), e);
                last_error = format!("{}: {:?}", candidate.display(), e);
            }
        }
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            info!("Bound system pdfium library");
            Ok(Pdfium::new(bindings))
        }
        Err(e) => Err(OcrMdError::PdfiumBindingFailed(format!(
            "{last_error}; system library: {e:?}"
        ))),
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumDocument<'a> {
    fn page(&self, index: usize) -> Result<PdfPage<'a>, OcrMdError> {
        self.document
            .pages()
            .get(index as u16)
            .map_err(|e| OcrMdError::TextExtractionFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            })
    }
}

impl PdfDocumentHandle for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn metadata(&self) -> DocumentMetadata {
        let metadata = self.document.metadata();

        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata.get(tag).and_then(|t| {
                let v = t.value().trim().to_string();
                if v.is_empty() {
                    None
                } else {
                    Some(v)
                }
            })
        };

        DocumentMetadata {
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            subject: get_meta(PdfDocumentMetadataTagType::Subject),
            creator: get_meta(PdfDocumentMetadataTagType::Creator),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            page_count: self.page_count(),
            pdf_version: format!("{:?}", self.document.version()),
        }
    }

    fn page_text(&self, index: usize) -> Result<String, OcrMdError> {
        let page = self.page(index)?;
        let text = page.text().map_err(|e| OcrMdError::TextExtractionFailed {
            page: index + 1,
            detail: format!("{:?}", e),
        })?;
        Ok(text.all())
    }

    fn text_runs(&self, index: usize) -> Result<Vec<TextRun>, OcrMdError> {
        let page = self.page(index)?;
        let runs = page
            .objects()
            .iter()
            .filter_map(|object| {
                object
                    .as_text_object()
                    .map(|text| TextRun::new(text.text(), text.scaled_font_size().value))
            })
            .collect();
        Ok(runs)
    }

    fn render_page(&self, index: usize, options: &RenderOptions) -> Result<RgbImage, OcrMdError> {
        let page = self.page(index).map_err(|e| OcrMdError::RasterisationFailed {
            page: index + 1,
            detail: e.to_string(),
        })?;
        render::render_page(&page, index, options)
    }
}
