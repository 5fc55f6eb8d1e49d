//! In-memory PDF backend and recognizer shared by the integration tests.

#![allow(dead_code)]

use image::RgbImage;
use ocrmd::{
    DocumentMetadata, OcrMdError, PdfBackend, PdfDocumentHandle, RenderOptions, TextRecognizer,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;

/// What a fake PDF contains.
#[derive(Clone, Debug)]
pub enum FakePdf {
    /// Born-digital: one text-layer string per page.
    Text(Vec<String>),
    /// Scanned: no text layer at all.
    Scanned { pages: usize },
}

impl FakePdf {
    pub fn text(pages: &[&str]) -> Self {
        FakePdf::Text(pages.iter().map(|s| s.to_string()).collect())
    }

    fn page_count(&self) -> usize {
        match self {
            FakePdf::Text(pages) => pages.len(),
            FakePdf::Scanned { pages } => *pages,
        }
    }
}

/// Serves documents by file name; counts opens and records passwords.
#[derive(Default)]
pub struct FakeBackend {
    docs: HashMap<String, FakePdf>,
    pub opens: Cell<usize>,
    pub passwords: RefCell<Vec<Option<String>>>,
}

impl FakeBackend {
    pub fn with(mut self, file_name: &str, pdf: FakePdf) -> Self {
        self.docs.insert(file_name.to_string(), pdf);
        self
    }
}

impl PdfBackend for FakeBackend {
    fn open<'a>(
        &'a self,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<Box<dyn PdfDocumentHandle + 'a>, OcrMdError> {
        self.opens.set(self.opens.get() + 1);
        self.passwords
            .borrow_mut()
            .push(password.map(str::to_string));
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let pdf = self.docs.get(&name).ok_or_else(|| OcrMdError::CorruptPdf {
            path: path.to_path_buf(),
            detail: "unknown fake document".into(),
        })?;
        Ok(Box::new(FakeDoc { pdf: pdf.clone() }))
    }
}

struct FakeDoc {
    pdf: FakePdf,
}

impl PdfDocumentHandle for FakeDoc {
    fn page_count(&self) -> usize {
        self.pdf.page_count()
    }

    fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            title: Some("Fake".into()),
            page_count: self.page_count(),
            ..Default::default()
        }
    }

    fn page_text(&self, index: usize) -> Result<String, OcrMdError> {
        match self.pdf {
            FakePdf::Text(ref pages) => Ok(pages[index].clone()),
            FakePdf::Scanned { .. } => Ok(String::new()),
        }
    }

    /// Encodes the page index in the image width so the recognizer can echo it.
    fn render_page(&self, index: usize, _options: &RenderOptions) -> Result<RgbImage, OcrMdError> {
        Ok(RgbImage::new(index as u32 + 1, 1))
    }
}

/// Returns `scanned text N` for page N and counts calls.
#[derive(Default)]
pub struct CountingRecognizer {
    pub calls: Cell<usize>,
}

impl TextRecognizer for CountingRecognizer {
    fn recognize(&self, image: &RgbImage) -> Result<String, OcrMdError> {
        self.calls.set(self.calls.get() + 1);
        Ok(format!("scanned text {}", image.width()))
    }
}

/// Write a file that passes the `%PDF` magic check.
pub fn write_pdf(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"%PDF-1.4\n%fake\n").unwrap();
}

/// Route library logs to the test harness; `RUST_LOG=debug` shows them.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
