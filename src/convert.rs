//! Per-file conversion and the batch loop.
//!
//! ## Extraction policy
//!
//! For every PDF the converter tries, in order:
//!
//! 1. structured markdown extraction over the whole document
//!    (skipped with `force_ocr`),
//! 2. a raw text check of the first page,
//! 3. rasterise-and-OCR, but only when `force_ocr` is set or both of the
//!    above came back empty.
//!
//! ## Error boundary
//!
//! [`Converter::convert_file`] propagates errors with `?`.
//! [`Converter::run_file`] is the per-file boundary: it logs the error and
//! records a failed [`FileReport`], so [`Converter::convert_batch`] always
//! attempts every file.

use crate::config::ConversionConfig;
use crate::discover::discover_pdfs;
use crate::error::OcrMdError;
use crate::output::{BatchReport, ConversionOutcome, DocumentMetadata, ExtractionMethod, FileReport};
use crate::pipeline::document::{PdfBackend, PdfiumBackend};
use crate::pipeline::ocr::{self, LazyOcrsRecognizer, TextRecognizer};
use crate::pipeline::{extract, input};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

/// Name of the directory created next to a PDF when no output dir is given.
pub const DEFAULT_OUTPUT_SUBDIR: &str = "markdown";

/// Converts PDFs one at a time with a fixed configuration.
///
/// The pdfium binding and the OCR models are loaded lazily on first use and
/// reused for every later file.
///
/// # Example
/// ```rust,no_run
/// use ocrmd::{ConversionConfig, Converter};
/// use std::path::PathBuf;
///
/// let config = ConversionConfig::builder().output_dir("out").build().unwrap();
/// let converter = Converter::new(config);
/// let report = converter.convert_batch(&[PathBuf::from("scan.pdf")]);
/// eprintln!("{}", report.summary_line());
/// ```
pub struct Converter<B = PdfiumBackend, R = LazyOcrsRecognizer> {
    backend: B,
    recognizer: R,
    config: ConversionConfig,
}

impl Converter {
    /// Converter backed by pdfium and `ocrs`.
    pub fn new(config: ConversionConfig) -> Self {
        let backend = PdfiumBackend::from_config(&config);
        let recognizer = LazyOcrsRecognizer::from_config(&config);
        Self {
            backend,
            recognizer,
            config,
        }
    }
}

impl<B: PdfBackend, R: TextRecognizer> Converter<B, R> {
    /// Converter with caller-supplied PDF backend and recognizer.
    pub fn with_backends(config: ConversionConfig, backend: B, recognizer: R) -> Self {
        Self {
            backend,
            recognizer,
            config,
        }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Convert one PDF and write its Markdown.
    ///
    /// # Errors
    /// Any failure for this file: missing or unreadable input, pdfium or OCR
    /// errors, no text extracted, or the output could not be written.
    pub fn convert_file(&self, pdf_path: &Path) -> Result<ConversionOutcome, OcrMdError> {
        info!("Processing: {}", pdf_path.display());

        if !pdf_path.exists() {
            return Err(OcrMdError::FileNotFound {
                path: pdf_path.to_path_buf(),
            });
        }

        let output_path = output_path_for(pdf_path, self.config.output_dir.as_deref());
        ensure_parent_dir(&output_path)?;

        if self.config.skip_existing && output_path.exists() {
            info!(
                "Output file already exists: {}; skipping (use --overwrite to force conversion)",
                output_path.display()
            );
            return Ok(ConversionOutcome::SkippedExisting { output_path });
        }

        input::validate_pdf(pdf_path)?;

        // The handle lives only inside this block, so it is released before
        // the write and on every early return.
        let (markdown, method, total_pages, ocr_pages, metadata) = {
            let doc = self.backend.open(pdf_path, self.config.password.as_deref())?;
            let total_pages = doc.page_count();
            info!("PDF has {} pages", total_pages);

            let first_page_text = if total_pages > 0 {
                doc.page_text(0)?
            } else {
                String::new()
            };
            debug!("First page text length: {}", first_page_text.len());

            let mut markdown = String::new();
            if !self.config.force_ocr {
                debug!("Trying structured markdown extraction");
                markdown = extract::document_to_markdown(&*doc, &self.config.page_separator)?;
                debug!("Markdown text length: {}", markdown.len());
            }

            let mut method = ExtractionMethod::Markdown;
            let mut ocr_pages = 0;
            if self.config.force_ocr
                || (markdown.trim().is_empty() && first_page_text.trim().is_empty())
            {
                info!("Using OCR to extract text");
                let ocr = ocr::ocr_document(&*doc, &self.recognizer, &self.config)?;
                debug!("OCR extracted text length: {}", ocr.markdown.len());
                markdown = ocr.markdown;
                method = ExtractionMethod::Ocr;
                ocr_pages = ocr.pages;
            }

            let metadata = self.config.include_metadata.then(|| doc.metadata());
            (markdown, method, total_pages, ocr_pages, metadata)
        };

        if markdown.trim().is_empty() {
            return Err(OcrMdError::NoTextExtracted {
                path: pdf_path.to_path_buf(),
            });
        }

        let contents = match metadata {
            Some(ref meta) => format!("{}{}", format_yaml_front_matter(meta), markdown),
            None => markdown,
        };

        write_atomic(&output_path, &contents)?;
        info!("Saved markdown to {}", output_path.display());

        Ok(ConversionOutcome::Written {
            output_path,
            method,
            total_pages,
            ocr_pages,
            chars: contents.chars().count(),
        })
    }

    /// Convert one PDF, turning any error into a failed report.
    pub fn run_file(&self, pdf_path: &Path) -> FileReport {
        let start = Instant::now();
        let result = self.convert_file(pdf_path);
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(outcome) => FileReport::succeeded(pdf_path.to_path_buf(), outcome, duration_ms),
            Err(e) => {
                error!("Error processing {}: {}", pdf_path.display(), e);
                FileReport::failed(pdf_path.to_path_buf(), e, duration_ms)
            }
        }
    }

    /// Convert every path in order and report the aggregate result.
    pub fn convert_batch(&self, paths: &[PathBuf]) -> BatchReport {
        let start = Instant::now();
        let total = paths.len();
        info!("Found {} PDF files to process", total);

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_batch_start(total);
        }

        let mut files = Vec::with_capacity(total);
        let mut successful = 0;
        for (i, path) in paths.iter().enumerate() {
            info!("[{}/{}] Processing: {}", i + 1, total, path.display());
            if let Some(ref cb) = self.config.progress_callback {
                cb.on_file_start(i + 1, total, path);
            }

            let report = self.run_file(path);
            if report.success {
                successful += 1;
            }

            if let Some(ref cb) = self.config.progress_callback {
                cb.on_file_complete(i + 1, total, &report);
            }
            files.push(report);
        }

        let report = BatchReport {
            total,
            successful,
            failed: total - successful,
            elapsed_ms: start.elapsed().as_millis() as u64,
            files,
        };
        info!("{}", report.summary_line());

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_batch_complete(&report);
        }
        report
    }
}

/// Discover PDFs from CLI-style inputs and convert them with pdfium + `ocrs`.
pub fn convert_inputs<S: AsRef<str>>(
    inputs: &[S],
    recursive: bool,
    config: ConversionConfig,
) -> BatchReport {
    let paths = discover_pdfs(inputs, recursive);
    Converter::new(config).convert_batch(&paths)
}

/// Where the Markdown for `pdf_path` goes.
///
/// `<output_dir>/<stem>.md` when an output directory is given, otherwise
/// `<pdf_dir>/markdown/<stem>.md`.
pub fn output_path_for(pdf_path: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "output".into());
    let mut file_name = stem;
    file_name.push(".md");

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => pdf_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(DEFAULT_OUTPUT_SUBDIR)
            .join(file_name),
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), OcrMdError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| OcrMdError::OutputDirFailed {
                path: parent.to_path_buf(),
                source: e,
            }),
        _ => Ok(()),
    }
}

/// Write to a sibling temp file, then rename over the target.
fn write_atomic(path: &Path, contents: &str) -> Result<(), OcrMdError> {
    let tmp_path = path.with_extension("md.tmp");
    std::fs::write(&tmp_path, contents).map_err(|e| OcrMdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        OcrMdError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

/// Format document metadata as YAML front matter.
fn format_yaml_front_matter(meta: &DocumentMetadata) -> String {
    let mut yaml = String::from("---\n");

    let fields = [
        ("title", &meta.title),
        ("author", &meta.author),
        ("subject", &meta.subject),
        ("creator", &meta.creator),
        ("producer", &meta.producer),
    ];
    for (key, value) in fields {
        if let Some(v) = value {
            yaml.push_str(&format!("{}: \"{}\"\n", key, yaml_escape(v)));
        }
    }
    yaml.push_str(&format!("pages: {}\n", meta.page_count));
    if !meta.pdf_version.is_empty() {
        yaml.push_str(&format!("pdf_version: \"{}\"\n", yaml_escape(&meta.pdf_version)));
    }

    yaml.push_str("---\n\n");
    yaml
}

fn yaml_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
