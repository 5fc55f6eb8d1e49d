//! # ocrmd
//!
//! Batch-convert PDF files to Markdown, falling back to OCR for scanned
//! documents.
//!
//! ## Pipeline Overview
//!
//! ```text
//! inputs (files, dirs, globs)
//!  │
//!  ├─ 1. Discover  expand, dedupe, sort
//!  ├─ 2. Skip      output already exists (unless overwrite)
//!  ├─ 3. Extract   pdfium text layer → Markdown with headings
//!  ├─ 4. OCR       only if 3 and page 1 are empty, or forced
//!  ├─ 5. Polish    whitespace / invisible-char cleanup
//!  └─ 6. Write     <output_dir>/<stem>.md, atomically
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ocrmd::{discover_pdfs, ConversionConfig, Converter};
//!
//! let config = ConversionConfig::builder()
//!     .output_dir("markdown")
//!     .max_pages(20)
//!     .build()?;
//! let files = discover_pdfs(&["scans/", "reports/*.pdf"], false);
//! let report = Converter::new(config).convert_batch(&files);
//! eprintln!("{}", report.summary_line());
//! # Ok::<(), ocrmd::OcrMdError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ocrmd` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! ## Runtime Requirements
//!
//! * A pdfium shared library, found via `--pdfium-lib`, `PDFIUM_LIB_PATH`,
//!   the working directory, or the system library path.
//! * For OCR, the `ocrs` detection and recognition models (see
//!   [`pipeline::ocr`]). They are loaded only when a file needs OCR.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod discover;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, PageSeparator};
pub use convert::{convert_inputs, output_path_for, Converter};
pub use discover::discover_pdfs;
pub use error::OcrMdError;
pub use output::{BatchReport, ConversionOutcome, DocumentMetadata, ExtractionMethod, FileReport};
pub use pipeline::document::{PdfBackend, PdfDocumentHandle, PdfiumBackend, TextRun};
pub use pipeline::ocr::{LazyOcrsRecognizer, OcrModelPaths, TextRecognizer};
pub use pipeline::render::RenderOptions;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
