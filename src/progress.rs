//! Progress-callback trait for batch and OCR events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the converter walks the file list and OCRs pages. The CLI uses it
//! to drive a terminal progress bar; library callers can forward events
//! anywhere without the converter knowing how.
//!
//! # Example
//!
//! ```rust
//! use ocrmd::{ConversionConfig, ConversionProgressCallback, FileReport};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, index: usize, total: usize, report: &FileReport) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("[{index}/{total}] {} ok={}", report.path.display(), report.success);
//!     }
//! }
//!
//! let cb = Arc::new(CountingCallback { done: AtomicUsize::new(0) });
//! let config = ConversionConfig::builder()
//!     .progress_callback(cb as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::{BatchReport, FileReport};
use std::path::Path;
use std::sync::Arc;

/// Called by the converter as it processes a batch.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Indices and page numbers are 1-based.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first file.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before a file is converted.
    fn on_file_start(&self, index: usize, total_files: usize, path: &Path) {
        let _ = (index, total_files, path);
    }

    /// Called when a document falls back to OCR.
    ///
    /// # Arguments
    /// * `pages`: number of pages that will be OCR'd (after the page cap)
    fn on_ocr_start(&self, pages: usize) {
        let _ = pages;
    }

    /// Called after each OCR'd page.
    fn on_ocr_page(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after a file succeeded, was skipped, or failed.
    fn on_file_complete(&self, index: usize, total_files: usize, report: &FileReport) {
        let _ = (index, total_files, report);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, report: &BatchReport) {
        let _ = report;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
