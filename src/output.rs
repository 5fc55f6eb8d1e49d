//! Result types: per-file outcomes and the batch report.
//!
//! Everything here is `Serialize + Deserialize` so the CLI can emit the whole
//! batch as JSON with `--json`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which tier of the fallback policy produced the Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Structured extraction from the PDF text layer.
    Markdown,
    /// Page rasterisation followed by OCR.
    Ocr,
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionMethod::Markdown => f.write_str("markdown"),
            ExtractionMethod::Ocr => f.write_str("ocr"),
        }
    }
}

/// What happened to a file that converted successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversionOutcome {
    /// Markdown was produced and written.
    Written {
        output_path: PathBuf,
        method: ExtractionMethod,
        /// Pages in the document.
        total_pages: usize,
        /// Pages that went through OCR (0 for markdown extraction).
        ocr_pages: usize,
        /// Characters written.
        chars: usize,
    },
    /// The output already existed and skip-existing was on.
    SkippedExisting { output_path: PathBuf },
}

impl ConversionOutcome {
    /// The Markdown file this outcome refers to.
    pub fn output_path(&self) -> &Path {
        match self {
            ConversionOutcome::Written { output_path, .. } => output_path,
            ConversionOutcome::SkippedExisting { output_path } => output_path,
        }
    }
}

/// Result of one file in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// Input path as discovered.
    pub path: PathBuf,
    /// `true` when the file was written or skipped as already converted.
    pub success: bool,
    /// Present on success.
    pub outcome: Option<ConversionOutcome>,
    /// Human-readable error, present on failure.
    pub error: Option<String>,
    /// Wall-clock time spent on this file.
    pub duration_ms: u64,
}

impl FileReport {
    pub fn succeeded(path: PathBuf, outcome: ConversionOutcome, duration_ms: u64) -> Self {
        Self {
            path,
            success: true,
            outcome: Some(outcome),
            error: None,
            duration_ms,
        }
    }

    pub fn failed(path: PathBuf, error: impl ToString, duration_ms: u64) -> Self {
        Self {
            path,
            success: false,
            outcome: None,
            error: Some(error.to_string()),
            duration_ms,
        }
    }
}

/// Aggregate result of a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Files attempted.
    pub total: usize,
    /// Files written or skipped.
    pub successful: usize,
    /// Files that failed.
    pub failed: usize,
    /// Wall-clock time for the whole batch.
    pub elapsed_ms: u64,
    /// Per-file results, in processing order.
    pub files: Vec<FileReport>,
}

impl BatchReport {
    /// The one-line summary printed at the end of a run.
    pub fn summary_line(&self) -> String {
        format!(
            "Processed {}/{} files successfully in {:.2} seconds",
            self.successful,
            self.total,
            self.elapsed_ms as f64 / 1000.0
        )
    }
}

/// Document-level metadata read from the PDF info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_line_format() {
        let report = BatchReport {
            total: 4,
            successful: 3,
            failed: 1,
            elapsed_ms: 1234,
            files: vec![],
        };
        assert_eq!(
            report.summary_line(),
            "Processed 3/4 files successfully in 1.23 seconds"
        );
    }

    #[test]
    fn outcome_serialises_with_kind_tag() {
        let outcome = ConversionOutcome::SkippedExisting {
            output_path: PathBuf::from("markdown/a.md"),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"kind\":\"skipped_existing\""), "got: {json}");
    }

    #[test]
    fn failed_report_has_no_outcome() {
        let r = FileReport::failed(PathBuf::from("x.pdf"), "nope", 5);
        assert!(!r.success);
        assert!(r.outcome.is_none());
        assert_eq!(r.error.as_deref(), Some("nope"));
    }

    #[test]
    fn method_display() {
        assert_eq!(ExtractionMethod::Ocr.to_string(), "ocr");
        assert_eq!(ExtractionMethod::Markdown.to_string(), "markdown");
    }
}
