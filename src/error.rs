//! Error type for the ocrmd library.
//!
//! Every fallible operation returns [`OcrMdError`]. Inside a batch, errors are
//! never fatal to the run: [`crate::convert::Converter::run_file`] catches the
//! error for one file, logs it, and records it in that file's
//! [`crate::output::FileReport`] before moving on to the next file.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the ocrmd library.
#[derive(Debug, Error)]
pub enum OcrMdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium could not read the text layer of a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractionFailed { page: usize, detail: String },

    /// pdfium-render returned an error while rendering a page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// An OCR model file is missing from the model directory.
    #[error(
        "OCR model not found at '{path}'\n\
Download text-detection.rten and text-recognition.rten from\n\
https://github.com/robertknight/ocrs-models and pass the directory with --ocr-models."
    )]
    OcrModelMissing { path: PathBuf },

    /// The OCR engine failed to load or to recognise a page.
    #[error("OCR failed: {0}")]
    OcrFailed(String),

    /// Neither extraction nor OCR produced any text.
    #[error("No text extracted from '{path}', not writing an empty file")]
    NoTextExtracted { path: PathBuf },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the directory that receives the Markdown file.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib).\n\
  • Place libpdfium next to the working directory.\n\
  • Install a system-wide pdfium build.\n"
    )]
    PdfiumBindingFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_display() {
        let e = OcrMdError::FileNotFound {
            path: PathBuf::from("/tmp/missing.pdf"),
        };
        assert!(e.to_string().contains("/tmp/missing.pdf"));
    }

    #[test]
    fn no_text_display_mentions_path() {
        let e = OcrMdError::NoTextExtracted {
            path: PathBuf::from("scan.pdf"),
        };
        let msg = e.to_string();
        assert!(msg.contains("scan.pdf"), "got: {msg}");
        assert!(msg.contains("empty file"), "got: {msg}");
    }

    #[test]
    fn output_write_keeps_source() {
        use std::error::Error as _;

        let e = OcrMdError::OutputWriteFailed {
            path: PathBuf::from("out/a.md"),
            source: std::io::Error::other("disk full"),
        };
        assert!(e.to_string().contains("disk full"));
        assert!(e.source().is_some());
    }

    #[test]
    fn rasterisation_display() {
        let e = OcrMdError::RasterisationFailed {
            page: 3,
            detail: "bitmap alloc".into(),
        };
        assert!(e.to_string().contains("page 3"));
    }

    #[test]
    fn model_missing_points_at_flag() {
        let e = OcrMdError::OcrModelMissing {
            path: PathBuf::from("/models/text-detection.rten"),
        };
        assert!(e.to_string().contains("--ocr-models"));
    }

    /// No wildcard arm.
    fn origin(e: &OcrMdError) -> &'static str {
        match e {
            OcrMdError::FileNotFound { .. }
            | OcrMdError::PermissionDenied { .. }
            | OcrMdError::NotAPdf { .. } => "input",
            OcrMdError::CorruptPdf { .. }
            | OcrMdError::PasswordRequired { .. }
            | OcrMdError::WrongPassword { .. }
            | OcrMdError::TextExtractionFailed { .. }
            | OcrMdError::RasterisationFailed { .. }
            | OcrMdError::PdfiumBindingFailed(_) => "pdfium",
            OcrMdError::OcrModelMissing { .. } | OcrMdError::OcrFailed(_) => "ocr",
            OcrMdError::NoTextExtracted { .. }
            | OcrMdError::OutputDirFailed { .. }
            | OcrMdError::OutputWriteFailed { .. } => "output",
            OcrMdError::InvalidConfig(_) => "config",
        }
    }

    #[test]
    fn every_variant_has_an_origin_and_message() {
        let p = || PathBuf::from("x.pdf");
        let all = vec![
            OcrMdError::FileNotFound { path: p() },
            OcrMdError::PermissionDenied { path: p() },
            OcrMdError::NotAPdf { path: p(), magic: *b"GIF8" },
            OcrMdError::CorruptPdf { path: p(), detail: "xref".into() },
            OcrMdError::PasswordRequired { path: p() },
            OcrMdError::WrongPassword { path: p() },
            OcrMdError::TextExtractionFailed { page: 1, detail: "d".into() },
            OcrMdError::RasterisationFailed { page: 1, detail: "d".into() },
            OcrMdError::PdfiumBindingFailed("missing".into()),
            OcrMdError::OcrModelMissing { path: p() },
            OcrMdError::OcrFailed("d".into()),
            OcrMdError::NoTextExtracted { path: p() },
            OcrMdError::OutputDirFailed { path: p(), source: std::io::Error::other("d") },
            OcrMdError::OutputWriteFailed { path: p(), source: std::io::Error::other("d") },
            OcrMdError::InvalidConfig("d".into()),
        ];
        assert_eq!(all.len(), 15);
        for e in &all {
            assert!(!origin(e).is_empty());
            assert!(!e.to_string().is_empty());
        }
    }
}
