//! Pipeline stages for PDF-to-Markdown conversion.
//!
//! Each submodule implements one step. The converter in [`crate::convert`]
//! chooses between the two extraction paths; the stages themselves know
//! nothing about the fallback policy.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌──▶ extract ──────────────────┐
//! input ──▶ document                        ├──▶ postprocess ──▶ .md
//!            └──▶ render ──▶ ocr ───────────┘
//! (validate)  (pdfium)     (ocrs)
//! ```
//!
//! 1. [`input`]   : check the path is a readable PDF
//! 2. [`document`]: open it through the [`document::PdfBackend`] seam
//! 3. [`extract`] : text layer → Markdown with detected headings
//! 4. [`render`]  : rasterise a page to RGB at the OCR scale
//! 5. [`ocr`]     : recognise each rendered page, `# Page N` sections
//! 6. [`postprocess`]: deterministic text cleanup shared by both paths

pub mod document;
pub mod extract;
pub mod input;
pub mod ocr;
pub mod postprocess;
pub mod render;
