//! Input validation: make sure a path is a readable PDF before pdfium sees it.
//!
//! We check the `%PDF` magic bytes up front so callers get a meaningful error
//! rather than an opaque pdfium load failure. PDF readers tolerate junk
//! before the header, so the marker is searched for in the first kilobyte.

use crate::error::OcrMdError;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// How far into the file the `%PDF` header may start.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Validate that `path` exists, is readable, and carries a PDF header.
pub fn validate_pdf(path: &Path) -> Result<(), OcrMdError> {
    if !path.exists() {
        return Err(OcrMdError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(OcrMdError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(OcrMdError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let mut head = Vec::with_capacity(HEADER_SEARCH_WINDOW);
    file.by_ref()
        .take(HEADER_SEARCH_WINDOW as u64)
        .read_to_end(&mut head)
        .map_err(|e| OcrMdError::CorruptPdf {
            path: path.to_path_buf(),
            detail: format!("could not read header: {e}"),
        })?;

    if !has_pdf_header(&head) {
        let mut magic = [0u8; 4];
        let n = head.len().min(4);
        magic[..n].copy_from_slice(&head[..n]);
        return Err(OcrMdError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }

    debug!("Validated PDF: {}", path.display());
    Ok(())
}

fn has_pdf_header(head: &[u8]) -> bool {
    head.windows(4).any(|w| w == b"%PDF")
}
