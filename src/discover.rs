//! File discovery: expand CLI inputs into the list of PDFs to convert.
//!
//! Each input is a file, a directory, or a glob pattern. Paths that don't
//! exist are passed through untouched so the converter can report them as a
//! per-file failure instead of silently dropping them.

use glob::{glob_with, MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Expand `inputs` into a deduplicated, lexicographically sorted list of PDF paths.
///
/// * directory → its `*.pdf` files (all nested ones when `recursive`)
/// * existing `.pdf` file → itself
/// * pattern containing `*` or `?` → its matching `.pdf` files
/// * nonexistent path → itself, left for the converter to reject
pub fn discover_pdfs<S: AsRef<str>>(inputs: &[S], recursive: bool) -> Vec<PathBuf> {
    let mut found = BTreeSet::new();

    for input in inputs {
        let input = input.as_ref();
        let path = Path::new(input);

        if path.is_dir() {
            let escaped = PathBuf::from(Pattern::escape(input));
            let pattern = if recursive {
                escaped.join("**").join("*.pdf")
            } else {
                escaped.join("*.pdf")
            };
            expand_pattern(&pattern.to_string_lossy(), &mut found);
        } else if path.is_file() {
            if has_pdf_extension(path) {
                found.insert(path.to_path_buf());
            } else {
                warn!("Skipping non-PDF file: {}", path.display());
            }
        } else if has_wildcard(input) {
            expand_pattern(input, &mut found);
        } else {
            found.insert(path.to_path_buf());
        }
    }

    debug!("Discovered {} candidate PDFs", found.len());
    found.into_iter().collect()
}

/// Whether the string should be expanded as a glob.
///
/// Only `*` and `?` count. A literal name like `report[1].pdf` is a path, so a
/// missing one still reaches the converter and is reported.
pub fn has_wildcard(input: &str) -> bool {
    input.contains(['*', '?'])
}

/// Whether the path ends in `.pdf`, ignoring case.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Add the PDFs matching `pattern` to `found`; returns how many matched.
fn expand_pattern(pattern: &str, found: &mut BTreeSet<PathBuf>) -> usize {
    let entries = match glob_with(pattern, MATCH_OPTIONS) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Invalid glob pattern '{}': {}", pattern, e);
            return 0;
        }
    };

    let mut matched = 0;
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() && has_pdf_extension(&path) => {
                found.insert(path);
                matched += 1;
            }
            Ok(path) => debug!("Ignoring non-PDF match: {}", path.display()),
            Err(e) => warn!("Failed to read glob entry: {}", e),
        }
    }

    if matched == 0 {
        warn!("No PDFs matched '{}'", pattern);
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"%PDF-1.4\n").unwrap();
    }

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.pdf"));
        touch(&dir.path().join("B.PDF"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("sub/c.pdf"));
        touch(&dir.path().join("sub/deeper/d.pdf"));
        dir
    }

    fn names(paths: &[PathBuf], root: &Path) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn directory_is_flat_without_recursion() {
        let dir = tree();
        let root = dir.path().to_string_lossy().to_string();
        let found = discover_pdfs(&[root], false);
        assert_eq!(names(&found, dir.path()), vec!["B.PDF", "a.pdf"]);
    }

    #[test]
    fn directory_recurses_when_asked() {
        let dir = tree();
        let root = dir.path().to_string_lossy().to_string();
        let found = discover_pdfs(&[root], true);
        assert_eq!(
            names(&found, dir.path()),
            vec!["B.PDF", "a.pdf", "sub/c.pdf", "sub/deeper/d.pdf"]
        );
    }

    #[test]
    fn duplicates_collapse() {
        let dir = tree();
        let root = dir.path().to_string_lossy().to_string();
        let file = dir.path().join("a.pdf").to_string_lossy().to_string();
        let found = discover_pdfs(&[file.clone(), root, file], false);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn glob_pattern_keeps_only_pdfs() {
        let dir = tree();
        let pattern = dir.path().join("*").to_string_lossy().to_string();
        let found = discover_pdfs(&[pattern], false);
        assert_eq!(names(&found, dir.path()), vec!["B.PDF", "a.pdf"]);
    }

    #[test]
    fn missing_path_passes_through() {
        let found = discover_pdfs(&["/definitely/not/here.pdf"], false);
        assert_eq!(found, vec![PathBuf::from("/definitely/not/here.pdf")]);
    }

    #[test]
    fn missing_bracketed_path_passes_through() {
        let found = discover_pdfs(
            &["/definitely/not/here[1].pdf", "/definitely/not/here.pdf"],
            false,
        );
        assert_eq!(
            found,
            vec![
                PathBuf::from("/definitely/not/here.pdf"),
                PathBuf::from("/definitely/not/here[1].pdf"),
            ]
        );
    }

    #[test]
    fn existing_bracketed_file_is_kept() {
        let dir = tree();
        let file = dir.path().join("scan[2].pdf");
        touch(&file);
        let found = discover_pdfs(&[file.to_string_lossy().to_string()], false);
        assert_eq!(found, vec![file]);
    }

    #[test]
    fn unmatched_pattern_counts_zero() {
        let dir = tree();
        let mut found = BTreeSet::new();
        let pattern = dir.path().join("*.docx").to_string_lossy().to_string();
        assert_eq!(expand_pattern(&pattern, &mut found), 0);
        assert!(found.is_empty());

        let pattern = dir.path().join("*.pdf").to_string_lossy().to_string();
        assert_eq!(expand_pattern(&pattern, &mut found), 2);
    }

    #[test]
    fn non_pdf_file_is_skipped() {
        let dir = tree();
        let txt = dir.path().join("notes.txt").to_string_lossy().to_string();
        assert!(discover_pdfs(&[txt], false).is_empty());
    }

    #[test]
    fn wildcard_detection() {
        assert!(has_wildcard("docs/*.pdf"));
        assert!(has_wildcard("scan-?.pdf"));
        assert!(!has_wildcard("scan-[12].pdf"));
        assert!(!has_wildcard("docs/report.pdf"));
    }

    #[test]
    fn pdf_extension_ignores_case() {
        assert!(has_pdf_extension(Path::new("x.PDF")));
        assert!(has_pdf_extension(Path::new("dir/x.pdf")));
        assert!(!has_pdf_extension(Path::new("x.pdf.txt")));
        assert!(!has_pdf_extension(Path::new("pdf")));
    }
}
