//! Structured markdown extraction from the PDF text layer.
//!
//! pdfium gives us each page's text in reading order plus the text objects it
//! was drawn from. We turn that into Markdown with two cheap heuristics:
//!
//! * **Headings by font size.** The size that carries the most characters is
//!   the body size. Larger sizes become heading levels, biggest first, up to
//!   `######`. A line becomes a heading when it matches a text object drawn
//!   at one of those sizes.
//! * **Bullets.** Lines starting with a bullet glyph become `- ` list items.
//!
//! Blank pages are dropped and the rest joined with the configured
//! [`PageSeparator`], then run through [`postprocess::clean_markdown`].

use crate::config::PageSeparator;
use crate::error::OcrMdError;
use crate::pipeline::document::{PdfDocumentHandle, TextRun};
use crate::pipeline::postprocess;
use std::collections::HashMap;
use tracing::debug;

/// Glyphs PDF producers use for list bullets.
const BULLETS: &[char] = &['•', '◦', '▪', '‣', '●', '○', '■', '–', '\u{f0b7}'];

/// Sizes closer than this to the body size are body text.
const MIN_HEADING_DELTA: f32 = 1.0;

/// Longest line (in chars) still considered a heading candidate.
const MAX_HEADING_CHARS: usize = 120;

/// Extract the whole document as Markdown.
///
/// Returns an empty string when no page has any text.
pub fn document_to_markdown(
    doc: &dyn PdfDocumentHandle,
    separator: &PageSeparator,
) -> Result<String, OcrMdError> {
    let page_count = doc.page_count();
    let mut texts = Vec::with_capacity(page_count);
    let mut runs = Vec::new();

    for index in 0..page_count {
        texts.push(doc.page_text(index)?);
        runs.extend(doc.text_runs(index)?);
    }

    let headings = HeadingMap::from_runs(&runs);
    debug!(
        "Heading detection: body size {:?}, {} heading lines",
        headings.body_size,
        headings.by_text.len()
    );

    let mut out = String::new();
    let mut emitted = 0usize;
    for (index, text) in texts.iter().enumerate() {
        let page = format_page(text, &headings);
        if page.trim().is_empty() {
            continue;
        }
        if emitted > 0 {
            out.push_str(&separator.render(index + 1));
        }
        out.push_str(&page);
        emitted += 1;
    }

    Ok(postprocess::clean_markdown(&out))
}

/// Maps heading text to its Markdown level (1–6).
#[derive(Debug, Default)]
pub struct HeadingMap {
    body_size: Option<f32>,
    by_text: HashMap<String, usize>,
}

impl HeadingMap {
    /// Build the map from every text run in the document.
    pub fn from_runs(runs: &[TextRun]) -> Self {
        let mut weight: HashMap<u32, usize> = HashMap::new();
        for run in runs {
            let chars = run.text.chars().filter(|c| !c.is_whitespace()).count();
            if chars > 0 && run.font_size > 0.0 {
                *weight.entry(size_key(run.font_size)).or_default() += chars;
            }
        }

        // Ties go to the smaller size so a single large title can't become body text.
        let Some(body_key) = weight
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(k, _)| *k)
        else {
            return Self::default();
        };
        let body_size = key_size(body_key);

        let mut larger: Vec<u32> = weight
            .keys()
            .copied()
            .filter(|k| key_size(*k) - body_size >= MIN_HEADING_DELTA)
            .collect();
        larger.sort_unstable_by(|a, b| b.cmp(a));
        larger.truncate(6);

        let levels: HashMap<u32, usize> = larger
            .iter()
            .enumerate()
            .map(|(i, k)| (*k, i + 1))
            .collect();

        let mut by_text = HashMap::new();
        for run in runs {
            let Some(&level) = levels.get(&size_key(run.font_size)) else {
                continue;
            };
            let text = normalise_line(&run.text);
            if text.is_empty() || text.chars().count() > MAX_HEADING_CHARS {
                continue;
            }
            by_text
                .entry(text)
                .and_modify(|l: &mut usize| *l = (*l).min(level))
                .or_insert(level);
        }

        Self {
            body_size: Some(body_size),
            by_text,
        }
    }

    /// Heading level for a line of page text, if it is a heading.
    pub fn level_of(&self, line: &str) -> Option<usize> {
        self.by_text.get(&normalise_line(line)).copied()
    }
}

/// Format one page's text as Markdown lines.
pub fn format_page(text: &str, headings: &HeadingMap) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            lines.push(String::new());
            continue;
        }

        if let Some(level) = headings.level_of(line) {
            lines.push(format!("{} {}", "#".repeat(level), line));
        } else if let Some(item) = strip_bullet(line) {
            lines.push(format!("- {item}"));
        } else {
            lines.push(raw.trim_end().to_string());
        }
    }

    lines.join("\n")
}

fn strip_bullet(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(BULLETS)?;
    let rest = rest.trim_start();
    if rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}

/// Collapse internal whitespace so object text and page text compare equal.
fn normalise_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Font sizes bucketed to half a point.
fn size_key(size: f32) -> u32 {
    (size * 2.0).round() as u32
}

fn key_size(key: u32) -> f32 {
    key as f32 / 2.0
}
