//! CLI binary for ocrmd.
//!
//! Maps flags to `ConversionConfig`, expands the inputs, runs the batch and
//! prints the summary. Per-file failures are reported but never change the
//! exit status.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ocrmd::{
    discover_pdfs, BatchReport, ConversionConfig, ConversionOutcome, ConversionProgressCallback,
    Converter, FileReport, PageSeparator, ProgressCallback,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One bar over the file list; the message shows OCR page progress.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Scanning");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} files  \
                 ⏱ {elapsed_precise}  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        self.bar.set_length(total_files as u64);
        self.bar.set_prefix("Converting");
    }

    fn on_file_start(&self, _index: usize, _total: usize, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(name);
    }

    fn on_ocr_page(&self, page_num: usize, total_pages: usize) {
        self.bar.set_message(format!("OCR page {page_num}/{total_pages}"));
    }

    fn on_file_complete(&self, index: usize, total: usize, report: &FileReport) {
        let line = match (&report.outcome, &report.error) {
            (Some(ConversionOutcome::Written { method, .. }), _) => format!(
                "  {} [{index}/{total}] {}  {}",
                green("✓"),
                report.path.display(),
                dim(&format!("{method}, {:.1}s", report.duration_ms as f64 / 1000.0)),
            ),
            (Some(ConversionOutcome::SkippedExisting { .. }), _) => format!(
                "  {} [{index}/{total}] {}  {}",
                cyan("↷"),
                report.path.display(),
                dim("exists, skipped"),
            ),
            (None, err) => format!(
                "  {} [{index}/{total}] {}  {}",
                red("✗"),
                report.path.display(),
                red(err.as_deref().unwrap_or("failed").lines().next().unwrap_or("")),
            ),
        };
        self.bar.println(line);
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _report: &BatchReport) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Every PDF in a directory, output next to each file in markdown/
  ocrmd scans/

  # Recursive, into one flat output directory
  ocrmd -r archive/ -o out/

  # Globs and files mix freely; duplicates are processed once
  ocrmd "reports/*.pdf" reports/annual.pdf

  # Scanned book: OCR the first 20 pages only
  ocrmd --force-ocr -m 20 book.pdf

  # Regenerate outputs that already exist
  ocrmd --overwrite docs/

OCR MODELS:
  OCR uses the ocrs engine. Download text-detection.rten and
  text-recognition.rten from https://github.com/robertknight/ocrs-models
  into ~/.cache/ocrs (or pass --ocr-models <dir>). They are only loaded
  when a document needs OCR.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory)
  OCRMD_*           Every flag, e.g. OCRMD_OUTPUT_DIR, OCRMD_MAX_PAGES
  RUST_LOG          Override the log filter
"#;

/// Batch-convert PDF files to Markdown, with OCR fallback for scans.
#[derive(Parser, Debug)]
#[command(
    name = "ocrmd",
    version,
    about = "Batch-convert PDF files to Markdown, with OCR fallback for scanned documents",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF files, directories, or glob patterns.
    #[arg(required = true, num_args = 1..)]
    input: Vec<String>,

    /// Write every output to this directory (default: <pdf_dir>/markdown/).
    #[arg(short, long, env = "OCRMD_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// OCR at most this many pages per document.
    #[arg(short, long, env = "OCRMD_MAX_PAGES",
          value_parser = clap::value_parser!(u64).range(1..))]
    max_pages: Option<u64>,

    /// Skip markdown extraction and always OCR.
    #[arg(long, env = "OCRMD_FORCE_OCR")]
    force_ocr: bool,

    /// Recurse into subdirectories.
    #[arg(short, long, env = "OCRMD_RECURSIVE")]
    recursive: bool,

    /// Regenerate outputs that already exist.
    #[arg(long, env = "OCRMD_OVERWRITE")]
    overwrite: bool,

    /// Raster zoom factor for OCR (0.5–8.0).
    #[arg(long, env = "OCRMD_OCR_SCALE", default_value_t = 2.0, value_parser = parse_scale)]
    ocr_scale: f32,

    /// Page separator for extracted text: none, hr, comment, or custom text.
    #[arg(long, env = "OCRMD_SEPARATOR", default_value = "hr")]
    separator: String,

    /// Prepend YAML front-matter with document metadata.
    #[arg(long, env = "OCRMD_METADATA")]
    metadata: bool,

    /// User password for encrypted PDFs.
    #[arg(long, env = "OCRMD_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Directory holding the ocrs detection and recognition models.
    #[arg(long, env = "OCRMD_OCR_MODELS")]
    ocr_models: Option<PathBuf>,

    /// Path to libpdfium (file or directory).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print the batch report as JSON on stdout.
    #[arg(long, env = "OCRMD_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "OCRMD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OCRMD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the summary.
    #[arg(short, long, env = "OCRMD_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO logs would interleave with the bar, so only errors while it shows.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.verbose;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Discover inputs ──────────────────────────────────────────────────
    let files = discover_pdfs(&cli.input, cli.recursive);
    if files.is_empty() {
        eprintln!("No PDF files found!");
        return Ok(());
    }
    if !cli.quiet && !cli.json {
        eprintln!("Found {} PDF files to process", files.len());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run batch ────────────────────────────────────────────────────────
    let report = Converter::new(config).convert_batch(&files);

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    }
    eprintln!("{}", report.summary_line());

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .force_ocr(cli.force_ocr)
        .skip_existing(!cli.overwrite)
        .ocr_scale(cli.ocr_scale)
        .page_separator(parse_separator(&cli.separator))
        .include_metadata(cli.metadata);

    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(n) = cli.max_pages {
        builder = builder.max_pages(usize::try_from(n).unwrap_or(usize::MAX));
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(ref dir) = cli.ocr_models {
        builder = builder.ocr_model_dir(dir);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library(lib);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn parse_scale(s: &str) -> std::result::Result<f32, String> {
    let v: f32 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (0.5..=8.0).contains(&v) {
        Ok(v)
    } else {
        Err(format!("scale must be between 0.5 and 8.0 (got {v})"))
    }
}

/// Parse `--separator` string into `PageSeparator`.
fn parse_separator(s: &str) -> PageSeparator {
    match s.to_lowercase().as_str() {
        "none" => PageSeparator::None,
        "hr" | "---" => PageSeparator::HorizontalRule,
        "comment" => PageSeparator::Comment,
        _ => PageSeparator::Custom(s.to_string()),
    }
}
