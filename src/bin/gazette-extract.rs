//! CLI binary for gazette-extract.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig`, runs one batch and prints a summary.

use anyhow::{Context, Result};
use clap::Parser;
use gazette_extract::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use gazette_extract::pipeline::{discover, render};
use gazette_extract::{
    render_output, run, BatchProgressCallback, BatchRunner, BatchStats, ExtractionConfig,
    ExtractionResult, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};
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
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the batch plus a start/finish line
/// per document.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Wall-clock start of the document currently being processed.
    started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Looking for PDFs…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_no_documents(&self, directory: &Path) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} No PDF files found in {}",
            cyan("⚠"),
            directory.display()
        );
    }

    fn on_batch_start(&self, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Extracting");
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Found {total} PDF files to process"))
        ));
    }

    fn on_document_start(&self, _index: usize, _total: usize, filename: &str) {
        if let Ok(mut started) = self.started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(filename.to_string());
        self.bar.println(format!("  {} Processing {filename}...", dim("…")));
    }

    fn on_document_complete(&self, _index: usize, _total: usize, result: &ExtractionResult) {
        let secs = dim(&format!("{:.1}s", self.elapsed_secs()));
        match result.error() {
            None => self.bar.println(format!(
                "  {} Completed processing {}  {}  {}",
                green("✓"),
                result.filename,
                dim(&format!("{} page(s)", result.page_count)),
                secs,
            )),
            Some(e) => {
                let msg = truncate(&e.to_string(), 80);
                self.bar.println(format!(
                    "  {} Completed processing {}  {}  {}",
                    red("✗"),
                    result.filename,
                    red(&msg),
                    secs,
                ));
            }
        }
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, stats: &BatchStats) {
        self.bar.finish_and_clear();
        if stats.failed == 0 {
            eprintln!(
                "{} {} documents extracted successfully",
                green("✔"),
                bold(&stats.succeeded.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} documents extracted  ({} failed)",
                if stats.failed == stats.total {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&stats.succeeded.to_string()),
                stats.total,
                red(&stats.failed.to_string()),
            );
        }
    }
}

/// Shorten long error messages on a char boundary to keep output tidy.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let head: String = s.chars().take(max_chars - 1).collect();
        format!("{head}\u{2026}")
    } else {
        s.to_string()
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract every PDF in a directory (writes <dir>/extracted_gazette_info.json)
  gazette-extract ./BE_GAZETTE_PDFS

  # Choose the output file
  gazette-extract ./BE_GAZETTE_PDFS -o results.json

  # Print results to stdout instead of writing a file
  gazette-extract --stdout ./BE_GAZETTE_PDFS > results.json

  # List PDFs and page counts (no API key needed)
  gazette-extract --list-only ./BE_GAZETTE_PDFS

OUTPUT:
  {"results": [
    {"filename": "a.pdf", "extracted_data": {"original": {...}, "english": {...}}},
    {"filename": "b.pdf", "status": "error", "error": "Failed to parse JSON response", "raw_response": "..."}
  ]}

  Documents that fail are recorded as errors; the run still exits 0.

ENVIRONMENT VARIABLES:
  ANTHROPIC_API_KEY       Anthropic API key
  ANTHROPIC_BASE_URL      Override the API endpoint
  GAZETTE_INPUT_DIR       Input directory
  GAZETTE_OUTPUT          Output file
  GAZETTE_MODEL           Model ID
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Log filter, e.g. gazette_extract=debug
"#;

/// Extract bilingual company records from Belgian Official Gazette PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "gazette-extract",
    version,
    about = "Extract bilingual company records from Belgian Official Gazette PDFs using a vision LLM",
    long_about = "Render every page of each PDF in a directory, send the pages of each document \
to an Anthropic vision model in a single request, and collect the model's JSON replies \
(original language + English) into one results file.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the gazette PDFs (not searched recursively).
    #[arg(env = "GAZETTE_INPUT_DIR", default_value = ".")]
    input_dir: PathBuf,

    /// Output JSON file. Default: <INPUT_DIR>/extracted_gazette_info.json.
    #[arg(short, long, env = "GAZETTE_OUTPUT")]
    output: Option<PathBuf>,

    /// Anthropic API key.
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model ID.
    #[arg(long, env = "GAZETTE_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Max output tokens per document.
    #[arg(long, env = "GAZETTE_MAX_TOKENS", default_value_t = 1024)]
    max_tokens: usize,

    /// API base URL.
    #[arg(long, env = "ANTHROPIC_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds (default: no explicit timeout).
    #[arg(long, env = "GAZETTE_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// Page render scale factor (0.5–4.0).
    #[arg(long, env = "GAZETTE_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// JPEG quality for page images (1–100).
    #[arg(long, env = "GAZETTE_JPEG_QUALITY", default_value_t = 95,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Path to a text file replacing the built-in extraction instruction.
    #[arg(long, env = "GAZETTE_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    /// Path to libpdfium (file or directory).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// List PDFs and their page counts only; no model calls.
    #[arg(long)]
    list_only: bool,

    /// Print the results JSON to stdout instead of writing the output file.
    #[arg(long)]
    stdout: bool,

    /// Disable progress bar.
    #[arg(long, env = "GAZETTE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "GAZETTE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "GAZETTE_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar already prints the per-document lines.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.list_only;
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

    // ── List-only mode ───────────────────────────────────────────────────
    if cli.list_only {
        return list_pdfs(&cli.input_dir, cli.pdfium_lib.as_deref());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as ProgressCallback)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb).await?;

    // ── Run batch ────────────────────────────────────────────────────────
    if cli.stdout {
        let runner = BatchRunner::from_config(&config).context("Failed to set up extraction")?;
        let results = runner
            .process_directory(&config.input_directory)
            .await
            .context("Extraction failed")?;
        let json = render_output(&results).context("Failed to serialise results")?;
        io::stdout()
            .lock()
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?;
        return Ok(());
    }

    let report = run(&config).await.context("Extraction failed")?;

    if !cli.quiet {
        if let Some(ref path) = report.output_path {
            eprintln!(
                "{}  {}/{} documents  →  {}",
                if report.stats.failed == 0 {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                report.stats.succeeded,
                report.stats.total,
                bold(&path.display().to_string()),
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .input_directory(&cli.input_dir)
        .model(&cli.model)
        .max_tokens(cli.max_tokens)
        .base_url(&cli.base_url)
        .render_scale(cli.scale)
        .jpeg_quality(cli.jpeg_quality);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref output) = cli.output {
        builder = builder.output_path(output);
    }
    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }
    if let Some(ref path) = cli.prompt_file {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt from {:?}", path))?;
        builder = builder.prompt(prompt);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(lib);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Print each PDF in `dir` with its page count.
fn list_pdfs(dir: &Path, pdfium_lib: Option<&Path>) -> Result<()> {
    let pdfs = discover::discover_pdfs(dir).context("Failed to scan input directory")?;
    if pdfs.is_empty() {
        println!("No PDF files found in {}", dir.display());
        return Ok(());
    }

    println!("Found {} PDF files in {}", pdfs.len(), dir.display());
    for path in &pdfs {
        let name = discover::file_name_of(path);
        match render::page_count(path, pdfium_lib) {
            Ok(n) => println!("  {name:<48} {n:>4} page(s)"),
            Err(e) => println!("  {name:<48} {}", red(&truncate(&e.to_string(), 80))),
        }
    }
    Ok(())
}
