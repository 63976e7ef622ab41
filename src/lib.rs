//! # gazette-extract
//!
//! Extract structured, bilingual company records from scanned Belgian
//! Official Gazette annexes ("Bijlagen bij het Belgisch Staatsblad - Annexes
//! du Moniteur belge") using a vision-capable LLM.
//!
//! The annexes are image-only scans in French, Dutch or German. Rather than
//! OCR them locally, this crate rasterises every page, sends all of a
//! document's pages to the model in one request together with a fixed
//! instruction, and stores the JSON the model returns: the company name,
//! registration number and purpose of the notice, once in the original
//! language and once translated to English.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input dir
//!  │
//!  ├─ 1. Discover  *.pdf, non-recursive, sorted
//!  ├─ 2. Render    every page at 2× via pdfium (spawn_blocking)
//!  ├─ 3. Encode    JPEG q95 → base64 image blocks
//!  ├─ 4. VLM       one Messages API call per document
//!  ├─ 5. Parse     first text block → JSON (or an error record)
//!  └─ 6. Output    {"results": [...]} written atomically
//! ```
//!
//! Documents are processed one at a time. A document that fails at any step
//! becomes an error record in the output; it never aborts the batch.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gazette_extract::{run, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder()
//!         .api_key(std::env::var("ANTHROPIC_API_KEY")?)
//!         .input_directory("gazette_pdfs")
//!         .build()?;
//!     let report = run(&config).await?;
//!     eprintln!(
//!         "{}/{} extracted → {:?}",
//!         report.stats.succeeded, report.stats.total, report.output_path
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `gazette-extract` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## PDFium
//!
//! Rendering needs the pdfium shared library at runtime. Point
//! `PDFIUM_LIB_PATH` at `libpdfium` (or its directory), or install it where
//! the system loader finds it.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod anthropic;
pub mod batch;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use anthropic::AnthropicClient;
pub use batch::{render_output, run, run_sync, write_output, BatchRunner};
pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::{DocumentError, GazetteError, ModelError, RenderError};
pub use extract::Extractor;
pub use model::{ContentBlock, ModelReply, ReplyBlock, Usage, VisionModel};
pub use output::{BatchOutput, BatchReport, BatchStats, ExtractionOutcome, ExtractionResult};
pub use pipeline::encode::PageImage;
pub use pipeline::render::{PageRenderer, PdfiumRenderer};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
