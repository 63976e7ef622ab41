//! Single-document extraction.
//!
//! [`Extractor::extract_document`] is the unit of work of a batch: render the
//! PDF, send every page plus the instruction in one request, parse the reply.
//! It always returns an [`ExtractionResult`]; every failure along the way is
//! folded into the result's [`crate::error::DocumentError`] so the caller can
//! keep going.

use crate::anthropic::AnthropicClient;
use crate::config::ExtractionConfig;
use crate::error::GazetteError;
use crate::model::VisionModel;
use crate::output::ExtractionResult;
use crate::pipeline::render::{self, PageRenderer, PdfiumRenderer};
use crate::pipeline::{discover, llm, parse};
use crate::prompts;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Renders, prompts and parses one document at a time.
///
/// Holds no per-document state; one instance is reused read-only for a whole
/// batch.
#[derive(Clone)]
pub struct Extractor {
    renderer: Arc<dyn PageRenderer>,
    model: Arc<dyn VisionModel>,
    instruction: String,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("model", &self.model.name())
            .field("instruction_len", &self.instruction.len())
            .finish_non_exhaustive()
    }
}

impl Extractor {
    /// Assemble an extractor from explicit parts.
    ///
    /// The instruction is taken from `config` (override or built-in default).
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        model: Arc<dyn VisionModel>,
        config: &ExtractionConfig,
    ) -> Self {
        Self {
            renderer,
            model,
            instruction: prompts::extraction_prompt(config).to_string(),
        }
    }

    /// Build the production extractor: pdfium renderer plus the configured model.
    ///
    /// A pre-built [`ExtractionConfig::provider`] takes precedence; otherwise
    /// an [`AnthropicClient`] is created from the API key.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, GazetteError> {
        let model = resolve_model(config)?;
        let renderer: Arc<dyn PageRenderer> = Arc::new(PdfiumRenderer::from_config(config));
        Ok(Self::new(renderer, model, config))
    }

    /// The model this extractor talks to.
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Extract one PDF. Never fails: errors become error records.
    pub async fn extract_document(&self, pdf_path: &Path) -> ExtractionResult {
        let start = Instant::now();
        let filename = discover::file_name_of(pdf_path);

        // ── Step 1: Render ───────────────────────────────────────────────────
        let rendered =
            render::render_document(Arc::clone(&self.renderer), pdf_path.to_path_buf()).await;
        let pages = match rendered {
            Ok(pages) => pages,
            Err(e) => {
                warn!("{}: rendering failed: {}", filename, e);
                return ExtractionResult::failed(filename, 0, e.into());
            }
        };
        let page_count = pages.len();

        // ── Step 2: Compose and send ─────────────────────────────────────────
        let content = llm::build_content(pages, &self.instruction);
        let reply = match llm::request_extraction(self.model.as_ref(), &content).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("{}: model call failed: {}", filename, e);
                return ExtractionResult::failed(filename, page_count, e.into());
            }
        };
        drop(content);

        // ── Step 3: Parse ────────────────────────────────────────────────────
        match parse::interpret_reply(&reply) {
            Ok(data) => {
                info!(
                    "{}: extracted from {} page(s) in {:?}",
                    filename,
                    page_count,
                    start.elapsed()
                );
                ExtractionResult::success(filename, page_count, data)
            }
            Err(e) => {
                warn!("{}: {}", filename, e);
                ExtractionResult::failed(filename, page_count, e)
            }
        }
    }
}

/// Pick the model client: pre-built provider first, then Anthropic by API key.
fn resolve_model(config: &ExtractionConfig) -> Result<Arc<dyn VisionModel>, GazetteError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }
    Ok(Arc::new(AnthropicClient::from_config(config)?))
}
