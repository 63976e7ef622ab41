//! Configuration types for gazette extraction.
//!
//! All batch behaviour is controlled through [`ExtractionConfig`], built via
//! its [`ExtractionConfigBuilder`]. The config is handed to the extractor and
//! the directory walker at construction time and only ever read afterwards,
//! so nothing about a run lives in global state.
//!
//! The three options every run needs are the API key, the input directory and
//! the output path; everything else has a default matching the behaviour the
//! gazette team has been relying on (2× render, JPEG 95, 1024 output tokens).

use crate::error::GazetteError;
use crate::model::VisionModel;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default Anthropic model used for extraction.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Default Anthropic API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// File name used when no explicit output path is configured.
pub const DEFAULT_OUTPUT_FILE: &str = "extracted_gazette_info.json";

/// Configuration for one extraction batch.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`] (which has no API key and therefore only
/// works with a pre-built [`ExtractionConfig::provider`]).
///
/// # Example
/// ```rust
/// use gazette_extract::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .api_key("sk-ant-...")
///     .input_directory("/data/gazette")
///     .output_path("/data/gazette/results.json")
///     .build()
///     .unwrap();
/// assert_eq!(config.jpeg_quality, 95);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Anthropic API key. Required unless `provider` is set.
    pub api_key: Option<String>,

    /// Directory scanned (non-recursively) for `*.pdf` files. Default: `.`.
    pub input_directory: PathBuf,

    /// Where the `{"results": [...]}` document is written.
    /// If None, uses `<input_directory>/extracted_gazette_info.json`.
    pub output_path: Option<PathBuf>,

    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Maximum tokens the model may generate per document. Default: 1024.
    pub max_tokens: usize,

    /// API base URL, without the `/v1/messages` suffix. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Per-request timeout in seconds. If None, the HTTP client default applies.
    pub api_timeout_secs: Option<u64>,

    /// Linear upscaling factor applied when rasterising each page. Range: 0.5–4.0. Default: 2.0.
    ///
    /// Gazette annexes are scanned at low resolution; doubling both axes makes
    /// the small print of registration numbers legible to the model.
    pub render_scale: f32,

    /// JPEG quality for page images. Range: 1–100. Default: 95.
    pub jpeg_quality: u8,

    /// Custom extraction instruction. If None, uses [`crate::prompts::EXTRACTION_PROMPT`].
    pub prompt: Option<String>,

    /// Path to a pdfium shared library (file or containing directory).
    /// If None, `PDFIUM_LIB_PATH` is consulted, then the system library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Pre-constructed model client. Takes precedence over `api_key`.
    pub provider: Option<Arc<dyn VisionModel>>,

    /// Optional per-document progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            input_directory: PathBuf::from("."),
            output_path: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_timeout_secs: None,
            render_scale: 2.0,
            jpeg_quality: 95,
            prompt: None,
            pdfium_lib_path: None,
            provider: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("input_directory", &self.input_directory)
            .field("output_path", &self.output_path)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("render_scale", &self.render_scale)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("prompt", &self.prompt.as_ref().map(|p| p.len()))
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: ExtractionConfig::default(),
        }
    }

    /// The effective output path.
    pub fn resolved_output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| self.input_directory.join(DEFAULT_OUTPUT_FILE))
    }

    /// The input directory as a path.
    pub fn input_directory(&self) -> &Path {
        &self.input_directory
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn input_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_directory = dir.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = Some(path.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    pub fn render_scale(mut self, scale: f32) -> Self {
        self.config.render_scale = scale;
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = Some(prompt.into());
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn VisionModel>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, GazetteError> {
        let c = &self.config;
        if !(0.5..=4.0).contains(&c.render_scale) {
            return Err(GazetteError::InvalidConfig(format!(
                "Render scale must be 0.5–4.0, got {}",
                c.render_scale
            )));
        }
        if c.jpeg_quality == 0 || c.jpeg_quality > 100 {
            return Err(GazetteError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        if c.max_tokens == 0 {
            return Err(GazetteError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.model.trim().is_empty() {
            return Err(GazetteError::InvalidConfig("Model must not be empty".into()));
        }
        if c.base_url.trim().is_empty() {
            return Err(GazetteError::InvalidConfig("Base URL must not be empty".into()));
        }
        if c.provider.is_none() && c.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(GazetteError::MissingApiKey);
        }
        Ok(self.config)
    }
}
