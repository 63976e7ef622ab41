//! Error types for the gazette-extract library.
//!
//! Two distinct error families reflect two distinct failure modes:
//!
//! * [`GazetteError`]: **Fatal**: the batch cannot run at all (missing API
//!   key, input directory does not exist, output file cannot be written).
//!   Returned as `Err(GazetteError)` from [`crate::batch::run`] and friends.
//!
//! * [`DocumentError`]: **Non-fatal**: one PDF failed (bad file, model call
//!   rejected, reply was not JSON) but the rest of the batch is fine. Stored
//!   inside [`crate::output::ExtractionResult`] and written to the output file
//!   as an error record, so a single bad scan never aborts the run.
//!
//! [`DocumentError`] is discriminated by origin ([`RenderError`],
//! [`ModelError`], parse failure, empty reply) so callers can branch on the
//! cause instead of matching on message strings.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the gazette-extract library.
#[derive(Debug, Error)]
pub enum GazetteError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input directory does not exist.
    #[error("Input directory not found: '{path}'\nCheck the path exists and is readable.")]
    InputDirectoryNotFound { path: PathBuf },

    /// The input path exists but is a file, not a directory.
    #[error("Input path is not a directory: '{path}'")]
    InputNotADirectory { path: PathBuf },

    /// The `*.pdf` pattern built from the input directory is not a valid glob.
    #[error("Invalid glob pattern '{pattern}': {detail}")]
    InvalidGlob { pattern: String, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output JSON file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Results could not be serialised to JSON.
    #[error("Failed to serialise results: {0}")]
    Serialize(#[from] serde_json::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// No API key was configured and no pre-built model was supplied.
    #[error(
        "No Anthropic API key configured.\n\
Set ANTHROPIC_API_KEY or pass --api-key <KEY>."
    )]
    MissingApiKey,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a PDF could not be turned into page images.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The PDF file was not found.
    #[error("PDF file not found: '{}'", path.display())]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{}'", path.display())]
    PermissionDenied { path: PathBuf },

    /// The file exists but does not start with the `%PDF` header.
    #[error("File is not a valid PDF: '{}' (first bytes: {magic:?})", path.display())]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// The PDF is password protected.
    #[error("PDF '{}' is encrypted and cannot be opened without a password", path.display())]
    Encrypted { path: PathBuf },

    /// pdfium could not parse the document.
    #[error("PDF '{}' is corrupt: {detail}", path.display())]
    CorruptPdf { path: PathBuf, detail: String },

    /// The document opened but contains no pages.
    #[error("PDF '{}' has no pages", path.display())]
    NoPages { path: PathBuf },

    /// pdfium failed to rasterise a page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The rendered bitmap could not be JPEG-encoded.
    #[error("JPEG encoding failed for page {page}: {detail}")]
    EncodeFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}. \
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    /// The blocking render task panicked or was cancelled.
    #[error("Render task failed: {0}")]
    TaskFailed(String),
}

/// Why the model call for a document failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The API answered with a non-success HTTP status.
    #[error("Anthropic API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request never completed (DNS, TLS, connection reset, ...).
    #[error("Request to model API failed: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout.
    #[error("Model API request timed out: {0}")]
    Timeout(String),

    /// A success response whose body could not be decoded.
    #[error("Invalid response from model API: {0}")]
    InvalidResponse(String),

    /// Failure reported by a non-HTTP [`crate::model::VisionModel`]
    /// implementation; displayed verbatim.
    #[error("{0}")]
    Provider(String),
}

impl ModelError {
    /// Classify a `reqwest` failure.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ModelError::Timeout(e.to_string())
        } else if e.is_decode() {
            ModelError::InvalidResponse(e.to_string())
        } else {
            ModelError::Transport(e.to_string())
        }
    }
}

/// A non-fatal failure for a single document.
///
/// The `Display` string is what lands in the output record's `error` field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The PDF could not be rendered to page images.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The model call itself failed; no reply text exists.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The model replied, but the text was not valid JSON.
    ///
    /// `raw_response` preserves the reply verbatim for manual inspection;
    /// `detail` is the JSON parser's message, kept for logs only.
    #[error("Failed to parse JSON response")]
    Parse { raw_response: String, detail: String },

    /// The reply had no content blocks, or its first block was not text.
    #[error("Model response contained no text content")]
    EmptyResponse,
}

impl DocumentError {
    /// The unparsed reply text, present only for [`DocumentError::Parse`].
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            DocumentError::Parse { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Short machine-friendly label for the failure origin.
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentError::Render(_) => "render",
            DocumentError::Model(_) => "model",
            DocumentError::Parse { .. } => "parse",
            DocumentError::EmptyResponse => "empty_response",
        }
    }
}
