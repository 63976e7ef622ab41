//! Result types written to the output file.
//!
//! In memory a result is a discriminated [`ExtractionOutcome`]; on disk it keeps
//! the flat record shape downstream consumers already read:
//!
//! ```json
//! {"filename": "a.pdf", "extracted_data": {"original": {...}, "english": {...}}}
//! {"filename": "b.pdf", "status": "error", "error": "Failed to parse JSON response", "raw_response": "..."}
//! {"filename": "c.pdf", "status": "error", "error": "Anthropic API error (HTTP 529): overloaded"}
//! ```
//!
//! `raw_response` appears only for parse failures.

use crate::error::DocumentError;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::path::PathBuf;

/// What happened to one document.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// The model's reply parsed as JSON.
    Success(Value),
    /// Rendering, the model call, or parsing failed.
    Failed(DocumentError),
}

/// The record produced for one PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    /// Base name of the PDF.
    pub filename: String,
    /// Number of page images sent to the model (0 if rendering failed).
    /// Not serialised.
    pub page_count: usize,
    pub outcome: ExtractionOutcome,
}

impl ExtractionResult {
    pub fn success(filename: impl Into<String>, page_count: usize, data: Value) -> Self {
        Self {
            filename: filename.into(),
            page_count,
            outcome: ExtractionOutcome::Success(data),
        }
    }

    pub fn failed(filename: impl Into<String>, page_count: usize, error: DocumentError) -> Self {
        Self {
            filename: filename.into(),
            page_count,
            outcome: ExtractionOutcome::Failed(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ExtractionOutcome::Success(_))
    }

    pub fn extracted_data(&self) -> Option<&Value> {
        match &self.outcome {
            ExtractionOutcome::Success(v) => Some(v),
            ExtractionOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&DocumentError> {
        match &self.outcome {
            ExtractionOutcome::Success(_) => None,
            ExtractionOutcome::Failed(e) => Some(e),
        }
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.outcome {
            ExtractionOutcome::Success(data) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("filename", &self.filename)?;
                map.serialize_entry("extracted_data", data)?;
                map.end()
            }
            ExtractionOutcome::Failed(err) => {
                let raw = err.raw_response();
                let mut map = serializer.serialize_map(Some(if raw.is_some() { 4 } else { 3 }))?;
                map.serialize_entry("filename", &self.filename)?;
                map.serialize_entry("status", "error")?;
                map.serialize_entry("error", &err.to_string())?;
                if let Some(raw) = raw {
                    map.serialize_entry("raw_response", raw)?;
                }
                map.end()
            }
        }
    }
}

/// The on-disk document: `{"results": [...]}`.
#[derive(Debug, Serialize)]
pub struct BatchOutput<'a> {
    pub results: &'a [ExtractionResult],
}

/// Counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchStats {
    pub fn from_results(results: &[ExtractionResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub results: Vec<ExtractionResult>,
    pub stats: BatchStats,
    /// Where the output file was written, if it was.
    pub output_path: Option<PathBuf>,
}
