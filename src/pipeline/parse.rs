//! Reply interpretation: first text block → JSON value.
//!
//! Parsing is strict JSON with no cleanup. Anything JSON-shaped counts as a
//! successful extraction; the nested `original` / `english` structure is not
//! validated. When parsing fails the raw text is preserved verbatim in the
//! error so it can be inspected by hand.

use crate::error::DocumentError;
use crate::model::ModelReply;
use serde_json::Value;
use tracing::debug;

/// Interpret a model reply as an extraction payload.
///
/// # Errors
/// [`DocumentError::EmptyResponse`] when the reply has no leading text block,
/// [`DocumentError::Parse`] when that text is not valid JSON.
pub fn interpret_reply(reply: &ModelReply) -> Result<Value, DocumentError> {
    let text = reply.first_text().ok_or(DocumentError::EmptyResponse)?;
    parse_extraction(text)
}

/// Parse reply text as JSON, keeping the original text on failure.
pub fn parse_extraction(text: &str) -> Result<Value, DocumentError> {
    serde_json::from_str(text).map_err(|e| {
        debug!("Reply is not valid JSON: {}", e);
        DocumentError::Parse {
            raw_response: text.to_string(),
            detail: e.to_string(),
        }
    })
}
