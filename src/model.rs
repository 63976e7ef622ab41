//! The vision-model seam: content blocks in, content blocks out.
//!
//! The request side mirrors the Anthropic Messages API content model: an
//! ordered list of image and text blocks forming a single user turn. The
//! extraction prompt is written against that contract. The reply is
//! kept as a sequence of blocks rather than "the text", so an empty reply or a
//! reply that opens with a non-text block is something the caller can detect.
//!
//! Production code talks to [`crate::anthropic::AnthropicClient`]; tests plug
//! in a deterministic stub through the same [`VisionModel`] trait.

use crate::error::ModelError;
use crate::pipeline::encode::PageImage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One block of the user turn sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// An inline base64 image.
    Image { source: ImageSource },
    /// Plain instruction text.
    Text { text: String },
}

impl ContentBlock {
    /// Wrap an encoded page as an image block.
    pub fn image(page: PageImage) -> Self {
        ContentBlock::Image {
            source: ImageSource {
                kind: "base64".to_string(),
                media_type: page.media_type,
                data: page.data,
            },
        }
    }

    /// Wrap instruction text as a text block.
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ContentBlock::Image { .. })
    }
}

/// Source of an image block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSource {
    /// Always `"base64"` for inline data.
    #[serde(rename = "type")]
    pub kind: String,
    /// e.g. `image/jpeg`.
    pub media_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

/// One block of the model's reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplyBlock {
    Text { text: String },
    /// Any block type this crate does not consume (tool use, thinking, ...).
    #[serde(other)]
    Other,
}

/// Token accounting reported by the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

/// The model's reply to one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub content: Vec<ReplyBlock>,
    pub usage: Option<Usage>,
}

impl ModelReply {
    /// A reply consisting of a single text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ReplyBlock::Text { text: text.into() }],
            usage: None,
        }
    }

    /// Text of the first block, if the first block is text.
    ///
    /// Later blocks are deliberately ignored: the extraction contract is that
    /// the JSON object is the first thing the model says.
    pub fn first_text(&self) -> Option<&str> {
        match self.content.first() {
            Some(ReplyBlock::Text { text }) => Some(text),
            _ => None,
        }
    }
}

/// A multimodal model that answers one user turn made of content blocks.
///
/// Implementations must be `Send + Sync`; a single instance is shared
/// read-only by every document in a batch.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Human-readable identifier used in logs, e.g. the model id.
    fn name(&self) -> &str;

    /// Send one request and wait for the complete reply.
    async fn complete(&self, content: &[ContentBlock]) -> Result<ModelReply, ModelError>;
}
