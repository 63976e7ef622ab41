//! Anthropic Messages API client.
//!
//! One `POST /v1/messages` per document: a single user turn holding every page
//! image followed by the instruction text. No streaming, no retries; any
//! failure is reported once as a [`ModelError`] and the caller moves on to the
//! next document.

use crate::config::ExtractionConfig;
use crate::error::{GazetteError, ModelError};
use crate::model::{ContentBlock, ModelReply, ReplyBlock, Usage, VisionModel};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Value of the `anthropic-version` header.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Request body for `POST /v1/messages`.
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: usize,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a [ContentBlock],
}

/// Success body of `POST /v1/messages`; fields this crate ignores are skipped.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ReplyBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

/// Documented error envelope: `{"type":"error","error":{"type":..,"message":..}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type", default)]
    kind: String,
    message: String,
}

/// HTTP client for the Anthropic Messages API.
#[derive(Clone)]
pub struct AnthropicClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: usize,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl AnthropicClient {
    /// Build a client from the batch configuration.
    ///
    /// # Errors
    /// [`GazetteError::MissingApiKey`] when no key is configured, or
    /// [`GazetteError::HttpClient`] if the TLS backend cannot initialise.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, GazetteError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GazetteError::MissingApiKey)?;

        let mut builder = Client::builder();
        if let Some(secs) = config.api_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| GazetteError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

#[async_trait]
impl VisionModel for AnthropicClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, content: &[ContentBlock]) -> Result<ModelReply, ModelError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: [UserMessage {
                role: "user",
                content,
            }],
        };

        let response = self
            .http
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(ModelError::from_reqwest)?;

        let status = response.status();
        let text = response.text().await.map_err(ModelError::from_reqwest)?;

        if !status.is_success() {
            return Err(ModelError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&text).map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        debug!(
            "Model replied with {} content block(s), usage {:?}",
            parsed.content.len(),
            parsed.usage
        );

        Ok(ModelReply {
            content: parsed.content,
            usage: parsed.usage,
        })
    }
}

/// Extract a readable message from an error response body.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) if env.error.kind.is_empty() => env.error.message,
        Ok(env) => format!("{}: {}", env.error.kind, env.error.message),
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
