//! Generative text service client
//!
//! [`TextGenerator`] is the seam the practice-set pipeline depends on;
//! [`OpenAiClient`] implements it against any OpenAI-compatible
//! `/chat/completions` endpoint. One call, no retries: the configured
//! transport timeout bounds the wait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tsuzuri_common::config::GenerativeConfig;

const USER_AGENT: &str = concat!("tsuzuri/", env!("CARGO_PKG_VERSION"));

/// Generative service errors
#[derive(Debug, Error)]
pub enum GenerativeError {
    #[error("API key is not configured")]
    MissingApiKey,

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Request(String),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("empty completion")]
    EmptyResponse,
}

impl From<reqwest::Error> for GenerativeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerativeError::Timeout
        } else {
            GenerativeError::Request(e.to_string())
        }
    }
}

/// Text-completion capability
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(
        &self,
        prompt: &str,
        model: &str,
        max_output_tokens: u32,
    ) -> Result<String, GenerativeError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client
pub struct OpenAiClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &GenerativeConfig) -> Result<Self, GenerativeError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerativeError::Request(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate_text(
        &self,
        prompt: &str,
        model: &str,
        max_output_tokens: u32,
    ) -> Result<String, GenerativeError> {
        let api_key = self.api_key.as_deref().ok_or(GenerativeError::MissingApiKey)?;

        let body = ChatRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: max_output_tokens,
        };

        tracing::debug!(model = model, max_output_tokens, "Requesting completion");

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerativeError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerativeError::Parse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(GenerativeError::EmptyResponse)
    }
}
