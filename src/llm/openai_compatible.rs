//! OpenAI-compatible text generator.
//!
//! Works against any endpoint that implements the OpenAI Chat Completions
//! API: OpenAI itself, OpenRouter, vLLM, LiteLLM, or Ollama in OpenAI mode.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::GenerationError;
use crate::llm::provider::TextGenerator;

/// Provider name constant to avoid magic strings.
const PROVIDER_NAME: &str = "openai_compatible";

/// Chat Completions API generator.
pub struct OpenAiCompatibleGenerator {
    client: Client,
    config: LlmConfig,
}

impl OpenAiCompatibleGenerator {
    /// Create a new generator from config.
    pub fn new(config: LlmConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::RequestFailed {
                provider: PROVIDER_NAME.to_string(),
                reason: format!("Failed to build reqwest client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    /// Construct the chat completions URL. Strips a trailing `/v1` from the
    /// base URL to avoid double `/v1` issues.
    fn api_url(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let base = base.strip_suffix("/v1").unwrap_or(base);
        format!("{}/v1/chat/completions", base)
    }

    /// Add Authorization header if an API key is configured.
    fn add_auth_header(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.api_key.as_ref() {
            Some(key) => request.header("Authorization", format!("Bearer {}", key.expose_secret())),
            None => request,
        }
    }
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Deserialize)]
struct ApiResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleGenerator {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = self.api_url();
        let body = ApiRequest {
            model: &self.config.model,
            messages: vec![ApiMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::debug!(url = %url, model = %self.config.model, "sending generation request");

        let request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        let request = self.add_auth_header(request);

        let response = request.send().await.map_err(|e| {
            tracing::error!("generation request failed: {}", e);
            GenerationError::RequestFailed {
                provider: PROVIDER_NAME.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| GenerationError::RequestFailed {
                provider: PROVIDER_NAME.to_string(),
                reason: format!("Failed to read response body: {}", e),
            })?;

        if !status.is_success() {
            if status.as_u16() == 401 {
                return Err(GenerationError::AuthFailed {
                    provider: PROVIDER_NAME.to_string(),
                });
            }
            if status.as_u16() == 429 {
                return Err(GenerationError::RateLimited {
                    provider: PROVIDER_NAME.to_string(),
                });
            }
            return Err(GenerationError::RequestFailed {
                provider: PROVIDER_NAME.to_string(),
                reason: format!(
                    "HTTP {}: {}",
                    status,
                    &response_text[..response_text.len().min(200)]
                ),
            });
        }

        let parsed: ApiResponse =
            serde_json::from_str(&response_text).map_err(|e| GenerationError::InvalidResponse {
                provider: PROVIDER_NAME.to_string(),
                reason: format!(
                    "JSON parse error: {}. Raw: {}",
                    e,
                    &response_text[..response_text.len().min(200)]
                ),
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(GenerationError::InvalidResponse {
                provider: PROVIDER_NAME.to_string(),
                reason: "empty completion content".to_string(),
            });
        }

        Ok(content)
    }
}
