//! OpenRouter LLM client
//!
//! One request per call with no retry or model fallback. Callers that need
//! an answer anyway use the rule-based fallback.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::completer::TextCompleter;
use super::types::{ChatRequest, ChatResponse, LlmResponse, Message};

/// OpenRouter API base URL
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// OpenRouter chat completions client
#[derive(Clone)]
pub struct LlmClient {
    http_client: HttpClient,
    config: LlmConfig,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("base_url", &self.base_url)
            .field("default_model", &self.config.default_model)
            .finish()
    }
}

/// Builder for creating an LlmClient
#[derive(Default)]
pub struct LlmClientBuilder {
    config: Option<LlmConfig>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl LlmClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: LlmConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL (defaults to OpenRouter)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Transport timeout; defaults to `llm.timeout_secs`
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn build(self) -> Result<LlmClient> {
        let config = self.config.unwrap_or_default();
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::LLMError("API key is required".to_string()))?;

        let timeout_secs = self.timeout_secs.unwrap_or(config.timeout_secs);

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(Error::NetworkError)?;

        Ok(LlmClient {
            http_client,
            config,
            api_key,
            base_url: self
                .base_url
                .unwrap_or_else(|| OPENROUTER_BASE_URL.to_string()),
        })
    }
}

impl LlmClient {
    pub fn new(config: LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        LlmClientBuilder::new()
            .config(config)
            .api_key(api_key)
            .build()
    }

    pub fn builder() -> LlmClientBuilder {
        LlmClientBuilder::new()
    }

    pub fn default_model(&self) -> &str {
        &self.config.default_model
    }

    /// Send one chat completion request with explicit bounds
    pub async fn chat(
        &self,
        messages: Vec<Message>,
        max_tokens: usize,
        temperature: f32,
    ) -> Result<LlmResponse> {
        let request = ChatRequest::new(&self.config.default_model, messages)
            .with_temperature(temperature)
            .with_max_tokens(max_tokens);

        self.send_request(&request).await
    }

    async fn send_request(&self, request: &ChatRequest) -> Result<LlmResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("X-Title", "Homegraph")
            .json(request)
            .send()
            .await
            .map_err(Error::NetworkError)?;

        let status = response.status();

        if !status.is_success() {
            return self.handle_error_response(status, response).await;
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::LLMError(format!("Failed to parse response: {}", e)))?;

        LlmResponse::from_chat_response(chat_response)
            .ok_or_else(|| Error::LLMError("Empty response from API".to_string()))
    }

    async fn handle_error_response<T>(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> Result<T> {
        let body = response.text().await.unwrap_or_default();
        Err(Error::LLMError(describe_status(status.as_u16(), &body)))
    }
}

/// Human-readable message for a non-success status
fn describe_status(status: u16, body: &str) -> String {
    match status {
        401 => "Unauthorized: Invalid API key. Set HOMEGRAPH_API_KEY or OPENROUTER_API_KEY environment variable.".to_string(),
        402 => "Payment required: Insufficient credits on OpenRouter account".to_string(),
        429 => format!("Rate limited: {}", body),
        400 => format!("Bad request: {}", body),
        403 => format!("Forbidden: {}", body),
        404 => format!("Model not found or endpoint unavailable: {}", body),
        500..=599 => format!("Server error ({}): {}", status, body),
        _ => format!("HTTP error {}: {}", status, body),
    }
}

#[async_trait]
impl TextCompleter for LlmClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: usize,
        temperature: f32,
    ) -> Result<String> {
        let messages = vec![Message::system(system), Message::user(user)];
        let response = self.chat(messages, max_tokens, temperature).await?;
        debug!(
            model = %response.model,
            tokens = response.tokens_used,
            finish_reason = %response.finish_reason,
            "Chat completion finished"
        );
        Ok(response.content)
    }
}
