//! OpenAI-compatible classifier backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use timeline_core::defaults::{AI_MAX_TOKENS, AI_TEMPERATURE};
use tracing::{debug, info, warn};

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::classify::TagClassifier;
use crate::config::AiConfig;
use crate::error::{AiError, AiResult};

/// Chat-completion client for any OpenAI-compatible endpoint.
pub struct OpenAIBackend {
    client: Client,
    config: AiConfig,
    endpoint: Url,
}

impl OpenAIBackend {
    /// Create a backend, validating the configuration and endpoint URL.
    pub fn new(config: AiConfig) -> AiResult<Self> {
        if !config.is_valid() {
            return Err(AiError::InvalidConfig);
        }

        let endpoint_str = config.endpoint_url();
        let endpoint =
            Url::parse(&endpoint_str).map_err(|_| AiError::InvalidUrl(endpoint_str.clone()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(AiError::InvalidUrl(endpoint_str));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "openai",
            endpoint = %endpoint,
            model = %config.model_name,
            "Initializing OpenAI backend"
        );

        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> AiResult<Self> {
        Self::new(AiConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// The resolved chat-completion URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Build a request with authentication if configured.
    fn build_request(&self) -> reqwest::RequestBuilder {
        let mut req = self.client.post(self.endpoint.clone());

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        req.header("Content-Type", "application/json")
    }

    /// Send a single user message and return the trimmed reply.
    pub async fn chat(&self, prompt: &str) -> AiResult<String> {
        let start = Instant::now();
        debug!(
            subsystem = "inference",
            component = "openai",
            model = %self.config.model_name,
            prompt_len = prompt.len(),
            "Sending chat completion"
        );

        let request = ChatCompletionRequest {
            model: self.config.model_name.clone(),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: AI_MAX_TOKENS,
            temperature: AI_TEMPERATURE,
        };

        let response = self
            .build_request()
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(
                    subsystem = "inference",
                    component = "openai",
                    error = %e,
                    timeout = e.is_timeout(),
                    "Request failed"
                );
                AiError::Network(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;

        if status != StatusCode::OK {
            let body = String::from_utf8_lossy(&body).into_owned();
            warn!(
                subsystem = "inference",
                component = "openai",
                status = status.as_u16(),
                response_len = body.len(),
                "Endpoint returned an error status"
            );
            return Err(AiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_slice(&body).map_err(|_| AiError::Parse)?;
        let content = parsed.first_content().ok_or(AiError::Parse)?;

        debug!(
            subsystem = "inference",
            component = "openai",
            response_len = content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Chat completion finished"
        );
        Ok(content)
    }
}

#[async_trait]
impl TagClassifier for OpenAIBackend {
    async fn complete(&self, prompt: &str) -> AiResult<String> {
        self.chat(prompt).await
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}
