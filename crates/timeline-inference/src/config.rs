//! AI endpoint configuration.

use timeline_core::defaults::AI_TIMEOUT_SECS;

/// Environment variable for the endpoint base URL.
pub const ENV_BASE_URL: &str = "TIMELINE_AI_BASE_URL";
/// Environment variable for the model name.
pub const ENV_MODEL: &str = "TIMELINE_AI_MODEL";
/// Environment variable for the bearer key.
pub const ENV_API_KEY: &str = "TIMELINE_AI_API_KEY";
/// Environment variable for the request timeout in seconds.
pub const ENV_TIMEOUT: &str = "TIMELINE_AI_TIMEOUT";

const CHAT_COMPLETIONS_SUFFIX: &str = "/chat/completions";

/// Connection settings for an OpenAI-compatible chat-completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    /// Endpoint base, normalised by [`AiConfig::endpoint_url`].
    pub base_url: String,
    /// Bearer key. `None` sends no `Authorization` header.
    pub api_key: Option<String>,
    /// Model identifier sent with every request.
    pub model_name: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            model_name: String::new(),
            timeout_seconds: AI_TIMEOUT_SECS,
        }
    }
}

impl AiConfig {
    pub fn new(base_url: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model_name: model_name.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = if key.trim().is_empty() { None } else { Some(key) };
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Create from environment variables.
    ///
    /// Unset variables leave the configuration invalid rather than failing;
    /// an empty key counts as no key.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var(ENV_BASE_URL).unwrap_or_default(),
            api_key: std::env::var(ENV_API_KEY)
                .ok()
                .filter(|k| !k.trim().is_empty()),
            model_name: std::env::var(ENV_MODEL).unwrap_or_default(),
            timeout_seconds: std::env::var(ENV_TIMEOUT)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(AI_TIMEOUT_SECS),
        }
    }

    /// Both base URL and model name are non-empty after trimming.
    pub fn is_valid(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.model_name.trim().is_empty()
    }

    /// Full chat-completion URL derived from `base_url`.
    ///
    /// | base ends with       | appended               |
    /// |----------------------|------------------------|
    /// | `/chat/completions`  | nothing                |
    /// | `/v1`                | `/chat/completions`    |
    /// | `/v1/`               | `chat/completions`     |
    /// | `/`                  | `v1/chat/completions`  |
    /// | anything else        | `/v1/chat/completions` |
    pub fn endpoint_url(&self) -> String {
        let base = self.base_url.trim();
        if base.ends_with(CHAT_COMPLETIONS_SUFFIX) {
            base.to_string()
        } else if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else if base.ends_with("/v1/") {
            format!("{}chat/completions", base)
        } else if base.ends_with('/') {
            format!("{}v1/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }
}
