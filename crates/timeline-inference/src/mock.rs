//! Mock classifier for deterministic testing.
//!
//! ```rust,ignore
//! let classifier = MockClassifier::new().with_fixed_response("用户认证模块");
//! let tags = classifier.classify("完成了用户认证模块的开发", &[]).await?;
//! assert_eq!(tags, vec!["用户认证模块".to_string()]);
//! assert_eq!(classifier.call_count(), 1);
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::classify::TagClassifier;
use crate::error::{AiError, AiResult};

/// Classifier that answers from configuration instead of the network.
#[derive(Clone)]
pub struct MockClassifier {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<String>>>,
}

#[derive(Debug, Clone, Default)]
struct MockConfig {
    default_response: String,
    response_mappings: Vec<(String, String)>,
    error: Option<AiError>,
    latency_ms: u64,
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClassifier {
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply used when no mapping matches.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Reply with `output` whenever the prompt contains `needle`.
    pub fn with_response_mapping(
        mut self,
        needle: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .response_mappings
            .push((needle.into(), output.into()));
        self
    }

    /// Fail every call with `error`.
    pub fn with_error(mut self, error: AiError) -> Self {
        Arc::make_mut(&mut self.config).error = Some(error);
        self
    }

    /// Delay every call.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.call_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl TagClassifier for MockClassifier {
    async fn complete(&self, prompt: &str) -> AiResult<String> {
        self.call_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());

        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        if let Some(ref error) = self.config.error {
            return Err(error.clone());
        }

        let reply = self
            .config
            .response_mappings
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| self.config.default_response.clone());
        Ok(reply.trim().to_string())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
