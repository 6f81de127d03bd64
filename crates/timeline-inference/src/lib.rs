//! # timeline-inference
//!
//! AI tag classification for the timeline journal.
//!
//! This crate provides:
//! - [`AiConfig`]: endpoint settings and URL normalisation
//! - [`TagClassifier`]: the seam the classification pipeline calls through
//! - [`openai::OpenAIBackend`]: a classifier over any OpenAI-compatible
//!   chat-completion endpoint
//! - [`AiError`]: typed failures (configuration, URL, network, API, parse)
//!
//! # Feature Flags
//!
//! - `mock`: expose [`mock::MockClassifier`] to dependent crates' tests

pub mod classify;
pub mod config;
pub mod error;
pub mod openai;

// Mock classifier for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use classify::{build_classification_prompt, TagClassifier, TEST_CONNECTION_PROMPT};
pub use config::AiConfig;
pub use error::{AiError, AiResult};
pub use openai::OpenAIBackend;
