//! OpenAI-compatible chat-completion backend.
//!
//! Works with any endpoint speaking the OpenAI chat-completion protocol
//! (OpenAI, Azure OpenAI, Ollama in compatibility mode, vLLM, LM Studio,
//! DeepSeek, Moonshot, ...).
//!
//! # Example
//!
//! ```rust,no_run
//! use timeline_inference::openai::OpenAIBackend;
//! use timeline_inference::{AiConfig, TagClassifier};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AiConfig::new("http://localhost:11434/v1", "qwen2.5");
//!     let backend = OpenAIBackend::new(config).unwrap();
//!
//!     let tags = backend
//!         .classify("完成了用户认证模块的开发", &["开发".to_string()])
//!         .await
//!         .unwrap();
//!     println!("{:?}", tags);
//! }
//! ```

mod backend;
mod types;

pub use backend::OpenAIBackend;
pub use types::*;
