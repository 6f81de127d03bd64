//! Classification errors.

use thiserror::Error;

/// Result type alias for AI calls.
pub type AiResult<T> = std::result::Result<T, AiError>;

/// Why an AI request produced no usable reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    /// Base URL or model name is empty.
    #[error("AI configuration is invalid: base URL and model name are required")]
    InvalidConfig,

    /// The endpoint URL could not be used.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Transport failure, including timeouts.
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-200 status.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The reply body did not contain `choices[0].message.content`.
    #[error("Failed to parse response")]
    Parse,
}
